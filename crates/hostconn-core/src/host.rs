//! ホスト関数インボーカー
//!
//! ホストのグローバル名前空間にある関数を名前で解決し、呼び出す。
//! アダプターのすべての操作はここを通る。
//!
//! ## 呼び出し規約
//!
//! ```text
//! invoke(name, args):
//!   1. resolve(name)  → 未定義/呼び出し不可なら FunctionUndefined
//!   2. call(fn, args) → ホスト側の失敗は InvocationFailed
//! ```
//!
//! 1 回の invoke につき解決 1 回・呼び出し 1 回。リトライもキャッシュもしない。

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::error::{ConnError, HostFault};

/// ホスト環境の抽象化
///
/// 実際のホスト（JS のグローバル名前空間）もテスト用のレジストリも
/// このトレイトを実装してアダプターに注入される。
pub trait HostEnv {
    /// ホストの値（引数・戻り値）
    type Value;
    /// 解決済みの呼び出し可能なハンドル
    type Function: Clone;

    /// 名前から関数を解決する
    ///
    /// 未定義、または束縛された値が呼び出し可能でない場合は `None`。
    /// 副作用なし。何度呼んでもよい。
    fn resolve(&self, name: &str) -> Option<Self::Function>;

    /// 解決済みの関数を引数付きで呼び出す
    fn call(&self, function: &Self::Function, args: &[Self::Value]) -> Result<Self::Value, HostFault>;

    /// バイト列をホストのバイナリ配列に変換する
    ///
    /// ビューではなく、ホスト側で確保した独立したコピーを返すこと。
    fn bytes_to_value(&self, bytes: &[u8]) -> Self::Value;

    /// ホストの値をバイト列に変換する
    ///
    /// 文字列は UTF-8、バイナリ配列はそのまま、undefined/null は空。
    fn value_to_bytes(&self, value: &Self::Value) -> Vec<u8>;
}

/// 関数名を解決し、見つかったかどうかを返す
pub fn resolve<E: HostEnv + ?Sized>(env: &E, name: &str) -> Option<E::Function> {
    env.resolve(name)
}

/// 関数名を解決して呼び出す
///
/// # エラー
/// - 名前が未定義/呼び出し不可: `ConnError::FunctionUndefined`
/// - ホスト関数の失敗: `ConnError::InvocationFailed`
pub fn invoke<E: HostEnv + ?Sized>(env: &E, name: &str, args: &[E::Value]) -> Result<E::Value, ConnError> {
    let function = match env.resolve(name) {
        Some(function) => function,
        None => {
            tracing::debug!("host function {:?} is undefined", name);
            return Err(ConnError::FunctionUndefined(name.to_string()));
        }
    };
    call_resolved(env, name, &function, args)
}

/// 解決済みのハンドルを呼び出す（エラーには `name` を付ける）
pub(crate) fn call_resolved<E: HostEnv + ?Sized>(
    env: &E,
    name: &str,
    function: &E::Function,
    args: &[E::Value],
) -> Result<E::Value, ConnError> {
    tracing::debug!("invoking host function {:?} with {} argument(s)", name, args.len());
    env.call(function, args).map_err(|fault| ConnError::InvocationFailed {
        name: name.to_string(),
        message: fault.0,
    })
}
