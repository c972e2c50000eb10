//! インメモリのホスト環境
//!
//! 名前 → 関数の束縛テーブルを持つ `HostEnv` 実装。
//! テストでのモックホストや、ネイティブでの同一プロセス内配線に使う。
//! 構築後に束縛を削除・差し替えることもできる。

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::error::HostFault;
use crate::host::HostEnv;

/// レジストリ上の値
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// ホスト側のバイナリ配列（Uint8Array 相当）
    Bytes(Vec<u8>),
}

impl RegistryValue {
    /// バイナリ配列ならその中身
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RegistryValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<&str> for RegistryValue {
    fn from(s: &str) -> Self {
        RegistryValue::Str(s.to_string())
    }
}

impl From<String> for RegistryValue {
    fn from(s: String) -> Self {
        RegistryValue::Str(s)
    }
}

impl From<Vec<u8>> for RegistryValue {
    fn from(bytes: Vec<u8>) -> Self {
        RegistryValue::Bytes(bytes)
    }
}

type HostFn = dyn Fn(&[RegistryValue]) -> Result<RegistryValue, HostFault>;

/// 解決済みの関数ハンドル
#[derive(Clone)]
pub struct RegistryFunction {
    name: String,
    func: Rc<HostFn>,
}

impl RegistryFunction {
    /// 解決時の名前
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl core::fmt::Debug for RegistryFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegistryFunction").field("name", &self.name).finish()
    }
}

enum Binding {
    Callable(Rc<HostFn>),
    /// 呼び出し不可能な値（resolve では見つからない扱い）
    Value(RegistryValue),
}

/// 1 回の呼び出しの記録
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub name: String,
    pub args: Vec<RegistryValue>,
}

#[derive(Default)]
struct Inner {
    bindings: RefCell<BTreeMap<String, Binding>>,
    /// false なら呼び出しを記録しない
    record_calls: bool,
    calls: RefCell<Vec<CallRecord>>,
}

/// 名前で関数を引けるホスト環境
///
/// `Clone` は同じテーブルを共有する（`Rc`）。ホストはシングルスレッド前提なので
/// `!Send + !Sync`。
#[derive(Clone, Default)]
pub struct HostRegistry {
    inner: Rc<Inner>,
}

impl HostRegistry {
    /// 呼び出しを記録しないレジストリ（長時間の配線用）
    pub fn new() -> Self {
        Self::default()
    }

    /// 呼び出しをすべて記録するレジストリ（テスト用）
    ///
    /// 書き込まれたバイト列も引数として保持し続けるので、
    /// 長く使う場合は `take_calls()` で定期的に取り出すこと。
    pub fn recording() -> Self {
        HostRegistry {
            inner: Rc::new(Inner {
                record_calls: true,
                ..Inner::default()
            }),
        }
    }

    /// 呼び出しを記録しているか
    pub fn is_recording(&self) -> bool {
        self.inner.record_calls
    }

    /// 呼び出し可能な関数を束縛する（同名があれば置き換え）
    pub fn define<F>(&self, name: &str, func: F)
    where
        F: Fn(&[RegistryValue]) -> Result<RegistryValue, HostFault> + 'static,
    {
        self.inner
            .bindings
            .borrow_mut()
            .insert(name.to_string(), Binding::Callable(Rc::new(func)));
    }

    /// 呼び出し不可能な値を束縛する
    pub fn set_value(&self, name: &str, value: RegistryValue) {
        self.inner
            .bindings
            .borrow_mut()
            .insert(name.to_string(), Binding::Value(value));
    }

    /// 束縛を削除する。削除したら true
    pub fn remove(&self, name: &str) -> bool {
        self.inner.bindings.borrow_mut().remove(name).is_some()
    }

    /// 名前が（呼び出し可能かどうかに関わらず）束縛されているか
    pub fn contains(&self, name: &str) -> bool {
        self.inner.bindings.borrow().contains_key(name)
    }

    /// 指定した名前の関数が呼ばれた回数（記録している場合のみ）
    pub fn call_count(&self, name: &str) -> usize {
        self.inner.calls.borrow().iter().filter(|c| c.name == name).count()
    }

    /// 指定した名前の関数が最後に受け取った引数
    pub fn last_args(&self, name: &str) -> Option<Vec<RegistryValue>> {
        self.inner
            .calls
            .borrow()
            .iter()
            .rev()
            .find(|c| c.name == name)
            .map(|c| c.args.clone())
    }

    /// すべての呼び出し記録（呼び出し順）
    pub fn calls(&self) -> Vec<CallRecord> {
        self.inner.calls.borrow().clone()
    }

    /// 記録を取り出して空にする
    pub fn take_calls(&self) -> Vec<CallRecord> {
        core::mem::take(&mut *self.inner.calls.borrow_mut())
    }
}

impl HostEnv for HostRegistry {
    type Value = RegistryValue;
    type Function = RegistryFunction;

    fn resolve(&self, name: &str) -> Option<RegistryFunction> {
        match self.inner.bindings.borrow().get(name) {
            Some(Binding::Callable(func)) => Some(RegistryFunction {
                name: name.to_string(),
                func: Rc::clone(func),
            }),
            Some(Binding::Value(_)) | None => None,
        }
    }

    fn call(&self, function: &RegistryFunction, args: &[RegistryValue]) -> Result<RegistryValue, HostFault> {
        // 関数内からレジストリを操作できるよう、借用を解放してから呼ぶ
        if self.inner.record_calls {
            self.inner.calls.borrow_mut().push(CallRecord {
                name: function.name.clone(),
                args: args.to_vec(),
            });
        }
        (function.func)(args)
    }

    fn bytes_to_value(&self, bytes: &[u8]) -> RegistryValue {
        RegistryValue::Bytes(bytes.to_vec())
    }

    fn value_to_bytes(&self, value: &RegistryValue) -> Vec<u8> {
        match value {
            RegistryValue::Undefined | RegistryValue::Null => Vec::new(),
            RegistryValue::Bool(b) => b.to_string().into_bytes(),
            RegistryValue::Number(n) => format_number(*n).into_bytes(),
            RegistryValue::Str(s) => s.as_bytes().to_vec(),
            RegistryValue::Bytes(bytes) => bytes.clone(),
        }
    }
}

/// JS の `String(number)` に合わせる
///
/// 整数値は小数点なし、1e21 以上と 1e-6 未満は指数表記（`1e+21`）、
/// 非有限値は `NaN` / `Infinity`、-0 は `0`。
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return String::from("NaN");
    }
    if n.is_infinite() {
        return String::from(if n > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if n == 0.0 {
        return String::from("0");
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let s = format!("{:e}", n);
        match s.find('e') {
            Some(pos) if !s[pos + 1..].starts_with('-') => {
                format!("{}e+{}", &s[..pos], &s[pos + 1..])
            }
            _ => s,
        }
    } else {
        format!("{}", n)
    }
}
