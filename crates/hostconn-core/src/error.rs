//! 接続アダプターのエラー型

use alloc::string::String;

use crate::options::HandlerRole;

/// ホスト関数の呼び出し中に発生した失敗（JS の例外など）
///
/// ホスト側が返したメッセージをそのまま保持する。解釈はしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFault(pub String);

impl HostFault {
    pub fn new(message: impl Into<String>) -> Self {
        HostFault(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for HostFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続の構築・操作のエラー
///
/// どのエラーもリトライされず、そのまま呼び出し元に返される。
/// 一時的な失敗と恒久的な失敗は区別しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnError {
    /// 構築時: 設定されたハンドラー名が未定義、または呼び出し可能でない
    HandlerUndefined { role: HandlerRole, name: String },
    /// 呼び出し時: 関数名が未定義（構築後に削除された場合など）
    FunctionUndefined(String),
    /// ホスト関数自体が失敗した
    InvocationFailed { name: String, message: String },
}

impl ConnError {
    /// エラーの原因となったホスト関数名
    pub fn function_name(&self) -> &str {
        match self {
            ConnError::HandlerUndefined { name, .. } => name,
            ConnError::FunctionUndefined(name) => name,
            ConnError::InvocationFailed { name, .. } => name,
        }
    }

    /// 未定義ハンドラーによるエラーか
    pub fn is_undefined(&self) -> bool {
        matches!(
            self,
            ConnError::HandlerUndefined { .. } | ConnError::FunctionUndefined(_)
        )
    }
}

impl core::fmt::Display for ConnError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConnError::HandlerUndefined { role, name } => {
                write!(f, "{} handler function \"{}\" is undefined", role, name)
            }
            ConnError::FunctionUndefined(name) => write!(f, "function \"{}\" is undefined", name),
            ConnError::InvocationFailed { name, message } => {
                write!(f, "function \"{}\" failed: {}", name, message)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConnError {}

#[cfg(feature = "std")]
impl From<ConnError> for std::io::Error {
    fn from(err: ConnError) -> Self {
        let kind = if err.is_undefined() {
            std::io::ErrorKind::NotFound
        } else {
            std::io::ErrorKind::Other
        };
        std::io::Error::new(kind, err)
    }
}
