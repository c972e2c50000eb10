//! 接続の構成オプション
//!
//! オプションは呼び出し元が渡した順に適用され、同じフィールドは後勝ち。
//!
//! ## デフォルト値
//!
//! ```text
//! onRead  = "onWrite"   ← 意図的に逆
//! onWrite = "onRead"    ← 意図的に逆
//! onClose = なし（close は何もしない）
//! ```
//!
//! 名前が逆なのは、両端の対称なアダプターを同名のハンドラーで互いに
//! つなげるため（片方の onWrite がもう片方の onRead になる）。

use alloc::string::String;

/// onRead のデフォルト関数名
pub const DEFAULT_ON_READ: &str = "onWrite";
/// onWrite のデフォルト関数名
pub const DEFAULT_ON_WRITE: &str = "onRead";

/// ハンドラーの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerRole {
    Read,
    Write,
    Close,
}

impl HandlerRole {
    /// エラーメッセージや設定キーに使うラベル
    pub fn label(&self) -> &'static str {
        match self {
            HandlerRole::Read => "onRead",
            HandlerRole::Write => "onWrite",
            HandlerRole::Close => "onClose",
        }
    }
}

impl core::fmt::Display for HandlerRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// ハンドラーの解決タイミング
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// 操作のたびに名前から解決し直す。構築後に削除された関数は呼び出し時エラーになる
    #[default]
    PerCall,
    /// 構築時に解決したハンドルを使い続ける
    BindOnce,
}

/// 構築中の接続に適用される 1 つの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOption {
    OnRead(String),
    OnWrite(String),
    OnClose(String),
    Resolution(Resolution),
}

/// onRead ハンドラー名を設定する
pub fn on_read(name: impl Into<String>) -> HandlerOption {
    HandlerOption::OnRead(name.into())
}

/// onWrite ハンドラー名を設定する
pub fn on_write(name: impl Into<String>) -> HandlerOption {
    HandlerOption::OnWrite(name.into())
}

/// onClose ハンドラー名を設定する
pub fn on_close(name: impl Into<String>) -> HandlerOption {
    HandlerOption::OnClose(name.into())
}

/// 構築時に一度だけ解決する
pub fn bind_once() -> HandlerOption {
    HandlerOption::Resolution(Resolution::BindOnce)
}

/// オプション適用後の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub on_read: String,
    pub on_write: String,
    pub on_close: Option<String>,
    pub resolution: Resolution,
}

impl HandlerConfig {
    /// デフォルト値から始めてオプションを順に適用する
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = HandlerOption>,
    {
        let mut config = HandlerConfig::default();
        for option in options {
            config.apply(option);
        }
        config
    }

    /// オプションを 1 つ適用する
    pub fn apply(&mut self, option: HandlerOption) {
        match option {
            HandlerOption::OnRead(name) => self.on_read = name,
            HandlerOption::OnWrite(name) => self.on_write = name,
            HandlerOption::OnClose(name) => self.on_close = Some(name),
            HandlerOption::Resolution(resolution) => self.resolution = resolution,
        }
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        HandlerConfig {
            on_read: String::from(DEFAULT_ON_READ),
            on_write: String::from(DEFAULT_ON_WRITE),
            on_close: None,
            resolution: Resolution::PerCall,
        }
    }
}
