//! # hostconn-wasm
//!
//! JS ホストのグローバル関数を接続として使うための WASM エントリポイント。
//!
//! - Rust のゲストコード: [`connect`] で `HostConn<JsGlobalEnv>` を得て、
//!   `Conn` / `std::io::Read` / `std::io::Write` として使う。
//! - JS 側: [`JsConn`] クラスで直接操作する。
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import { JsConn, init_panic_hook } from '../hostconn-wasm-pkg/hostconn_wasm';
//!
//! // パニック時のスタックトレースを有効化（開発時）
//! init_panic_hook();
//!
//! // デフォルトでは onRead = "onWrite", onWrite = "onRead"
//! globalThis.onWrite = () => pendingFromPeer.shift() ?? "";
//! globalThis.onRead = (data: Uint8Array) => peer.deliver(data);
//!
//! const conn = new JsConn();
//! conn.write(new TextEncoder().encode("Hello from the guest!"));
//! const data = conn.read(1024);
//! ```

use wasm_bindgen::prelude::*;

pub mod conn;
pub mod env;

pub use conn::{ConnInfo, JsConn, JsConnOptions, MAX_READ_CHUNK};
pub use env::{connect, JsGlobalEnv};

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 開発時に必ず呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// 名前のグローバル関数がハンドラーとして使えるかを調べる
///
/// `JsConn` を構築する前の事前確認用。
#[wasm_bindgen(js_name = "isHandlerDefined")]
pub fn is_handler_defined(name: &str) -> bool {
    hostconn_core::resolve(&JsGlobalEnv, name).is_some()
}
