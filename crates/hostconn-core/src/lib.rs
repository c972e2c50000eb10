//! # hostconn-core
//!
//! ホストが提供するコールバック（read / write / close の 3 関数）を、
//! 通常の双方向ストリーム接続として扱うためのアダプター。
//!
//! ソケットを持たない WASM ゲストでも、接続インターフェースを期待するコードに
//! そのまま渡せるオブジェクトを作れる。実際のバイト転送はホスト側の関数が行う。
//! `no_std` + `alloc` 環境（WASM を含む）で動作する。
//!
//! ## 構成
//!
//! ```text
//! HostConn<E: HostEnv>
//!   ├── HostEnv      ホスト環境（JS グローバル / HostRegistry）を注入
//!   ├── invoke()     名前解決 + 呼び出し（すべての操作がここを通る）
//!   └── ReadChannel  read で入りきらなかったバイトを保持
//! ```
//!
//! ## 使用例
//!
//! ```
//! use hostconn_core::{on_close, on_read, on_write, HostConn, HostRegistry, RegistryValue};
//!
//! let host = HostRegistry::new();
//! host.define("onRead", |_| Ok(RegistryValue::from("Hello from Go!")));
//! host.define("onWrite", |_| Ok(RegistryValue::Undefined));
//! host.define("onClose", |_| Ok(RegistryValue::Undefined));
//!
//! let mut conn = HostConn::new(
//!     host,
//!     [on_read("onRead"), on_write("onWrite"), on_close("onClose")],
//! )
//! .unwrap();
//!
//! let mut buf = [0u8; 1024];
//! let n = conn.read(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"Hello from Go!");
//! conn.write(b"pong").unwrap();
//! conn.close().unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

mod addr;
mod channel;
mod conn;
mod deadline;
mod error;
pub mod host;
mod options;
mod registry;

pub use addr::{PeerAddr, NETWORK};
pub use channel::ReadChannel;
pub use conn::{Conn, HostConn};
pub use deadline::Deadline;
pub use error::{ConnError, HostFault};
pub use host::{invoke, resolve, HostEnv};
pub use options::{
    bind_once, on_close, on_read, on_write, HandlerConfig, HandlerOption, HandlerRole, Resolution,
    DEFAULT_ON_READ, DEFAULT_ON_WRITE,
};
pub use registry::{CallRecord, HostRegistry, RegistryFunction, RegistryValue};
