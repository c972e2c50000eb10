//! 接続アダプター
//!
//! 名前付きのホスト関数 3 つ（onRead / onWrite / onClose）を
//! 通常のストリーム接続インターフェースで包む。
//!
//! ## 操作とホスト呼び出しの対応
//!
//! ```text
//! read(buf)   → onRead()                  戻り値をバイト列に変換して buf にコピー
//! write(buf)  → onWrite(Uint8Array copy)  戻り値は無視、len(buf) を返す
//! close()     → onClose()                 未設定なら何もしない
//! ```
//!
//! 各操作は同期的で、ホスト関数が返るまでブロックする。
//! ポーリングもリトライもしない。

use alloc::string::String;

use crate::addr::PeerAddr;
use crate::channel::ReadChannel;
use crate::deadline::Deadline;
use crate::error::ConnError;
use crate::host::{self, HostEnv};
use crate::options::{HandlerConfig, HandlerOption, HandlerRole, Resolution};

/// ストリーム接続の契約
///
/// 双方向のバイトストリーム。アダプターはこれを実装し、
/// この契約を期待するコードにそのまま渡せる。
pub trait Conn {
    /// 受信データを `buf` に読み込み、読み込んだバイト数を返す
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ConnError>;
    /// `buf` を送信し、送信したバイト数を返す
    fn write(&mut self, buf: &[u8]) -> Result<usize, ConnError>;
    /// 接続を閉じる
    fn close(&mut self) -> Result<(), ConnError>;
    fn local_addr(&self) -> PeerAddr;
    fn remote_addr(&self) -> PeerAddr;
    fn set_deadline(&mut self, deadline: Deadline) -> Result<(), ConnError>;
    fn set_read_deadline(&mut self, deadline: Deadline) -> Result<(), ConnError>;
    fn set_write_deadline(&mut self, deadline: Deadline) -> Result<(), ConnError>;
}

/// 1 つのハンドラー（名前 + 構築時に解決したハンドル）
struct Handler<F> {
    name: String,
    /// `Resolution::BindOnce` のときだけ Some
    bound: Option<F>,
}

impl<F: Clone> Handler<F> {
    /// 名前が呼び出し可能な関数を指しているか確認する（呼び出しはしない）
    fn validate<E>(env: &E, role: HandlerRole, name: String, resolution: Resolution) -> Result<Self, ConnError>
    where
        E: HostEnv<Function = F>,
    {
        let function = match host::resolve(env, &name) {
            Some(function) => function,
            None => return Err(ConnError::HandlerUndefined { role, name }),
        };
        let bound = match resolution {
            Resolution::PerCall => None,
            Resolution::BindOnce => Some(function),
        };
        Ok(Handler { name, bound })
    }

    fn invoke<E>(&self, env: &E, args: &[E::Value]) -> Result<E::Value, ConnError>
    where
        E: HostEnv<Function = F>,
    {
        match &self.bound {
            Some(function) => host::call_resolved(env, &self.name, function, args),
            None => host::invoke(env, &self.name, args),
        }
    }
}

/// ホスト関数を使う接続アダプター
///
/// ハンドラー名は構築後に変更できない。
/// 内部にロックはない。複数の呼び出し元から使う場合は外部で直列化すること
/// （`&mut self` なので Rust ではそれが強制される）。
pub struct HostConn<E: HostEnv> {
    env: E,
    on_read: Handler<E::Function>,
    on_write: Handler<E::Function>,
    /// None なら close は何もしない
    on_close: Option<Handler<E::Function>>,
    resolution: Resolution,
    channel: ReadChannel,
    /// ホストに渡した総バイト数（統計用）
    total_written: u64,
}

impl<E: HostEnv> HostConn<E> {
    /// オプションを順に適用して接続を構築する
    ///
    /// # エラー
    /// - onRead / onWrite / onClose（設定時）のいずれかが未定義または呼び出し不可。
    ///   この順に検査し、最初の失敗を返す。
    pub fn new<I>(env: E, options: I) -> Result<Self, ConnError>
    where
        I: IntoIterator<Item = HandlerOption>,
    {
        Self::with_config(env, HandlerConfig::from_options(options))
    }

    /// 適用済みの設定から接続を構築する
    pub fn with_config(env: E, config: HandlerConfig) -> Result<Self, ConnError> {
        let HandlerConfig { on_read, on_write, on_close, resolution } = config;

        let on_read = Handler::validate(&env, HandlerRole::Read, on_read, resolution)?;
        let on_write = Handler::validate(&env, HandlerRole::Write, on_write, resolution)?;
        let on_close = match on_close {
            Some(name) => Some(Handler::validate(&env, HandlerRole::Close, name, resolution)?),
            None => None,
        };

        tracing::debug!(
            "host connection ready: onRead={:?} onWrite={:?} onClose={:?} resolution={:?}",
            on_read.name,
            on_write.name,
            on_close.as_ref().map(|h| h.name.as_str()),
            resolution
        );

        Ok(HostConn {
            env,
            on_read,
            on_write,
            on_close,
            resolution,
            channel: ReadChannel::new(),
            total_written: 0,
        })
    }

    /// onRead を呼び出し、結果を `buf` にコピーする
    ///
    /// 前回の read で入りきらなかったデータがあれば、ホストを呼ばずにそれを返す。
    /// そうでなければ onRead を 1 回だけ呼ぶ（`buf` が空でも呼び、結果は保持する）。
    /// データが届くまで待つことはしない。ホストが何も返さなければ `Ok(0)`。
    ///
    /// # エラー
    /// ホスト呼び出しの失敗をそのまま返す（0 バイト）。
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, ConnError> {
        if !self.channel.has_pending_read() {
            let value = self.on_read.invoke(&self.env, &[])?;
            let bytes = self.env.value_to_bytes(&value);
            self.channel.apply(&bytes);
        }
        Ok(self.channel.fill(buf))
    }

    /// `buf` のコピーをホストのバイナリ配列として onWrite に渡す
    ///
    /// ホストが全バイトを受け取ったものとして `buf.len()` を返す。
    /// 部分書き込みはサポートしない。
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, ConnError> {
        let array = self.env.bytes_to_value(buf);
        self.on_write.invoke(&self.env, core::slice::from_ref(&array))?;
        self.total_written += buf.len() as u64;
        Ok(buf.len())
    }

    /// onClose を呼ぶ（未設定なら何もしない）
    ///
    /// 冪等ではない。2 回呼べば onClose も 2 回呼ばれる。
    pub fn close(&mut self) -> Result<(), ConnError> {
        match &self.on_close {
            Some(handler) => handler.invoke(&self.env, &[]).map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn local_addr(&self) -> PeerAddr {
        PeerAddr::GUEST
    }

    pub fn remote_addr(&self) -> PeerAddr {
        PeerAddr::HOST
    }

    /// 何もしない（常に成功）
    pub fn set_deadline(&mut self, _deadline: Deadline) -> Result<(), ConnError> {
        Ok(())
    }

    /// 何もしない（常に成功）
    pub fn set_read_deadline(&mut self, _deadline: Deadline) -> Result<(), ConnError> {
        Ok(())
    }

    /// 何もしない（常に成功）
    pub fn set_write_deadline(&mut self, _deadline: Deadline) -> Result<(), ConnError> {
        Ok(())
    }

    pub fn on_read(&self) -> &str {
        &self.on_read.name
    }

    pub fn on_write(&self) -> &str {
        &self.on_write.name
    }

    pub fn on_close(&self) -> Option<&str> {
        self.on_close.as_ref().map(|h| h.name.as_str())
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// 次の read でホストを呼ばずに返せるバイト数
    pub fn pending_read_len(&self) -> usize {
        self.channel.pending_len()
    }

    /// 呼び出し元に渡した総バイト数
    pub fn total_read_bytes(&self) -> u64 {
        self.channel.total_read_bytes()
    }

    /// ホストに渡した総バイト数
    pub fn total_written_bytes(&self) -> u64 {
        self.total_written
    }

    /// 注入されたホスト環境
    pub fn env(&self) -> &E {
        &self.env
    }
}

impl<E: HostEnv> Conn for HostConn<E> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ConnError> {
        HostConn::read(self, buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, ConnError> {
        HostConn::write(self, buf)
    }

    fn close(&mut self) -> Result<(), ConnError> {
        HostConn::close(self)
    }

    fn local_addr(&self) -> PeerAddr {
        HostConn::local_addr(self)
    }

    fn remote_addr(&self) -> PeerAddr {
        HostConn::remote_addr(self)
    }

    fn set_deadline(&mut self, deadline: Deadline) -> Result<(), ConnError> {
        HostConn::set_deadline(self, deadline)
    }

    fn set_read_deadline(&mut self, deadline: Deadline) -> Result<(), ConnError> {
        HostConn::set_read_deadline(self, deadline)
    }

    fn set_write_deadline(&mut self, deadline: Deadline) -> Result<(), ConnError> {
        HostConn::set_write_deadline(self, deadline)
    }
}

/// `Ok(0)` はホストに現在データがないことを意味する。
/// `std::io::Read` の利用側はこれを EOF と解釈する点に注意。
#[cfg(feature = "std")]
impl<E: HostEnv> std::io::Read for HostConn<E> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        HostConn::read(self, buf).map_err(Into::into)
    }
}

#[cfg(feature = "std")]
impl<E: HostEnv> std::io::Write for HostConn<E> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        HostConn::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
