//! JsConn wasm-bindgen エクスポート
//!
//! JS 側から直接アダプターを組み立てて使うためのクラス。
//! 中身は `HostConn<JsGlobalEnv>` で、ハンドラーは `globalThis` の関数名で指定する。

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use js_sys::{Reflect, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use hostconn_core::{
    bind_once, on_close, on_read, on_write, ConnError, Deadline, HandlerOption, HandlerRole,
    HostConn, Resolution,
};

use crate::env::JsGlobalEnv;

/// `read(maxLen)` 1 回で確保するバッファの上限（64 KiB）
///
/// これを超える分はアダプター内に保持され、次の read で返る。
pub const MAX_READ_CHUNK: usize = 64 * 1024;

/// `read(maxLen)` で確保するバッファ長
fn read_buffer_len(max_len: u32) -> usize {
    (max_len as usize).min(MAX_READ_CHUNK)
}

/// JS から渡される構成オブジェクト
///
/// ```typescript
/// { onRead?: string, onWrite?: string, onClose?: string, bindOnce?: boolean, debug?: boolean }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsConnOptions {
    pub on_read: Option<String>,
    pub on_write: Option<String>,
    pub on_close: Option<String>,
    pub bind_once: bool,
    /// 各操作をブラウザコンソールに出力する
    pub debug: bool,
}

impl JsConnOptions {
    /// JS オブジェクトから読み取る（undefined / null なら全てデフォルト）
    pub fn from_js(value: &JsValue) -> Result<Self, String> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        if !value.is_object() {
            return Err(String::from("options must be an object"));
        }

        Ok(JsConnOptions {
            on_read: string_field(value, HandlerRole::Read.label())?,
            on_write: string_field(value, HandlerRole::Write.label())?,
            on_close: string_field(value, HandlerRole::Close.label())?,
            bind_once: bool_field(value, "bindOnce")?,
            debug: bool_field(value, "debug")?,
        })
    }

    /// 接続構築用のオプション列に変換する
    pub fn handler_options(&self) -> Vec<HandlerOption> {
        let mut options = Vec::new();
        if let Some(name) = &self.on_read {
            options.push(on_read(name.as_str()));
        }
        if let Some(name) = &self.on_write {
            options.push(on_write(name.as_str()));
        }
        if let Some(name) = &self.on_close {
            options.push(on_close(name.as_str()));
        }
        if self.bind_once {
            options.push(bind_once());
        }
        options
    }
}

fn string_field(obj: &JsValue, key: &str) -> Result<Option<String>, String> {
    let value = Reflect::get(obj, &JsValue::from_str(key))
        .map_err(|_| format!("cannot read option {}", key))?;
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    value
        .as_string()
        .map(Some)
        .ok_or_else(|| format!("option {} must be a string", key))
}

fn bool_field(obj: &JsValue, key: &str) -> Result<bool, String> {
    let value = Reflect::get(obj, &JsValue::from_str(key))
        .map_err(|_| format!("cannot read option {}", key))?;
    if value.is_undefined() || value.is_null() {
        return Ok(false);
    }
    value
        .as_bool()
        .ok_or_else(|| format!("option {} must be a boolean", key))
}

/// `describe()` の出力
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnInfo<'a> {
    pub on_read: &'a str,
    pub on_write: &'a str,
    pub on_close: Option<&'a str>,
    pub bind_once: bool,
    pub network: &'static str,
    pub local_addr: &'static str,
    pub remote_addr: &'static str,
    pub pending_read: usize,
    pub total_read_bytes: u64,
    pub total_written_bytes: u64,
}

impl<'a> ConnInfo<'a> {
    pub fn of<E: hostconn_core::HostEnv>(conn: &'a HostConn<E>) -> Self {
        ConnInfo {
            on_read: conn.on_read(),
            on_write: conn.on_write(),
            on_close: conn.on_close(),
            bind_once: conn.resolution() == Resolution::BindOnce,
            network: conn.local_addr().network(),
            local_addr: conn.local_addr().label(),
            remote_addr: conn.remote_addr().label(),
            pending_read: conn.pending_read_len(),
            total_read_bytes: conn.total_read_bytes(),
            total_written_bytes: conn.total_written_bytes(),
        }
    }
}

fn conn_error(err: ConnError) -> JsError {
    JsError::new(&format!("{}", err))
}

/// JS グローバル関数をハンドラーとする接続
///
/// ## 使用例（TypeScript）
///
/// ```typescript
/// globalThis.onRead = () => "Hello from JS!";
/// globalThis.onWrite = (data: Uint8Array) => socket.send(data);
/// globalThis.onClose = () => socket.close();
///
/// const conn = new JsConn({ onRead: "onRead", onWrite: "onWrite", onClose: "onClose" });
/// const data = conn.read(1024);
/// conn.write(new TextEncoder().encode("ping"));
/// conn.close();
/// ```
///
/// ## スレッド安全性
///
/// WASM は シングルスレッドのため、`!Send + !Sync` を満たす。
/// JS からは単一スレッドで呼び出される前提。
#[wasm_bindgen]
pub struct JsConn {
    inner: HostConn<JsGlobalEnv>,
    debug: bool,
}

#[wasm_bindgen]
impl JsConn {
    /// 接続を構築する
    ///
    /// 指定された（またはデフォルトの）ハンドラー関数がすべて
    /// `globalThis` 上の関数であることを検証する。呼び出しはしない。
    ///
    /// # エラー
    /// - 構成オブジェクトの型が不正
    /// - ハンドラー関数が未定義、または関数でない
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsConn, JsError> {
        let options = JsConnOptions::from_js(&options)
            .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))?;
        let inner = HostConn::new(JsGlobalEnv, options.handler_options()).map_err(conn_error)?;
        Ok(JsConn { inner, debug: options.debug })
    }

    /// onRead を呼び、最大 `max_len` バイト（`MAX_READ_CHUNK` まで）を返す
    ///
    /// 入りきらなかった分は保持され、次の read で返される。
    #[wasm_bindgen]
    pub fn read(&mut self, max_len: u32) -> Result<Uint8Array, JsError> {
        let mut buf = vec![0u8; read_buffer_len(max_len)];
        let n = self.inner.read(&mut buf).map_err(conn_error)?;
        self.trace(|| format!("read {} byte(s) via {}", n, self.inner.on_read()));

        let arr = Uint8Array::new_with_length(n as u32);
        arr.copy_from(&buf[..n]);
        Ok(arr)
    }

    /// 渡されたバッファに直接読み込み、読み込んだバイト数を返す
    #[wasm_bindgen(js_name = "readInto")]
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<u32, JsError> {
        let n = self.inner.read(buf).map_err(conn_error)?;
        self.trace(|| format!("read {} byte(s) via {}", n, self.inner.on_read()));
        Ok(n as u32)
    }

    /// `data` のコピーを onWrite に渡し、書き込んだバイト数を返す
    #[wasm_bindgen]
    pub fn write(&mut self, data: &[u8]) -> Result<u32, JsError> {
        let n = self.inner.write(data).map_err(conn_error)?;
        self.trace(|| format!("wrote {} byte(s) via {}", n, self.inner.on_write()));
        Ok(n as u32)
    }

    /// onClose を呼ぶ（未設定なら何もしない）
    #[wasm_bindgen]
    pub fn close(&mut self) -> Result<(), JsError> {
        self.inner.close().map_err(conn_error)?;
        self.trace(|| format!("closed via {:?}", self.inner.on_close()));
        Ok(())
    }

    #[wasm_bindgen(js_name = "localAddr")]
    pub fn local_addr(&self) -> String {
        String::from(self.inner.local_addr().label())
    }

    #[wasm_bindgen(js_name = "remoteAddr")]
    pub fn remote_addr(&self) -> String {
        String::from(self.inner.remote_addr().label())
    }

    #[wasm_bindgen]
    pub fn network(&self) -> String {
        String::from(self.inner.local_addr().network())
    }

    /// 受け付けるだけで効果はない
    ///
    /// # 引数
    /// - `deadline_ms`: `Date.now()` 基準のミリ秒
    #[wasm_bindgen(js_name = "setDeadline")]
    pub fn set_deadline(&mut self, deadline_ms: f64) -> Result<(), JsError> {
        self.inner
            .set_deadline(Deadline::from_ms(deadline_ms as u64))
            .map_err(conn_error)
    }

    /// 受け付けるだけで効果はない
    #[wasm_bindgen(js_name = "setReadDeadline")]
    pub fn set_read_deadline(&mut self, deadline_ms: f64) -> Result<(), JsError> {
        self.inner
            .set_read_deadline(Deadline::from_ms(deadline_ms as u64))
            .map_err(conn_error)
    }

    /// 受け付けるだけで効果はない
    #[wasm_bindgen(js_name = "setWriteDeadline")]
    pub fn set_write_deadline(&mut self, deadline_ms: f64) -> Result<(), JsError> {
        self.inner
            .set_write_deadline(Deadline::from_ms(deadline_ms as u64))
            .map_err(conn_error)
    }

    /// 接続情報を JSON 文字列で返す
    ///
    /// # 戻り値
    /// ```json
    /// {
    ///   "onRead": "onRead",
    ///   "onWrite": "onWrite",
    ///   "onClose": null,
    ///   "bindOnce": false,
    ///   "network": "hostconn",
    ///   "localAddr": "guest end",
    ///   "remoteAddr": "host end",
    ///   "pendingRead": 0,
    ///   "totalReadBytes": 14,
    ///   "totalWrittenBytes": 42
    /// }
    /// ```
    #[wasm_bindgen]
    pub fn describe(&self) -> Result<String, JsError> {
        serde_json::to_string(&ConnInfo::of(&self.inner))
            .map_err(|e| JsError::new(&format!("Serialize failed: {}", e)))
    }
}

impl JsConn {
    /// Rust 側から内部の接続を使う
    pub fn inner_mut(&mut self) -> &mut HostConn<JsGlobalEnv> {
        &mut self.inner
    }

    fn trace(&self, message: impl FnOnce() -> String) {
        if self.debug {
            web_sys::console::debug_1(&JsValue::from_str(&format!("hostconn: {}", message())));
        }
    }
}
