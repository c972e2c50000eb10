//! JS グローバル名前空間をホスト環境として使う
//!
//! `globalThis[name]` を引いて `Function` なら呼び出し可能とみなす。
//! 引数・戻り値は `JsValue` のまま扱い、バイト列との変換だけをここで行う。

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use js_sys::{Array, ArrayBuffer, Function, Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};

use hostconn_core::{ConnError, HandlerOption, HostConn, HostEnv, HostFault};

/// JS の `globalThis` を引くホスト環境
#[derive(Debug, Clone, Copy, Default)]
pub struct JsGlobalEnv;

impl HostEnv for JsGlobalEnv {
    type Value = JsValue;
    type Function = Function;

    fn resolve(&self, name: &str) -> Option<Function> {
        // getter が例外を投げた場合も未定義として扱う
        let value = Reflect::get(&js_sys::global(), &JsValue::from_str(name)).ok()?;
        value.dyn_into::<Function>().ok()
    }

    fn call(&self, function: &Function, args: &[JsValue]) -> Result<JsValue, HostFault> {
        let this = JsValue::UNDEFINED;
        let result = match args {
            [] => function.call0(&this),
            [a] => function.call1(&this, a),
            [a, b] => function.call2(&this, a, b),
            _ => {
                let array: Array = args.iter().collect();
                function.apply(&this, &array)
            }
        };
        result.map_err(|e| HostFault::new(describe_js_value(&e)))
    }

    fn bytes_to_value(&self, bytes: &[u8]) -> JsValue {
        // wasm メモリのビューではなく JS 側に確保したコピーを渡す
        let arr = Uint8Array::new_with_length(bytes.len() as u32);
        arr.copy_from(bytes);
        arr.into()
    }

    fn value_to_bytes(&self, value: &JsValue) -> Vec<u8> {
        if value.is_undefined() || value.is_null() {
            Vec::new()
        } else if let Some(s) = value.as_string() {
            s.into_bytes()
        } else if let Some(arr) = value.dyn_ref::<Uint8Array>() {
            arr.to_vec()
        } else if value.is_instance_of::<ArrayBuffer>() {
            Uint8Array::new(value).to_vec()
        } else {
            describe_js_value(value).into_bytes()
        }
    }
}

/// JS の値（主に例外）を文字列にする
///
/// `Error` なら message、文字列ならそのまま、それ以外は JSON 表現。
/// JSON にできない値（関数、Symbol など）は `<function>` のように型名で表す。
pub(crate) fn describe_js_value(value: &JsValue) -> String {
    if value.is_undefined() {
        return String::from("undefined");
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    if let Some(s) = value.as_string() {
        return s;
    }
    // stringify は Symbol で例外、関数では undefined を返す
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| format!("<{}>", value.js_typeof().as_string().unwrap_or_default()))
}

/// JS グローバルのハンドラーで接続を構築する（Rust のゲストコード向け）
///
/// # 例
/// ```ignore
/// let mut conn = hostconn_wasm::connect([on_read("onRead"), on_write("onWrite")])?;
/// conn.write(b"Hello from Rust!")?;
/// ```
pub fn connect<I>(options: I) -> Result<HostConn<JsGlobalEnv>, ConnError>
where
    I: IntoIterator<Item = HandlerOption>,
{
    tracing::debug!("connecting to JS global handlers");
    HostConn::new(JsGlobalEnv, options)
}
