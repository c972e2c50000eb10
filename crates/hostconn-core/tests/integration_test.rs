//! hostconn-core 統合テスト
//!
//! 1 つのホスト環境を共有する 2 つのアダプターを、デフォルトの
//! 逆向きハンドラー名で対向させて、双方向のやり取りをシミュレートする。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::rc::Rc;

use hostconn_core::{
    on_close, on_read, on_write, Conn, ConnError, Deadline, HostConn, HostRegistry, RegistryValue,
};

// ==============================================================
// ヘルパー: 名前付きメールボックス
// ==============================================================

/// 引数 1 つで呼ばれたら積み、引数なしで呼ばれたら 1 件取り出す関数を定義する
///
/// 片方のアダプターの onWrite、もう片方の onRead として同じ関数が使われる。
fn mailbox(host: &HostRegistry, name: &str) -> Rc<RefCell<VecDeque<Vec<u8>>>> {
    let queue = Rc::new(RefCell::new(VecDeque::new()));
    let q = Rc::clone(&queue);
    host.define(name, move |args| match args.first() {
        Some(value) => {
            let bytes = value.as_bytes().map(|b| b.to_vec()).unwrap_or_default();
            q.borrow_mut().push_back(bytes);
            Ok(RegistryValue::Undefined)
        }
        None => Ok(q
            .borrow_mut()
            .pop_front()
            .map(RegistryValue::Bytes)
            .unwrap_or(RegistryValue::Undefined)),
    });
    queue
}

/// 対向する 2 つのアダプター（guest はデフォルト名、peer は明示名）
fn connected_pair() -> (HostConn<HostRegistry>, HostConn<HostRegistry>, HostRegistry) {
    let host = HostRegistry::recording();
    mailbox(&host, "onRead");
    mailbox(&host, "onWrite");

    // guest: onRead = "onWrite", onWrite = "onRead"
    let guest = HostConn::new(host.clone(), Vec::new()).unwrap();
    // peer:  onRead = "onRead",  onWrite = "onWrite"
    let peer = HostConn::new(host.clone(), [on_read("onRead"), on_write("onWrite")]).unwrap();
    (guest, peer, host)
}

// ==============================================================
// テスト
// ==============================================================

/// 対向アダプター間でメッセージが往復する
#[test]
fn test_symmetric_pair_exchanges_messages() {
    let (mut guest, mut peer, _host) = connected_pair();

    assert_eq!(peer.write(b"Hello from Go!").unwrap(), 14);
    let mut buf = vec![0u8; 1024];
    let n = guest.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"Hello from Go!");

    guest.write(b"reply").unwrap();
    let n = peer.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"reply");
}

/// メッセージがない時の read は待たずに 0 を返す
#[test]
fn test_read_without_data_returns_zero() {
    let (mut guest, _peer, host) = connected_pair();

    let mut buf = [0u8; 16];
    assert_eq!(guest.read(&mut buf).unwrap(), 0);
    assert_eq!(host.call_count("onWrite"), 1);
}

/// 小さいバッファでもデータを失わない
#[test]
fn test_small_buffer_reads_whole_stream() {
    let (mut guest, mut peer, _host) = connected_pair();
    peer.write(b"abcdefghij").unwrap();
    peer.write(b"KLMNO").unwrap();

    let mut collected = Vec::new();
    let mut buf = [0u8; 3];
    loop {
        let n = guest.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&buf[..n]);
    }
    assert_eq!(collected, b"abcdefghijKLMNO");
    assert_eq!(guest.total_read_bytes(), 15);
}

/// std::io::Read / std::io::Write として使える
#[test]
fn test_std_io_traits() {
    let (mut guest, mut peer, _host) = connected_pair();

    Write::write_all(&mut peer, b"first,").unwrap();
    Write::write_all(&mut peer, b"second").unwrap();
    Write::flush(&mut peer).unwrap();

    // ホストが空を返したところで EOF 扱いになる
    let mut received = Vec::new();
    Read::read_to_end(&mut guest, &mut received).unwrap();
    assert_eq!(received, b"first,second");
}

/// std::io のエラー種別へ変換される
#[test]
fn test_std_io_error_after_removal() {
    let (mut guest, _peer, host) = connected_pair();
    host.remove("onRead");

    let err = Write::write(&mut guest, b"lost").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    assert_eq!(err.to_string(), "function \"onRead\" is undefined");
}

/// 構築後に書き込み関数が消えたら、その名前を含むエラーで 0 バイト
#[test]
fn test_write_handler_removed_after_construction() {
    let host = HostRegistry::recording();
    host.define("pull", |_| Ok(RegistryValue::Undefined));
    host.define("push", |_| Ok(RegistryValue::Undefined));
    let mut conn = HostConn::new(host.clone(), [on_read("pull"), on_write("push")]).unwrap();

    host.remove("push");
    let result = conn.write(b"payload");
    assert_eq!(result, Err(ConnError::FunctionUndefined("push".to_string())));
    assert!(result.unwrap_err().to_string().contains("push"));
}

/// close の有無とホスト呼び出し回数
#[test]
fn test_close_call_counts() {
    let host = HostRegistry::recording();
    host.define("r", |_| Ok(RegistryValue::Undefined));
    host.define("w", |_| Ok(RegistryValue::Undefined));
    host.define("c", |_| Ok(RegistryValue::Undefined));

    let mut without_close = HostConn::new(host.clone(), [on_read("r"), on_write("w")]).unwrap();
    without_close.close().unwrap();
    assert!(host.calls().is_empty());

    let mut with_close =
        HostConn::new(host.clone(), [on_read("r"), on_write("w"), on_close("c")]).unwrap();
    with_close.close().unwrap();
    assert_eq!(host.call_count("c"), 1);
    assert_eq!(host.calls().len(), 1);
}

/// 書き込んだバイト列がそのままホストに渡る（様々な長さ）
#[test]
fn test_write_passes_exact_bytes() {
    let host = HostRegistry::recording();
    host.define("r", |_| Ok(RegistryValue::Undefined));
    host.define("w", |_| Ok(RegistryValue::Undefined));
    let mut conn = HostConn::new(host.clone(), [on_read("r"), on_write("w")]).unwrap();

    for size in [1usize, 13, 256, 4096] {
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        assert_eq!(conn.write(&data).unwrap(), size);
        let args = host.last_args("w").unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].as_bytes(), Some(data.as_slice()));
    }
}

/// Conn トレイトオブジェクトとして扱える
#[test]
fn test_boxed_conn() {
    let (guest, mut peer, _host) = connected_pair();
    let mut conn: Box<dyn Conn> = Box::new(guest);

    peer.write(b"boxed").unwrap();
    conn.set_read_deadline(Deadline::after(0, 10)).unwrap();

    let mut buf = [0u8; 8];
    let n = conn.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"boxed");
    assert_eq!(conn.local_addr().label(), "guest end");
    assert_eq!(conn.remote_addr().label(), "host end");
    assert_ne!(conn.local_addr().to_string(), conn.remote_addr().to_string());
}

/// 記録なしのレジストリは長時間のやり取りでも呼び出しを溜め込まない
#[test]
fn test_long_lived_pair_retains_no_call_log() {
    let host = HostRegistry::new();
    mailbox(&host, "onRead");
    mailbox(&host, "onWrite");
    let mut guest = HostConn::new(host.clone(), Vec::new()).unwrap();
    let mut peer = HostConn::new(host.clone(), [on_read("onRead"), on_write("onWrite")]).unwrap();

    let mut buf = [0u8; 4];
    for _ in 0..10_000 {
        peer.write(b"x").unwrap();
        assert_eq!(guest.read(&mut buf).unwrap(), 1);
    }

    assert!(host.calls().is_empty());
    assert_eq!(guest.total_read_bytes(), 10_000);
    assert_eq!(peer.total_written_bytes(), 10_000);
}
