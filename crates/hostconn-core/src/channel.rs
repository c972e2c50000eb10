//! 読み取りの残りバイト管理

use alloc::collections::VecDeque;

/// ホストから受け取ったバイトのうち、まだ呼び出し元に渡していない分
///
/// onRead が呼び出し元のバッファより長いデータを返した場合、
/// 入りきらなかった分を捨てずにここに保持し、次の read で先に返す。
pub struct ReadChannel {
    /// 未読データ
    recv_buffer: VecDeque<u8>,
    /// 呼び出し元に渡した総バイト数（統計用）
    total_read: u64,
}

impl ReadChannel {
    pub fn new() -> Self {
        ReadChannel {
            recv_buffer: VecDeque::new(),
            total_read: 0,
        }
    }

    /// ホストから受け取ったバイト列を積む
    pub fn apply(&mut self, data: &[u8]) {
        self.recv_buffer.extend(data.iter().copied());
    }

    /// 未読データを `buf` に入るだけコピーし、コピーしたバイト数を返す
    pub fn fill(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.recv_buffer.len());
        for (dst, src) in buf.iter_mut().zip(self.recv_buffer.drain(..n)) {
            *dst = src;
        }
        self.total_read += n as u64;
        n
    }

    /// 未読データがあるか
    pub fn has_pending_read(&self) -> bool {
        !self.recv_buffer.is_empty()
    }

    /// 未読データのバイト数
    pub fn pending_len(&self) -> usize {
        self.recv_buffer.len()
    }

    pub fn total_read_bytes(&self) -> u64 {
        self.total_read
    }
}

impl Default for ReadChannel {
    fn default() -> Self {
        Self::new()
    }
}
