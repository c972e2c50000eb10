//! 接続のデッドライン（時刻）
//!
//! ホストはシングルスレッドの協調的なイベントループなので、
//! 呼び出し中のホスト関数を途中で打ち切る手段がない。
//! デッドラインは受け付けるだけで強制はされない。

/// ミリ秒単位の Unix 時刻で表したデッドライン
///
/// WASM 環境では JS の `Date.now()` から注入する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(pub u64);

impl Deadline {
    /// デッドラインなし
    pub const NONE: Self = Deadline(0);

    /// ミリ秒の Unix 時刻から生成する
    pub fn from_ms(ms: u64) -> Self {
        Deadline(ms)
    }

    /// `now_ms` から `after_ms` 後のデッドライン
    pub fn after(now_ms: u64, after_ms: u64) -> Self {
        Deadline(now_ms.saturating_add(after_ms))
    }

    pub fn as_ms(&self) -> u64 {
        self.0
    }

    /// デッドラインが設定されているか
    pub fn is_set(&self) -> bool {
        *self != Self::NONE
    }
}

impl From<u64> for Deadline {
    fn from(ms: u64) -> Self {
        Deadline(ms)
    }
}
