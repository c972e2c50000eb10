//! 接続の両端を表すダミーアドレス

/// アドレスのネットワーク種別（固定）
pub const NETWORK: &str = "hostconn";

/// 接続の片端を表すアドレス
///
/// 実際のネットワークアドレスではない。どちらの端かを示すラベルだけを持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerAddr {
    label: &'static str,
}

impl PeerAddr {
    /// ゲスト側（このアダプターを使うコード）
    pub const GUEST: PeerAddr = PeerAddr { label: "guest end" };
    /// ホスト側（ハンドラー関数を提供する環境）
    pub const HOST: PeerAddr = PeerAddr { label: "host end" };

    pub fn network(&self) -> &'static str {
        NETWORK
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl core::fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label)
    }
}
