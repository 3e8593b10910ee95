use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical trade signal derived from the score plus override rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG BUY",
            Signal::Buy => "BUY",
            Signal::Hold => "HOLD",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG SELL",
        }
    }

    /// Emoji used in Telegram summaries
    pub fn emoji(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "🟢",
            Signal::Buy => "🟩",
            Signal::Hold => "⬜",
            Signal::Sell => "🟧",
            Signal::StrongSell => "🔴",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
