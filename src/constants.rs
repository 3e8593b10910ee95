//! Universe, indicator periods and scoring thresholds.
//!
//! The score point table and the signal cut-offs live here so that every
//! component (scanner, watcher, alert formatting) agrees on one set of
//! numbers.

/// NIFTY50 constituents (as on 28-Mar-2025). Plain NSE symbols; the Yahoo
/// client appends the `.NS` suffix itself.
pub const NIFTY50: &[&str] = &[
    "ADANIENT", "ADANIPORTS", "APOLLOHOSP", "ASIANPAINT", "AXISBANK", "BAJAJ-AUTO", "BAJFINANCE",
    "BAJAJFINSV", "BEL", "BHARTIARTL", "CIPLA", "COALINDIA", "DRREDDY", "EICHERMOT", "ETERNAL",
    "GRASIM", "HCLTECH", "HDFCBANK", "HDFCLIFE", "HEROMOTOCO", "HINDALCO", "HINDUNILVR",
    "ICICIBANK", "INDUSINDBK", "INFY", "ITC", "JIOFIN", "JSWSTEEL", "KOTAKBANK", "LT", "M&M",
    "MARUTI", "NESTLEIND", "NTPC", "ONGC", "POWERGRID", "RELIANCE", "SBILIFE", "SHRIRAMFIN",
    "SBIN", "SUNPHARMA", "TCS", "TATACONSUM", "TATAMOTORS", "TATASTEEL", "TECHM", "TITAN",
    "TRENT", "ULTRACEMCO", "WIPRO",
];

/// Hard minimum bar count before any indicator or score is asserted.
pub const MIN_BARS_FOR_ANALYSIS: usize = 20;

// Indicator periods
pub const EMA_SHORT_PERIOD: usize = 20;
pub const EMA_LONG_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;
pub const MACD_SIGNAL_PERIOD: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;
pub const ATR_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
pub const ROC_PERIOD: usize = 9;
pub const VOLUME_AVG_PERIOD: usize = 20;

// Signal thresholds (canonical table: 5 buckets, 70/55/40)
pub const STRONG_BUY_SCORE: u8 = 70;
pub const BUY_SCORE: u8 = 55;
pub const HOLD_SCORE: u8 = 40;

/// RSI above this forces STRONG SELL regardless of score.
pub const RSI_OVERBOUGHT_OVERRIDE: f64 = 85.0;

/// Days projected by the naive return extrapolation.
pub const PROJECTION_DAYS: usize = 5;

/// Concurrent fetch+analyze workers per scan group.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Politeness delay between worker groups (milliseconds).
pub const GROUP_DELAY_MS: u64 = 200;

/// Default number of ranked entries shown / sent.
pub const DEFAULT_TOP_K: usize = 10;
