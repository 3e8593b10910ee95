//! Runtime configuration, read once from the environment.
//!
//! Replaces the scattered module-level constants of earlier iterations with a
//! single explicit object handed to the scanner, notifier and portfolio
//! commands. A missing Telegram token only disables the alert surface, never
//! the scan pipeline.

use chrono_tz::Tz;
use std::path::PathBuf;
use tracing::warn;

use crate::constants::{DEFAULT_CONCURRENCY, NIFTY50};
use crate::utils::get_market_data_dir;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telegram bot token; None when unset (alerts unavailable)
    pub telegram_bot_token: Option<String>,

    /// Hardcoded destination chat ids (comma-separated in the environment)
    pub telegram_chat_ids: Vec<String>,

    /// Total deployable capital (₹)
    pub total_capital: f64,

    /// Alert when a position is down at least this many percent
    pub stop_loss_percent: f64,

    /// Recommended partial sell size on a breach, percent of the position
    pub partial_sell_percent: f64,

    /// Display timezone for reports and messages
    pub timezone: Tz,

    /// CSV fallback cache directory
    pub data_dir: PathBuf,

    /// JSON array of chat ids learned from the bot inbox
    pub recipients_file: PathBuf,

    /// JSON object of manual portfolio entries
    pub portfolio_file: PathBuf,

    /// Concurrent fetch+analyze workers
    pub concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_chat_ids: Vec::new(),
            total_capital: 1_000_000.0,
            stop_loss_percent: 2.0,
            partial_sell_percent: 25.0,
            timezone: chrono_tz::Asia::Kolkata,
            data_dir: PathBuf::from("market_data"),
            recipients_file: PathBuf::from("known_recipients.json"),
            portfolio_file: PathBuf::from("portfolio.json"),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults on anything missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let telegram_chat_ids = std::env::var("TELEGRAM_CHAT_IDS")
            .map(|raw| parse_chat_ids(&raw))
            .unwrap_or_default();

        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|raw| match raw.parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(_) => {
                    warn!(timezone = %raw, "Unknown TIMEZONE, using Asia/Kolkata");
                    None
                }
            })
            .unwrap_or(defaults.timezone);

        Self {
            telegram_bot_token,
            telegram_chat_ids,
            total_capital: parse_env_f64("TOTAL_CAPITAL", defaults.total_capital),
            stop_loss_percent: parse_env_f64("STOP_LOSS_PERCENT", defaults.stop_loss_percent),
            partial_sell_percent: parse_env_f64(
                "PARTIAL_SELL_PERCENT",
                defaults.partial_sell_percent,
            ),
            timezone,
            data_dir: get_market_data_dir(),
            recipients_file: std::env::var("NIFTYPULSE_RECIPIENTS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.recipients_file),
            portfolio_file: std::env::var("NIFTYPULSE_PORTFOLIO_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.portfolio_file),
            concurrency: parse_env_usize("NIFTYPULSE_CONCURRENCY", defaults.concurrency).max(1),
        }
    }

    /// Symbol universe to scan. `NIFTYPULSE_SYMBOLS` (comma separated)
    /// overrides the built-in NIFTY50 list.
    pub fn universe(&self) -> Vec<String> {
        match std::env::var("NIFTYPULSE_SYMBOLS") {
            Ok(raw) => {
                let symbols = parse_chat_ids(&raw);
                if symbols.is_empty() {
                    default_universe()
                } else {
                    symbols
                }
            }
            Err(_) => default_universe(),
        }
    }
}

fn default_universe() -> Vec<String> {
    NIFTY50.iter().map(|s| s.to_string()).collect()
}

/// Split a comma-separated list, trimming blanks.
fn parse_chat_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_env_f64(key: &str, default: f64) -> f64 {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(key = key, value = %raw, "Unparsable numeric setting, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(key = key, value = %raw, "Unparsable numeric setting, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_ids() {
        assert_eq!(
            parse_chat_ids("1438699528, FRIEND_CHAT_ID ,"),
            vec!["1438699528".to_string(), "FRIEND_CHAT_ID".to_string()]
        );
        assert!(parse_chat_ids("").is_empty());
        assert!(parse_chat_ids(" , ,").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.total_capital, 1_000_000.0);
        assert_eq!(config.stop_loss_percent, 2.0);
        assert_eq!(config.partial_sell_percent, 25.0);
        assert_eq!(config.timezone, chrono_tz::Asia::Kolkata);
        assert!(config.telegram_bot_token.is_none());
    }

    #[test]
    fn test_default_universe_is_nifty50() {
        let universe = default_universe();
        assert_eq!(universe.len(), 50);
        assert!(universe.contains(&"RELIANCE".to_string()));
        assert!(universe.contains(&"M&M".to_string()));
    }
}
