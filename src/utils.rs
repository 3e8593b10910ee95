use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Get market data (CSV cache) directory from environment variable or use default
pub fn get_market_data_dir() -> PathBuf {
    std::env::var("NIFTYPULSE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("market_data"))
}

/// Parse a timestamp in any of the formats the cache and the provider emit:
/// RFC 3339, "YYYY-MM-DD HH:MM:SS", or bare "YYYY-MM-DD" (midnight UTC).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(Error::Parse(format!("Unrecognized timestamp: {}", s)))
}

/// File-system safe form of a ticker symbol ("M&M" -> "M_M").
pub fn sanitize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2025-03-28T09:15:00+05:30").unwrap();
        assert_eq!(rfc.hour(), 3); // 09:15 IST is 03:45 UTC
        assert_eq!(rfc.minute(), 45);

        let space = parse_timestamp("2025-03-28 09:15:00").unwrap();
        assert_eq!(space.hour(), 9);

        let bare = parse_timestamp("2025-03-28").unwrap();
        assert_eq!(bare.hour(), 0);

        assert!(parse_timestamp("not-a-date").is_err());
    }

    #[test]
    fn test_sanitize_symbol() {
        assert_eq!(sanitize_symbol("RELIANCE"), "RELIANCE");
        assert_eq!(sanitize_symbol("M&M"), "M_M");
        assert_eq!(sanitize_symbol("BAJAJ-AUTO"), "BAJAJ-AUTO");
        assert_eq!(sanitize_symbol("RELIANCE.NS"), "RELIANCE_NS");
    }
}
