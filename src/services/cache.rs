//! CSV fallback cache: one file per symbol, overwritten on every successful
//! fetch and read back when the live fetch fails.
//!
//! Columns: `datetime,open,high,low,close,volume`. Concurrent writers to the
//! same symbol are last-write-wins; the cache is a best-effort fallback, not a
//! consistent store.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Bar;
use crate::utils::{parse_timestamp, sanitize_symbol};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct BarCache {
    dir: PathBuf,
}

impl BarCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file for a symbol ("M&M" -> `M_M_latest.csv`).
    pub fn file_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}_latest.csv", sanitize_symbol(symbol)))
    }

    /// Overwrite the symbol's cache with the given series.
    pub fn store(&self, symbol: &str, bars: &[Bar]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Io(format!("Failed to create cache dir: {}", e)))?;

        let path = self.file_path(symbol);
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| Error::Io(format!("Failed to open cache for write: {}", e)))?;

        writer.write_record(["datetime", "open", "high", "low", "close", "volume"])?;
        for bar in bars {
            writer.write_record(&[
                bar.time.format(TIME_FORMAT).to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ])?;
        }
        writer.flush()?;

        debug!(symbol = symbol, rows = bars.len(), path = %path.display(), "Cached series");
        Ok(())
    }

    /// Read the symbol's last cached series. Rows that fail to parse are
    /// skipped rather than failing the whole read.
    pub fn load(&self, symbol: &str) -> Result<Vec<Bar>> {
        let path = self.file_path(symbol);
        if !path.exists() {
            return Err(Error::NoData(format!("no cache for {}", symbol)));
        }

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| Error::Io(format!("Failed to open cache: {}", e)))?;

        let mut bars = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() < 6 {
                continue;
            }
            let Ok(time) = parse_timestamp(&record[0]) else {
                continue;
            };
            let (Ok(open), Ok(high), Ok(low), Ok(close)) = (
                record[1].parse(),
                record[2].parse(),
                record[3].parse(),
                record[4].parse(),
            ) else {
                continue;
            };
            let volume = record[5].parse().unwrap_or(0);
            bars.push(Bar::new(time, open, high, low, close, volume));
        }

        bars.sort_by(|a, b| a.time.cmp(&b.time));
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_bars() -> Vec<Bar> {
        (0..25)
            .map(|i| {
                let time = Utc.with_ymd_and_hms(2025, 3, 28, 9, 15, 0).unwrap()
                    + chrono::Duration::minutes(5 * i as i64);
                let close = 100.0 + 0.25 * i as f64;
                Bar::new(time, close - 0.1, close + 0.2, close - 0.3, close, 1000 + i as u64)
            })
            .collect()
    }

    fn temp_cache(tag: &str) -> BarCache {
        let dir = std::env::temp_dir().join(format!("niftypulse-cache-{}-{}", tag, std::process::id()));
        BarCache::new(dir)
    }

    #[test]
    fn test_round_trip_preserves_closes_and_count() {
        let cache = temp_cache("roundtrip");
        let bars = sample_bars();

        cache.store("RELIANCE", &bars).unwrap();
        let loaded = cache.load("RELIANCE").unwrap();

        assert_eq!(loaded.len(), bars.len());
        for (a, b) in bars.iter().zip(loaded.iter()) {
            assert_eq!(a.time, b.time);
            assert!((a.close - b.close).abs() < 1e-9);
            assert_eq!(a.volume, b.volume);
        }

        fs::remove_dir_all(cache.dir()).unwrap();
    }

    #[test]
    fn test_store_overwrites() {
        let cache = temp_cache("overwrite");
        let bars = sample_bars();

        cache.store("TCS", &bars).unwrap();
        cache.store("TCS", &bars[..5]).unwrap();
        let loaded = cache.load("TCS").unwrap();
        assert_eq!(loaded.len(), 5);

        fs::remove_dir_all(cache.dir()).unwrap();
    }

    #[test]
    fn test_missing_cache_is_no_data() {
        let cache = temp_cache("missing");
        assert!(matches!(cache.load("WIPRO"), Err(Error::NoData(_))));
    }

    #[test]
    fn test_symbol_with_special_chars() {
        let cache = temp_cache("special");
        let bars = sample_bars();
        cache.store("M&M", &bars).unwrap();
        assert!(cache.file_path("M&M").ends_with("M_M_latest.csv"));
        assert_eq!(cache.load("M&M").unwrap().len(), bars.len());
        fs::remove_dir_all(cache.dir()).unwrap();
    }
}
