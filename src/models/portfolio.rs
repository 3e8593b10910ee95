use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// One manual buy entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub entry_price: f64,
    pub quantity: i64,
    /// ISO-8601 timestamp of the entry
    pub datetime: String,
}

/// Manual portfolio, persisted as one JSON object (symbol -> entry).
///
/// Read-modify-written without locking; concurrent writers are last-write-wins
/// (accepted limitation).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(flatten)]
    pub entries: BTreeMap<String, PortfolioEntry>,
}

/// A position whose loss reached the stop-loss threshold.
#[derive(Debug, Clone, Serialize)]
pub struct StopLossBreach {
    pub symbol: String,
    pub entry_price: f64,
    pub current_price: f64,
    /// Loss as a positive percentage of the entry price
    pub loss_percent: f64,
    pub quantity: i64,
}

impl Portfolio {
    /// Load from a JSON file; a missing file is an empty portfolio.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read portfolio: {}", e)))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let portfolio = serde_json::from_str(&content)
            .map_err(|e| Error::Parse(format!("Invalid portfolio file: {}", e)))?;
        Ok(portfolio)
    }

    /// Persist as pretty JSON, overwriting the previous state.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)
            .map_err(|e| Error::Io(format!("Failed to write portfolio: {}", e)))?;
        Ok(())
    }

    /// Record a buy; an existing entry for the symbol is overwritten.
    pub fn buy(&mut self, symbol: &str, entry_price: f64, quantity: i64, datetime: String) {
        self.entries.insert(
            symbol.to_string(),
            PortfolioEntry {
                entry_price,
                quantity,
                datetime,
            },
        );
    }

    /// Remove a position, returning it if present.
    pub fn sell(&mut self, symbol: &str) -> Option<PortfolioEntry> {
        self.entries.remove(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Positions whose loss is at or past `stop_loss_percent`. Symbols without
    /// a current price are skipped (no data is never an alert).
    pub fn breaches(
        &self,
        prices: &HashMap<String, f64>,
        stop_loss_percent: f64,
    ) -> Vec<StopLossBreach> {
        let mut breaches = Vec::new();
        for (symbol, entry) in &self.entries {
            let Some(&current_price) = prices.get(symbol) else {
                continue;
            };
            if entry.entry_price <= 0.0 {
                continue;
            }
            let change = (current_price - entry.entry_price) / entry.entry_price * 100.0;
            if change <= -stop_loss_percent {
                breaches.push(StopLossBreach {
                    symbol: symbol.clone(),
                    entry_price: entry.entry_price,
                    current_price,
                    loss_percent: -change,
                    quantity: entry.quantity,
                });
            }
        }
        breaches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Portfolio {
        let mut p = Portfolio::default();
        p.buy("RELIANCE", 2900.0, 10, "2025-03-28T10:00:00+05:30".to_string());
        p.buy("TCS", 4000.0, 5, "2025-03-28T10:05:00+05:30".to_string());
        p
    }

    #[test]
    fn test_round_trip() {
        let dir = std::env::temp_dir().join(format!("niftypulse-pf-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("portfolio.json");

        let portfolio = sample();
        portfolio.save(&path).unwrap();
        let loaded = Portfolio::from_file(&path).unwrap();

        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(loaded.entries["RELIANCE"].entry_price, 2900.0);
        assert_eq!(loaded.entries["TCS"].quantity, 5);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_empty() {
        let portfolio = Portfolio::from_file("does/not/exist.json").unwrap();
        assert!(portfolio.is_empty());
    }

    #[test]
    fn test_buy_overwrites_and_sell_removes() {
        let mut portfolio = sample();
        portfolio.buy("RELIANCE", 2800.0, 20, "2025-03-29T10:00:00+05:30".to_string());
        assert_eq!(portfolio.entries["RELIANCE"].entry_price, 2800.0);
        assert_eq!(portfolio.entries["RELIANCE"].quantity, 20);

        let sold = portfolio.sell("TCS").unwrap();
        assert_eq!(sold.quantity, 5);
        assert!(portfolio.sell("TCS").is_none());
    }

    #[test]
    fn test_breaches_threshold() {
        let portfolio = sample();
        let mut prices = HashMap::new();
        prices.insert("RELIANCE".to_string(), 2842.0); // exactly -2%
        prices.insert("TCS".to_string(), 3990.0); // -0.25%, no breach

        let breaches = portfolio.breaches(&prices, 2.0);
        assert_eq!(breaches.len(), 1);
        assert_eq!(breaches[0].symbol, "RELIANCE");
        assert!((breaches[0].loss_percent - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_breaches_skips_unpriced_symbols() {
        let portfolio = sample();
        let prices = HashMap::new();
        assert!(portfolio.breaches(&prices, 2.0).is_empty());
    }
}
