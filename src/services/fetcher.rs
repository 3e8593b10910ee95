//! Market-data fetcher: interval ladder with a CSV-cache fallback.
//!
//! Tries finer intraday intervals first, falls back to coarser daily bars,
//! and finally to the last cached series. Total failure is "no data" - the
//! caller skips the symbol, nothing crashes.

use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::Bar;

use super::cache::BarCache;
use super::retry::RetryPolicy;
use super::yahoo::YahooClient;

/// (interval, range) rungs, finest first. Ranges follow the provider's rule
/// of thumb: minute data only exists for the most recent sessions.
const INTERVAL_LADDER: &[(&str, &str)] = &[
    ("5m", "1d"),
    ("15m", "1d"),
    ("1h", "5d"),
    ("1d", "60d"),
];

/// Politeness delay between ladder rungs.
const RUNG_DELAY_MS: u64 = 200;

#[derive(Clone)]
pub struct MarketDataFetcher {
    client: YahooClient,
    cache: BarCache,
}

impl MarketDataFetcher {
    pub fn new(data_dir: PathBuf, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: YahooClient::new(retry)?,
            cache: BarCache::new(data_dir),
        })
    }

    pub fn with_client(client: YahooClient, cache: BarCache) -> Self {
        Self { client, cache }
    }

    /// Fetch a symbol's series, walking the interval ladder and falling back
    /// to the cache. `None` means skip this symbol for the cycle.
    pub async fn fetch(&self, symbol: &str) -> Option<Vec<Bar>> {
        for (i, &(interval, range)) in INTERVAL_LADDER.iter().enumerate() {
            if i > 0 {
                sleep(Duration::from_millis(RUNG_DELAY_MS)).await;
            }

            match self.client.fetch_bars(symbol, interval, range).await {
                Ok(bars) if !bars.is_empty() => {
                    info!(symbol = symbol, interval = interval, rows = bars.len(), "Fetched series");
                    if let Err(e) = self.cache.store(symbol, &bars) {
                        warn!(symbol = symbol, error = %e, "Failed to cache series");
                    }
                    return Some(bars);
                }
                Ok(_) => {
                    debug!(symbol = symbol, interval = interval, "Empty series at interval");
                }
                Err(e) => {
                    debug!(symbol = symbol, interval = interval, error = %e, "Fetch failed at interval");
                }
            }
        }

        match self.cache.load(symbol) {
            Ok(bars) if !bars.is_empty() => {
                info!(symbol = symbol, rows = bars.len(), "Loaded fallback series from cache");
                Some(bars)
            }
            _ => {
                warn!(symbol = symbol, "No data after all intervals and cache fallback");
                None
            }
        }
    }
}
