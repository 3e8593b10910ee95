//! Yahoo Finance chart API client.
//!
//! Fetches one symbol's bar series for a given interval/range pair. Plain NSE
//! symbols get the `.NS` suffix appended. Responses are navigated as loose
//! JSON; rows with a null close are dropped and the series is returned sorted
//! ascending with duplicate timestamps removed.

use chrono::DateTime;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Bar;

use super::retry::RetryPolicy;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl YahooClient {
    pub fn new(retry: RetryPolicy) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), retry)
    }

    /// Custom endpoint, used by tests and proxies.
    pub fn with_base_url(base_url: String, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("Mozilla/5.0 (compatible; niftypulse)")
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// Fetch bars for one symbol. `interval` and `range` use the provider's
    /// notation ("5m", "1d", "5d", "60d", ...).
    pub async fn fetch_bars(&self, symbol: &str, interval: &str, range: &str) -> Result<Vec<Bar>> {
        let provider_symbol = to_provider_symbol(symbol);
        // '&' appears in NSE symbols (M&M) and must not split the path
        let encoded = provider_symbol.replace('&', "%26");
        let url = format!("{}/v8/finance/chart/{}", self.base_url, encoded);

        let mut last_error = Error::NoData(provider_symbol.clone());

        for attempt in 0..self.retry.max_attempts {
            let delay = self.retry.jittered_delay(attempt);
            if !delay.is_zero() {
                debug!(
                    symbol = %provider_symbol,
                    attempt = attempt + 1,
                    wait_ms = delay.as_millis() as u64,
                    "Retry backoff before chart request"
                );
                sleep(delay).await;
            }

            let response = match self
                .client
                .get(&url)
                .query(&[("interval", interval), ("range", range)])
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(symbol = %provider_symbol, attempt = attempt + 1, error = %e, "Chart request failed");
                    last_error = Error::Network(e.to_string());
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                warn!(symbol = %provider_symbol, status = status.as_u16(), "Provider busy, retrying");
                last_error = Error::Network(format!("HTTP {}", status));
                continue;
            }
            if !status.is_success() {
                // other client errors will not get better on retry
                return Err(Error::Network(format!(
                    "HTTP {} for {}",
                    status, provider_symbol
                )));
            }

            let body: Value = match response.json().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(symbol = %provider_symbol, attempt = attempt + 1, error = %e, "Bad chart response body");
                    last_error = Error::Parse(e.to_string());
                    continue;
                }
            };

            return parse_chart_response(&body, &provider_symbol);
        }

        Err(last_error)
    }
}

/// Append `.NS` unless the caller already picked an exchange suffix.
fn to_provider_symbol(symbol: &str) -> String {
    let symbol = symbol.trim();
    if symbol.contains('.') {
        symbol.to_string()
    } else {
        format!("{}.NS", symbol)
    }
}

/// Pull the OHLCV arrays out of a chart response. Rows with a null close are
/// dropped; null open/high/low fall back to the close, null volume to 0.
fn parse_chart_response(body: &Value, symbol: &str) -> Result<Vec<Bar>> {
    let result = &body["chart"]["result"][0];
    if result.is_null() {
        let detail = body["chart"]["error"]["description"]
            .as_str()
            .unwrap_or("empty chart result");
        return Err(Error::NoData(format!("{}: {}", symbol, detail)));
    }

    let timestamps = result["timestamp"]
        .as_array()
        .ok_or_else(|| Error::NoData(format!("{}: no timestamps", symbol)))?;
    let quote = &result["indicators"]["quote"][0];

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(ts) = ts.as_i64() else { continue };
        let Some(time) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };
        let Some(close) = quote["close"][i].as_f64() else {
            continue;
        };

        let open = quote["open"][i].as_f64().unwrap_or(close);
        let high = quote["high"][i].as_f64().unwrap_or(close);
        let low = quote["low"][i].as_f64().unwrap_or(close);
        let volume = quote["volume"][i].as_u64().unwrap_or(0);

        bars.push(Bar::new(time, open, high, low, close, volume));
    }

    bars.sort_by(|a, b| a.time.cmp(&b.time));
    bars.dedup_by(|a, b| a.time == b.time);

    debug!(symbol = %symbol, rows = bars.len(), "Parsed chart response");
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_provider_symbol() {
        assert_eq!(to_provider_symbol("RELIANCE"), "RELIANCE.NS");
        assert_eq!(to_provider_symbol(" TCS "), "TCS.NS");
        assert_eq!(to_provider_symbol("RELIANCE.NS"), "RELIANCE.NS");
        assert_eq!(to_provider_symbol("M&M"), "M&M.NS");
    }

    #[test]
    fn test_parse_drops_null_closes() {
        let body = json!({
            "chart": {
                "result": [{
                    "timestamp": [1743132900, 1743133200, 1743133500],
                    "indicators": {
                        "quote": [{
                            "open":   [100.0, 101.0, null],
                            "high":   [101.0, 102.0, 103.0],
                            "low":    [99.0, 100.0, 101.0],
                            "close":  [100.5, null, 102.0],
                            "volume": [1000, 2000, null]
                        }]
                    }
                }],
                "error": null
            }
        });
        let bars = parse_chart_response(&body, "RELIANCE.NS").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 100.5);
        // null open falls back to close, null volume to 0
        assert_eq!(bars[1].open, 102.0);
        assert_eq!(bars[1].volume, 0);
    }

    #[test]
    fn test_parse_sorts_and_dedupes() {
        let body = json!({
            "chart": {
                "result": [{
                    "timestamp": [1743133200, 1743132900, 1743133200],
                    "indicators": {
                        "quote": [{
                            "open":   [101.0, 100.0, 101.0],
                            "high":   [102.0, 101.0, 102.0],
                            "low":    [100.0, 99.0, 100.0],
                            "close":  [101.5, 100.5, 101.5],
                            "volume": [2000, 1000, 2000]
                        }]
                    }
                }],
                "error": null
            }
        });
        let bars = parse_chart_response(&body, "TCS.NS").unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].time < bars[1].time);
    }

    #[test]
    fn test_parse_error_payload() {
        let body = json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        });
        let err = parse_chart_response(&body, "NOPE.NS").unwrap_err();
        assert!(matches!(err, Error::NoData(_)));
    }
}
