//! Scanner: runs fetch+analyze over the whole universe in bounded concurrent
//! groups, collects the successes and ranks them.

use futures::future::join_all;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::analysis::{analyze, percent_change};
use crate::constants::GROUP_DELAY_MS;
use crate::models::AnalysisResult;

use super::fetcher::MarketDataFetcher;

/// Ranking metric for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Score,
    PercentChange,
}

impl RankBy {
    /// Parse from CLI input (case-insensitive).
    pub fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "score" => Ok(RankBy::Score),
            "change" | "percent" | "percent_change" => Ok(RankBy::PercentChange),
            _ => Err(format!("Invalid ranking: {}. Valid options: score, change", s)),
        }
    }
}

pub struct Scanner {
    fetcher: MarketDataFetcher,
    concurrency: usize,
}

impl Scanner {
    pub fn new(fetcher: MarketDataFetcher, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch and analyze every symbol. Failures are skipped with a log line;
    /// results come back in universe order (ranking is a separate step).
    pub async fn scan(&self, symbols: &[String]) -> Vec<AnalysisResult> {
        let mut results = Vec::with_capacity(symbols.len());
        let groups: Vec<&[String]> = symbols.chunks(self.concurrency).collect();
        let total_groups = groups.len();

        for (group_idx, group) in groups.into_iter().enumerate() {
            let tasks: Vec<_> = group
                .iter()
                .map(|symbol| {
                    let fetcher = self.fetcher.clone();
                    let symbol = symbol.clone();
                    tokio::spawn(async move { fetch_and_analyze(&fetcher, &symbol).await })
                })
                .collect();

            for task in join_all(tasks).await {
                match task {
                    Ok(Some(result)) => results.push(result),
                    Ok(None) => {} // skip already logged
                    Err(e) => warn!(error = %e, "Analysis task panicked"),
                }
            }

            if group_idx + 1 < total_groups {
                sleep(Duration::from_millis(GROUP_DELAY_MS)).await;
            }
        }

        info!(
            analyzed = results.len(),
            skipped = symbols.len() - results.len(),
            "Scan cycle completed"
        );
        results
    }
}

/// One symbol through the full pipeline. `None` on no data.
pub async fn fetch_and_analyze(
    fetcher: &MarketDataFetcher,
    symbol: &str,
) -> Option<AnalysisResult> {
    let bars = fetcher.fetch(symbol).await?;
    let last_close = bars.last().map(|b| b.close)?;

    let analysis = analyze(&bars);
    Some(AnalysisResult {
        symbol: symbol.to_string(),
        current_price: last_close,
        percent_change: percent_change(&bars),
        score: analysis.score,
        signal: analysis.signal,
        snapshot: analysis.snapshot,
        projection: analysis.projection,
        bars,
    })
}

/// Stable descending sort by the chosen metric; ties keep input order.
pub fn rank(results: &mut [AnalysisResult], by: RankBy) {
    match by {
        RankBy::Score => results.sort_by(|a, b| b.score.cmp(&a.score)),
        RankBy::PercentChange => results.sort_by(|a, b| {
            b.percent_change
                .partial_cmp(&a.percent_change)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

/// Top K by truncation after ranking.
pub fn top_k(mut results: Vec<AnalysisResult>, by: RankBy, k: usize) -> Vec<AnalysisResult> {
    rank(&mut results, by);
    results.truncate(k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::IndicatorSnapshot;
    use crate::models::Signal;

    fn result(symbol: &str, score: u8, percent_change: f64) -> AnalysisResult {
        AnalysisResult {
            symbol: symbol.to_string(),
            current_price: 100.0,
            percent_change,
            score,
            signal: Signal::Hold,
            snapshot: IndicatorSnapshot::default(),
            projection: Vec::new(),
            bars: Vec::new(),
        }
    }

    #[test]
    fn test_rank_by_score_is_stable() {
        let mut results = vec![
            result("A", 10, 0.0),
            result("B", 90, 0.0),
            result("C", 50, 0.0),
            result("D", 90, 0.0),
            result("E", 30, 0.0),
        ];
        rank(&mut results, RankBy::Score);

        let order: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        // both 90s ahead of the 50, preserving B-before-D input order
        assert_eq!(order, vec!["B", "D", "C", "E", "A"]);
    }

    #[test]
    fn test_rank_by_percent_change() {
        let mut results = vec![
            result("A", 0, -1.2),
            result("B", 0, 3.4),
            result("C", 0, 0.5),
        ];
        rank(&mut results, RankBy::PercentChange);
        let order: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_top_k_truncates() {
        let results = vec![
            result("A", 10, 0.0),
            result("B", 90, 0.0),
            result("C", 50, 0.0),
        ];
        let top = top_k(results, RankBy::Score, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].symbol, "B");
        assert_eq!(top[1].symbol, "C");
    }

    #[test]
    fn test_rank_by_parse() {
        assert_eq!(RankBy::from_str("score").unwrap(), RankBy::Score);
        assert_eq!(RankBy::from_str("CHANGE").unwrap(), RankBy::PercentChange);
        assert!(RankBy::from_str("volume").is_err());
    }
}
