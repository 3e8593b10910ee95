//! Indicator and scoring engine.
//!
//! Pure transform from a bar series to indicator snapshots, a bounded score,
//! a categorical signal and a short-horizon projected-return curve. No I/O,
//! no network, no state beyond the constants module.

pub mod indicators;
mod score;
mod snapshot;

pub use score::{classify_signal, percent_change, project_returns, score_snapshot};
pub use snapshot::{IndicatorSeries, IndicatorSnapshot};

use crate::constants::{MIN_BARS_FOR_ANALYSIS, PROJECTION_DAYS};
use crate::models::{Bar, Signal};

/// Full engine output for one series.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub snapshot: IndicatorSnapshot,
    pub score: u8,
    pub signal: Signal,
    pub projection: Vec<f64>,
}

/// Run the whole pipeline over one series.
///
/// Below the minimum history the score stays at the insufficient-data floor
/// (0) and the signal is HOLD: thin data supports no decision in either
/// direction.
pub fn analyze(bars: &[Bar]) -> Analysis {
    let series = IndicatorSeries::compute(bars);
    let snapshot = series.snapshot(bars);
    let projection = project_returns(bars, PROJECTION_DAYS);

    if bars.len() < MIN_BARS_FOR_ANALYSIS {
        return Analysis {
            snapshot,
            score: 0,
            signal: Signal::Hold,
            projection,
        };
    }

    let score = score_snapshot(&snapshot);
    let signal = classify_signal(score, &snapshot);
    Analysis {
        snapshot,
        score,
        signal,
        projection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bars_from_closes(closes: &[f64], volume: u64) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let time = Utc.with_ymd_and_hms(2025, 3, 28, 9, 15, 0).unwrap()
                    + chrono::Duration::minutes(5 * i as i64);
                Bar::new(time, close, close + 0.5, close - 0.5, close, volume)
            })
            .collect()
    }

    #[test]
    fn test_insufficient_history_floor() {
        // extreme values must not leak through the minimum-length gate
        let closes: Vec<f64> = (0..19).map(|i| 1000.0 * (i + 1) as f64).collect();
        let analysis = analyze(&bars_from_closes(&closes, u64::MAX / 2));
        assert_eq!(analysis.score, 0);
        assert_eq!(analysis.signal, Signal::Hold);
        assert!(analysis.snapshot.ema20.is_none());
        assert!(analysis.snapshot.rsi14.is_none());
    }

    #[test]
    fn test_score_bounded_on_adversarial_series() {
        // constant close, zero volume
        let closes = vec![50.0; 60];
        let analysis = analyze(&bars_from_closes(&closes, 0));
        assert!(analysis.score <= 100);

        // monotonically collapsing price
        let closes: Vec<f64> = (0..60).map(|i| 1000.0 - 16.0 * i as f64).collect();
        let analysis = analyze(&bars_from_closes(&closes, 1000));
        assert!(analysis.score <= 100);
    }

    #[test]
    fn test_monotone_decline_reads_bearish() {
        let closes: Vec<f64> = (0..40).map(|i| 500.0 - 5.0 * i as f64).collect();
        let bars = bars_from_closes(&closes, 1000);
        let series = IndicatorSeries::compute(&bars);
        let snap = series.snapshot(&bars);

        // RSI pinned to the floor on a strictly falling series
        assert!(snap.rsi14.unwrap() < 1.0);
        // OBV at its running minimum: every bar subtracted volume
        assert_eq!(snap.obv.unwrap(), -(39.0 * 1000.0));
        // projection points down
        let analysis = analyze(&bars);
        assert!(analysis.projection.iter().all(|p| *p < 0.0));
    }

    #[test]
    fn test_noisy_uptrend_scores_high() {
        // rising 0.5/bar with a pullback every fourth bar, so RSI stays off
        // the blow-off override
        let closes: Vec<f64> = (0..80)
            .map(|i| {
                let dip = if i % 4 == 0 { -1.5 } else { 0.0 };
                100.0 + 0.5 * i as f64 + dip
            })
            .collect();
        let bars = bars_from_closes(&closes, 1000);
        let analysis = analyze(&bars);

        assert!(analysis.snapshot.rsi14.unwrap() < 85.0);
        assert!(analysis.score >= 40, "uptrend scored {}", analysis.score);
        assert_ne!(analysis.signal, Signal::StrongSell);
        assert!(analysis.projection.iter().all(|p| *p > 0.0));
    }
}
