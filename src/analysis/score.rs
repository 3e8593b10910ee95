//! Score, signal classification and the naive return projection.

use crate::constants::{BUY_SCORE, HOLD_SCORE, RSI_OVERBOUGHT_OVERRIDE, STRONG_BUY_SCORE};
use crate::models::{Bar, Signal};

use super::IndicatorSnapshot;

/// Additive point score over the latest snapshot, clamped to [0,100].
/// An undefined indicator contributes 0 for its rows.
pub fn score_snapshot(snap: &IndicatorSnapshot) -> u8 {
    let mut points: i32 = 0;

    if let (Some(ema20), Some(ema50)) = (snap.ema20, snap.ema50) {
        if ema20 > ema50 {
            points += 20;
        }
    }

    if matches!(snap.macd_hist, Some(h) if h > 0.0) {
        points += 10;
    }

    if let Some(rsi) = snap.rsi14 {
        if (30.0..=60.0).contains(&rsi) {
            points += 12;
        } else if rsi < 30.0 {
            points += 8;
        } else if rsi < 75.0 {
            points += 6;
        }
    }

    if matches!(snap.roc9, Some(r) if r > 0.0) {
        points += 5;
    }

    if let Some(avg) = snap.vol_avg20 {
        if avg > 0.0 {
            let ratio = snap.volume / avg;
            if ratio > 1.5 {
                points += 15;
            } else if ratio > 1.1 {
                points += 8;
            }
        }
    }

    if matches!(snap.vwap, Some(v) if snap.close > v) {
        points += 10;
    }

    if let Some(adx) = snap.adx14 {
        if adx > 25.0 {
            points += 10;
        } else if adx > 18.0 {
            points += 5;
        }
    }

    if let (Some(obv), Some(avg)) = (snap.obv, snap.obv_avg20) {
        if obv > avg {
            points += 5;
        }
    }

    if let Some(atr) = snap.atr14 {
        if snap.close > 0.0 {
            let ratio = atr / snap.close;
            if ratio < 0.01 {
                points += 5;
            } else if ratio < 0.02 {
                points += 3;
            }
        }
    }

    points.clamp(0, 100) as u8
}

/// Map score plus override conditions to a signal.
///
/// Overrides are checked first: a close under the lower Bollinger band or an
/// RSI past the blow-off threshold is STRONG SELL regardless of score.
pub fn classify_signal(score: u8, snap: &IndicatorSnapshot) -> Signal {
    if matches!(snap.bb_lower, Some(lower) if snap.close < lower) {
        return Signal::StrongSell;
    }
    if matches!(snap.rsi14, Some(rsi) if rsi > RSI_OVERBOUGHT_OVERRIDE) {
        return Signal::StrongSell;
    }

    if score >= STRONG_BUY_SCORE {
        Signal::StrongBuy
    } else if score >= BUY_SCORE {
        Signal::Buy
    } else if score >= HOLD_SCORE {
        Signal::Hold
    } else {
        Signal::Sell
    }
}

/// Projected cumulative percent change for day offsets `1..=horizon`:
/// the arithmetic mean bar-to-bar percent change, scaled linearly. Not
/// compounded, and not a forecast in any statistical sense.
pub fn project_returns(bars: &[Bar], horizon: usize) -> Vec<f64> {
    let mut changes = Vec::new();
    for window in bars.windows(2) {
        let prev = window[0].close;
        if prev != 0.0 {
            changes.push((window[1].close - prev) / prev * 100.0);
        }
    }
    let mean = if changes.is_empty() {
        0.0
    } else {
        changes.iter().sum::<f64>() / changes.len() as f64
    };
    (1..=horizon).map(|day| mean * day as f64).collect()
}

/// Percent change from the first to the last close of the fetched window.
/// A single-bar series or a zero first close reads 0.0.
pub fn percent_change(bars: &[Bar]) -> f64 {
    if bars.len() < 2 {
        return 0.0;
    }
    let first = bars[0].close;
    let last = bars[bars.len() - 1].close;
    if first == 0.0 {
        return 0.0;
    }
    (last - first) / first * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(i: usize, close: f64) -> Bar {
        let time = Utc.with_ymd_and_hms(2025, 3, 28, 9, 15, 0).unwrap()
            + chrono::Duration::minutes(5 * i as i64);
        Bar::new(time, close, close, close, close, 1000)
    }

    fn bullish_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: 105.0,
            volume: 2000.0,
            ema20: Some(104.0),
            ema50: Some(100.0),   // +20
            rsi14: Some(45.0),    // +12
            macd_hist: Some(0.8), // +10
            bb_upper: Some(110.0),
            bb_lower: Some(95.0),
            atr14: Some(0.9),       // 0.86% of close: +5
            adx14: Some(30.0),      // +10
            obv: Some(5000.0),      // above avg: +5
            obv_avg20: Some(3000.0),
            roc9: Some(2.0),          // +5
            vwap: Some(103.0),        // close above: +10
            vol_avg20: Some(1000.0), // ratio 2.0: +15
        }
    }

    #[test]
    fn test_full_bullish_score() {
        // every row fires at its maximum: 20+10+12+5+15+10+10+5+5 = 92
        assert_eq!(score_snapshot(&bullish_snapshot()), 92);
    }

    #[test]
    fn test_undefined_snapshot_scores_zero() {
        let snap = IndicatorSnapshot {
            close: 123.0,
            volume: 456.0,
            ..IndicatorSnapshot::default()
        };
        assert_eq!(score_snapshot(&snap), 0);
    }

    #[test]
    fn test_rsi_buckets_are_exclusive() {
        let mut snap = IndicatorSnapshot::default();
        snap.rsi14 = Some(45.0);
        assert_eq!(score_snapshot(&snap), 12);
        snap.rsi14 = Some(25.0);
        assert_eq!(score_snapshot(&snap), 8);
        snap.rsi14 = Some(70.0);
        assert_eq!(score_snapshot(&snap), 6);
        snap.rsi14 = Some(80.0);
        assert_eq!(score_snapshot(&snap), 0);
    }

    #[test]
    fn test_volume_buckets() {
        let mut snap = IndicatorSnapshot {
            volume: 1600.0,
            vol_avg20: Some(1000.0),
            ..IndicatorSnapshot::default()
        };
        assert_eq!(score_snapshot(&snap), 15);
        snap.volume = 1300.0;
        assert_eq!(score_snapshot(&snap), 8);
        snap.volume = 1000.0;
        assert_eq!(score_snapshot(&snap), 0);
    }

    #[test]
    fn test_adx_and_atr_buckets() {
        let mut snap = IndicatorSnapshot {
            close: 100.0,
            adx14: Some(20.0),
            atr14: Some(1.5),
            ..IndicatorSnapshot::default()
        };
        // adx 18..=25 bucket (+5), atr 1.5% (+3)
        assert_eq!(score_snapshot(&snap), 8);
        snap.adx14 = Some(26.0);
        snap.atr14 = Some(0.5);
        assert_eq!(score_snapshot(&snap), 15);
    }

    #[test]
    fn test_score_tolerates_adversarial_input() {
        // all-zero volume: vol ratio and VWAP rows simply don't fire
        let snap = IndicatorSnapshot {
            close: 0.0,
            volume: 0.0,
            vol_avg20: Some(0.0),
            atr14: Some(1.0),
            ..IndicatorSnapshot::default()
        };
        let score = score_snapshot(&snap);
        assert!(score <= 100);
    }

    #[test]
    fn test_classify_score_thresholds() {
        let snap = bullish_snapshot();
        assert_eq!(classify_signal(80, &snap), Signal::StrongBuy);
        assert_eq!(classify_signal(70, &snap), Signal::StrongBuy);
        assert_eq!(classify_signal(60, &snap), Signal::Buy);
        assert_eq!(classify_signal(45, &snap), Signal::Hold);
        assert_eq!(classify_signal(20, &snap), Signal::Sell);
    }

    #[test]
    fn test_classify_lower_band_override() {
        let mut snap = bullish_snapshot();
        snap.close = 90.0; // below bb_lower 95
        assert_eq!(classify_signal(80, &snap), Signal::StrongSell);
    }

    #[test]
    fn test_classify_rsi_override() {
        let mut snap = bullish_snapshot();
        snap.rsi14 = Some(90.0);
        assert_eq!(classify_signal(95, &snap), Signal::StrongSell);
    }

    #[test]
    fn test_percent_change_exact() {
        let bars = vec![bar(0, 100.0), bar(1, 105.0), bar(2, 110.0)];
        assert_eq!(percent_change(&bars), 10.0);
    }

    #[test]
    fn test_percent_change_degenerate() {
        assert_eq!(percent_change(&[bar(0, 100.0)]), 0.0);
        assert_eq!(percent_change(&[]), 0.0);
        let zero_first = vec![bar(0, 0.0), bar(1, 10.0)];
        assert_eq!(percent_change(&zero_first), 0.0);
    }

    #[test]
    fn test_projection_is_linear() {
        // +1% per bar
        let bars = vec![bar(0, 100.0), bar(1, 101.0), bar(2, 102.01)];
        let projection = project_returns(&bars, 3);
        assert_eq!(projection.len(), 3);
        assert!((projection[0] - 1.0).abs() < 1e-9);
        assert!((projection[2] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_empty_series() {
        assert_eq!(project_returns(&[], 5), vec![0.0; 5]);
    }
}
