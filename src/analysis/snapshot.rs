//! Per-bar indicator series and the latest-bar snapshot fed to scoring.

use serde::Serialize;

use crate::constants::{
    ADX_PERIOD, ATR_PERIOD, BOLLINGER_PERIOD, BOLLINGER_WIDTH, EMA_LONG_PERIOD, EMA_SHORT_PERIOD,
    MACD_FAST_PERIOD, MACD_SIGNAL_PERIOD, MACD_SLOW_PERIOD, MIN_BARS_FOR_ANALYSIS, ROC_PERIOD,
    RSI_PERIOD, VOLUME_AVG_PERIOD,
};
use crate::models::Bar;

use super::indicators;

/// Indicator columns aligned one-to-one with a bar series.
///
/// Series shorter than [`MIN_BARS_FOR_ANALYSIS`] get all-`None` columns: too
/// little history to assert anything, which is a precondition rather than an
/// error.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSeries {
    pub ema20: Vec<Option<f64>>,
    pub ema50: Vec<Option<f64>>,
    pub rsi14: Vec<Option<f64>>,
    pub macd_hist: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub atr14: Vec<Option<f64>>,
    pub adx14: Vec<Option<f64>>,
    pub obv: Vec<Option<f64>>,
    pub obv_avg20: Vec<Option<f64>>,
    pub roc9: Vec<Option<f64>>,
    pub vwap: Vec<Option<f64>>,
    pub vol_avg20: Vec<Option<f64>>,
}

/// Latest indicator values plus the latest close/volume - the sole input to
/// scoring and signal classification.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub volume: f64,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub atr14: Option<f64>,
    pub adx14: Option<f64>,
    pub obv: Option<f64>,
    pub obv_avg20: Option<f64>,
    pub roc9: Option<f64>,
    pub vwap: Option<f64>,
    pub vol_avg20: Option<f64>,
}

impl IndicatorSeries {
    /// Compute every column for the given series.
    pub fn compute(bars: &[Bar]) -> Self {
        let n = bars.len();
        if n < MIN_BARS_FOR_ANALYSIS {
            return Self::undefined(n);
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
        let obv_raw = indicators::obv(bars);

        let (bb_upper, bb_lower) =
            indicators::bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_WIDTH);

        Self {
            ema20: indicators::ema(&closes, EMA_SHORT_PERIOD),
            ema50: indicators::ema(&closes, EMA_LONG_PERIOD),
            rsi14: indicators::rsi(&closes, RSI_PERIOD),
            macd_hist: indicators::macd_histogram(
                &closes,
                MACD_FAST_PERIOD,
                MACD_SLOW_PERIOD,
                MACD_SIGNAL_PERIOD,
            ),
            bb_upper,
            bb_lower,
            atr14: indicators::atr(bars, ATR_PERIOD),
            adx14: indicators::adx(bars, ADX_PERIOD),
            obv_avg20: indicators::rolling_mean(&obv_raw, VOLUME_AVG_PERIOD),
            obv: obv_raw.into_iter().map(Some).collect(),
            roc9: indicators::roc(&closes, ROC_PERIOD),
            vwap: indicators::vwap(bars),
            vol_avg20: indicators::rolling_mean(&volumes, VOLUME_AVG_PERIOD),
        }
    }

    /// All columns undefined, for series below the minimum length.
    fn undefined(len: usize) -> Self {
        let none = vec![None; len];
        Self {
            ema20: none.clone(),
            ema50: none.clone(),
            rsi14: none.clone(),
            macd_hist: none.clone(),
            bb_upper: none.clone(),
            bb_lower: none.clone(),
            atr14: none.clone(),
            adx14: none.clone(),
            obv: none.clone(),
            obv_avg20: none.clone(),
            roc9: none.clone(),
            vwap: none.clone(),
            vol_avg20: none,
        }
    }

    /// Snapshot of the last row. Empty series yield a fully undefined
    /// snapshot with zero close/volume.
    pub fn snapshot(&self, bars: &[Bar]) -> IndicatorSnapshot {
        let Some(last) = bars.last() else {
            return IndicatorSnapshot::default();
        };
        let i = bars.len() - 1;
        IndicatorSnapshot {
            close: last.close,
            volume: last.volume as f64,
            ema20: self.ema20[i],
            ema50: self.ema50[i],
            rsi14: self.rsi14[i],
            macd_hist: self.macd_hist[i],
            bb_upper: self.bb_upper[i],
            bb_lower: self.bb_lower[i],
            atr14: self.atr14[i],
            adx14: self.adx14[i],
            obv: self.obv[i],
            obv_avg20: self.obv_avg20[i],
            roc9: self.roc9[i],
            vwap: self.vwap[i],
            vol_avg20: self.vol_avg20[i],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let time = Utc.with_ymd_and_hms(2025, 3, 28, 9, 15, 0).unwrap()
                    + chrono::Duration::minutes(5 * i as i64);
                let close = 100.0 + i as f64;
                Bar::new(time, close - 0.5, close + 1.0, close - 1.0, close, 1000 + i as u64)
            })
            .collect()
    }

    #[test]
    fn test_short_series_all_undefined() {
        let bars = series(19);
        let ind = IndicatorSeries::compute(&bars);
        let snap = ind.snapshot(&bars);
        assert!(snap.ema20.is_none());
        assert!(snap.rsi14.is_none());
        assert!(snap.vwap.is_none());
        assert!(snap.obv.is_none());
        assert_eq!(snap.close, 118.0);
    }

    #[test]
    fn test_columns_align_with_bars() {
        let bars = series(60);
        let ind = IndicatorSeries::compute(&bars);
        assert_eq!(ind.ema20.len(), 60);
        assert_eq!(ind.adx14.len(), 60);
        assert_eq!(ind.vol_avg20.len(), 60);

        let snap = ind.snapshot(&bars);
        assert!(snap.ema20.is_some());
        assert!(snap.ema50.is_some());
        assert!(snap.rsi14.is_some());
        assert!(snap.macd_hist.is_some());
        assert!(snap.adx14.is_some());
        assert!(snap.vol_avg20.is_some());
    }

    #[test]
    fn test_empty_series_snapshot() {
        let ind = IndicatorSeries::compute(&[]);
        let snap = ind.snapshot(&[]);
        assert_eq!(snap.close, 0.0);
        assert!(snap.ema20.is_none());
    }

    #[test]
    fn test_ema50_undefined_below_fifty_bars() {
        // 20 <= L < 50: short EMA defined, long EMA still warming up
        let bars = series(30);
        let ind = IndicatorSeries::compute(&bars);
        let snap = ind.snapshot(&bars);
        assert!(snap.ema20.is_some());
        assert!(snap.ema50.is_none());
    }
}
