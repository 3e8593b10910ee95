//! Primitive indicator computations.
//!
//! Every function returns a vector aligned one-to-one with its input, using
//! `None` for bars without enough history (and for any value that would
//! require dividing by zero). Values at index `i` use only bars up to and
//! including `i` - no look-ahead.

use crate::models::Bar;

/// Rolling mean, `None` until the window is filled.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = Some(sum / period as f64);
    }
    out
}

/// Exponential moving average. Multiplier `2/(n+1)`, seeded with the SMA of
/// the first `n` values, defined from index `n-1`.
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut prev: f64 = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(prev);
    for i in period..values.len() {
        prev = values[i] * k + prev * (1.0 - k);
        out[i] = Some(prev);
    }
    out
}

/// Relative Strength Index with Wilder smoothing (`1/n`), defined from index
/// `n`. A window with no losses reads 100, no gains 0, perfectly flat 50.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss += -delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    let n = period as f64;
    for i in (period + 1)..closes.len() {
        let delta = closes[i] - closes[i - 1];
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// MACD histogram: `(EMA(fast) - EMA(slow))` minus its `signal`-period EMA.
/// Defined once the signal EMA has its own seed history.
pub fn macd_histogram(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut out = vec![None; n];

    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let macd_line: Vec<Option<f64>> = (0..n)
        .map(|i| match (fast_ema[i], slow_ema[i]) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let Some(first) = macd_line.iter().position(|v| v.is_some()) else {
        return out;
    };
    // EMAs are contiguous once defined, so everything from `first` on is Some.
    let defined: Vec<f64> = macd_line[first..].iter().flatten().copied().collect();
    let signal_ema = ema(&defined, signal);

    for (j, sig) in signal_ema.iter().enumerate() {
        if let (Some(sig), Some(macd)) = (*sig, macd_line[first + j]) {
            out[first + j] = Some(macd - sig);
        }
    }
    out
}

/// Bollinger bands: `period`-SMA +/- `width` population standard deviations.
/// Returns `(upper, lower)`.
pub fn bollinger(closes: &[f64], period: usize, width: f64) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = closes.len();
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];
    if period == 0 || n < period {
        return (upper, lower);
    }
    for i in (period - 1)..n {
        let window = &closes[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        let sd = variance.sqrt();
        upper[i] = Some(mean + width * sd);
        lower[i] = Some(mean - width * sd);
    }
    (upper, lower)
}

/// True range per bar. `TR[0] = high - low` (no previous close).
fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                let prev_close = bars[i - 1].close;
                (bar.high - bar.low)
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs())
            }
        })
        .collect()
}

/// Average True Range: rolling mean of the true range.
pub fn atr(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    rolling_mean(&true_range(bars), period)
}

/// Average Directional Index (Wilder). Values in [0,100], defined from index
/// `2n - 1`.
pub fn adx(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut out = vec![None; n];
    if period == 0 || n < 2 * period {
        return out;
    }

    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let tr = true_range(bars);
    for i in 1..n {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;
        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
    }

    // Wilder-smoothed running sums, seeded over the first `period` moves.
    let p = period as f64;
    let mut smooth_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut smooth_minus: f64 = minus_dm[1..=period].iter().sum();
    let mut smooth_tr: f64 = tr[1..=period].iter().sum();

    let mut dx = vec![0.0; n];
    dx[period] = dx_value(smooth_plus, smooth_minus, smooth_tr);
    for i in (period + 1)..n {
        smooth_plus = smooth_plus - smooth_plus / p + plus_dm[i];
        smooth_minus = smooth_minus - smooth_minus / p + minus_dm[i];
        smooth_tr = smooth_tr - smooth_tr / p + tr[i];
        dx[i] = dx_value(smooth_plus, smooth_minus, smooth_tr);
    }

    // ADX: Wilder average of DX, seeded with the mean of its first `period` values.
    let mut prev = dx[period..2 * period].iter().sum::<f64>() / p;
    out[2 * period - 1] = Some(prev);
    for i in (2 * period)..n {
        prev = (prev * (p - 1.0) + dx[i]) / p;
        out[i] = Some(prev);
    }
    out
}

fn dx_value(plus: f64, minus: f64, tr: f64) -> f64 {
    if tr <= 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus / tr;
    let minus_di = 100.0 * minus / tr;
    let sum = plus_di + minus_di;
    if sum == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / sum
    }
}

/// On-Balance Volume: running sum seeded at 0, +volume on up closes, -volume
/// on down closes, unchanged on flat closes.
pub fn obv(bars: &[Bar]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    let mut running = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            let prev_close = bars[i - 1].close;
            if bar.close > prev_close {
                running += bar.volume as f64;
            } else if bar.close < prev_close {
                running -= bar.volume as f64;
            }
        }
        out.push(running);
    }
    out
}

/// Rate of Change: percent difference vs the close `period` bars prior.
pub fn roc(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 {
        return out;
    }
    for i in period..closes.len() {
        let base = closes[i - period];
        if base != 0.0 {
            out[i] = Some((closes[i] - base) / base * 100.0);
        }
    }
    out
}

/// Volume-weighted average price: cumulative typical-price x volume over
/// cumulative volume, from the start of the series.
pub fn vwap(bars: &[Bar]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(bars.len());
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;
    for bar in bars {
        cum_pv += bar.typical_price() * bar.volume as f64;
        cum_volume += bar.volume as f64;
        out.push(if cum_volume > 0.0 {
            Some(cum_pv / cum_volume)
        } else {
            None
        });
    }
    out
}
