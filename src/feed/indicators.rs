//! Indicator math over OHLCV series
//!
//! All functions return a vector the same length as the input, with a NaN
//! prefix while the indicator is warming up. The loader drops those rows
//! before replay begins.

/// Simple moving average
pub fn sma(values: &[f64], length: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if length == 0 || values.len() < length {
        return out;
    }

    let mut sum: f64 = values[..length].iter().sum();
    out[length - 1] = sum / length as f64;
    for i in length..values.len() {
        sum += values[i] - values[i - length];
        out[i] = sum / length as f64;
    }
    out
}

/// Exponential moving average, SMA-seeded
///
/// Tolerates a NaN prefix in the input so it can be chained (MACD signal).
pub fn ema(values: &[f64], length: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if length == 0 {
        return out;
    }

    let start = match values.iter().position(|v| v.is_finite()) {
        Some(idx) => idx,
        None => return out,
    };
    if values.len() < start + length {
        return out;
    }

    let alpha = 2.0 / (length as f64 + 1.0);
    let seed: f64 = values[start..start + length].iter().sum::<f64>() / length as f64;
    out[start + length - 1] = seed;
    for i in start + length..values.len() {
        out[i] = values[i] * alpha + out[i - 1] * (1.0 - alpha);
    }
    out
}

/// Wilder smoothing (running moving average), SMA-seeded
fn rma(values: &[f64], length: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if length == 0 {
        return out;
    }

    let start = match values.iter().position(|v| v.is_finite()) {
        Some(idx) => idx,
        None => return out,
    };
    if values.len() < start + length {
        return out;
    }

    let seed: f64 = values[start..start + length].iter().sum::<f64>() / length as f64;
    out[start + length - 1] = seed;
    for i in start + length..values.len() {
        out[i] = (out[i - 1] * (length as f64 - 1.0) + values[i]) / length as f64;
    }
    out
}

/// Relative Strength Index (Wilder)
pub fn rsi(close: &[f64], length: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; close.len()];
    if close.len() < 2 {
        return out;
    }

    let mut gains = vec![f64::NAN; close.len()];
    let mut losses = vec![f64::NAN; close.len()];
    for i in 1..close.len() {
        let diff = close[i] - close[i - 1];
        gains[i] = diff.max(0.0);
        losses[i] = (-diff).max(0.0);
    }

    let avg_gain = rma(&gains, length);
    let avg_loss = rma(&losses, length);

    for i in 0..close.len() {
        if avg_gain[i].is_finite() && avg_loss[i].is_finite() {
            out[i] = if avg_loss[i] == 0.0 {
                if avg_gain[i] == 0.0 {
                    50.0
                } else {
                    100.0
                }
            } else {
                100.0 - 100.0 / (1.0 + avg_gain[i] / avg_loss[i])
            };
        }
    }
    out
}

/// MACD histogram (macd line minus its signal line)
pub fn macd_histogram(close: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<f64> {
    let ema_fast = ema(close, fast);
    let ema_slow = ema(close, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&macd_line, signal);

    macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect()
}

/// True range series
fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; high.len()];
    if high.is_empty() {
        return out;
    }
    out[0] = high[0] - low[0];
    for i in 1..high.len() {
        let hl = high[i] - low[i];
        let hc = (high[i] - close[i - 1]).abs();
        let lc = (low[i] - close[i - 1]).abs();
        out[i] = hl.max(hc).max(lc);
    }
    out
}

/// Average True Range (Wilder)
pub fn atr(high: &[f64], low: &[f64], close: &[f64], length: usize) -> Vec<f64> {
    rma(&true_range(high, low, close), length)
}

/// Average Directional Index (Wilder)
pub fn adx(high: &[f64], low: &[f64], close: &[f64], length: usize) -> Vec<f64> {
    let n = high.len();
    let mut out = vec![f64::NAN; n];
    if n < 2 {
        return out;
    }

    let mut dm_plus = vec![f64::NAN; n];
    let mut dm_minus = vec![f64::NAN; n];
    for i in 1..n {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        dm_plus[i] = if up > down && up > 0.0 { up } else { 0.0 };
        dm_minus[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let tr_smooth = rma(&true_range(high, low, close), length);
    let dm_plus_smooth = rma(&dm_plus, length);
    let dm_minus_smooth = rma(&dm_minus, length);

    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if tr_smooth[i].is_finite() && tr_smooth[i] > 0.0 {
            let di_plus = 100.0 * dm_plus_smooth[i] / tr_smooth[i];
            let di_minus = 100.0 * dm_minus_smooth[i] / tr_smooth[i];
            let di_sum = di_plus + di_minus;
            dx[i] = if di_sum > 0.0 {
                100.0 * (di_plus - di_minus).abs() / di_sum
            } else {
                0.0
            };
        }
    }

    // ADX is a second Wilder pass over DX
    let adx_line = rma(&dx, length);
    out.copy_from_slice(&adx_line);
    out
}

/// Cumulative volume-weighted average price over the whole series
pub fn vwap(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; close.len()];
    let mut pv_sum = 0.0;
    let mut v_sum = 0.0;
    for i in 0..close.len() {
        let typical = (high[i] + low[i] + close[i]) / 3.0;
        pv_sum += typical * volume[i];
        v_sum += volume[i];
        if v_sum > 0.0 {
            out[i] = pv_sum / v_sum;
        }
    }
    out
}
