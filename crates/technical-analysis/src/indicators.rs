use analysis_core::{BollingerBands, Macd};

/// Simple Moving Average over the trailing `period` samples. Undefined
/// (not an error) when fewer than `period` samples exist.
pub fn sma(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period {
        return None;
    }
    let sum: f64 = data[data.len() - period..].iter().sum();
    Some(sum / period as f64)
}

/// Exponential Moving Average across the whole series, seeded with the
/// first sample rather than an SMA. Early values are biased toward the
/// first price; kept for parity with historical report output.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let prev = result[i - 1];
        result.push(data[i] * k + prev * (1.0 - k));
    }

    result
}

/// Relative Strength Index at the latest point. Gains and losses are
/// averaged over a fixed trailing window of the last `period` diffs, not
/// Wilder's recursive smoothing; kept for parity with historical report
/// output. Undefined with fewer than `period` diffs.
pub fn rsi(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let tail = gains.len() - period;
    let avg_gain: f64 = gains[tail..].iter().sum::<f64>() / period as f64;
    let avg_loss: f64 = losses[tail..].iter().sum::<f64>() / period as f64;

    // Zero average loss means pure gains; RSI pins at 100 instead of
    // dividing by zero.
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}

/// MACD at the latest point: line = EMA(fast) - EMA(slow) pointwise over
/// the whole series, signal = EMA(signal_period) of the line, histogram =
/// last line value minus last signal value.
pub fn macd(data: &[f64], fast: usize, slow: usize, signal_period: usize) -> Option<Macd> {
    if fast == 0 || slow == 0 || signal_period == 0 || data.len() < 2 {
        return None;
    }

    let ema_fast = ema(data, fast);
    let ema_slow = ema(data, slow);
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema(&line, signal_period);

    let last_line = *line.last()?;
    let last_signal = *signal_line.last()?;

    Some(Macd {
        line: last_line,
        signal: last_signal,
        histogram: last_line - last_signal,
    })
}

/// Bollinger Bands at the latest point: middle = SMA(period), band
/// half-width = `std_dev` times the population standard deviation of the
/// trailing window. Undefined when the window is short.
pub fn bollinger_bands(data: &[f64], period: usize, std_dev: f64) -> Option<BollingerBands> {
    let middle = sma(data, period)?;

    let window = &data[data.len() - period..];
    let variance: f64 =
        window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
    let half_width = std_dev * variance.sqrt();

    Some(BollingerBands {
        upper: middle + half_width,
        middle,
        lower: middle - half_width,
    })
}
