//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) inputs are undefined.

/// EMA of an arbitrary input stream, `None` until `period` inputs have been
/// seen. Feeds both MACD moving averages and the MACD signal line.
pub(crate) fn ema_over(inputs: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(inputs.len());
    if period == 0 {
        out.resize(inputs.len(), None);
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &x) in inputs.iter().enumerate() {
        if i < period - 1 {
            sum += x;
            out.push(None);
        } else if i == period - 1 {
            sum += x;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = x * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }

    out
}
