//! Average True Range
//!
//! Plain moving average of the last `period` true ranges. This is used as a
//! volatility threshold for the zigzag, not as a trend indicator, so there is
//! no Wilder smoothing here.

/// True range of a bar against the previous close.
#[inline]
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// ATR over chronological `highs`, `lows`, `closes`.
///
/// Returns 0.0 when fewer than `period + 1` bars are available, when the
/// slices differ in length, or when `period` is zero.
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let n = highs.len();
    if period == 0 || n < period + 1 || lows.len() != n || closes.len() != n {
        return 0.0;
    }

    let sum: f64 = (n - period..n)
        .map(|i| true_range(highs[i], lows[i], closes[i - 1]))
        .sum();
    (sum / period as f64).max(0.0)
}
