//! Swing point detection
//!
//! Two interchangeable strategies reduce a price series to ordered swing highs
//! and swing lows:
//!
//! - [`zigzag_swings`]: ATR-adaptive zigzag. A running extreme is confirmed as a
//!   swing once price moves `ATR * multiplier` against it.
//! - [`window_swings`]: fixed-window local extrema, used only when the zigzag
//!   cannot produce both a high and a low.
//!
//! [`detect_swing_points`] applies the selection rule between the two.

use super::atr::calculate_atr;
use crate::{SwingKind, SwingMethod, SwingPoint};

/// Swing highs and lows found in one window, ascending by index.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct SwingPoints {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
    pub method: SwingMethod,
}

impl SwingPoints {
    /// True when there is at least one high and one low to build from.
    #[inline]
    pub fn is_usable(&self) -> bool {
        !self.highs.is_empty() && !self.lows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZigzagState {
    SeekingHigh,
    SeekingLow,
}

/// ATR-adaptive zigzag swing detection.
///
/// The running extreme is seeded with the highest high of the first
/// `atr_period` bars and the scan starts in the seeking-high state. Returns
/// empty lists when fewer than `atr_period + 1` bars exist or the ATR is not
/// positive.
pub fn zigzag_swings(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    atr_multiplier: f64,
    atr_period: usize,
) -> (Vec<SwingPoint>, Vec<SwingPoint>) {
    let n = highs.len();
    let mut swing_highs = Vec::new();
    let mut swing_lows = Vec::new();

    if atr_period == 0 || n < atr_period + 1 || lows.len() != n {
        return (swing_highs, swing_lows);
    }

    let atr = calculate_atr(highs, lows, closes, atr_period);
    if atr <= 0.0 {
        return (swing_highs, swing_lows);
    }
    let threshold = atr * atr_multiplier;

    // Seed: first occurrence of the highest high in the opening window
    let (mut ext_idx, mut ext_val) = (0usize, highs[0]);
    for (i, &h) in highs.iter().enumerate().take(atr_period).skip(1) {
        if h > ext_val {
            ext_idx = i;
            ext_val = h;
        }
    }
    let mut state = ZigzagState::SeekingHigh;

    for i in atr_period..n {
        match state {
            ZigzagState::SeekingHigh => {
                if highs[i] > ext_val {
                    ext_idx = i;
                    ext_val = highs[i];
                } else if ext_val - lows[i] >= threshold {
                    swing_highs.push(SwingPoint::high(ext_idx, ext_val));
                    state = ZigzagState::SeekingLow;
                    ext_idx = i;
                    ext_val = lows[i];
                }
            }
            ZigzagState::SeekingLow => {
                if lows[i] < ext_val {
                    ext_idx = i;
                    ext_val = lows[i];
                } else if highs[i] - ext_val >= threshold {
                    swing_lows.push(SwingPoint::low(ext_idx, ext_val));
                    state = ZigzagState::SeekingHigh;
                    ext_idx = i;
                    ext_val = highs[i];
                }
            }
        }
    }

    log::trace!(
        "zigzag: atr={atr:.4} threshold={threshold:.4} highs={} lows={}",
        swing_highs.len(),
        swing_lows.len()
    );

    (swing_highs, swing_lows)
}

/// Fixed-window local extrema.
///
/// Bar `i` is a swing high when its high is strictly greater than every other
/// high in `[i - window, i + window]`; swing lows are symmetric on lows. Bars
/// without a full window on both sides are never swings.
pub fn window_swings(
    highs: &[f64],
    lows: &[f64],
    window: usize,
) -> (Vec<SwingPoint>, Vec<SwingPoint>) {
    let n = highs.len().min(lows.len());
    let mut swing_highs = Vec::new();
    let mut swing_lows = Vec::new();

    if window == 0 || n < 2 * window + 1 {
        return (swing_highs, swing_lows);
    }

    for i in window..n - window {
        let span = i - window..=i + window;

        if span.clone().all(|j| j == i || highs[i] > highs[j]) {
            swing_highs.push(SwingPoint::high(i, highs[i]));
        }
        if span.clone().all(|j| j == i || lows[i] < lows[j]) {
            swing_lows.push(SwingPoint::low(i, lows[i]));
        }
    }

    (swing_highs, swing_lows)
}

/// Detect swing points, preferring the zigzag and falling back to fixed windows.
///
/// The returned set may still be unusable (see [`SwingPoints::is_usable`]) when
/// neither strategy finds both a high and a low.
pub fn detect_swing_points(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    atr_multiplier: f64,
    atr_period: usize,
    window: usize,
) -> SwingPoints {
    let (zz_highs, zz_lows) = zigzag_swings(highs, lows, closes, atr_multiplier, atr_period);
    if !zz_highs.is_empty() && !zz_lows.is_empty() {
        return SwingPoints {
            highs: zz_highs,
            lows: zz_lows,
            method: SwingMethod::Zigzag,
        };
    }

    log::debug!(
        "zigzag found {} highs / {} lows, falling back to {}-bar window",
        zz_highs.len(),
        zz_lows.len(),
        window
    );

    let (highs, lows) = window_swings(highs, lows, window);
    SwingPoints {
        highs,
        lows,
        method: SwingMethod::Window,
    }
}

impl SwingPoint {
    #[inline]
    pub(crate) fn high(index: usize, price: f64) -> Self {
        Self {
            index,
            price,
            kind: SwingKind::High,
        }
    }

    #[inline]
    pub(crate) fn low(index: usize, price: f64) -> Self {
        Self {
            index,
            price,
            kind: SwingKind::Low,
        }
    }
}
