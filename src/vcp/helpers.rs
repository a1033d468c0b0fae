//! Shared thresholds and small numeric helpers for the VCP pipeline.

// ============================================================
// PATTERN THRESHOLDS
// ============================================================

/// Minimum number of bars in the analysis window
pub const MIN_BARS: usize = 30;
/// Fewest contractions the scorer has a base score for
pub const MIN_CONTRACTIONS: usize = 2;
/// Maximum number of contractions in one chain (T1..T4)
pub const MAX_CONTRACTIONS: usize = 4;
/// Number of highest swing highs tried as pattern origins
pub const NUM_START_PEAKS: usize = 3;
/// Later contraction highs must stay within this % of the T1 high
pub const RIGHT_SHOULDER_PCT: f64 = 5.0;
/// T1 deeper than this % is reported as a warning
pub const T1_DEPTH_WARN_PCT: f64 = 35.0;
/// T1 deeper than this % costs score points
pub const T1_DEPTH_PENALTY_PCT: f64 = 30.0;
/// Pattern span below this many bars is invalid
pub const MIN_PATTERN_BARS: usize = 15;
/// Pattern span above this many bars is reported as a warning
pub const MAX_PATTERN_BARS: usize = 325;

// ============================================================
// HELPERS
// ============================================================

/// Pullback depth from `high` to `low` as a percentage of `high`.
/// Returns 0.0 for a non-positive high.
#[inline]
pub fn depth_pct(high: f64, low: f64) -> f64 {
    if high <= 0.0 {
        return 0.0;
    }
    (high - low) / high * 100.0
}

/// Absolute deviation of `price` from `reference` in percent.
#[inline]
pub fn deviation_pct(price: f64, reference: f64) -> f64 {
    if reference <= 0.0 {
        return 0.0;
    }
    (price - reference).abs() / reference * 100.0
}

/// Ordinal label for the contraction at zero-based position `i`.
#[inline]
pub fn contraction_label(i: usize) -> String {
    format!("T{}", i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_pct() {
        assert!((depth_pct(100.0, 80.0) - 20.0).abs() < 1e-9);
        assert!((depth_pct(50.0, 45.0) - 10.0).abs() < 1e-9);
        assert_eq!(depth_pct(0.0, 10.0), 0.0);
    }

    #[test]
    fn test_deviation_pct_is_symmetric() {
        assert!((deviation_pct(105.0, 100.0) - 5.0).abs() < 1e-9);
        assert!((deviation_pct(95.0, 100.0) - 5.0).abs() < 1e-9);
        assert_eq!(deviation_pct(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_contraction_label() {
        assert_eq!(contraction_label(0), "T1");
        assert_eq!(contraction_label(3), "T4");
    }
}
