//! Pattern validator
//!
//! Checks a contraction chain against the VCP rules. Some rules invalidate
//! the pattern, others only append a warning to `issues`.

use super::helpers::{
    deviation_pct, MAX_PATTERN_BARS, MIN_PATTERN_BARS, RIGHT_SHOULDER_PCT, T1_DEPTH_WARN_PCT,
};
use crate::{Contraction, ValidationResult, VcpConfig};

/// Validate `contractions` found in a window of `total_bars` bars.
///
/// Rules, in order:
/// - fewer than `min_contractions` contractions: invalid, nothing else checked
/// - T1 shallower than `t1_depth_min`: invalid; deeper than 35%: warning
/// - depth ratio of each contraction to the previous above `contraction_ratio`:
///   invalid (all ratios are recorded)
/// - high drifting more than 5% from the T1 high: issue only
/// - span under 15 bars: invalid; over 325 bars: warning
/// - any index outside the window: invalid
pub fn validate_pattern(
    contractions: &[Contraction],
    total_bars: usize,
    config: &VcpConfig,
) -> ValidationResult {
    let mut issues = Vec::new();
    let n = contractions.len();

    let Some(first) = contractions.first().filter(|_| n >= config.min_contractions) else {
        issues.push(format!(
            "Only {} contractions found (minimum {})",
            n, config.min_contractions
        ));
        return ValidationResult {
            valid: false,
            issues,
            contraction_ratios: Vec::new(),
            t1_depth: contractions.first().map_or(0.0, |c| c.depth_pct),
        };
    };

    let mut valid = true;
    let t1_depth = first.depth_pct;

    if t1_depth < config.t1_depth_min {
        valid = false;
        issues.push(format!(
            "T1 depth {:.1}% too shallow (minimum {:.1}%)",
            t1_depth, config.t1_depth_min
        ));
    } else if t1_depth > T1_DEPTH_WARN_PCT {
        issues.push(format!(
            "T1 depth {:.1}% is deeper than {:.0}% (warning)",
            t1_depth, T1_DEPTH_WARN_PCT
        ));
    }

    let ceiling = config.contraction_ratio.get();
    let mut contraction_ratios = Vec::with_capacity(n.saturating_sub(1));
    for (i, pair) in contractions.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let ratio = if prev.depth_pct > 0.0 {
            cur.depth_pct / prev.depth_pct
        } else {
            0.0
        };
        contraction_ratios.push(ratio);

        if ratio > ceiling {
            valid = false;
            issues.push(format!(
                "T{} fails to tighten: ratio {:.2} exceeds {:.2}",
                i + 2,
                ratio,
                ceiling
            ));
        }
    }

    for (i, c) in contractions.iter().enumerate().skip(1) {
        let drift = deviation_pct(c.high_price, first.high_price);
        if drift > RIGHT_SHOULDER_PCT {
            issues.push(format!(
                "T{} high {:.2} is {:.1}% away from T1 high {:.2}",
                i + 1,
                c.high_price,
                drift,
                first.high_price
            ));
        }
    }

    let span = contractions[n - 1].low_idx.saturating_sub(first.high_idx);
    if span < MIN_PATTERN_BARS {
        valid = false;
        issues.push(format!(
            "Pattern too short: {span} bars (minimum {MIN_PATTERN_BARS})"
        ));
    } else if span > MAX_PATTERN_BARS {
        issues.push(format!(
            "Pattern spans {span} bars, longer than {MAX_PATTERN_BARS} (warning)"
        ));
    }

    if contractions.iter().any(|c| c.low_idx >= total_bars || c.high_idx >= total_bars) {
        valid = false;
        issues.push(format!("Contraction index outside the {total_bars}-bar window"));
    }

    ValidationResult {
        valid,
        issues,
        contraction_ratios,
        t1_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contraction(i: usize, high_idx: usize, high: f64, low_idx: usize, low: f64) -> Contraction {
        Contraction {
            label: format!("T{}", i + 1),
            high_idx,
            high_price: high,
            high_date: None,
            low_idx,
            low_price: low,
            low_date: None,
            depth_pct: (high - low) / high * 100.0,
            duration_days: low_idx - high_idx,
        }
    }

    fn classic() -> Vec<Contraction> {
        vec![
            contraction(0, 10, 100.0, 20, 80.0),
            contraction(1, 30, 100.0, 38, 88.0),
            contraction(2, 46, 100.0, 51, 94.0),
        ]
    }

    #[test]
    fn test_classic_chain_is_valid() {
        let v = validate_pattern(&classic(), 60, &VcpConfig::default());
        assert!(v.valid, "issues: {:?}", v.issues);
        assert!(v.issues.is_empty());
        assert_eq!(v.contraction_ratios.len(), 2);
        assert!((v.contraction_ratios[0] - 0.6).abs() < 1e-9);
        assert!((v.contraction_ratios[1] - 0.5).abs() < 1e-9);
        assert!((v.t1_depth - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_contractions_short_circuits() {
        let chain = vec![contraction(0, 10, 100.0, 20, 99.0)];
        let v = validate_pattern(&chain, 60, &VcpConfig::default());
        assert!(!v.valid);
        assert_eq!(v.issues.len(), 1);
        assert!(v.contraction_ratios.is_empty());
        assert!((v.t1_depth - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_chain() {
        let v = validate_pattern(&[], 60, &VcpConfig::default());
        assert!(!v.valid);
        assert_eq!(v.t1_depth, 0.0);
    }

    #[test]
    fn test_shallow_t1_is_invalid() {
        let chain = vec![
            contraction(0, 10, 100.0, 20, 95.0),
            contraction(1, 30, 100.0, 40, 97.0),
        ];
        let v = validate_pattern(&chain, 60, &VcpConfig::default());
        assert!(!v.valid);
        assert!(v.issues[0].contains("too shallow"));
    }

    #[test]
    fn test_deep_t1_is_only_a_warning() {
        let chain = vec![
            contraction(0, 10, 100.0, 20, 60.0),
            contraction(1, 30, 100.0, 40, 90.0),
        ];
        let v = validate_pattern(&chain, 60, &VcpConfig::default());
        assert!(v.valid);
        assert_eq!(v.issues.len(), 1);
        assert!(v.issues[0].contains("warning"));
    }

    #[test]
    fn test_loosening_is_invalid_but_ratios_recorded() {
        let chain = vec![
            contraction(0, 10, 100.0, 20, 80.0),
            contraction(1, 30, 100.0, 40, 82.0),
            contraction(2, 50, 100.0, 60, 95.0),
        ];
        let v = validate_pattern(&chain, 70, &VcpConfig::default());
        assert!(!v.valid);
        assert_eq!(v.contraction_ratios.len(), 2);
        assert!((v.contraction_ratios[0] - 0.9).abs() < 1e-9);
        assert!(v.issues.iter().any(|i| i.contains("T2 fails to tighten")));
    }

    #[test]
    fn test_high_drift_is_recorded_not_invalidating() {
        let chain = vec![
            contraction(0, 10, 100.0, 20, 80.0),
            contraction(1, 30, 107.0, 40, 96.0),
        ];
        let v = validate_pattern(&chain, 60, &VcpConfig::default());
        assert!(v.valid);
        assert!(v.issues.iter().any(|i| i.contains("away from T1 high")));
    }

    #[test]
    fn test_short_span_is_invalid() {
        let chain = vec![
            contraction(0, 10, 100.0, 15, 80.0),
            contraction(1, 17, 100.0, 22, 90.0),
        ];
        let v = validate_pattern(&chain, 60, &VcpConfig::default());
        assert!(!v.valid);
        assert!(v.issues.iter().any(|i| i.contains("too short")));
    }

    #[test]
    fn test_long_span_is_a_warning() {
        let chain = vec![
            contraction(0, 0, 100.0, 200, 80.0),
            contraction(1, 250, 100.0, 330, 90.0),
        ];
        let v = validate_pattern(&chain, 400, &VcpConfig::default());
        assert!(v.valid);
        assert!(v.issues.iter().any(|i| i.contains("longer than")));
    }

    #[test]
    fn test_index_outside_window() {
        let v = validate_pattern(&classic(), 50, &VcpConfig::default());
        assert!(!v.valid);
    }
}
