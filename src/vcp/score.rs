//! Pattern scorer

use super::helpers::T1_DEPTH_PENALTY_PCT;
use crate::{Contraction, ValidationResult};

/// Score cap for chains that fail validation
pub const INVALID_SCORE_CAP: u32 = 40;
/// Per-contraction credit for chains that fail validation
pub const INVALID_SCORE_PER_CONTRACTION: u32 = 15;
/// Final contraction tighter than this % earns a bonus
pub const TIGHT_PIVOT_PCT: f64 = 5.0;
/// Mean contraction ratio below this earns a bonus
pub const STRONG_TIGHTENING_RATIO: f64 = 0.4;

/// Map a chain and its validation to a 0..=100 quality score.
///
/// Invalid chains get structural credit only, capped at 40. Valid chains start
/// at 60/80/90 for 2/3/4+ contractions and are adjusted by +10 for a final
/// depth under 5%, +10 for a mean ratio under 0.4 and -10 for a T1 deeper
/// than 30%.
pub fn score_pattern(contractions: &[Contraction], validation: &ValidationResult) -> u32 {
    let n = contractions.len();

    if !validation.valid {
        let partial = (n as u32).saturating_mul(INVALID_SCORE_PER_CONTRACTION);
        return partial.min(INVALID_SCORE_CAP);
    }

    let mut score: i32 = match n {
        0 | 1 => 0,
        2 => 60,
        3 => 80,
        _ => 90,
    };

    if contractions.last().is_some_and(|c| c.depth_pct < TIGHT_PIVOT_PCT) {
        score += 10;
    }

    let ratios = &validation.contraction_ratios;
    if !ratios.is_empty() {
        let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
        if mean < STRONG_TIGHTENING_RATIO {
            score += 10;
        }
    }

    if validation.t1_depth > T1_DEPTH_PENALTY_PCT {
        score -= 10;
    }

    score.clamp(0, 100) as u32
}
