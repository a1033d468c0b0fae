//! Contraction chain builder
//!
//! Starting from one swing high, walks forward through the swing lists and
//! pairs each high with the next qualifying low, producing up to
//! [`MAX_CONTRACTIONS`] high-to-low segments.

use super::helpers::{
    contraction_label, depth_pct, deviation_pct, MAX_CONTRACTIONS, RIGHT_SHOULDER_PCT,
};
use crate::{Contraction, SwingPoint};

/// Build a chronological contraction chain from `start`.
///
/// - Each low is the earliest swing low after the current high that is at
///   least `min_contraction_days` bars away. A chain stops when there is none,
///   or when that low is not below its high.
/// - Contractions after the first must keep their high within
///   [`RIGHT_SHOULDER_PCT`] of the first high; the chain stops at the first
///   violation.
/// - The next high is the earliest swing high after the previous low.
///
/// Dates are left empty; the caller attaches them from its bars.
pub fn build_contractions(
    start: &SwingPoint,
    swing_highs: &[SwingPoint],
    swing_lows: &[SwingPoint],
    min_contraction_days: usize,
) -> Vec<Contraction> {
    let mut chain: Vec<Contraction> = Vec::with_capacity(MAX_CONTRACTIONS);
    let mut high = *start;

    while chain.len() < MAX_CONTRACTIONS {
        let Some(low) = swing_lows
            .iter()
            .find(|l| l.index > high.index && l.index - high.index >= min_contraction_days)
        else {
            break;
        };

        if low.price >= high.price {
            break;
        }

        if let Some(first) = chain.first() {
            if deviation_pct(high.price, first.high_price) > RIGHT_SHOULDER_PCT {
                break;
            }
        }

        chain.push(Contraction {
            label: contraction_label(chain.len()),
            high_idx: high.index,
            high_price: high.price,
            high_date: None,
            low_idx: low.index,
            low_price: low.price,
            low_date: None,
            depth_pct: depth_pct(high.price, low.price),
            duration_days: low.index - high.index,
        });

        match swing_highs.iter().find(|h| h.index > low.index) {
            Some(next) => high = *next,
            None => break,
        }
    }

    chain
}
