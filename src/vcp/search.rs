//! Multi-start contraction search
//!
//! The highest peak in the window is not always the right pattern origin, so
//! the builder runs from each of the top [`NUM_START_PEAKS`] swing highs and the
//! best-scoring chain wins. Candidates are independent and run on the rayon
//! pool; they are collected in candidate order so the reduction is
//! deterministic.

use rayon::prelude::*;

use super::{
    contraction::build_contractions, helpers::NUM_START_PEAKS, score::score_pattern,
    swing::SwingPoints, validate::validate_pattern,
};
use crate::{Contraction, SwingPoint, ValidationResult, VcpConfig};

/// A chain that reached `min_contractions`, with its validation and score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChain {
    pub start: SwingPoint,
    pub contractions: Vec<Contraction>,
    pub validation: ValidationResult,
    pub score: u32,
}

/// Result of the multi-start search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// At least one candidate reached `min_contractions`
    Scored(ScoredChain),
    /// No candidate did; carries the longest partial chain
    Partial(Vec<Contraction>),
}

impl SearchOutcome {
    pub fn contractions(&self) -> &[Contraction] {
        match self {
            SearchOutcome::Scored(best) => &best.contractions,
            SearchOutcome::Partial(chain) => chain,
        }
    }
}

/// Top `k` swing highs by price, descending. Equal prices keep index order.
pub fn top_peaks(swing_highs: &[SwingPoint], k: usize) -> Vec<SwingPoint> {
    let mut peaks = swing_highs.to_vec();
    peaks.sort_by(|a, b| b.price.total_cmp(&a.price));
    peaks.truncate(k);
    peaks
}

/// Run the contraction builder from each top peak and keep the best chain.
///
/// Best means highest score, then more contractions, then the earlier
/// candidate (higher peak).
pub fn search_best_chain(
    swings: &SwingPoints,
    total_bars: usize,
    config: &VcpConfig,
) -> SearchOutcome {
    let starts = top_peaks(&swings.highs, NUM_START_PEAKS);

    let chains: Vec<(SwingPoint, Vec<Contraction>)> = starts
        .into_par_iter()
        .map(|start| {
            let chain = build_contractions(
                &start,
                &swings.highs,
                &swings.lows,
                config.min_contraction_days,
            );
            (start, chain)
        })
        .collect();

    let mut best: Option<ScoredChain> = None;
    for (start, contractions) in &chains {
        log::trace!(
            "candidate peak idx={} price={:.2}: {} contractions",
            start.index,
            start.price,
            contractions.len()
        );

        if contractions.len() < config.min_contractions {
            continue;
        }

        let validation = validate_pattern(contractions, total_bars, config);
        let score = score_pattern(contractions, &validation);

        let better = match &best {
            None => true,
            Some(b) => {
                score > b.score
                    || (score == b.score && contractions.len() > b.contractions.len())
            }
        };
        if better {
            best = Some(ScoredChain {
                start: *start,
                contractions: contractions.clone(),
                validation,
                score,
            });
        }
    }

    if let Some(best) = best {
        return SearchOutcome::Scored(best);
    }

    // Longest partial chain, first candidate wins ties
    let mut longest: &[Contraction] = &[];
    for (_, chain) in &chains {
        if chain.len() > longest.len() {
            longest = chain;
        }
    }
    SearchOutcome::Partial(longest.to_vec())
}
