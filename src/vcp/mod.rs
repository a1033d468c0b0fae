//! VCP detection pipeline
//!
//! Stages, leaves first:
//!
//! - **atr**: plain-average true range, used as the zigzag threshold
//! - **swing**: ATR zigzag with a fixed-window fallback
//! - **contraction**: high-to-low chain builder from one starting peak
//! - **search**: multi-start search over the top peaks
//! - **validate**: rule checks (depth, tightening, span)
//! - **score**: 0..=100 quality score

pub mod helpers;

pub mod atr;
pub mod contraction;
pub mod score;
pub mod search;
pub mod swing;
pub mod validate;

pub use atr::*;
pub use contraction::*;
pub use helpers::*;
pub use score::*;
pub use search::*;
pub use swing::*;
pub use validate::*;
