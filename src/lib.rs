//! # VCPD - Volatility Contraction Pattern Detector
//!
//! Detects and scores Volatility Contraction Patterns: a series of successively
//! shallower pullbacks from a roughly flat top, read as a pre-breakout signal.
//!
//! ## Quick Start
//!
//! ```rust
//! use vcpd::prelude::*;
//!
//! // Any bar type works through the OHLCV trait; PriceBar is provided.
//! let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let bars: Vec<PriceBar> = (0..60)
//!     .map(|i| {
//!         let c = 100.0 + (i as f64 * 0.7).sin() * 5.0;
//!         PriceBar::new(start + chrono::Days::new(i), c, c + 1.0, c - 1.0, c, 1_000.0)
//!     })
//!     .collect();
//!
//! let detector = VcpDetectorBuilder::new().lookback_days(90).build().unwrap();
//! let result = detector.analyze(&bars);
//!
//! if result.valid_vcp {
//!     println!("VCP score {} pivot {:?}", result.score, result.pivot_price);
//! }
//! ```
//!
//! Analysis never fails: insufficient data, missing swings and short chains
//! are reported in [`PatternResult::error`].

pub mod params;
pub mod vcp;

pub mod prelude {
    pub use crate::{
        // Parameters
        params::{get_float, get_period, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
        // Parallel
        rank_candidates,
        scan_parallel,
        // Types
        Contraction,
        // Core traits
        OHLCVExt,
        // Errors
        PatternError,
        PatternResult,
        Period,
        PriceBar,
        Ratio,
        Result,
        ScanResult,
        SwingKind,
        SwingMethod,
        SwingPoint,
        ValidationResult,
        VcpConfig,
        // Detector
        VcpDetector,
        VcpDetectorBuilder,
        OHLCV,
    };
}

use chrono::NaiveDate;
use vcp::{
    calculate_atr, detect_swing_points, search_best_chain, validate_pattern, SearchOutcome,
    MAX_CONTRACTIONS, MIN_BARS, MIN_CONTRACTIONS,
};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors from configuration and analysis.
///
/// Configuration errors are returned as `Err`. Analysis errors are never
/// returned that way; they are carried in [`PatternResult::error`].
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data: need {need} bars, got {got}")]
    InsufficientData { need: usize, got: usize },

    /// `index` is the position in the caller's input slice, not in the window.
    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },

    #[error("Insufficient swing points: found {highs} highs and {lows} lows")]
    InsufficientSwingPoints { highs: usize, lows: usize },

    #[error("Insufficient contractions: need {need}, got {got}")]
    InsufficientContractions { need: usize, got: usize },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(PatternError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Trading date of the bar, copied onto contraction highs and lows
    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// Blanket impl for references, so re-ordered views (`Vec<&T>`) can be analyzed
impl<T: OHLCV + ?Sized> OHLCV for &T {
    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }

    fn volume(&self) -> f64 {
        (**self).volume()
    }

    fn date(&self) -> Option<NaiveDate> {
        (**self).date()
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        if self.open().is_nan()
            || self.high().is_nan()
            || self.low().is_nan()
            || self.close().is_nan()
        {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if self.open().is_infinite()
            || self.high().is_infinite()
            || self.low().is_infinite()
            || self.close().is_infinite()
        {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.range() < 0.0 {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV + ?Sized> OHLCVExt for T {}

/// Daily price bar
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for PriceBar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

// ============================================================
// PATTERN TYPES
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SwingKind {
    High,
    Low,
}

/// Strategy that produced the swing points of a result
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum SwingMethod {
    /// ATR-adaptive zigzag
    #[default]
    Zigzag,
    /// Fixed-window local extrema fallback
    Window,
}

/// Confirmed swing high or low. `index` is a position in the analysis window.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
    pub kind: SwingKind,
}

/// One high-to-low pullback of a pattern
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Contraction {
    /// T1..T4 in chronological order
    pub label: String,
    pub high_idx: usize,
    pub high_price: f64,
    pub high_date: Option<NaiveDate>,
    pub low_idx: usize,
    pub low_price: f64,
    pub low_date: Option<NaiveDate>,
    /// (high - low) / high * 100
    pub depth_pct: f64,
    /// Bars from high to low
    pub duration_days: usize,
}

/// Outcome of the rule checks on one chain
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Invalidating problems and warnings, in check order
    pub issues: Vec<String>,
    /// depth(i) / depth(i-1) for i >= 2
    pub contraction_ratios: Vec<f64>,
    pub t1_depth: f64,
}

/// Full result of one analysis.
///
/// Every path fills the same shape; `error` is set when the analysis stopped
/// early. `valid_vcp == false` with `error == None` means the chain was built
/// but broke a rule (see `validation`).
///
/// Contraction indices count from the start of the analysis window. Add
/// `window_start` to map them back onto the input slice.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct PatternResult {
    /// Quality score 0..=100
    pub score: u32,
    pub valid_vcp: bool,
    pub contractions: Vec<Contraction>,
    pub num_contractions: usize,
    /// High of the final contraction, the breakout trigger level
    pub pivot_price: Option<f64>,
    /// Bars from the first contraction high to the last contraction low
    pub pattern_duration_days: usize,
    pub atr_value: f64,
    pub error: Option<PatternError>,
    pub validation: Option<ValidationResult>,
    pub swing_method: Option<SwingMethod>,
    pub swing_highs: usize,
    pub swing_lows: usize,
    pub bars_analyzed: usize,
    /// Input position of the first bar in the analysis window
    pub window_start: usize,
}

impl PatternResult {
    fn failed(error: PatternError, bars_analyzed: usize, window_start: usize) -> Self {
        Self {
            error: Some(error),
            bars_analyzed,
            window_start,
            ..Self::default()
        }
    }

    fn with_chain(mut self, contractions: Vec<Contraction>) -> Self {
        self.num_contractions = contractions.len();
        self.pivot_price = contractions.last().map(|c| c.high_price);
        self.pattern_duration_days = match (contractions.first(), contractions.last()) {
            (Some(first), Some(last)) => last.low_idx.saturating_sub(first.high_idx),
            _ => 0,
        };
        self.contractions = contractions;
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Issues from validation, empty when the chain was never validated
    pub fn issues(&self) -> &[String] {
        self.validation.as_ref().map_or(&[], |v| v.issues.as_slice())
    }
}

// ============================================================
// CONFIGURATION
// ============================================================

/// Detector configuration.
///
/// Deserializes with defaults for missing keys.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VcpConfig {
    /// Bars analyzed, counted back from the most recent
    pub lookback_days: usize,
    /// Zigzag threshold in ATRs
    pub atr_multiplier: f64,
    pub atr_period: Period,
    /// Minimum bars from a contraction high to its low
    pub min_contraction_days: usize,
    pub min_contractions: usize,
    /// Minimum T1 depth in percent
    pub t1_depth_min: f64,
    /// Ceiling for depth(i) / depth(i-1)
    pub contraction_ratio: Ratio,
    /// Half-width of the fallback swing window
    pub swing_window: Period,
    /// Reject NaN/infinite/inverted bars before analysis
    pub validate_data: bool,
}

impl Default for VcpConfig {
    fn default() -> Self {
        Self {
            lookback_days: 120,
            atr_multiplier: 1.5,
            atr_period: Period::new_const(14),
            min_contraction_days: 5,
            min_contractions: 2,
            t1_depth_min: 8.0,
            contraction_ratio: Ratio::new_const(0.75),
            swing_window: Period::new_const(5),
            validate_data: false,
        }
    }
}

impl VcpConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lookback_days < MIN_BARS {
            return Err(PatternError::InvalidConfig(format!(
                "lookback_days = {} is below the {MIN_BARS}-bar minimum",
                self.lookback_days
            )));
        }
        if !self.atr_multiplier.is_finite() || self.atr_multiplier <= 0.0 {
            return Err(PatternError::InvalidValue(
                "atr_multiplier must be positive and finite",
            ));
        }
        if self.atr_period.get() == 0 {
            return Err(PatternError::InvalidValue("atr_period must be > 0"));
        }
        if self.swing_window.get() == 0 {
            return Err(PatternError::InvalidValue("swing_window must be > 0"));
        }
        if !(MIN_CONTRACTIONS..=MAX_CONTRACTIONS).contains(&self.min_contractions) {
            return Err(PatternError::OutOfRange {
                field: "min_contractions",
                value: self.min_contractions as f64,
                min: MIN_CONTRACTIONS as f64,
                max: MAX_CONTRACTIONS as f64,
            });
        }
        if !(0.0..=100.0).contains(&self.t1_depth_min) {
            return Err(PatternError::OutOfRange {
                field: "t1_depth_min",
                value: self.t1_depth_min,
                min: 0.0,
                max: 100.0,
            });
        }
        // Ratio::new_const bypasses the range check
        Ratio::new(self.contraction_ratio.get())?;
        Ok(())
    }
}

// ============================================================
// DETECTOR
// ============================================================

/// VCP detector. Holds only immutable configuration, so one instance can be
/// shared across threads.
#[derive(Debug, Clone, Default)]
pub struct VcpDetector {
    config: VcpConfig,
}

impl VcpDetector {
    pub fn new(config: VcpConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &VcpConfig {
        &self.config
    }

    /// Analyze chronological (oldest-first) bars.
    ///
    /// Only the last `lookback_days` bars are used; contraction indices in the
    /// result are positions within that window, and `window_start` is the
    /// input position of its first bar.
    pub fn analyze<T: OHLCV>(&self, bars: &[T]) -> PatternResult {
        let cfg = &self.config;

        let start = bars.len().saturating_sub(cfg.lookback_days);
        let window = &bars[start..];
        if window.len() < MIN_BARS {
            log::debug!("vcp: {} bars, need {}", window.len(), MIN_BARS);
            return PatternResult::failed(
                PatternError::InsufficientData {
                    need: MIN_BARS,
                    got: window.len(),
                },
                window.len(),
                start,
            );
        }

        if cfg.validate_data {
            if let Err(e) = validate_bars(window, start) {
                log::debug!("vcp: rejected input: {e}");
                return PatternResult::failed(e, window.len(), start);
            }
        }

        let highs: Vec<f64> = window.iter().map(|b| b.high()).collect();
        let lows: Vec<f64> = window.iter().map(|b| b.low()).collect();
        let closes: Vec<f64> = window.iter().map(|b| b.close()).collect();

        let atr_value = calculate_atr(&highs, &lows, &closes, cfg.atr_period.get());

        let swings = detect_swing_points(
            &highs,
            &lows,
            &closes,
            cfg.atr_multiplier,
            cfg.atr_period.get(),
            cfg.swing_window.get(),
        );

        let base = PatternResult {
            atr_value,
            swing_method: Some(swings.method),
            swing_highs: swings.highs.len(),
            swing_lows: swings.lows.len(),
            bars_analyzed: window.len(),
            window_start: start,
            ..PatternResult::default()
        };

        if !swings.is_usable() {
            log::debug!(
                "vcp: no usable swings ({} highs, {} lows)",
                swings.highs.len(),
                swings.lows.len()
            );
            return PatternResult {
                error: Some(PatternError::InsufficientSwingPoints {
                    highs: swings.highs.len(),
                    lows: swings.lows.len(),
                }),
                ..base
            };
        }

        match search_best_chain(&swings, window.len(), cfg) {
            SearchOutcome::Partial(chain) => {
                log::debug!(
                    "vcp: best chain has {} contractions, need {}",
                    chain.len(),
                    cfg.min_contractions
                );
                let validation = validate_pattern(&chain, window.len(), cfg);
                PatternResult {
                    error: Some(PatternError::InsufficientContractions {
                        need: cfg.min_contractions,
                        got: chain.len(),
                    }),
                    validation: Some(validation),
                    ..base
                }
                .with_chain(attach_dates(chain, window))
            }
            SearchOutcome::Scored(best) => {
                log::debug!(
                    "vcp: {} contractions from peak {} valid={} score={}",
                    best.contractions.len(),
                    best.start.index,
                    best.validation.valid,
                    best.score
                );
                PatternResult {
                    score: best.score,
                    valid_vcp: best.validation.valid,
                    validation: Some(best.validation),
                    ..base
                }
                .with_chain(attach_dates(best.contractions, window))
            }
        }
    }

    /// Analyze bars supplied most-recent-first, as most data feeds return them.
    pub fn analyze_recent_first<T: OHLCV>(&self, bars: &[T]) -> PatternResult {
        let chronological: Vec<&T> = bars.iter().rev().collect();
        self.analyze(&chronological)
    }
}

fn validate_bars<T: OHLCV>(bars: &[T], offset: usize) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            PatternError::InvalidOHLCV { reason, .. } => PatternError::InvalidOHLCV {
                index: offset + i,
                reason,
            },
            other => other,
        })?;
    }
    Ok(())
}

fn attach_dates<T: OHLCV>(mut chain: Vec<Contraction>, window: &[T]) -> Vec<Contraction> {
    for c in &mut chain {
        c.high_date = window.get(c.high_idx).and_then(|b| b.date());
        c.low_date = window.get(c.low_idx).and_then(|b| b.date());
    }
    chain
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating VcpDetector instances
#[derive(Debug, Clone, Default)]
pub struct VcpDetectorBuilder {
    config: VcpConfig,
}

impl VcpDetectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: VcpConfig) -> Self {
        self.config = config;
        self
    }

    pub fn lookback_days(mut self, days: usize) -> Self {
        self.config.lookback_days = days;
        self
    }

    pub fn atr_multiplier(mut self, multiplier: f64) -> Self {
        self.config.atr_multiplier = multiplier;
        self
    }

    pub fn atr_period(mut self, period: usize) -> Self {
        self.config.atr_period = Period::new_const(period);
        self
    }

    pub fn min_contraction_days(mut self, days: usize) -> Self {
        self.config.min_contraction_days = days;
        self
    }

    pub fn min_contractions(mut self, count: usize) -> Self {
        self.config.min_contractions = count;
        self
    }

    pub fn t1_depth_min(mut self, pct: f64) -> Self {
        self.config.t1_depth_min = pct;
        self
    }

    pub fn contraction_ratio(mut self, ratio: f64) -> Self {
        self.config.contraction_ratio = Ratio::new_const(ratio);
        self
    }

    pub fn swing_window(mut self, window: usize) -> Self {
        self.config.swing_window = Period::new_const(window);
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Build the detector, validating the configuration
    pub fn build(self) -> Result<VcpDetector> {
        VcpDetector::new(self.config)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of analyzing a single instrument
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanResult {
    pub symbol: String,
    pub result: PatternResult,
}

/// Parallel analysis of multiple instruments.
///
/// A failing symbol never aborts the batch; its failure is in
/// `result.error`. Output order follows the input order.
pub fn scan_parallel<'a, T, I>(detector: &VcpDetector, instruments: I) -> Vec<ScanResult>
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    instruments
        .into_par_iter()
        .map(|(symbol, bars)| ScanResult {
            symbol: symbol.to_string(),
            result: detector.analyze(bars),
        })
        .collect()
}

/// Valid patterns only, best first: score, then contraction count, then symbol.
pub fn rank_candidates(results: &[ScanResult]) -> Vec<&ScanResult> {
    let mut ranked: Vec<&ScanResult> = results.iter().filter(|r| r.result.valid_vcp).collect();
    ranked.sort_by(|a, b| {
        b.result
            .score
            .cmp(&a.result.score)
            .then(b.result.num_contractions.cmp(&a.result.num_contractions))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    ranked
}

// ============================================================
// TESTS
// ============================================================
