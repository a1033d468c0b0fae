//! Parameter metadata for the VCP detector
//!
//! This module provides metadata about detector parameters, enabling:
//! - Grid search optimization
//! - Parameter documentation
//! - Building a detector from a flat name/value map
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use vcpd::prelude::*;
//!
//! for param in VcpDetector::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let mut params = HashMap::new();
//! params.insert("atr_multiplier", 2.0);
//! let detector = VcpDetector::with_params(&params).unwrap();
//! assert_eq!(detector.config().atr_multiplier, 2.0);
//! ```

use std::collections::HashMap;

use crate::{PatternError, Period, Ratio, Result, VcpConfig, VcpDetector};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value (0.0..=1.0)
  Ratio,
  /// Period or count (positive integer)
  Period,
  /// Unbounded float (multipliers, percentages)
  Float,
}

/// Metadata for a single detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name, matching the `VcpConfig` field
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn float(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Float, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(PatternError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
      ParamType::Float => Ok(()),
    }
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Trait for detectors that support parameterization
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values. Unknown names and values
  /// outside the declared range are rejected.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  /// Returns the pattern ID string
  fn pattern_id_str() -> &'static str;
}

static VCP_PARAMS: [ParamMeta; 8] = [
  ParamMeta::period("lookback_days", 120.0, (60.0, 250.0, 10.0), "Bars analyzed, most recent last"),
  ParamMeta::float("atr_multiplier", 1.5, (0.5, 3.0, 0.25), "Zigzag reversal threshold in ATRs"),
  ParamMeta::period("atr_period", 14.0, (7.0, 28.0, 7.0), "True range averaging period"),
  ParamMeta::period(
    "min_contraction_days",
    5.0,
    (2.0, 10.0, 1.0),
    "Minimum bars from a contraction high to its low",
  ),
  ParamMeta::period("min_contractions", 2.0, (2.0, 4.0, 1.0), "Contractions required for a pattern"),
  ParamMeta::float("t1_depth_min", 8.0, (4.0, 15.0, 1.0), "Minimum first pullback depth in percent"),
  ParamMeta::ratio(
    "contraction_ratio",
    0.75,
    (0.5, 0.9, 0.05),
    "Maximum depth ratio between consecutive contractions",
  ),
  ParamMeta::period("swing_window", 5.0, (3.0, 10.0, 1.0), "Half-width of the fallback swing window"),
];

impl ParameterizedDetector for VcpDetector {
  fn param_meta() -> &'static [ParamMeta] {
    &VCP_PARAMS
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    for (&name, &value) in params {
      let meta = VCP_PARAMS
        .iter()
        .find(|m| m.name == name)
        .ok_or_else(|| PatternError::InvalidConfig(format!("unknown parameter '{name}'")))?;
      meta.validate(value)?;
    }

    let defaults = VcpConfig::default();
    let config = VcpConfig {
      lookback_days: get_period(params, "lookback_days", defaults.lookback_days)?.get(),
      atr_multiplier: get_float(params, "atr_multiplier", defaults.atr_multiplier)?,
      atr_period: get_period(params, "atr_period", defaults.atr_period.get())?,
      min_contraction_days: get_period(params, "min_contraction_days", defaults.min_contraction_days)?
        .get(),
      min_contractions: get_period(params, "min_contractions", defaults.min_contractions)?.get(),
      t1_depth_min: get_float(params, "t1_depth_min", defaults.t1_depth_min)?,
      contraction_ratio: get_ratio(params, "contraction_ratio", defaults.contraction_ratio.get())?,
      swing_window: get_period(params, "swing_window", defaults.swing_window.get())?,
      validate_data: defaults.validate_data,
    };
    VcpDetector::new(config)
  }

  fn pattern_id_str() -> &'static str {
    "VCP"
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  if value.fract() != 0.0 {
    return Err(PatternError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

/// Helper to get a finite float from params with default fallback
pub fn get_float(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<f64> {
  let value = params.get(key).copied().unwrap_or(default);
  if !value.is_finite() {
    return Err(PatternError::InvalidValue("Parameter must be finite"));
  }
  Ok(value)
}

// ============================================================
// TESTS
// ============================================================
