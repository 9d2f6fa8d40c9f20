//! User-facing configuration for gamma evaluation.

use crate::util::{GammaError, GammaResult};

/// Default RAM budget for batched evaluation (1.5 GiB).
pub const DEFAULT_RAM_BYTES: u64 = 3 << 29;

/// Default seed for random reference sub-sampling.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Dose-difference normalisation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalisationMode {
    /// Normalise by a single global dose value.
    #[default]
    Global,
    /// Normalise by the reference dose at each point.
    Local,
}

/// Configuration for a gamma evaluation.
#[derive(Clone, Debug)]
pub struct GammaConfig {
    /// Percent of the global normalisation below which reference points are skipped.
    pub lower_percent_dose_cutoff: f64,
    /// Divisor applied to the smallest distance threshold to get the shell step.
    pub interp_fraction: f64,
    /// Largest gamma searched for; results are clamped to this value.
    pub max_gamma: f64,
    /// Global or local dose normalisation.
    pub mode: NormalisationMode,
    /// Dose that percent thresholds refer to; defaults to the reference maximum.
    pub global_normalisation: Option<f64>,
    /// Stop refining a threshold pair once its gamma is at most 1.
    pub skip_once_passed: bool,
    /// Also apply the lower cutoff to the evaluation dose at each reference point.
    pub mask_evaluation: bool,
    /// Evaluate only this many randomly chosen eligible reference points.
    pub random_subset: Option<usize>,
    /// Advisory memory budget in bytes for one batch of shell samples.
    pub ram_available: u64,
    /// Seed for `random_subset` selection.
    pub random_seed: u64,
    /// Use parallel batch evaluation when the `rayon` feature is enabled.
    pub parallel: bool,
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            lower_percent_dose_cutoff: 20.0,
            interp_fraction: 10.0,
            max_gamma: f64::INFINITY,
            mode: NormalisationMode::Global,
            global_normalisation: None,
            skip_once_passed: false,
            mask_evaluation: false,
            random_subset: None,
            ram_available: DEFAULT_RAM_BYTES,
            random_seed: DEFAULT_RANDOM_SEED,
            parallel: false,
        }
    }
}

impl GammaConfig {
    /// Validates parameter ranges.
    pub fn validate(&self) -> GammaResult<()> {
        let cutoff = self.lower_percent_dose_cutoff;
        if !cutoff.is_finite() || !(0.0..100.0).contains(&cutoff) {
            return Err(GammaError::InvalidConfig {
                reason: "lower_percent_dose_cutoff must be in [0, 100)",
            });
        }
        if !self.interp_fraction.is_finite() || self.interp_fraction < 1.0 {
            return Err(GammaError::InvalidConfig {
                reason: "interp_fraction must be finite and >= 1",
            });
        }
        if self.max_gamma.is_nan() || self.max_gamma < 0.0 {
            return Err(GammaError::InvalidConfig {
                reason: "max_gamma must be >= 0",
            });
        }
        if let Some(norm) = self.global_normalisation {
            if !norm.is_finite() || norm <= 0.0 {
                return Err(GammaError::InvalidConfig {
                    reason: "global_normalisation must be finite and > 0",
                });
            }
        }
        if self.mode == NormalisationMode::Local && cutoff <= 0.0 {
            return Err(GammaError::InvalidConfig {
                reason: "local normalisation requires lower_percent_dose_cutoff > 0",
            });
        }
        if self.ram_available == 0 {
            return Err(GammaError::InvalidConfig {
                reason: "ram_available must be > 0",
            });
        }
        Ok(())
    }
}

/// Non-empty list of positive thresholds.
///
/// A bare `f64` converts into a single-element list.
#[derive(Clone, Debug, PartialEq)]
pub struct Thresholds(Vec<f64>);

impl Thresholds {
    /// Returns the threshold values in the order supplied.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Returns the number of thresholds.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no thresholds are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn validate(&self, kind: &'static str) -> GammaResult<()> {
        if self.0.is_empty() {
            return Err(GammaError::EmptyThresholds { kind });
        }
        if let Some(&value) = self.0.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(GammaError::InvalidThreshold { kind, value });
        }
        Ok(())
    }

    pub(crate) fn min(&self) -> f64 {
        self.0.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub(crate) fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

impl From<f64> for Thresholds {
    fn from(value: f64) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<f64>> for Thresholds {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for Thresholds {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Thresholds {
    fn from(values: [f64; N]) -> Self {
        Self(values.to_vec())
    }
}
