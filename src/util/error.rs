//! Error types for gammaindex.

use thiserror::Error;

/// Result alias for gammaindex operations.
pub type GammaResult<T> = std::result::Result<T, GammaError>;

/// Configuration errors rejected before the gamma search starts.
///
/// A reference point without a match is not an error; it is reported as
/// `NaN` in the returned gamma map.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GammaError {
    /// The grid dimensionality is not 1, 2 or 3.
    #[error("expected 1, 2 or 3 dimensions, got {ndim}")]
    InvalidDimensions { ndim: usize },
    /// Reference and evaluation grids have different dimensionality.
    #[error("dimension mismatch: reference has {reference}, evaluation has {evaluation}")]
    DimensionMismatch { reference: usize, evaluation: usize },
    /// An axis is empty, non-finite or not strictly ascending.
    #[error("invalid axis {axis}: {reason}")]
    InvalidAxis { axis: usize, reason: &'static str },
    /// The dose buffer length does not match the product of axis lengths.
    #[error("dose buffer has {got} values, axes describe {expected}")]
    ShapeMismatch { expected: usize, got: usize },
    /// A dose value is negative or non-finite.
    #[error("invalid dose value {value} at flat index {index}")]
    InvalidDose { index: usize, value: f64 },
    /// A threshold list was empty.
    #[error("no {kind} thresholds supplied")]
    EmptyThresholds { kind: &'static str },
    /// A threshold is non-positive or non-finite.
    #[error("invalid {kind} threshold: {value}")]
    InvalidThreshold { kind: &'static str, value: f64 },
    /// A configuration parameter is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// More random reference points were requested than pass the cutoff.
    #[error("random subset of {requested} requested, only {available} points eligible")]
    RandomSubsetTooLarge { requested: usize, available: usize },
    /// Shell parameters are out of range.
    #[error("invalid shell: {reason}")]
    InvalidShell { reason: &'static str },
}
