//! regression::errors — the fit outcome type shared by every estimator.
//!
//! Purpose
//! -------
//! Model the ways a least-squares fit can fail as ordinary values so that
//! batch screening can survive thousands of degenerate gene pairs without
//! unwinding. `FitResult<T>` is the tagged union
//! `Ok(payload) | InsufficientData | SingularMatrix | …` that every fitting
//! entry point (OLS, cosinor, AR(p), PAR(2)) returns.
//!
//! Conventions
//! -----------
//! - Non-finite inputs are filtered before fitting; if too few points
//!   survive, the error is `InsufficientData` (not a separate variant).
//! - [`FitError::kind`] collapses variants into [`FailureKind`] for the
//!   orchestrator's failure counters.
use crate::linalg::LinalgError;
use serde::{Deserialize, Serialize};
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for fitting routines.
pub type FitResult<T> = Result<T, FitError>;

/// FitError — reasons a regression-based fit could not be produced.
///
/// Variants
/// --------
/// - `InsufficientData { n, required }`
///   Fewer usable observations (or design rows) than the estimator needs.
/// - `SingularMatrix { step, pivot }`
///   XᵗX was numerically singular during inversion.
/// - `LengthMismatch { expected, actual }`
///   Parallel input arrays (time, value, clock) differ in length.
/// - `InvalidPeriod { period }`
///   Cosinor period was non-finite or non-positive.
/// - `InvalidDesign { reason }`
///   The design matrix was malformed (e.g. zero columns).
/// - `NonFiniteEstimate { index }`
///   Elimination succeeded but produced a non-finite coefficient.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    InsufficientData { n: usize, required: usize },
    SingularMatrix { step: usize, pivot: f64 },
    LengthMismatch { expected: usize, actual: usize },
    InvalidPeriod { period: f64 },
    InvalidDesign { reason: &'static str },
    NonFiniteEstimate { index: usize },
}

/// Coarse failure categories reported by the batch orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    InsufficientData,
    SingularMatrix,
    InvalidInput,
}

impl FitError {
    /// Collapse the error into its reporting category.
    pub fn kind(&self) -> FailureKind {
        match self {
            FitError::InsufficientData { .. } => FailureKind::InsufficientData,
            FitError::SingularMatrix { .. } | FitError::NonFiniteEstimate { .. } => {
                FailureKind::SingularMatrix
            }
            FitError::LengthMismatch { .. }
            | FitError::InvalidPeriod { .. }
            | FitError::InvalidDesign { .. } => FailureKind::InvalidInput,
        }
    }
}

impl std::error::Error for FitError {}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::InsufficientData { n, required } => {
                write!(f, "Insufficient data: {n} usable observations, need at least {required}")
            }
            FitError::SingularMatrix { step, pivot } => {
                write!(f, "Singular design matrix (pivot {pivot:e} at step {step})")
            }
            FitError::LengthMismatch { expected, actual } => {
                write!(f, "Input length mismatch: expected {expected}, got {actual}")
            }
            FitError::InvalidPeriod { period } => {
                write!(f, "Period must be finite and > 0; got {period}")
            }
            FitError::InvalidDesign { reason } => write!(f, "Invalid design matrix: {reason}"),
            FitError::NonFiniteEstimate { index } => {
                write!(f, "Coefficient {index} is non-finite after elimination")
            }
        }
    }
}

impl From<LinalgError> for FitError {
    fn from(err: LinalgError) -> Self {
        match err {
            LinalgError::SingularMatrix { step, pivot } => FitError::SingularMatrix { step, pivot },
            LinalgError::DimensionMismatch { expected, actual, .. } => {
                FitError::LengthMismatch { expected, actual }
            }
            LinalgError::NotSquare { .. } => {
                FitError::InvalidDesign { reason: "normal equations are not square" }
            }
            LinalgError::Empty => FitError::InvalidDesign { reason: "design matrix is empty" },
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<FitError> for PyErr {
    fn from(err: FitError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
