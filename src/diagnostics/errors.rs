//! diagnostics::errors — failures of individual residual tests.
//!
//! Purpose
//! -------
//! Give each residual test (Durbin–Watson, Ljung–Box, Jarque–Bera, ADF,
//! ACF) a typed failure so callers can decide whether to skip, degrade or
//! surface it. The aggregate [`crate::diagnostics::run_diagnostics`] entry
//! point never returns these; it folds them into "not computed" quality
//! checks instead.
use crate::regression::FitError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for individual diagnostic tests.
pub type DiagResult<T> = Result<T, DiagnosticsError>;

/// DiagnosticsError — reasons a residual test could not be computed.
///
/// Variants
/// --------
/// - `InsufficientData { n, required }`
///   The series is shorter than the test needs.
/// - `NonFiniteValue { index, value }`
///   A NaN or infinity was found at `index`.
/// - `ZeroVariance`
///   The series is constant, so autocorrelations and moments are
///   undefined.
/// - `InvalidLag { lag, n }`
///   A requested lag is zero or not smaller than the series length.
/// - `Fit(FitError)`
///   An auxiliary regression (ADF) failed.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticsError {
    InsufficientData { n: usize, required: usize },
    NonFiniteValue { index: usize, value: f64 },
    ZeroVariance,
    InvalidLag { lag: usize, n: usize },
    Fit(FitError),
}

impl std::error::Error for DiagnosticsError {}

impl std::fmt::Display for DiagnosticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticsError::InsufficientData { n, required } => {
                write!(f, "Need at least {required} observations for this test; got {n}")
            }
            DiagnosticsError::NonFiniteValue { index, value } => {
                write!(f, "Invalid value {value} at index {index}. Must be a finite number.")
            }
            DiagnosticsError::ZeroVariance => write!(f, "Series has zero variance"),
            DiagnosticsError::InvalidLag { lag, n } => {
                write!(f, "Invalid lag {lag}. Must satisfy 1 ≤ lag < n = {n}.")
            }
            DiagnosticsError::Fit(err) => write!(f, "Auxiliary regression failed: {err}"),
        }
    }
}

impl From<FitError> for DiagnosticsError {
    fn from(err: FitError) -> Self {
        DiagnosticsError::Fit(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<DiagnosticsError> for PyErr {
    fn from(err: DiagnosticsError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
