//! data::errors — construction errors for series containers.
use crate::regression::FitError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type DataResult<T> = Result<T, DataError>;

/// DataError — malformed series inputs.
///
/// Variants
/// --------
/// - `EmptySeries`
///   No observations were supplied.
/// - `LengthMismatch { field, expected, actual }`
///   A parallel array (`field`) differs in length from `time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    EmptySeries,
    LengthMismatch { field: &'static str, expected: usize, actual: usize },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::EmptySeries => write!(f, "Series must contain at least one observation"),
            DataError::LengthMismatch { field, expected, actual } => {
                write!(f, "Length of `{field}` ({actual}) does not match `time` ({expected})")
            }
        }
    }
}

impl From<DataError> for FitError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::EmptySeries => FitError::InsufficientData { n: 0, required: 1 },
            DataError::LengthMismatch { expected, actual, .. } => {
                FitError::LengthMismatch { expected, actual }
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<DataError> for PyErr {
    fn from(err: DataError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
