//! resampling::errors — failures of resampling procedures.
use crate::{data::DataError, regression::FitError};
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type ResamplingResult<T> = Result<T, ResamplingError>;

/// ResamplingError — reasons a resampling run could not produce output.
///
/// Variants
/// --------
/// - `Fit(FitError)`
///   The reference fit on the original data failed.
/// - `Data(DataError)`
///   Input arrays were malformed.
/// - `NotPowerOfTwo { len }`
///   The radix-2 FFT received a length that is not a power of two.
/// - `EmptyInput`
///   No observations were supplied.
/// - `NoIterations`
///   `iterations == 0`.
/// - `NoSuccessfulIterations { attempted }`
///   Every resample failed to refit (e.g. all degenerate draws).
/// - `Cancelled { completed }`
///   The caller's cancel flag was raised before any usable result existed.
#[derive(Debug, Clone, PartialEq)]
pub enum ResamplingError {
    Fit(FitError),
    Data(DataError),
    NotPowerOfTwo { len: usize },
    EmptyInput,
    NoIterations,
    NoSuccessfulIterations { attempted: usize },
    Cancelled { completed: usize },
}

impl std::error::Error for ResamplingError {}

impl std::fmt::Display for ResamplingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResamplingError::Fit(err) => write!(f, "Reference fit failed: {err}"),
            ResamplingError::Data(err) => write!(f, "Invalid input: {err}"),
            ResamplingError::NotPowerOfTwo { len } => {
                write!(f, "FFT length must be a power of two; got {len}")
            }
            ResamplingError::EmptyInput => write!(f, "Input series is empty"),
            ResamplingError::NoIterations => write!(f, "Iteration count must be at least 1"),
            ResamplingError::NoSuccessfulIterations { attempted } => {
                write!(f, "None of {attempted} resamples produced a valid fit")
            }
            ResamplingError::Cancelled { completed } => {
                write!(f, "Resampling cancelled after {completed} iterations")
            }
        }
    }
}

impl From<FitError> for ResamplingError {
    fn from(err: FitError) -> Self {
        ResamplingError::Fit(err)
    }
}

impl From<DataError> for ResamplingError {
    fn from(err: DataError) -> Self {
        ResamplingError::Data(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<ResamplingError> for PyErr {
    fn from(err: ResamplingError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
