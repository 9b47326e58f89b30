//! batch::errors — request-level failures and per-pair failure categories.
//!
//! Pair failures never abort a batch; they are classified by
//! [`PairFailureKind`] and counted. Only a malformed request or invalid
//! options produce a [`BatchError`].
use crate::{
    data::DataError,
    options::OptionsError,
    regression::{FailureKind, FitError},
};
use serde::{Deserialize, Serialize};
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type BatchResult<T> = Result<T, BatchError>;

/// BatchError — the batch could not be started.
///
/// Variants
/// --------
/// - `Options(OptionsError)`
///   `AnalysisOptions::validate` rejected the configuration.
/// - `EmptyRequest`
///   No datasets, targets or clocks were supplied.
/// - `Data { dataset, source }`
///   A dataset's gene vector did not match its time axis.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchError {
    Options(OptionsError),
    EmptyRequest,
    Data { dataset: String, source: DataError },
}

impl std::error::Error for BatchError {}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Options(err) => write!(f, "Invalid analysis options: {err}"),
            BatchError::EmptyRequest => {
                write!(f, "Batch request needs at least one dataset, target and clock")
            }
            BatchError::Data { dataset, source } => write!(f, "Dataset `{dataset}`: {source}"),
        }
    }
}

impl From<OptionsError> for BatchError {
    fn from(err: OptionsError) -> Self {
        BatchError::Options(err)
    }
}

/// Why a single (dataset, target, clock) pair produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairFailureKind {
    InsufficientData,
    SingularMatrix,
    MissingGene,
    InvalidInput,
}

impl From<FailureKind> for PairFailureKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::InsufficientData => PairFailureKind::InsufficientData,
            FailureKind::SingularMatrix => PairFailureKind::SingularMatrix,
            FailureKind::InvalidInput => PairFailureKind::InvalidInput,
        }
    }
}

impl From<&FitError> for PairFailureKind {
    fn from(err: &FitError) -> Self {
        err.kind().into()
    }
}

/// Per-category failure counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCounts {
    pub insufficient_data: usize,
    pub singular_matrix: usize,
    pub missing_gene: usize,
    pub invalid_input: usize,
}

impl FailureCounts {
    pub fn record(&mut self, kind: PairFailureKind) {
        match kind {
            PairFailureKind::InsufficientData => self.insufficient_data += 1,
            PairFailureKind::SingularMatrix => self.singular_matrix += 1,
            PairFailureKind::MissingGene => self.missing_gene += 1,
            PairFailureKind::InvalidInput => self.invalid_input += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.insufficient_data + self.singular_matrix + self.missing_gene + self.invalid_input
    }
}

#[cfg(feature = "python-bindings")]
impl From<BatchError> for PyErr {
    fn from(err: BatchError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
