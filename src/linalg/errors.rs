//! Errors for the dense linear-algebra kernel.
//!
//! `LinalgError` reports singular pivots and shape mismatches as values so
//! that regression code can fall back to degenerate results instead of
//! producing NaNs. An alias `LinalgResult<T>` standardizes return types.

/// Result alias for linear-algebra routines.
pub type LinalgResult<T> = Result<T, LinalgError>;

/// Error conditions raised by [`crate::linalg`] routines.
#[derive(Debug, Clone, PartialEq)]
pub enum LinalgError {
    // ---- Elimination ----
    /// Largest available pivot at elimination step `step` fell below the
    /// routine's tolerance.
    SingularMatrix { step: usize, pivot: f64 },

    // ---- Shapes ----
    /// Operand shapes are incompatible for the requested operation.
    DimensionMismatch { expected: usize, actual: usize, context: &'static str },

    /// A square matrix was required.
    NotSquare { rows: usize, cols: usize },

    /// Matrix or vector has no elements.
    Empty,
}

impl std::error::Error for LinalgError {}

impl std::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinalgError::SingularMatrix { step, pivot } => {
                write!(f, "Singular matrix: pivot {pivot:e} at elimination step {step}")
            }
            LinalgError::DimensionMismatch { expected, actual, context } => {
                write!(f, "Dimension mismatch in {context}: expected {expected}, got {actual}")
            }
            LinalgError::NotSquare { rows, cols } => {
                write!(f, "Matrix must be square; got {rows}×{cols}")
            }
            LinalgError::Empty => write!(f, "Matrix or vector is empty"),
        }
    }
}
