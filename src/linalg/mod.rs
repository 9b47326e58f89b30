//! linalg — dense linear algebra for small regression problems.
//!
//! Purpose
//! -------
//! Supply the matrix operations behind ordinary least squares: transpose,
//! products, Gaussian elimination with partial pivoting, and explicit
//! inversion. Design matrices in this crate have at most a handful of
//! columns (7 for PAR(2)), so plain dense routines are sufficient.
//!
//! Key behaviors
//! -------------
//! - Report near-singular pivots as [`LinalgError::SingularMatrix`] using
//!   the absolute tolerances [`SOLVE_PIVOT_TOL`] and [`INVERT_PIVOT_TOL`].
//! - Validate operand shapes up front and never panic on user input.
//!
//! Downstream usage
//! ----------------
//! - `regression::ols` inverts XᵗX through [`invert`] and converts any
//!   [`LinalgError`] into a `FitError`, which in turn lets callers fall back
//!   to the degenerate regression sentinel.

pub mod errors;
pub mod matrix;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{LinalgError, LinalgResult};
pub use self::matrix::{
    INVERT_PIVOT_TOL, SOLVE_PIVOT_TOL, dot, invert, mat_vec, multiply, solve_linear_system,
    transpose,
};
