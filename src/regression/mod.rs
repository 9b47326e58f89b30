//! regression — least-squares fitting with classical inference.
//!
//! Purpose
//! -------
//! Provide one OLS routine for arbitrary design matrices and the
//! single-harmonic cosinor fit built on it. Every model in the crate
//! (AR(p), PAR(2), ARX, null, ADF) reduces to a call to [`ols`].
//!
//! Key behaviors
//! -------------
//! - [`ols`] returns a [`FitResult`], the explicit success/failure union
//!   used throughout the crate; [`ols_or_degenerate`] collapses failures
//!   into the NaN-free [`RegressionResult::degenerate`] sentinel.
//! - [`fit_cosinor`] supplies the circadian phase for PAR(2) designs.
//!
//! Conventions
//! -----------
//! - Design matrices carry observations in rows and regressors in columns;
//!   an intercept column must be included explicitly.
//! - p-values are two-sided Student-t with df = n − k.

pub mod cosinor;
pub mod errors;
pub mod ols;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::cosinor::{CosinorFit, fit_cosinor, unwrap_near, wrap_phase};
pub use self::errors::{FailureKind, FitError, FitResult};
pub use self::ols::{RegressionResult, gaussian_log_likelihood, ols, ols_or_degenerate};

pub mod prelude {
    pub use super::{
        CosinorFit, FailureKind, FitError, FitResult, RegressionResult, fit_cosinor, ols,
        ols_or_degenerate,
    };
}
