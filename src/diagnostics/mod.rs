//! diagnostics — residual tests, edge-case heuristics and confidence scoring.
//!
//! Purpose
//! -------
//! Decide how much an AR(2) reading of a series can be trusted. The suite
//! combines classical residual tests (Durbin–Watson, Ljung–Box,
//! Jarque–Bera), an augmented Dickey–Fuller stationarity check, seven
//! heuristic edge cases, and a rule-table confidence score.
//!
//! Key behaviors
//! -------------
//! - Individual tests return `DiagResult<T>` and fail on short, non-finite
//!   or constant input.
//! - [`run_diagnostics`] is infallible and accepts any numeric sequence;
//!   failures surface as an `Unreliable` result.
//!
//! Downstream usage
//! ----------------
//! - `models::fit_par2` attaches a [`DiagnosticsResult`] for the target
//!   series when diagnostics are requested.
//! - External simulators call [`run_diagnostics`] directly (also exposed
//!   through the Python bindings as `Diagnostics`).

pub mod confidence;
pub mod edge_cases;
pub mod errors;
pub mod report;
pub mod residual_tests;
pub mod stationarity;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::confidence::{
    AppliedPenalty, CONFIDENCE_RULES, ConfidenceLevel, ConfidenceRule, ConfidenceScore,
    ScoringContext, score_confidence, score_with,
};
pub use self::edge_cases::{EdgeCaseDiagnostic, EdgeCaseKind, Severity, eigenvalue_band};
pub use self::errors::{DiagResult, DiagnosticsError};
pub use self::report::{Ar2Summary, DiagnosticsResult, QualityCheck, run_diagnostics};
pub use self::residual_tests::{
    AutocorrelationBand, DurbinWatson, JarqueBera, LjungBox, acf, durbin_watson,
    excess_kurtosis, jarque_bera, ljung_box, skewness,
};
pub use self::stationarity::{AdfResult, CriticalValues, augmented_dickey_fuller};
pub use self::validation::validate_residuals;

pub mod prelude {
    pub use super::{
        ConfidenceLevel, DiagnosticsError, DiagnosticsResult, EdgeCaseDiagnostic, EdgeCaseKind,
        QualityCheck, Severity, run_diagnostics,
    };
}
