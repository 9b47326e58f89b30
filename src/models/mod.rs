//! models — AR(p), PAR(2) and nested model comparison.
//!
//! Purpose
//! -------
//! Turn paired series into fitted autoregressive models: the AR(2)
//! baseline with its eigenstructure, the phase-gated PAR(2) model with
//! per-term inference and within-pair correction, and the comparison of
//! PAR(2) against ARX, AR(2) and null alternatives on identical rows.
//!
//! Key behaviors
//! -------------
//! - [`fit_ar2`] / [`fit_ar`] regress on lagged values with an intercept.
//! - [`fit_par2`] is the per-pair entry point used by the batch
//!   orchestrator; [`fit_par2_core`] is the lean variant used inside
//!   resampling loops.
//! - [`compare_models`] reports F-tests, likelihood-ratio tests and
//!   AIC/BIC verdicts.
//!
//! Downstream usage
//! ----------------
//! - All fitting entry points return `FitResult`, so failures surface as
//!   values that batch code can count by `FailureKind`.

pub mod ar;
pub mod comparison;
pub mod par2;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::ar::{AR2Fit, ARFit, fit_ar, fit_ar2, lagged_design};
pub use self::comparison::{
    IC_MARGIN, ModelComparison, ModelFit, ModelKind, NestedTest, NonNestedComparison, Verdict,
    compare_models,
};
pub use self::par2::{
    EffectSize, EffectSizeLabel, EnhancedPar2Result, PAR2_TERM_NAMES, PHASE_TERM_INDICES,
    Par2Result, Par2Term, fit_par2, fit_par2_core, par2_design,
};

pub mod prelude {
    pub use super::{
        AR2Fit, EffectSize, EnhancedPar2Result, ModelComparison, ModelKind, Par2Result, Par2Term,
        Verdict, compare_models, fit_ar2, fit_par2, fit_par2_core,
    };
}
