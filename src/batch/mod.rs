//! batch — multi-dataset, multi-pair PAR(2) screening.
//!
//! Purpose
//! -------
//! Take aligned expression datasets plus target and clock gene lists, fit
//! every (dataset × target × clock) pair in parallel, and correct the
//! family with Benjamini–Hochberg.
//!
//! Key behaviors
//! -------------
//! - [`ExpressionDataset`] holds gene series on one time axis;
//!   [`BatchRequest`] lists the combinations to screen.
//! - [`run_batch`] never aborts on a single pair: failures are classified
//!   by [`PairFailureKind`] and counted in [`FailureCounts`].
//! - Results are ranked by q-value, then by effect size.
//!
//! Downstream usage
//! ----------------
//! - Gene-identifier mapping and dataset loading happen upstream; callers
//!   hand this module aligned arrays.

pub mod dataset;
pub mod errors;
pub mod orchestrator;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::dataset::{BatchRequest, ExpressionDataset, NullCalibration};
pub use self::errors::{BatchError, BatchResult, FailureCounts, PairFailureKind};
pub use self::orchestrator::{
    BatchAnalysisResult, PairCalibration, PairFailure, PairResult, run_batch,
};

pub mod prelude {
    pub use super::{
        BatchAnalysisResult, BatchError, BatchRequest, ExpressionDataset, NullCalibration,
        PairResult, run_batch,
    };
}
