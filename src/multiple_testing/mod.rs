//! multiple_testing — multiplicity corrections across pairs and terms.
//!
//! The batch orchestrator applies [`within_pair_bonferroni`] to each pair's
//! minimum phase-term p-value and then [`benjamini_hochberg`] across the
//! whole batch. Model comparison lives in `models::comparison`.

pub mod fdr;

pub use self::fdr::{
    CorrectionMethod, FdrCorrection, benjamini_hochberg, bonferroni, within_pair_bonferroni,
};
