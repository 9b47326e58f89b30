//! options — validated configuration for analyses and diagnostics.
//!
//! Purpose
//! -------
//! Collect every recognized analysis knob in one serializable place so the
//! external configuration layer can hand the core a single JSON document.
//!
//! Key behaviors
//! -------------
//! - [`AnalysisOptions`] carries the per-pair analysis configuration
//!   (period, significance, optional blocks, resampling counts, FDR level).
//! - [`DiagnosticsOptions`] configures the diagnostics entry point.
//! - Constructors validate ranges and return [`OptionsError`]; `Default`
//!   impls document the canonical values.
//!
//! Conventions
//! -----------
//! - Probabilities (significance, FDR) must lie in (0, 1).
//! - Periods and sampling intervals share the caller's time unit (hours).
use crate::resampling::ResamplingOptions;
use serde::{Deserialize, Serialize};
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type OptionsResult<T> = Result<T, OptionsError>;

/// OptionsError — rejected configuration values.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionsError {
    InvalidPeriod { value: f64 },
    InvalidProbability { name: &'static str, value: f64 },
    InvalidIterations { name: &'static str, value: usize },
    InvalidSamplingInterval { value: f64 },
    InvalidWorkers,
}

impl std::error::Error for OptionsError {}

impl std::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionsError::InvalidPeriod { value } => {
                write!(f, "Period must be finite and > 0; got {value}")
            }
            OptionsError::InvalidProbability { name, value } => {
                write!(f, "{name} must lie strictly between 0 and 1; got {value}")
            }
            OptionsError::InvalidIterations { name, value } => {
                write!(f, "{name} must be at least 1; got {value}")
            }
            OptionsError::InvalidSamplingInterval { value } => {
                write!(f, "Sampling interval must be finite and > 0; got {value}")
            }
            OptionsError::InvalidWorkers => write!(f, "Worker count must be at least 1"),
        }
    }
}

/// AnalysisOptions — configuration for one PAR(2) pair analysis or batch.
///
/// Fields
/// ------
/// - `period`: circadian period of the clock cosinor (default 24).
/// - `significance_threshold`: α for per-term and corrected tests
///   (default 0.05).
/// - `include_model_comparison`, `include_diagnostics`,
///   `include_cross_validation`, `include_bootstrap`: optional result
///   blocks (comparison on, others off by default).
/// - `bootstrap_iterations`: cosinor bootstrap resamples (default 500).
/// - `fdr_threshold`: Benjamini–Hochberg level across a batch (default
///   0.05).
/// - `permutation_iterations`, `surrogate_count`: null-distribution sizes
///   for the permutation and surrogate procedures (default 1000 / 200).
/// - `seed`: base seed for every resampling stream (default 42).
/// - `workers`: dedicated worker count for resampling and batch pools;
///   `None` uses the global rayon pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub period: f64,
    pub significance_threshold: f64,
    pub include_model_comparison: bool,
    pub include_diagnostics: bool,
    pub include_cross_validation: bool,
    pub include_bootstrap: bool,
    pub bootstrap_iterations: usize,
    pub fdr_threshold: f64,
    pub permutation_iterations: usize,
    pub surrogate_count: usize,
    pub seed: u64,
    pub workers: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            period: 24.0,
            significance_threshold: 0.05,
            include_model_comparison: true,
            include_diagnostics: false,
            include_cross_validation: false,
            include_bootstrap: false,
            bootstrap_iterations: 500,
            fdr_threshold: 0.05,
            permutation_iterations: 1000,
            surrogate_count: 200,
            seed: 42,
            workers: None,
        }
    }
}

impl AnalysisOptions {
    /// Construct options with the core scalar settings, leaving the rest at
    /// their defaults.
    pub fn new(
        period: f64, significance_threshold: f64, fdr_threshold: f64,
    ) -> OptionsResult<Self> {
        let opts =
            AnalysisOptions { period, significance_threshold, fdr_threshold, ..Default::default() };
        opts.validate()?;
        Ok(opts)
    }

    /// Check every field; useful after deserializing from JSON.
    pub fn validate(&self) -> OptionsResult<()> {
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(OptionsError::InvalidPeriod { value: self.period });
        }
        check_probability("significance_threshold", self.significance_threshold)?;
        check_probability("fdr_threshold", self.fdr_threshold)?;
        check_iterations("bootstrap_iterations", self.bootstrap_iterations)?;
        check_iterations("permutation_iterations", self.permutation_iterations)?;
        check_iterations("surrogate_count", self.surrogate_count)?;
        if self.workers == Some(0) {
            return Err(OptionsError::InvalidWorkers);
        }
        Ok(())
    }

    pub fn with_diagnostics(mut self, on: bool) -> Self {
        self.include_diagnostics = on;
        self
    }

    pub fn with_cross_validation(mut self, on: bool) -> Self {
        self.include_cross_validation = on;
        self
    }

    pub fn with_bootstrap(mut self, on: bool) -> Self {
        self.include_bootstrap = on;
        self
    }

    /// Resampling configuration for `iterations` draws sharing this
    /// analysis's seed and worker settings.
    pub fn resampling(&self, iterations: usize) -> ResamplingOptions {
        ResamplingOptions {
            iterations,
            seed: self.seed,
            workers: self.workers,
            ..Default::default()
        }
    }
}

/// DiagnosticsOptions — configuration of [`crate::diagnostics::run_diagnostics`].
///
/// Fields
/// ------
/// - `sampling_interval`: time between samples, used for eigenperiods
///   (default 1).
/// - `max_ljung_box_lag`: cap on the Ljung–Box lag count; the effective
///   lag is min(cap, ⌊n/3⌋) (default 10).
/// - `whiteness_alpha`: Ljung–Box level below which residuals count as
///   non-white (default 0.05).
/// - `include_model_order_check`: fit AR(3) for the model-order edge case
///   (default true).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsOptions {
    pub sampling_interval: f64,
    pub max_ljung_box_lag: usize,
    pub whiteness_alpha: f64,
    pub include_model_order_check: bool,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        DiagnosticsOptions {
            sampling_interval: 1.0,
            max_ljung_box_lag: 10,
            whiteness_alpha: 0.05,
            include_model_order_check: true,
        }
    }
}

impl DiagnosticsOptions {
    pub fn new(sampling_interval: f64, max_ljung_box_lag: usize) -> OptionsResult<Self> {
        if !(sampling_interval.is_finite() && sampling_interval > 0.0) {
            return Err(OptionsError::InvalidSamplingInterval { value: sampling_interval });
        }
        check_iterations("max_ljung_box_lag", max_ljung_box_lag)?;
        Ok(DiagnosticsOptions { sampling_interval, max_ljung_box_lag, ..Default::default() })
    }
}

fn check_probability(name: &'static str, value: f64) -> OptionsResult<()> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(OptionsError::InvalidProbability { name, value })
    }
}

fn check_iterations(name: &'static str, value: usize) -> OptionsResult<()> {
    if value == 0 { Err(OptionsError::InvalidIterations { name, value }) } else { Ok(()) }
}

#[cfg(feature = "python-bindings")]
impl From<OptionsError> for PyErr {
    fn from(err: OptionsError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
