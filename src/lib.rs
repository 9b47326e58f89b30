//! par2_timeseries — phase-gated AR(2) inference for paired circadian series.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the PAR(2) analysis and the diagnostics suite to Python via the
//! `_par2_timeseries` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the numerical core: small dense linear algebra, special
//!   functions, OLS and cosinor regression, AR(2) eigen-analysis, series
//!   containers, AR / PAR(2) models and their comparison, diagnostics,
//!   resampling, multiple-testing correction, batch screening and seeded
//!   synthetic generators.
//! - With `python-bindings`, define the `Diagnostics` and `PAR2`
//!   `#[pyclass]` wrappers, an `fdr_correction` function, and register them
//!   under `par2_timeseries.diagnostics` / `par2_timeseries.models`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion and error mapping.
//! - Core errors convert to `PyValueError` through the `From<_> for PyErr`
//!   impls next to each error type.
//!
//! Conventions
//! -----------
//! - Time is in hours; the clock period defaults to 24.
//! - Python-visible labels (confidence level, edge-case ids, effect-size
//!   class) are the Rust variant names.
//!
//! Downstream usage
//! ----------------
//! - Rust callers typically import [`models::fit_par2`],
//!   [`diagnostics::run_diagnostics`] and [`batch::run_batch`] (or the
//!   `prelude` of each module).
//! - External simulators call the `Diagnostics` class to grade synthetic
//!   series against the same rules as observed data.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds end-to-end
//!   detection, control-calibration and batch scenarios.
//! - The PyO3 surface is exercised from Python, not from `cargo test`.

pub mod batch;
pub mod data;
pub mod diagnostics;
pub mod eigen;
pub mod linalg;
pub mod models;
pub mod multiple_testing;
pub mod options;
pub mod regression;
pub mod resampling;
pub mod special;
pub mod synthetic;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    diagnostics::{DiagnosticsResult, run_diagnostics},
    models::{EnhancedPar2Result, fit_par2},
    multiple_testing::benjamini_hochberg,
    utils::{
        extract_analysis_options, extract_array1, extract_diagnostics_options,
        extract_paired_series,
    },
};

/// Diagnostics — Python-facing wrapper for [`run_diagnostics`].
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `Diagnostics(data, sampling_interval=1.0, max_ljung_box_lag=10,
/// include_model_order_check=True)`:
/// - `data`: one-dimensional array-like of floats; non-finite entries are
///   dropped before analysis.
///
/// Fields
/// ------
/// - `inner`: [`DiagnosticsResult`]
///   Full Rust-side result backing the property accessors.
///
/// Notes
/// -----
/// - Construction never fails on short or degenerate data; such inputs
///   produce `confidence_level == "Unreliable"` and a `failure` message.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "par2_timeseries.diagnostics")]
pub struct Diagnostics {
    inner: DiagnosticsResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl Diagnostics {
    #[new]
    #[pyo3(
        signature = (
            data,
            sampling_interval = None,
            max_ljung_box_lag = None,
            include_model_order_check = None,
        ),
        text_signature = "(data, /, sampling_interval=1.0, max_ljung_box_lag=10, \
                          include_model_order_check=True)"
    )]
    pub fn new<'py>(
        py: Python<'py>, data: &Bound<'py, PyAny>, sampling_interval: Option<f64>,
        max_ljung_box_lag: Option<usize>, include_model_order_check: Option<bool>,
    ) -> PyResult<Self> {
        let values = extract_array1(py, data, "data")?;
        let opts = extract_diagnostics_options(
            sampling_interval,
            max_ljung_box_lag,
            include_model_order_check,
        )?;
        let inner = py.allow_threads(|| run_diagnostics(values.view(), &opts));
        Ok(Diagnostics { inner })
    }

    #[getter]
    pub fn n(&self) -> usize {
        self.inner.n
    }

    #[getter]
    pub fn confidence_score(&self) -> f64 {
        self.inner.score
    }

    #[getter]
    pub fn confidence_level(&self) -> String {
        format!("{:?}", self.inner.level)
    }

    /// (intercept, φ₁, φ₂) of the AR(2) fit, if it was computed.
    #[getter]
    pub fn coefficients(&self) -> Option<(f64, f64, f64)> {
        self.inner.ar2.as_ref().map(|a| (a.intercept, a.phi1, a.phi2))
    }

    #[getter]
    pub fn r_squared(&self) -> Option<f64> {
        self.inner.ar2.as_ref().map(|a| a.r_squared)
    }

    #[getter]
    pub fn modulus(&self) -> Option<f64> {
        self.inner.ar2.as_ref().map(|a| a.modulus)
    }

    #[getter]
    pub fn eigenperiod(&self) -> Option<f64> {
        self.inner.ar2.as_ref().and_then(|a| a.eigenperiod)
    }

    #[getter]
    pub fn half_life(&self) -> Option<f64> {
        self.inner.ar2.as_ref().and_then(|a| a.half_life)
    }

    #[getter]
    pub fn durbin_watson(&self) -> Option<f64> {
        self.inner.durbin_watson.as_ref().map(|d| d.statistic)
    }

    #[getter]
    pub fn ljung_box_pvalue(&self) -> Option<f64> {
        self.inner.ljung_box.as_ref().map(|l| l.p_value)
    }

    #[getter]
    pub fn jarque_bera_pvalue(&self) -> Option<f64> {
        self.inner.jarque_bera.as_ref().map(|j| j.p_value)
    }

    #[getter]
    pub fn adf_statistic(&self) -> Option<f64> {
        self.inner.adf.as_ref().map(|a| a.statistic)
    }

    #[getter]
    pub fn adf_stationary(&self) -> Option<bool> {
        self.inner.adf.as_ref().map(|a| a.stationary)
    }

    /// Triggered edge cases as (id, severity, detail).
    #[getter]
    pub fn edge_cases(&self) -> Vec<(String, String, String)> {
        self.inner
            .triggered_edge_cases()
            .map(|e| (format!("{:?}", e.id), format!("{:?}", e.severity), e.detail.clone()))
            .collect()
    }

    /// Applied penalties as (rule id, points, message).
    #[getter]
    pub fn penalties(&self) -> Vec<(String, f64, String)> {
        self.inner.penalties.iter().map(|p| (p.id.clone(), p.penalty, p.message.clone())).collect()
    }

    #[getter]
    pub fn failure(&self) -> Option<String> {
        self.inner.failure.clone()
    }
}

/// PAR2 — Python-facing wrapper for [`fit_par2`].
///
/// Parameters
/// ----------
/// Constructed from Python via `PAR2(time, target, clock, period=24.0,
/// significance_threshold=0.05, ...)`:
/// - `time`, `target`, `clock`: equal-length one-dimensional array-likes.
///   Rows with any non-finite entry are dropped.
/// - Remaining keywords toggle the optional diagnostics, leave-one-out and
///   bootstrap blocks.
///
/// Fields
/// ------
/// - `inner`: [`EnhancedPar2Result`]
///
/// Notes
/// -----
/// - Raises `ValueError` for mismatched lengths, too few finite rows or a
///   singular design.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "par2_timeseries.models")]
pub struct PAR2 {
    inner: EnhancedPar2Result,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PAR2 {
    #[new]
    #[pyo3(
        signature = (
            time,
            target,
            clock,
            period = None,
            significance_threshold = None,
            include_diagnostics = None,
            include_cross_validation = None,
            include_bootstrap = None,
            bootstrap_iterations = None,
            seed = None,
        ),
        text_signature = "(time, target, clock, /, period=24.0, significance_threshold=0.05, \
                          include_diagnostics=False, include_cross_validation=False, \
                          include_bootstrap=False, bootstrap_iterations=500, seed=42)"
    )]
    pub fn fit<'py>(
        py: Python<'py>, time: &Bound<'py, PyAny>, target: &Bound<'py, PyAny>,
        clock: &Bound<'py, PyAny>, period: Option<f64>, significance_threshold: Option<f64>,
        include_diagnostics: Option<bool>, include_cross_validation: Option<bool>,
        include_bootstrap: Option<bool>, bootstrap_iterations: Option<usize>, seed: Option<u64>,
    ) -> PyResult<Self> {
        let series = extract_paired_series(py, time, target, clock)?;
        let opts = extract_analysis_options(
            period,
            significance_threshold,
            include_diagnostics,
            include_cross_validation,
            include_bootstrap,
            bootstrap_iterations,
            seed,
        )?;
        let inner = py.allow_threads(|| fit_par2(&series, &opts))?;
        Ok(PAR2 { inner })
    }

    /// Per-term (name, estimate, std_error, t_stat, p_value).
    #[getter]
    pub fn terms(&self) -> Vec<(String, f64, f64, f64, f64)> {
        self.inner
            .result
            .terms
            .iter()
            .map(|t| (t.name.clone(), t.estimate, t.std_error, t.t_stat, t.p_value))
            .collect()
    }

    #[getter]
    pub fn significant_terms(&self) -> Vec<String> {
        self.inner.result.significant_terms.clone()
    }

    #[getter]
    pub fn min_phase_pvalue(&self) -> f64 {
        self.inner.result.min_phase_p
    }

    #[getter]
    pub fn bonferroni_pvalue(&self) -> f64 {
        self.inner.result.bonferroni_p
    }

    #[getter]
    pub fn significant(&self) -> bool {
        self.inner.result.significant
    }

    #[getter]
    pub fn r_squared(&self) -> f64 {
        self.inner.result.r_squared
    }

    #[getter]
    pub fn n(&self) -> usize {
        self.inner.result.n
    }

    #[getter]
    pub fn cohens_f2(&self) -> f64 {
        self.inner.effect_size.cohens_f2
    }

    #[getter]
    pub fn effect_size(&self) -> String {
        format!("{:?}", self.inner.effect_size.label)
    }

    #[getter]
    pub fn modulus(&self) -> f64 {
        let [a, b] = self.inner.result.eigen.moduli;
        a.max(b)
    }

    #[getter]
    pub fn clock_acrophase(&self) -> f64 {
        self.inner.result.clock.acrophase
    }

    #[getter]
    pub fn confidence_level(&self) -> Option<String> {
        self.inner.diagnostics.as_ref().map(|d| format!("{:?}", d.level))
    }

    #[getter]
    pub fn verdict(&self) -> Option<String> {
        self.inner.comparison.as_ref().map(|c| format!("{:?}", c.verdict))
    }
}

/// Benjamini–Hochberg q-values for `p_values` at level `alpha`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (p_values, alpha = 0.05), text_signature = "(p_values, /, alpha=0.05)")]
pub fn fdr_correction<'py>(
    py: Python<'py>, p_values: &Bound<'py, PyAny>, alpha: f64,
) -> PyResult<(Vec<f64>, Vec<bool>)> {
    let p = extract_array1(py, p_values, "p_values")?;
    let correction = benjamini_hochberg(p.as_slice().unwrap_or(&[]), alpha);
    Ok((correction.q_values, correction.significant))
}

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _par2_timeseries<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let diagnostics_mod = PyModule::new(_py, "diagnostics")?;
    let models_mod = PyModule::new(_py, "models")?;
    diagnostics(_py, m, &diagnostics_mod)?;
    models(_py, m, &models_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("par2_timeseries.diagnostics", diagnostics_mod)?;

    _py.import("sys")?.getattr("modules")?.set_item("par2_timeseries.models", models_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn diagnostics<'py>(
    _py: Python, par2_timeseries: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<Diagnostics>()?;
    par2_timeseries.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn models<'py>(
    _py: Python, par2_timeseries: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PAR2>()?;
    m.add_function(wrap_pyfunction!(fdr_correction, m)?)?;
    par2_timeseries.add_submodule(m)?;
    Ok(())
}
