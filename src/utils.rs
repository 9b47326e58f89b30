//! utils — conversion helpers for the PyO3 boundary.
//!
//! Everything here is compiled only with the `python-bindings` feature.
//! Helpers accept numpy arrays, pandas Series or plain sequences and turn
//! optional keyword arguments into validated option structs.

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    data::PairedSeries,
    options::{AnalysisOptions, DiagnosticsOptions},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Borrow a contiguous 1-D float64 view of `raw_data`, copying only when
/// the input is not already a contiguous numpy array.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Owned copy of a 1-D float input.
#[cfg(feature = "python-bindings")]
pub fn extract_array1<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(Array1::from(slice.to_vec()))
}

/// Assemble a [`PairedSeries`] from three Python array-likes.
#[cfg(feature = "python-bindings")]
pub fn extract_paired_series<'py>(
    py: Python<'py>, time: &Bound<'py, PyAny>, target: &Bound<'py, PyAny>,
    clock: &Bound<'py, PyAny>,
) -> PyResult<PairedSeries> {
    let time = extract_array1(py, time, "time")?;
    let target = extract_array1(py, target, "target")?;
    let clock = extract_array1(py, clock, "clock")?;
    Ok(PairedSeries::new(time, target, clock)?)
}

/// Build [`AnalysisOptions`] from keyword arguments, keeping defaults for
/// anything left as `None`.
#[cfg(feature = "python-bindings")]
pub fn extract_analysis_options(
    period: Option<f64>, significance_threshold: Option<f64>, include_diagnostics: Option<bool>,
    include_cross_validation: Option<bool>, include_bootstrap: Option<bool>,
    bootstrap_iterations: Option<usize>, seed: Option<u64>,
) -> PyResult<AnalysisOptions> {
    let defaults = AnalysisOptions::default();
    let opts = AnalysisOptions {
        period: period.unwrap_or(defaults.period),
        significance_threshold: significance_threshold.unwrap_or(defaults.significance_threshold),
        include_diagnostics: include_diagnostics.unwrap_or(defaults.include_diagnostics),
        include_cross_validation: include_cross_validation
            .unwrap_or(defaults.include_cross_validation),
        include_bootstrap: include_bootstrap.unwrap_or(defaults.include_bootstrap),
        bootstrap_iterations: bootstrap_iterations.unwrap_or(defaults.bootstrap_iterations),
        seed: seed.unwrap_or(defaults.seed),
        ..defaults
    };
    opts.validate()?;
    Ok(opts)
}

/// Build [`DiagnosticsOptions`] from keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn extract_diagnostics_options(
    sampling_interval: Option<f64>, max_ljung_box_lag: Option<usize>,
    include_model_order_check: Option<bool>,
) -> PyResult<DiagnosticsOptions> {
    let defaults = DiagnosticsOptions::default();
    let mut opts = DiagnosticsOptions::new(
        sampling_interval.unwrap_or(defaults.sampling_interval),
        max_ljung_box_lag.unwrap_or(defaults.max_ljung_box_lag),
    )?;
    opts.include_model_order_check =
        include_model_order_check.unwrap_or(defaults.include_model_order_check);
    Ok(opts)
}
