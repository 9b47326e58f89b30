//! resampling::surrogate — phase-randomized FFT surrogates and their null.
//!
//! Purpose
//! -------
//! Build surrogate target series that share the original's power spectrum
//! (hence its autocorrelation) but carry no specific phase alignment with
//! the clock, and use them to calibrate the PAR(2) minimum phase-term
//! p-value.
//!
//! Key behaviors
//! -------------
//! - [`phase_randomized_surrogate`] zero-pads to the next power of two,
//!   draws an independent uniform [0, 2π) phase for every bin except DC and
//!   Nyquist, mirrors bin k onto N − k as its conjugate, inverts, and
//!   truncates back to the original length.
//! - [`surrogate_test`] compares the observed min phase p-value with the
//!   surrogate distribution: p = (1 + #{null ≤ observed}) / (1 + N).
use crate::{
    data::PairedSeries,
    models::par2::fit_par2_core,
    resampling::{
        errors::{ResamplingError, ResamplingResult},
        fft::{fft, ifft, next_power_of_two},
        options::ResamplingOptions,
    },
};
use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{debug, warn};

/// Phase-randomized surrogate of `values` (same length as the input).
///
/// Errors
/// ------
/// - `ResamplingError::EmptyInput` for an empty input.
pub fn phase_randomized_surrogate<R: Rng + ?Sized>(
    values: ArrayView1<'_, f64>, rng: &mut R,
) -> ResamplingResult<Array1<f64>> {
    let n = values.len();
    if n == 0 {
        return Err(ResamplingError::EmptyInput);
    }
    let len = next_power_of_two(n);
    let mut buf: Vec<Complex64> = values.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    buf.resize(len, Complex64::new(0.0, 0.0));
    let mut spectrum = fft(&buf)?;

    let half = len / 2;
    for k in 1..half {
        let magnitude = spectrum[k].norm();
        let theta = rng.gen_range(0.0..TAU);
        spectrum[k] = Complex64::from_polar(magnitude, theta);
        spectrum[len - k] = spectrum[k].conj();
    }

    let series = ifft(&spectrum)?;
    Ok(series.iter().take(n).map(|z| z.re).collect())
}

/// Surrogate null of the PAR(2) minimum phase-term p-value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurrogateTestResult {
    pub observed_min_p: f64,
    pub null_min_p: Vec<f64>,
    pub p_value: f64,
    pub iterations: usize,
    pub successful: usize,
    pub cancelled: bool,
}

/// Empirical p-value (1 + #{null ≤ observed}) / (1 + N).
pub fn empirical_p_value(observed: f64, null: &[f64]) -> f64 {
    let count = null.iter().filter(|&&v| v <= observed).count();
    (1 + count) as f64 / (1 + null.len()) as f64
}

/// Calibrate a pair's minimum phase p-value against target surrogates.
///
/// Each iteration replaces the (filtered) target with a phase-randomized
/// surrogate, keeps time and clock, and refits PAR(2).
///
/// Errors
/// ------
/// - `ResamplingError::NoIterations` for zero iterations.
/// - `ResamplingError::Fit` if the observed pair cannot be fitted.
/// - `ResamplingError::Cancelled` / `NoSuccessfulIterations` when no
///   surrogate produced a fit.
pub fn surrogate_test(
    series: &PairedSeries, period: f64, threshold: f64, options: &ResamplingOptions,
) -> ResamplingResult<SurrogateTestResult> {
    if options.iterations == 0 {
        return Err(ResamplingError::NoIterations);
    }
    let clean = series.filtered()?;
    let observed = fit_par2_core(&clean, period, threshold)?;

    let draws = options.run_parallel(|_, rng| {
        let target = phase_randomized_surrogate(clean.target.view(), rng).ok()?;
        let surrogate =
            PairedSeries { time: clean.time.clone(), target, clock: clean.clock.clone() };
        fit_par2_core(&surrogate, period, threshold).ok().map(|fit| fit.min_phase_p)
    });

    let cancelled = draws.iter().any(Option::is_none);
    let completed = draws.iter().filter(|d| d.is_some()).count();
    let null_min_p: Vec<f64> = draws.into_iter().flatten().flatten().collect();
    if cancelled {
        warn!(completed, requested = options.iterations, "surrogate test cancelled");
    }
    if null_min_p.is_empty() {
        return Err(if cancelled && completed == 0 {
            ResamplingError::Cancelled { completed }
        } else {
            ResamplingError::NoSuccessfulIterations { attempted: completed }
        });
    }
    let p_value = empirical_p_value(observed.min_phase_p, &null_min_p);
    debug!(p_value, successful = null_min_p.len(), "surrogate test finished");

    Ok(SurrogateTestResult {
        observed_min_p: observed.min_phase_p,
        successful: null_min_p.len(),
        null_min_p,
        p_value,
        iterations: options.iterations,
        cancelled,
    })
}
