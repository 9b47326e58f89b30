//! regression::cosinor — single-harmonic cosinor fits and phase helpers.
//!
//! Purpose
//! -------
//! Fit C(t) = M + A cos(ωt) + B sin(ωt) with ω = 2π / period by OLS and
//! expose the circadian phase φ(t) = wrap(ωt − acrophase) used to gate the
//! PAR(2) lag terms.
//!
//! Key behaviors
//! -------------
//! - [`fit_cosinor`] filters non-finite (time, value) pairs, builds the
//!   three-column design [1, cos ωt, sin ωt] and reports mesor, amplitude
//!   √(A² + B²), acrophase atan2(B, A) ∈ [0, 2π), R² and the rhythm F-test
//!   p-value for H₀: A = B = 0.
//! - [`wrap_phase`] maps any angle into [0, 2π); [`unwrap_near`] shifts an
//!   angle by multiples of 2π to lie within π of a reference.
//!
//! Invariants & assumptions
//! ------------------------
//! - `period` must be finite and > 0.
//! - At least 4 finite pairs are required (3 parameters plus one residual
//!   degree of freedom).
use crate::{
    regression::{
        errors::{FitError, FitResult},
        ols::{RegressionResult, ols},
    },
    special::f_sf,
};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// CosinorFit — fitted single-harmonic rhythm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosinorFit {
    pub mesor: f64,
    pub amplitude: f64,
    /// Phase offset atan2(B, A), wrapped into [0, 2π).
    pub acrophase: f64,
    pub beta_cos: f64,
    pub beta_sin: f64,
    pub period: f64,
    pub r_squared: f64,
    /// F-test p-value for the joint null A = B = 0.
    pub rhythm_p_value: f64,
    pub n: usize,
}

impl CosinorFit {
    /// Angular frequency ω = 2π / period.
    #[inline]
    pub fn omega(&self) -> f64 {
        TAU / self.period
    }

    /// Circadian phase at time `t`, in [0, 2π).
    #[inline]
    pub fn phase_at(&self, t: f64) -> f64 {
        wrap_phase(self.omega() * t - self.acrophase)
    }

    /// Phases at every timestamp in `time`.
    pub fn phases(&self, time: ArrayView1<'_, f64>) -> Array1<f64> {
        time.mapv(|t| self.phase_at(t))
    }

    /// Fitted rhythm value M + A cos ωt + B sin ωt.
    pub fn predict(&self, t: f64) -> f64 {
        let wt = self.omega() * t;
        self.mesor + self.beta_cos * wt.cos() + self.beta_sin * wt.sin()
    }
}

/// Wrap an angle into [0, 2π).
#[inline]
pub fn wrap_phase(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shift `value` by a multiple of 2π so that |value − reference| ≤ π.
#[inline]
pub fn unwrap_near(value: f64, reference: f64) -> f64 {
    let diff = value - reference;
    value - TAU * ((diff + PI) / TAU).floor()
}

/// Fit a single-harmonic cosinor model at `period`.
///
/// Parameters
/// ----------
/// - `time`: timestamps in the same unit as `period` (hours by default).
/// - `values`: observations; pairs with a non-finite time or value are
///   dropped before fitting.
/// - `period`: rhythm period, finite and > 0.
///
/// Errors
/// ------
/// - `FitError::InvalidPeriod` for a non-finite or non-positive period.
/// - `FitError::LengthMismatch` if `time` and `values` differ in length.
/// - `FitError::InsufficientData` with fewer than 4 finite pairs.
/// - `FitError::SingularMatrix` when the timestamps cannot separate the cos
///   and sin regressors (e.g. all samples at the same phase).
pub fn fit_cosinor(
    time: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>, period: f64,
) -> FitResult<CosinorFit> {
    if !(period.is_finite() && period > 0.0) {
        return Err(FitError::InvalidPeriod { period });
    }
    if time.len() != values.len() {
        return Err(FitError::LengthMismatch { expected: time.len(), actual: values.len() });
    }
    let (t, y): (Vec<f64>, Vec<f64>) = time
        .iter()
        .zip(values.iter())
        .filter(|(t, v)| t.is_finite() && v.is_finite())
        .map(|(&t, &v)| (t, v))
        .unzip();
    let n = t.len();
    if n < 4 {
        return Err(FitError::InsufficientData { n, required: 4 });
    }

    let omega = TAU / period;
    let mut design = Array2::ones((n, 3));
    for (i, &ti) in t.iter().enumerate() {
        design[[i, 1]] = (omega * ti).cos();
        design[[i, 2]] = (omega * ti).sin();
    }
    let y = Array1::from(y);
    let fit = ols(design.view(), y.view())?;
    Ok(from_regression(&fit, period))
}

fn from_regression(fit: &RegressionResult, period: f64) -> CosinorFit {
    let mesor = fit.coefficients[0];
    let beta_cos = fit.coefficients[1];
    let beta_sin = fit.coefficients[2];
    let amplitude = beta_cos.hypot(beta_sin);
    let acrophase = wrap_phase(beta_sin.atan2(beta_cos));

    // Overall F-test of the two rhythm regressors.
    let r2 = fit.r_squared.clamp(0.0, 1.0);
    let df2 = fit.df as f64;
    let rhythm_p_value = if amplitude < 1e-12 {
        1.0
    } else if r2 >= 1.0 {
        0.0
    } else {
        f_sf((r2 / 2.0) / ((1.0 - r2) / df2), 2.0, df2)
    };

    CosinorFit {
        mesor,
        amplitude,
        acrophase,
        beta_cos,
        beta_sin,
        period,
        r_squared: fit.r_squared,
        rhythm_p_value,
        n: fit.n,
    }
}
