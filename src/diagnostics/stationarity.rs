//! diagnostics::stationarity — augmented Dickey–Fuller unit-root test.
//!
//! Purpose
//! -------
//! Check whether a series looks stationary before its AR(2) eigenstructure
//! is interpreted. The regression is
//!
//!   Δyₜ = α + γ yₜ₋₁ + Σᵢ δᵢ Δyₜ₋ᵢ + εₜ,   i = 1..p,
//!
//! and the statistic is γ̂ / SE(γ̂).
//!
//! Key behaviors
//! -------------
//! - p starts at ⌊(n − 1)^{1/3}⌋ and is reduced until at least four
//!   residual degrees of freedom remain.
//! - Critical values use the sample-size adjusted closed forms
//!   cv₁ = −3.43 − 6/N + 2/N², cv₅ = −2.86 − 2.74/N + 0.3/N²,
//!   cv₁₀ = −2.57 − 1.67/N + 0.2/N² with N = max(n, 25).
//! - A series is called stationary iff the statistic is below cv₅.
//!
//! Invariants & assumptions
//! ------------------------
//! - The constants above are empirical fits carried as-is; they are not
//!   the MacKinnon response surfaces.
use crate::{
    diagnostics::{
        errors::{DiagResult, DiagnosticsError},
        validation::validate_residuals,
    },
    regression::ols,
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Minimum residual degrees of freedom kept when choosing the lag order.
pub const ADF_MIN_RESIDUAL_DF: usize = 4;

/// ADF critical values at the 1 %, 5 % and 10 % levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_percent: f64,
    pub five_percent: f64,
    pub ten_percent: f64,
}

impl CriticalValues {
    /// Closed-form critical values for a series of length `n`.
    pub fn for_sample_size(n: usize) -> Self {
        let big_n = n.max(25) as f64;
        let inv = 1.0 / big_n;
        let inv2 = inv * inv;
        CriticalValues {
            one_percent: -3.43 - 6.0 * inv + 2.0 * inv2,
            five_percent: -2.86 - 2.74 * inv + 0.3 * inv2,
            ten_percent: -2.57 - 1.67 * inv + 0.2 * inv2,
        }
    }
}

/// AdfResult — outcome of [`augmented_dickey_fuller`].
///
/// Fields
/// ------
/// - `statistic`: t-ratio of the lagged level coefficient γ̂.
/// - `gamma`: γ̂ itself.
/// - `lags`: number of lagged differences used.
/// - `n_obs`: regression rows.
/// - `critical_values`: see [`CriticalValues::for_sample_size`].
/// - `stationary`: `statistic < critical_values.five_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    pub statistic: f64,
    pub gamma: f64,
    pub lags: usize,
    pub n_obs: usize,
    pub critical_values: CriticalValues,
    pub stationary: bool,
}

/// Lag order ⌊(n − 1)^{1/3}⌋ reduced until the regression keeps
/// [`ADF_MIN_RESIDUAL_DF`] residual degrees of freedom.
pub fn adf_lag_order(n: usize) -> Option<usize> {
    let mut lags = (n.saturating_sub(1) as f64).cbrt().floor() as usize;
    loop {
        // rows = n − 1 − p, parameters = p + 2
        let rows = n.saturating_sub(1 + lags);
        if rows >= lags + 2 + ADF_MIN_RESIDUAL_DF {
            return Some(lags);
        }
        if lags == 0 {
            return None;
        }
        lags -= 1;
    }
}

/// Augmented Dickey–Fuller test with an intercept.
///
/// Errors
/// ------
/// - `DiagnosticsError::InsufficientData` when no lag order leaves four
///   residual degrees of freedom (n < 7).
/// - `DiagnosticsError::NonFiniteValue` for NaN or ±∞ entries.
/// - `DiagnosticsError::Fit` if the ADF regression is singular (e.g. a
///   constant or exactly linear series).
pub fn augmented_dickey_fuller(values: &[f64]) -> DiagResult<AdfResult> {
    validate_residuals(values, 2)?;
    let n = values.len();
    let lags = adf_lag_order(n)
        .ok_or(DiagnosticsError::InsufficientData { n, required: 3 + ADF_MIN_RESIDUAL_DF })?;

    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    // diffs[j] = y[j + 1] − y[j]; its lagged level is y[j].
    let rows = diffs.len() - lags;
    let mut design = Array2::ones((rows, lags + 2));
    let mut response = Array1::zeros(rows);
    for r in 0..rows {
        let j = r + lags;
        response[r] = diffs[j];
        design[[r, 1]] = values[j];
        for i in 1..=lags {
            design[[r, 1 + i]] = diffs[j - i];
        }
    }

    let fit = ols(design.view(), response.view())?;
    let statistic = fit.t_stats[1];
    let critical_values = CriticalValues::for_sample_size(n);
    Ok(AdfResult {
        statistic,
        gamma: fit.coefficients[1],
        lags,
        n_obs: rows,
        critical_values,
        stationary: statistic < critical_values.five_percent,
    })
}
