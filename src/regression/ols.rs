//! regression::ols — ordinary least squares with classical inference.
//!
//! Purpose
//! -------
//! Fit y = Xβ + ε for an arbitrary design matrix X (n×k) and report the
//! full set of classical inference quantities: coefficients, standard
//! errors, t-statistics, two-sided p-values, residuals, MSE and R². The
//! same routine backs AR(p), PAR(2), ARX, cosinor and ADF regressions.
//!
//! Key behaviors
//! -------------
//! - Computes β = (XᵗX)⁻¹Xᵗy via `linalg::invert`, MSE = SSE/(n − k),
//!   SE_j = √(MSE · [(XᵗX)⁻¹]_jj), t_j = β_j / SE_j and
//!   p_j = P(|T_{n−k}| ≥ |t_j|).
//! - Requires n > k; otherwise returns `FitError::InsufficientData`.
//! - [`ols_or_degenerate`] converts any failure into the degenerate
//!   sentinel [`RegressionResult::degenerate`] (β = 0, SE = ∞, t = 0, p = 1,
//!   `reliable = false`) for callers that must always produce a record.
//! - Exposes the Gaussian log-likelihood and AIC/BIC used by model
//!   comparison.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; pairwise filtering happens in `data`.
//! - No result field is NaN: zero standard errors yield t = ±∞ (p = 0) for
//!   non-zero coefficients and t = 0 (p = 1) for zero coefficients, and
//!   negative variance diagonals from round-off are clamped to zero.
//!
//! Testing notes
//! -------------
//! - Unit tests check exact recovery on noiseless data, agreement of
//!   standard errors with the closed-form simple-regression formula, the
//!   n ≤ k guard, singular designs, and the degenerate sentinel.
use crate::{
    linalg::invert,
    regression::errors::{FitError, FitResult},
    special::student_t_two_sided_p,
};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Floor applied to SSE/n before taking logarithms.
pub const SSE_FLOOR: f64 = 1e-300;

/// Threshold under which a total sum of squares counts as zero variance.
pub const VARIANCE_EPS: f64 = 1e-14;

/// RegressionResult — classical OLS output for one design matrix.
///
/// Fields
/// ------
/// - `coefficients`, `standard_errors`, `t_stats`, `p_values`: length k,
///   in design-column order.
/// - `residuals`, `fitted`: length n.
/// - `n`, `k`, `df`: observations, parameters and residual degrees of
///   freedom (n − k).
/// - `sse`, `mse`: residual sum of squares and SSE/df.
/// - `r_squared`, `adj_r_squared`: centered coefficient of determination
///   and its degrees-of-freedom adjustment.
/// - `reliable`: `false` only for the degenerate sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub coefficients: Array1<f64>,
    pub standard_errors: Array1<f64>,
    pub t_stats: Array1<f64>,
    pub p_values: Array1<f64>,
    pub residuals: Array1<f64>,
    pub fitted: Array1<f64>,
    pub n: usize,
    pub k: usize,
    pub df: usize,
    pub sse: f64,
    pub mse: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub reliable: bool,
}

impl RegressionResult {
    /// Degenerate sentinel for a failed fit of `k` parameters to `y`.
    ///
    /// All coefficients are zero, standard errors are `+∞`, t-statistics
    /// are zero, p-values are one, residuals equal `y`, and `reliable` is
    /// `false`.
    pub fn degenerate(k: usize, y: ArrayView1<'_, f64>) -> Self {
        let n = y.len();
        let sse = y.iter().map(|v| v * v).sum::<f64>();
        let df = n.saturating_sub(k);
        RegressionResult {
            coefficients: Array1::zeros(k),
            standard_errors: Array1::from_elem(k, f64::INFINITY),
            t_stats: Array1::zeros(k),
            p_values: Array1::ones(k),
            residuals: y.to_owned(),
            fitted: Array1::zeros(n),
            n,
            k,
            df,
            sse,
            mse: if df > 0 { sse / df as f64 } else { f64::INFINITY },
            r_squared: 0.0,
            adj_r_squared: 0.0,
            reliable: false,
        }
    }

    /// Gaussian log-likelihood ℓ = −n/2 · (ln 2π + ln(SSE/n) + 1).
    pub fn log_likelihood(&self) -> f64 {
        gaussian_log_likelihood(self.sse, self.n)
    }

    /// Akaike information criterion 2k − 2ℓ.
    pub fn aic(&self) -> f64 {
        2.0 * self.k as f64 - 2.0 * self.log_likelihood()
    }

    /// Bayesian information criterion k·ln(n) − 2ℓ.
    pub fn bic(&self) -> f64 {
        self.k as f64 * (self.n as f64).ln() - 2.0 * self.log_likelihood()
    }
}

/// Gaussian log-likelihood of a least-squares fit with `n` residuals.
pub fn gaussian_log_likelihood(sse: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let sigma2 = (sse / n).max(SSE_FLOOR);
    -0.5 * n * ((2.0 * PI).ln() + sigma2.ln() + 1.0)
}

/// Fit ordinary least squares of `y` on the columns of `x`.
///
/// Parameters
/// ----------
/// - `x`: `ArrayView2<f64>`
///   Design matrix with n rows (observations) and k columns. Include a
///   column of ones explicitly if an intercept is wanted.
/// - `y`: `ArrayView1<f64>`
///   Response of length n.
///
/// Returns
/// -------
/// `FitResult<RegressionResult>`
///   Classical OLS inference on success.
///
/// Errors
/// ------
/// - `FitError::InvalidDesign` if `x` has no columns.
/// - `FitError::LengthMismatch` if `y.len() != x.nrows()`.
/// - `FitError::InsufficientData` if n ≤ k.
/// - `FitError::SingularMatrix` if XᵗX has a pivot below 1e-12.
/// - `FitError::NonFiniteEstimate` if a coefficient comes out non-finite.
pub fn ols(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> FitResult<RegressionResult> {
    let (n, k) = x.dim();
    if k == 0 {
        return Err(FitError::InvalidDesign { reason: "design matrix has no columns" });
    }
    if y.len() != n {
        return Err(FitError::LengthMismatch { expected: n, actual: y.len() });
    }
    if n <= k {
        return Err(FitError::InsufficientData { n, required: k + 1 });
    }

    let xtx = x.t().dot(&x);
    let xtx_inv = invert(xtx.view())?;
    let xty = x.t().dot(&y);
    let coefficients = xtx_inv.dot(&xty);
    if let Some(index) = coefficients.iter().position(|b| !b.is_finite()) {
        return Err(FitError::NonFiniteEstimate { index });
    }

    let fitted = x.dot(&coefficients);
    let residuals = &y - &fitted;
    let sse = residuals.iter().map(|r| r * r).sum::<f64>();
    let df = n - k;
    let mse = sse / df as f64;

    let standard_errors: Array1<f64> =
        (0..k).map(|j| (mse * xtx_inv[[j, j]]).max(0.0).sqrt()).collect();
    let t_stats: Array1<f64> = coefficients
        .iter()
        .zip(standard_errors.iter())
        .map(|(&b, &se)| t_statistic(b, se))
        .collect();
    let p_values: Array1<f64> =
        t_stats.iter().map(|&t| student_t_two_sided_p(t, df as f64)).collect();

    let (r_squared, adj_r_squared) = coefficient_of_determination(y, sse, n, k);

    Ok(RegressionResult {
        coefficients,
        standard_errors,
        t_stats,
        p_values,
        residuals,
        fitted,
        n,
        k,
        df,
        sse,
        mse,
        r_squared,
        adj_r_squared,
        reliable: true,
    })
}

/// Fit OLS, substituting the degenerate sentinel on any failure.
pub fn ols_or_degenerate(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> RegressionResult {
    ols(x, y).unwrap_or_else(|_| RegressionResult::degenerate(x.ncols(), y))
}

#[inline]
fn t_statistic(beta: f64, se: f64) -> f64 {
    if se > 0.0 && se.is_finite() {
        beta / se
    } else if beta == 0.0 || se.is_infinite() {
        0.0
    } else {
        beta.signum() * f64::INFINITY
    }
}

fn coefficient_of_determination(
    y: ArrayView1<'_, f64>, sse: f64, n: usize, k: usize,
) -> (f64, f64) {
    let mean = y.mean().unwrap_or(0.0);
    let sst = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    let r2 = if sst > VARIANCE_EPS {
        1.0 - sse / sst
    } else if sse <= VARIANCE_EPS {
        1.0
    } else {
        0.0
    };
    let adj =
        if n > k && n > 1 { 1.0 - (1.0 - r2) * (n as f64 - 1.0) / (n - k) as f64 } else { r2 };
    (r2, adj)
}
