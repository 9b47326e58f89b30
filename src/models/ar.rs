//! models::ar — AR(p) fits by conditional least squares.
//!
//! Purpose
//! -------
//! Regress xₜ on [1, xₜ₋₁, …, xₜ₋ₚ] over t = p..n and expose the AR(2)
//! special case with its eigenstructure. AR(3) fits back the model-order
//! diagnostic.
//!
//! Key behaviors
//! -------------
//! - Non-finite values are dropped before lagging.
//! - The intercept is always estimated, so a noiseless series generated
//!   from known (φ₁, φ₂) is recovered exactly whatever its level.
//! - Requires n − p > p + 1 usable rows; otherwise
//!   `FitError::InsufficientData`.
use crate::{
    eigen::{EigenResult, solve_ar2},
    regression::{FitError, FitResult, RegressionResult, ols},
};
use ndarray::{Array1, Array2, ArrayView1, s};
use serde::{Deserialize, Serialize};

/// ARFit — AR(p) fit with intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ARFit {
    pub order: usize,
    pub intercept: f64,
    /// φ₁..φₚ in lag order.
    pub coefficients: Array1<f64>,
    pub regression: RegressionResult,
}

/// AR2Fit — AR(2) fit plus its characteristic roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AR2Fit {
    pub intercept: f64,
    pub phi1: f64,
    pub phi2: f64,
    pub residuals: Array1<f64>,
    pub r_squared: f64,
    pub eigen: EigenResult,
    pub regression: RegressionResult,
}

impl AR2Fit {
    /// Dominant eigenvalue modulus.
    pub fn modulus(&self) -> f64 {
        self.eigen.max_modulus()
    }
}

/// Lagged design [1, xₜ₋₁, …, xₜ₋ₚ] and response xₜ for t = p..n.
pub fn lagged_design(values: ArrayView1<'_, f64>, order: usize) -> (Array2<f64>, Array1<f64>) {
    let n = values.len();
    let rows = n.saturating_sub(order);
    let mut design = Array2::ones((rows, order + 1));
    for r in 0..rows {
        let t = r + order;
        for lag in 1..=order {
            design[[r, lag]] = values[t - lag];
        }
    }
    let response = if rows > 0 { values.slice(s![order..]).to_owned() } else { Array1::zeros(0) };
    (design, response)
}

/// Fit an AR(`order`) model with intercept.
///
/// Errors
/// ------
/// - `FitError::InvalidDesign` for `order == 0`.
/// - `FitError::InsufficientData` when fewer than `order + 2` lagged rows
///   remain.
/// - `FitError::SingularMatrix` for collinear lags (e.g. a constant series).
pub fn fit_ar(values: ArrayView1<'_, f64>, order: usize) -> FitResult<ARFit> {
    if order == 0 {
        return Err(FitError::InvalidDesign { reason: "AR order must be at least 1" });
    }
    let clean: Array1<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let required = 2 * order + 2;
    if clean.len() < required {
        return Err(FitError::InsufficientData { n: clean.len(), required });
    }
    let (design, response) = lagged_design(clean.view(), order);
    let regression = ols(design.view(), response.view())?;
    Ok(ARFit {
        order,
        intercept: regression.coefficients[0],
        coefficients: regression.coefficients.slice(s![1..]).to_owned(),
        regression,
    })
}

/// Fit AR(2) and solve its characteristic equation.
pub fn fit_ar2(values: ArrayView1<'_, f64>) -> FitResult<AR2Fit> {
    let fit = fit_ar(values, 2)?;
    let phi1 = fit.coefficients[0];
    let phi2 = fit.coefficients[1];
    Ok(AR2Fit {
        intercept: fit.intercept,
        phi1,
        phi2,
        residuals: fit.regression.residuals.clone(),
        r_squared: fit.regression.r_squared,
        eigen: solve_ar2(phi1, phi2),
        regression: fit.regression,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noiseless_ar2(phi1: f64, phi2: f64, c: f64, n: usize) -> Array1<f64> {
        let mut x = vec![1.0, -0.5];
        for t in 2..n {
            x.push(c + phi1 * x[t - 1] + phi2 * x[t - 2]);
        }
        Array1::from(x)
    }

    #[test]
    // Purpose
    // -------
    // Zero-noise AR(2) data must be recovered to 1e-6 with R² ≈ 1.
    //
    // Given
    // -----
    // - φ₁ = 1.2, φ₂ = −0.5 (complex, stable roots), 60 points.
    //
    // Expect
    // ------
    // - |φ̂ − φ| < 1e-6, R² > 1 − 1e-9, complex eigenvalues with
    //   modulus √0.5.
    fn fit_ar2_recovers_noiseless_coefficients() {
        // Arrange
        let x = noiseless_ar2(1.2, -0.5, 0.0, 60);

        // Act
        let fit = fit_ar2(x.view()).expect("AR(2) fit");

        // Assert
        assert!((fit.phi1 - 1.2).abs() < 1e-6);
        assert!((fit.phi2 + 0.5).abs() < 1e-6);
        assert!(fit.r_squared > 1.0 - 1e-9);
        assert!(fit.eigen.is_complex);
        assert!((fit.modulus() - 0.5f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn lagged_design_aligns_rows_with_response() {
        let x = Array1::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        let (design, response) = lagged_design(x.view(), 2);

        assert_eq!(design.dim(), (3, 3));
        assert_eq!(design.row(0).to_vec(), vec![1.0, 2.0, 1.0]);
        assert_eq!(response.to_vec(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn fit_ar_guards_short_and_constant_series() {
        let short = Array1::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(fit_ar2(short.view()), Err(FitError::InsufficientData { n: 5, required: 6 }));

        let constant = Array1::from_elem(20, 3.0);
        assert!(matches!(fit_ar2(constant.view()), Err(FitError::SingularMatrix { .. })));
    }

    #[test]
    fn fit_ar3_on_ar2_data_finds_negligible_third_lag() {
        use rand::{SeedableRng, rngs::StdRng};
        use rand_distr::{Distribution, Normal};

        let mut rng = StdRng::seed_from_u64(2024);
        let noise = Normal::new(0.0, 1.0).unwrap();
        let mut x = vec![0.0, 0.0];
        for t in 2..600 {
            x.push(0.5 * x[t - 1] + 0.2 * x[t - 2] + noise.sample(&mut rng));
        }
        let x = Array1::from(x);

        let fit = fit_ar(x.view(), 3).unwrap();

        assert_eq!(fit.coefficients.len(), 3);
        assert!((fit.coefficients[0] - 0.5).abs() < 0.15);
        assert!(fit.coefficients[2].abs() < 0.15);
    }
}
