//! resampling::cross_validation — leave-one-out prediction error.
//!
//! Each observation is held out once, the design is refitted on the
//! remaining n − 1 rows and the held-out response is predicted. RMSE, MAE
//! and the predictive R² = 1 − PRESS / SST summarize those errors. Folds
//! run in parallel on rayon.
//!
//! A design with n ≤ k + 1 leaves no residual degrees of freedom in some
//! fold, so the result is reported as degenerate with infinite errors.
use crate::regression::ols;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// CrossValidationResult — aggregate held-out error.
///
/// Fields
/// ------
/// - `predictions`: held-out prediction per row (NaN-free; failed folds
///   hold the full-sample mean of `y`).
/// - `failed_folds`: folds whose refit failed (e.g. singular after
///   removal); excluded from the error summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationResult {
    pub n: usize,
    pub k: usize,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
    pub predictions: Array1<f64>,
    pub failed_folds: usize,
    pub degenerate: bool,
}

impl CrossValidationResult {
    fn degenerate(n: usize, k: usize, y: ArrayView1<'_, f64>) -> Self {
        let mean = y.mean().unwrap_or(0.0);
        CrossValidationResult {
            n,
            k,
            rmse: f64::INFINITY,
            mae: f64::INFINITY,
            r_squared: 0.0,
            predictions: Array1::from_elem(n, mean),
            failed_folds: n,
            degenerate: true,
        }
    }
}

/// Leave-one-out cross-validation of OLS on design `x` and response `y`.
pub fn leave_one_out(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> CrossValidationResult {
    let (n, k) = x.dim();
    if y.len() != n || n <= k + 1 {
        return CrossValidationResult::degenerate(n, k, y);
    }

    let folds: Vec<Option<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let keep: Vec<usize> = (0..n).filter(|&j| j != i).collect();
            let x_train = x.select(Axis(0), &keep);
            let y_train = y.select(Axis(0), &keep);
            let fit = ols(x_train.view(), y_train.view()).ok()?;
            let prediction = x.row(i).dot(&fit.coefficients);
            prediction.is_finite().then_some(prediction)
        })
        .collect();

    let succeeded: Vec<(usize, f64)> =
        folds.iter().enumerate().filter_map(|(i, p)| p.map(|p| (i, p))).collect();
    if succeeded.is_empty() {
        return CrossValidationResult::degenerate(n, k, y);
    }

    let mean_y = y.mean().unwrap_or(0.0);
    let mut press = 0.0;
    let mut abs_sum = 0.0;
    let mut sst = 0.0;
    for &(i, p) in &succeeded {
        let e = y[i] - p;
        press += e * e;
        abs_sum += e.abs();
        sst += (y[i] - mean_y).powi(2);
    }
    let m = succeeded.len() as f64;
    let predictions: Array1<f64> = folds.iter().map(|p| p.unwrap_or(mean_y)).collect();

    CrossValidationResult {
        n,
        k,
        rmse: (press / m).sqrt(),
        mae: abs_sum / m,
        r_squared: if sst > 0.0 { 1.0 - press / sst } else { 0.0 },
        predictions,
        failed_folds: n - succeeded.len(),
        degenerate: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn line_design(n: usize) -> Array2<f64> {
        let mut x = Array2::ones((n, 2));
        for i in 0..n {
            x[[i, 1]] = i as f64;
        }
        x
    }

    #[test]
    fn leave_one_out_is_exact_on_noiseless_line() {
        let x = line_design(10);
        let y: Array1<f64> = (0..10).map(|i| 1.0 + 0.5 * i as f64).collect();

        let cv = leave_one_out(x.view(), y.view());

        assert!(!cv.degenerate);
        assert!(cv.rmse < 1e-10 && cv.mae < 1e-10);
        assert!((cv.r_squared - 1.0).abs() < 1e-10);
        assert_eq!(cv.failed_folds, 0);
    }

    #[test]
    // Purpose
    // -------
    // Held-out error must exceed in-sample error on noisy data.
    fn leave_one_out_error_exceeds_training_error() {
        let x = line_design(12);
        let y: Array1<f64> =
            (0..12).map(|i| i as f64 + if i % 3 == 0 { 0.8 } else { -0.4 }).collect();

        let cv = leave_one_out(x.view(), y.view());
        let train = ols(x.view(), y.view()).unwrap();

        assert!(cv.rmse > (train.sse / 12.0).sqrt());
        assert!(cv.mae > 0.0);
    }

    #[test]
    fn tiny_designs_are_degenerate() {
        let x = line_design(3);
        let y = Array1::from(vec![1.0, 2.0, 4.0]);

        let cv = leave_one_out(x.view(), y.view());

        assert!(cv.degenerate);
        assert!(cv.rmse.is_infinite() && cv.mae.is_infinite());
        assert!(cv.predictions.iter().all(|p| p.is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // A fold whose refit is singular is counted as failed and predicted by
    // the full-sample mean of `y`.
    //
    // Given
    // -----
    // - Intercept, slope and an indicator column that is nonzero only in
    //   row 0, so removing row 0 leaves a zero column.
    fn singular_fold_is_predicted_by_full_sample_mean() {
        // Arrange
        let mut x = Array2::<f64>::zeros((8, 3));
        for i in 0..8 {
            x[[i, 0]] = 1.0;
            x[[i, 1]] = i as f64;
        }
        x[[0, 2]] = 1.0;
        let y = Array1::from(vec![3.0, 1.2, 1.3, 2.1, 2.4, 3.2, 3.1, 4.0]);

        // Act
        let cv = leave_one_out(x.view(), y.view());

        // Assert
        assert!(!cv.degenerate);
        assert_eq!(cv.failed_folds, 1);
        let full_mean = y.mean().unwrap();
        assert!((cv.predictions[0] - full_mean).abs() < 1e-12);
    }
}
