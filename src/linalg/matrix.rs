//! linalg::matrix — dense matrix kernels used by the regression core.
//!
//! Purpose
//! -------
//! Provide the handful of dense operations that ordinary least squares
//! needs: transpose, products, and Gaussian elimination with partial
//! pivoting for both linear solves and explicit inversion. Every routine
//! works on `ndarray` containers and reports degeneracy through
//! [`LinalgError`] rather than panicking or returning NaN.
//!
//! Key behaviors
//! -------------
//! - [`solve_linear_system`] reduces `[A | b]` to upper-triangular form and
//!   back-substitutes; any pivot with magnitude below [`SOLVE_PIVOT_TOL`]
//!   aborts with [`LinalgError::SingularMatrix`].
//! - [`invert`] runs Gauss–Jordan elimination on `[A | I]` with the stricter
//!   [`INVERT_PIVOT_TOL`].
//! - [`transpose`], [`multiply`], [`mat_vec`] and [`dot`] check shapes and
//!   delegate the arithmetic to `ndarray`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are expected to be finite. Non-finite entries propagate through
//!   the arithmetic; callers filter them upstream (see `data`).
//! - Pivot tolerances are absolute, not relative to the matrix norm. Design
//!   matrices in this crate are built from expression values of moderate
//!   scale, which keeps absolute thresholds meaningful.
//!
//! Testing notes
//! -------------
//! - Unit tests cover exact solves on small systems, inversion round trips,
//!   singular inputs for both tolerances, and shape errors.
use crate::linalg::errors::{LinalgError, LinalgResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

/// Pivot magnitude below which [`solve_linear_system`] reports singularity.
pub const SOLVE_PIVOT_TOL: f64 = 1e-10;

/// Pivot magnitude below which [`invert`] reports singularity.
pub const INVERT_PIVOT_TOL: f64 = 1e-12;

/// Return an owned transpose of `a`.
pub fn transpose(a: ArrayView2<'_, f64>) -> Array2<f64> {
    a.t().to_owned()
}

/// Matrix product `a · b`.
///
/// Errors
/// ------
/// - `LinalgError::DimensionMismatch` when `a.ncols() != b.nrows()`.
pub fn multiply(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> LinalgResult<Array2<f64>> {
    if a.ncols() != b.nrows() {
        return Err(LinalgError::DimensionMismatch {
            expected: a.ncols(),
            actual: b.nrows(),
            context: "multiply",
        });
    }
    Ok(a.dot(&b))
}

/// Matrix–vector product `a · x`.
pub fn mat_vec(a: ArrayView2<'_, f64>, x: ArrayView1<'_, f64>) -> LinalgResult<Array1<f64>> {
    if a.ncols() != x.len() {
        return Err(LinalgError::DimensionMismatch {
            expected: a.ncols(),
            actual: x.len(),
            context: "mat_vec",
        });
    }
    Ok(a.dot(&x))
}

/// Inner product of two equal-length slices.
pub fn dot(a: &[f64], b: &[f64]) -> LinalgResult<f64> {
    if a.len() != b.len() {
        return Err(LinalgError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
            context: "dot",
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
///
/// Parameters
/// ----------
/// - `a`: `ArrayView2<f64>`
///   Square coefficient matrix (k×k).
/// - `b`: `ArrayView1<f64>`
///   Right-hand side of length k.
///
/// Returns
/// -------
/// `LinalgResult<Array1<f64>>`
///   Solution vector `x` of length k.
///
/// Errors
/// ------
/// - `LinalgError::Empty` for a 0×0 system.
/// - `LinalgError::NotSquare` / `LinalgError::DimensionMismatch` for
///   incompatible shapes.
/// - `LinalgError::SingularMatrix` when the best available pivot at some
///   step has magnitude below [`SOLVE_PIVOT_TOL`].
///
/// Notes
/// -----
/// - Works on a private augmented copy; the inputs are never modified.
pub fn solve_linear_system(
    a: ArrayView2<'_, f64>, b: ArrayView1<'_, f64>,
) -> LinalgResult<Array1<f64>> {
    let k = check_square(a)?;
    if b.len() != k {
        return Err(LinalgError::DimensionMismatch {
            expected: k,
            actual: b.len(),
            context: "solve_linear_system",
        });
    }

    let mut aug = Array2::<f64>::zeros((k, k + 1));
    aug.slice_mut(s![.., ..k]).assign(&a);
    aug.column_mut(k).assign(&b);

    for col in 0..k {
        let pivot_row = select_pivot(aug.view(), col);
        let pivot = aug[[pivot_row, col]];
        if pivot.abs() < SOLVE_PIVOT_TOL {
            return Err(LinalgError::SingularMatrix { step: col, pivot });
        }
        swap_rows(&mut aug, col, pivot_row);

        for row in (col + 1)..k {
            let factor = aug[[row, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in col..=k {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    let mut x = Array1::<f64>::zeros(k);
    for row in (0..k).rev() {
        let mut acc = aug[[row, k]];
        for j in (row + 1)..k {
            acc -= aug[[row, j]] * x[j];
        }
        x[row] = acc / aug[[row, row]];
    }
    Ok(x)
}

/// Invert a square matrix with Gauss–Jordan elimination and partial pivoting.
///
/// Errors
/// ------
/// - `LinalgError::SingularMatrix` when a pivot falls below
///   [`INVERT_PIVOT_TOL`].
/// - Shape errors as for [`solve_linear_system`].
pub fn invert(a: ArrayView2<'_, f64>) -> LinalgResult<Array2<f64>> {
    let k = check_square(a)?;

    let mut aug = Array2::<f64>::zeros((k, 2 * k));
    aug.slice_mut(s![.., ..k]).assign(&a);
    for i in 0..k {
        aug[[i, k + i]] = 1.0;
    }

    for col in 0..k {
        let pivot_row = select_pivot(aug.view(), col);
        let pivot = aug[[pivot_row, col]];
        if pivot.abs() < INVERT_PIVOT_TOL {
            return Err(LinalgError::SingularMatrix { step: col, pivot });
        }
        swap_rows(&mut aug, col, pivot_row);

        aug.row_mut(col).mapv_inplace(|v| v / pivot);
        let pivot_vals = aug.row(col).to_owned();
        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = aug[[row, col]];
            if factor == 0.0 {
                continue;
            }
            aug.row_mut(row).scaled_add(-factor, &pivot_vals);
        }
    }

    Ok(aug.slice(s![.., k..]).to_owned())
}

fn check_square(a: ArrayView2<'_, f64>) -> LinalgResult<usize> {
    let (rows, cols) = a.dim();
    if rows == 0 || cols == 0 {
        return Err(LinalgError::Empty);
    }
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    Ok(rows)
}

/// Row index (≥ `col`) holding the largest `|a[row, col]|`.
#[inline]
fn select_pivot(aug: ArrayView2<'_, f64>, col: usize) -> usize {
    aug.column(col)
        .iter()
        .enumerate()
        .skip(col)
        .fold((col, f64::NEG_INFINITY), |(best, best_abs), (row, v)| {
            if v.abs() > best_abs { (row, v.abs()) } else { (best, best_abs) }
        })
        .0
}

#[inline]
fn swap_rows(aug: &mut Array2<f64>, i: usize, j: usize) {
    if i == j {
        return;
    }
    let (mut first, mut second) = aug.multi_slice_mut((s![i, ..], s![j, ..]));
    ndarray::Zip::from(&mut first).and(&mut second).for_each(std::mem::swap);
}
