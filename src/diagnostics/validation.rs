//! diagnostics::validation — shared input guards for residual tests.
//!
//! Purpose
//! -------
//! Centralize the length, finiteness and lag checks that every residual
//! test performs before computing its statistic, so the individual tests
//! stay focused on the arithmetic.
//!
//! Invariants & assumptions
//! ------------------------
//! - A series passing [`validate_residuals`] has at least `required`
//!   values and no NaN or ±∞ entries.
//! - A lag passing [`validate_lag`] satisfies `1 ≤ lag < n`.
//!
//! Downstream usage
//! ----------------
//! - Call at the top of every public test routine in
//!   `diagnostics::residual_tests` and `diagnostics::stationarity`.
use crate::diagnostics::errors::{DiagResult, DiagnosticsError};

/// Validate a residual (or raw) series before a diagnostic test.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
///   Series to validate.
/// - `required`: `usize`
///   Minimum number of observations the calling test needs.
///
/// Errors
/// ------
/// - `DiagnosticsError::InsufficientData` when `data.len() < required`.
/// - `DiagnosticsError::NonFiniteValue` for the first NaN or ±∞ entry.
///
/// Examples
/// --------
/// ```rust
/// # use par2_timeseries::diagnostics::validation::validate_residuals;
/// # use par2_timeseries::diagnostics::DiagnosticsError;
/// assert!(validate_residuals(&[0.1, -0.2, 0.3], 3).is_ok());
/// assert!(matches!(
///     validate_residuals(&[0.1, f64::NAN, 0.3], 3),
///     Err(DiagnosticsError::NonFiniteValue { index: 1, .. })
/// ));
/// ```
pub fn validate_residuals(data: &[f64], required: usize) -> DiagResult<()> {
    if data.len() < required {
        return Err(DiagnosticsError::InsufficientData { n: data.len(), required });
    }
    if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(DiagnosticsError::NonFiniteValue { index, value });
    }
    Ok(())
}

/// Validate a lag against a series length (`1 ≤ lag < n`).
pub fn validate_lag(lag: usize, n: usize) -> DiagResult<()> {
    if lag == 0 || lag >= n {
        return Err(DiagnosticsError::InvalidLag { lag, n });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Scope ----
    // Every error branch of `validate_residuals` / `validate_lag` plus the
    // success path.

    #[test]
    // Purpose
    // -------
    // Short input is rejected with the observed and required counts.
    //
    // Given
    // -----
    // - Two values, three required.
    //
    // Expect
    // ------
    // - `InsufficientData { n: 2, required: 3 }`.
    fn short_input_is_insufficient() {
        // Arrange
        let data = [1.0, 2.0];

        // Act
        let result = validate_residuals(&data, 3);

        // Assert
        assert_eq!(result, Err(DiagnosticsError::InsufficientData { n: 2, required: 3 }));
    }

    #[test]
    fn infinity_is_reported_with_its_index() {
        let data = [1.0, 2.0, f64::INFINITY, 4.0];

        let result = validate_residuals(&data, 2);

        assert_eq!(
            result,
            Err(DiagnosticsError::NonFiniteValue { index: 2, value: f64::INFINITY })
        );
    }

    #[test]
    fn lag_bounds_are_enforced() {
        assert!(validate_lag(1, 5).is_ok());
        assert!(validate_lag(4, 5).is_ok());
        assert_eq!(validate_lag(0, 5), Err(DiagnosticsError::InvalidLag { lag: 0, n: 5 }));
        assert_eq!(validate_lag(5, 5), Err(DiagnosticsError::InvalidLag { lag: 5, n: 5 }));
    }
}
