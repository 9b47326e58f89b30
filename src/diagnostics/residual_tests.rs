//! diagnostics::residual_tests — whiteness and normality of residuals.
//!
//! Purpose
//! -------
//! Classical residual diagnostics for an AR(2) fit: Durbin–Watson,
//! Ljung–Box portmanteau, Jarque–Bera normality, and the sample moments
//! and autocorrelations they are built from.
//!
//! Key behaviors
//! -------------
//! - [`durbin_watson`] reports DW = Σ(rₜ − rₜ₋₁)² / Σrₜ² with a fixed band
//!   interpretation only (< 1.5 positive, > 2.5 negative autocorrelation).
//!   No p-value is computed; the DW null distribution depends on the
//!   design matrix.
//! - [`ljung_box`] uses L = min(max_lag, ⌊n/3⌋) lags and a χ²(L) tail.
//! - [`jarque_bera`] uses the biased (population) moment estimators and a
//!   χ²(2) tail.
//!
//! Conventions
//! -----------
//! - Autocorrelations use the sample mean and the lag-0 sum of squares as
//!   the common denominator, so |ρ̂ₖ| ≤ 1.
//! - Moments of a zero-variance series are reported as 0 rather than NaN.
use crate::{
    diagnostics::{
        errors::{DiagResult, DiagnosticsError},
        validation::{validate_lag, validate_residuals},
    },
    special::chi_squared_sf,
};
use serde::{Deserialize, Serialize};

/// Durbin–Watson statistic below which residuals read as positively
/// autocorrelated.
pub const DW_LOWER_BAND: f64 = 1.5;
/// Durbin–Watson statistic above which residuals read as negatively
/// autocorrelated.
pub const DW_UPPER_BAND: f64 = 2.5;

/// Heuristic reading of a Durbin–Watson statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutocorrelationBand {
    Positive,
    Neutral,
    Negative,
}

impl AutocorrelationBand {
    pub fn from_statistic(dw: f64) -> Self {
        if dw < DW_LOWER_BAND {
            AutocorrelationBand::Positive
        } else if dw > DW_UPPER_BAND {
            AutocorrelationBand::Negative
        } else {
            AutocorrelationBand::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurbinWatson {
    pub statistic: f64,
    pub band: AutocorrelationBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LjungBox {
    pub statistic: f64,
    pub lags: usize,
    pub p_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JarqueBera {
    pub statistic: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
    pub p_value: f64,
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Central moment of order `k` (biased, divisor n).
fn central_moment(data: &[f64], center: f64, k: i32) -> f64 {
    data.iter().map(|v| (v - center).powi(k)).sum::<f64>() / data.len() as f64
}

/// Durbin–Watson statistic and band.
///
/// Errors
/// ------
/// - `InsufficientData` for fewer than 2 residuals.
/// - `NonFiniteValue` for NaN or ±∞ entries.
/// - `ZeroVariance` when every residual is exactly zero.
pub fn durbin_watson(residuals: &[f64]) -> DiagResult<DurbinWatson> {
    validate_residuals(residuals, 2)?;
    let denominator: f64 = residuals.iter().map(|r| r * r).sum();
    if denominator == 0.0 {
        return Err(DiagnosticsError::ZeroVariance);
    }
    let numerator: f64 = residuals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    let statistic = numerator / denominator;
    Ok(DurbinWatson { statistic, band: AutocorrelationBand::from_statistic(statistic) })
}

/// Sample autocorrelations ρ̂₁..ρ̂_max_lag.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
///   Finite series of length n.
/// - `max_lag`: `usize`
///   Highest lag, `1 ≤ max_lag < n`.
///
/// Returns
/// -------
/// `DiagResult<Vec<f64>>`
///   Element `k − 1` holds ρ̂ₖ = Σₜ (xₜ − x̄)(xₜ₋ₖ − x̄) / Σₜ (xₜ − x̄)².
///
/// Errors
/// ------
/// - `InvalidLag`, `NonFiniteValue`, `InsufficientData` from validation.
/// - `ZeroVariance` for a constant series.
pub fn acf(data: &[f64], max_lag: usize) -> DiagResult<Vec<f64>> {
    validate_residuals(data, 2)?;
    validate_lag(max_lag, data.len())?;
    let center = mean(data);
    let c0: f64 = data.iter().map(|v| (v - center).powi(2)).sum();
    if c0 <= f64::MIN_POSITIVE {
        return Err(DiagnosticsError::ZeroVariance);
    }
    Ok((1..=max_lag)
        .map(|k| {
            data[k..].iter().zip(data).map(|(a, b)| (a - center) * (b - center)).sum::<f64>() / c0
        })
        .collect())
}

/// Ljung–Box lag count L = min(max_lag, ⌊n/3⌋).
#[inline]
pub fn ljung_box_lags(n: usize, max_lag: usize) -> usize {
    max_lag.min(n / 3)
}

/// Ljung–Box Q = n(n + 2) Σₖ ρ̂ₖ² / (n − k) over k = 1..L.
///
/// Errors
/// ------
/// - `InsufficientData` when fewer than 3 residuals are supplied (L would
///   be 0).
/// - `ZeroVariance` / `NonFiniteValue` from [`acf`].
pub fn ljung_box(residuals: &[f64], max_lag: usize) -> DiagResult<LjungBox> {
    validate_residuals(residuals, 3)?;
    let n = residuals.len();
    let lags = ljung_box_lags(n, max_lag);
    if lags == 0 {
        return Err(DiagnosticsError::InvalidLag { lag: 0, n });
    }
    let rho = acf(residuals, lags)?;
    let nf = n as f64;
    let statistic = nf
        * (nf + 2.0)
        * rho.iter().enumerate().map(|(i, r)| r * r / (nf - (i + 1) as f64)).sum::<f64>();
    Ok(LjungBox { statistic, lags, p_value: chi_squared_sf(statistic, lags as f64) })
}

/// Sample skewness m₃ / m₂^{3/2}; 0 for a constant series.
pub fn skewness(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let center = mean(data);
    let m2 = central_moment(data, center, 2);
    if m2 <= f64::MIN_POSITIVE {
        return 0.0;
    }
    central_moment(data, center, 3) / m2.powf(1.5)
}

/// Sample excess kurtosis m₄ / m₂² − 3; 0 for a constant series.
pub fn excess_kurtosis(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let center = mean(data);
    let m2 = central_moment(data, center, 2);
    if m2 <= f64::MIN_POSITIVE {
        return 0.0;
    }
    central_moment(data, center, 4) / (m2 * m2) - 3.0
}

/// Jarque–Bera JB = (n/6)(S² + K²/4) with a χ²(2) p-value.
///
/// Errors
/// ------
/// - `InsufficientData` for fewer than 4 residuals.
/// - `NonFiniteValue` for NaN or ±∞ entries.
/// - `ZeroVariance` for a constant series.
pub fn jarque_bera(residuals: &[f64]) -> DiagResult<JarqueBera> {
    validate_residuals(residuals, 4)?;
    let center = mean(residuals);
    if central_moment(residuals, center, 2) <= f64::MIN_POSITIVE {
        return Err(DiagnosticsError::ZeroVariance);
    }
    let s = skewness(residuals);
    let k = excess_kurtosis(residuals);
    let statistic = residuals.len() as f64 / 6.0 * (s * s + k * k / 4.0);
    let p_value = chi_squared_sf(statistic, 2.0);
    Ok(JarqueBera { statistic, skewness: s, excess_kurtosis: k, p_value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    // ---- Scope ----
    // Hand-computed statistics on tiny series, band classification, and
    // the qualitative behavior of Ljung–Box / Jarque–Bera on white noise
    // versus strongly structured input.

    fn white_noise(n: usize, seed: u64) -> Vec<f64> {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    // Purpose
    // -------
    // DW must match the closed form and map onto the fixed bands.
    //
    // Given
    // -----
    // - Alternating residuals (DW = 12/4 = 3).
    // - Two long runs (DW = 4/8 = 0.5).
    //
    // Expect
    // ------
    // - Negative and Positive bands respectively.
    fn durbin_watson_matches_closed_form_and_bands() {
        // Arrange
        let alternating = [1.0, -1.0, 1.0, -1.0];
        let runs = [1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0];

        // Act
        let a = durbin_watson(&alternating).unwrap();
        let r = durbin_watson(&runs).unwrap();

        // Assert
        assert!((a.statistic - 3.0).abs() < 1e-12);
        assert_eq!(a.band, AutocorrelationBand::Negative);
        assert!((r.statistic - 0.5).abs() < 1e-12);
        assert_eq!(r.band, AutocorrelationBand::Positive);
        assert_eq!(AutocorrelationBand::from_statistic(2.0), AutocorrelationBand::Neutral);
    }

    #[test]
    fn durbin_watson_rejects_all_zero_residuals() {
        assert_eq!(durbin_watson(&[0.0, 0.0, 0.0]), Err(DiagnosticsError::ZeroVariance));
    }

    #[test]
    fn acf_of_alternating_series() {
        let x = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0];

        let rho = acf(&x, 2).unwrap();

        assert!((rho[0] + 5.0 / 6.0).abs() < 1e-12);
        assert!((rho[1] - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Ljung–Box must not reject white noise and must reject an AR(1)
    // series with φ = 0.9.
    //
    // Given
    // -----
    // - 200 seeded N(0, 1) draws and the AR(1) recursion driven by them.
    //
    // Expect
    // ------
    // - L = 10 in both cases; p > 1e-3 for noise, p < 1e-6 for AR(1).
    fn ljung_box_separates_noise_from_autocorrelation() {
        // Arrange
        let noise = white_noise(200, 7);
        let mut ar1 = vec![0.0; noise.len()];
        for t in 1..noise.len() {
            ar1[t] = 0.9 * ar1[t - 1] + noise[t];
        }

        // Act
        let lb_noise = ljung_box(&noise, 10).unwrap();
        let lb_ar1 = ljung_box(&ar1, 10).unwrap();

        // Assert
        assert_eq!(lb_noise.lags, 10);
        assert!(lb_noise.p_value > 1e-3, "p = {}", lb_noise.p_value);
        assert!(lb_ar1.p_value < 1e-6, "p = {}", lb_ar1.p_value);
    }

    #[test]
    fn ljung_box_lag_is_capped_by_a_third_of_n() {
        assert_eq!(ljung_box_lags(12, 10), 4);
        assert_eq!(ljung_box_lags(100, 10), 10);
        let lb = ljung_box(&white_noise(12, 3), 10).unwrap();
        assert_eq!(lb.lags, 4);
    }

    #[test]
    fn moments_of_skewed_and_constant_samples() {
        let mut skewed = [0.0; 10];
        skewed[9] = 10.0;

        assert!(skewness(&skewed) > 1.0);
        assert!(excess_kurtosis(&skewed) > -3.0);
        assert_eq!(skewness(&[2.0; 5]), 0.0);
        assert_eq!(excess_kurtosis(&[2.0; 5]), 0.0);
        assert!(skewness(&[-1.0, 0.0, 1.0]).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Jarque–Bera accepts Gaussian noise and rejects a heavily skewed
    // sample.
    fn jarque_bera_flags_non_gaussian_residuals() {
        // Arrange
        let noise = white_noise(400, 11);
        let skewed: Vec<f64> = noise.iter().map(|v| v.exp()).collect();

        // Act
        let jb_noise = jarque_bera(&noise).unwrap();
        let jb_skewed = jarque_bera(&skewed).unwrap();

        // Assert
        assert!(jb_noise.p_value > 1e-3, "p = {}", jb_noise.p_value);
        assert!(jb_skewed.p_value < 1e-6);
        assert!(jb_skewed.skewness > 1.0);
    }
}
