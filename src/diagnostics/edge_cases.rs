//! diagnostics::edge_cases — heuristic checks that qualify an AR(2) reading.
//!
//! Purpose
//! -------
//! Flag situations in which a fitted AR(2) eigenvalue modulus should not be
//! taken at face value: deterministic trends, small samples, a better
//! higher-order model, non-Gaussian or asymmetric residuals, and moduli
//! sitting on the unit circle.
//!
//! Key behaviors
//! -------------
//! - Every check returns an [`EdgeCaseDiagnostic`] whether or not it fires,
//!   so reports always list the same seven entries in the same order.
//! - `severity` is the severity of the outcome: `Info` for a check that did
//!   not fire, otherwise the level of the finding.
//!
//! Invariants & assumptions
//! ------------------------
//! - The sample-size → eigenvalue band table ([`eigenvalue_band`]) is an
//!   empirical lookup carried as-is.
//! - The observations-per-parameter check uses the n − 2 rows an AR(2)
//!   regression actually fits, spread over 3 parameters.
use crate::models::ar::fit_ar;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Normalized trend magnitude |slope·n/σ| above which a trend is present.
pub const TREND_THRESHOLD: f64 = 3.0;
/// Modulus above which a trend can masquerade as persistence.
pub const TREND_MODULUS_THRESHOLD: f64 = 0.9;
/// Parameters of the AR(2) model with intercept.
pub const AR2_PARAMETERS: usize = 3;
/// Unit-circle ambiguity window for the dominant modulus.
pub const BOUNDARY_WINDOW: (f64, f64) = (0.93, 1.07);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Identifier of each heuristic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCaseKind {
    Trend,
    EigenvalueBand,
    ObservationsPerParameter,
    ModelOrder,
    Nonlinearity,
    WaveformAsymmetry,
    UnitCircleBoundary,
}

/// EdgeCaseDiagnostic — outcome of one heuristic check.
///
/// Fields
/// ------
/// - `id`: which check produced this entry.
/// - `severity`: `Info` when not triggered, otherwise the finding's level.
/// - `triggered`: whether the check fired.
/// - `value`: the quantity the check thresholds (always finite).
/// - `detail`: human-readable explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCaseDiagnostic {
    pub id: EdgeCaseKind,
    pub severity: Severity,
    pub triggered: bool,
    pub value: f64,
    pub detail: String,
}

impl EdgeCaseDiagnostic {
    pub(crate) fn new(
        id: EdgeCaseKind, severity: Option<Severity>, value: f64, detail: String,
    ) -> Self {
        EdgeCaseDiagnostic {
            id,
            triggered: severity.is_some(),
            severity: severity.unwrap_or(Severity::Info),
            value: if value.is_finite() { value } else { 0.0 },
            detail,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() { 0.0 } else { values.iter().sum::<f64>() / values.len() as f64 }
}

/// Population standard deviation; 0 for fewer than two values.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Normalized linear trend |slope·n/σ| of `values` against their index.
pub fn normalized_trend(values: &[f64]) -> f64 {
    let n = values.len();
    let sigma = std_dev(values);
    if n < 3 || sigma <= f64::EPSILON {
        return 0.0;
    }
    let t_bar = (n - 1) as f64 / 2.0;
    let y_bar = mean(values);
    let (sxy, sxx) = values.iter().enumerate().fold((0.0, 0.0), |(sxy, sxx), (t, y)| {
        let dt = t as f64 - t_bar;
        (sxy + dt * (y - y_bar), sxx + dt * dt)
    });
    (sxy / sxx * n as f64 / sigma).abs()
}

/// (a) Deterministic trend. Critical only when the trend is strong AND the
/// fitted modulus exceeds [`TREND_MODULUS_THRESHOLD`].
pub fn trend_check(values: &[f64], modulus: f64) -> EdgeCaseDiagnostic {
    let magnitude = normalized_trend(values);
    let strong = magnitude > TREND_THRESHOLD;
    let (severity, detail) = match (strong, modulus > TREND_MODULUS_THRESHOLD) {
        (true, true) => (
            Some(Severity::Critical),
            format!(
                "Linear trend (|slope·n/σ| = {magnitude:.2}) with modulus {modulus:.3}; \
                 persistence may reflect the trend rather than AR dynamics"
            ),
        ),
        (true, false) => (
            None,
            format!("Linear trend (|slope·n/σ| = {magnitude:.2}) with moderate modulus"),
        ),
        _ => (None, format!("No material linear trend (|slope·n/σ| = {magnitude:.2})")),
    };
    EdgeCaseDiagnostic::new(EdgeCaseKind::Trend, severity, magnitude, detail)
}

/// Half-width of the eigenvalue uncertainty band for a sample of `n`.
pub fn eigenvalue_band(n: usize) -> f64 {
    match n {
        0..=14 => 0.25,
        15..=19 => 0.20,
        20..=29 => 0.15,
        30..=49 => 0.10,
        50..=99 => 0.05,
        100..=199 => 0.03,
        _ => 0.01,
    }
}

/// (b) Sample-size eigenvalue confidence band. Critical when
/// modulus ± band straddles 1, warning when the band is ±0.10 or wider.
pub fn eigenvalue_band_check(n: usize, modulus: f64) -> EdgeCaseDiagnostic {
    let band = eigenvalue_band(n);
    let straddles = modulus - band < 1.0 && modulus + band > 1.0;
    let severity = if straddles {
        Some(Severity::Critical)
    } else if band >= 0.10 {
        Some(Severity::Warning)
    } else {
        None
    };
    let detail = format!(
        "Eigenvalue modulus {modulus:.3} ± {band:.2} at n = {n}{}",
        if straddles { "; interval includes the unit circle" } else { "" }
    );
    EdgeCaseDiagnostic::new(EdgeCaseKind::EigenvalueBand, severity, band, detail)
}

/// (c) Observations per parameter, (n − 2) / 3. Warning below 10,
/// critical below 3.
pub fn observations_per_parameter_check(n: usize) -> EdgeCaseDiagnostic {
    let ratio = n.saturating_sub(2) as f64 / AR2_PARAMETERS as f64;
    let severity = if ratio < 3.0 {
        Some(Severity::Critical)
    } else if ratio < 10.0 {
        Some(Severity::Warning)
    } else {
        None
    };
    let detail = format!("{ratio:.1} effective observations per AR(2) parameter");
    EdgeCaseDiagnostic::new(EdgeCaseKind::ObservationsPerParameter, severity, ratio, detail)
}

/// (d) AR(3) versus AR(2) on identical rows. Fires when AR(3) lowers AIC
/// by at least 2 and raises R² by more than 0.02.
pub fn model_order_check(values: &[f64]) -> EdgeCaseDiagnostic {
    let fits = (values.len() > 1)
        .then(|| {
            let ar3 = fit_ar(ArrayView1::from(values), 3).ok()?;
            let ar2 = fit_ar(ArrayView1::from(&values[1..]), 2).ok()?;
            Some((ar2, ar3))
        })
        .flatten();
    let Some((ar2, ar3)) = fits else {
        return EdgeCaseDiagnostic::new(
            EdgeCaseKind::ModelOrder,
            None,
            0.0,
            "AR(3) comparison not available for this series".to_string(),
        );
    };
    let delta_aic = ar2.regression.aic() - ar3.regression.aic();
    let delta_r2 = ar3.regression.r_squared - ar2.regression.r_squared;
    let fires = delta_aic >= 2.0 && delta_r2 > 0.02;
    let detail = format!(
        "AR(3) changes AIC by {:.2} and R² by {delta_r2:+.3} relative to AR(2)",
        -delta_aic
    );
    EdgeCaseDiagnostic::new(
        EdgeCaseKind::ModelOrder,
        fires.then_some(Severity::Warning),
        delta_aic,
        detail,
    )
}

/// (e) Residual non-Gaussianity read as unmodeled nonlinearity.
pub fn nonlinearity_check(skewness: f64, excess_kurtosis: f64) -> EdgeCaseDiagnostic {
    let fires = skewness.abs() > 1.0 || excess_kurtosis.abs() > 3.0;
    let detail =
        format!("Residual skewness {skewness:.2}, excess kurtosis {excess_kurtosis:.2}");
    EdgeCaseDiagnostic::new(
        EdgeCaseKind::Nonlinearity,
        fires.then_some(Severity::Warning),
        skewness.abs().max(excess_kurtosis.abs()),
        detail,
    )
}

/// (f) Residual skew alone read as waveform asymmetry.
pub fn asymmetry_check(skewness: f64) -> EdgeCaseDiagnostic {
    let detail = format!("Residual skewness {skewness:.2}");
    EdgeCaseDiagnostic::new(
        EdgeCaseKind::WaveformAsymmetry,
        (skewness.abs() > 0.5).then_some(Severity::Info),
        skewness,
        detail,
    )
}

/// (g) Modulus inside the [0.93, 1.07] unit-circle ambiguity window.
pub fn unit_circle_check(modulus: f64) -> EdgeCaseDiagnostic {
    let (lo, hi) = BOUNDARY_WINDOW;
    let fires = modulus >= lo && modulus <= hi;
    let detail = if fires {
        format!("Modulus {modulus:.3} is too close to 1 to separate damped from sustained")
    } else {
        format!("Modulus {modulus:.3} is clear of the unit circle")
    };
    EdgeCaseDiagnostic::new(
        EdgeCaseKind::UnitCircleBoundary,
        fires.then_some(Severity::Warning),
        modulus,
        detail,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    // ---- Scope ----
    // Each check's threshold on both sides, plus the severity convention
    // (Info when not triggered).

    #[test]
    // Purpose
    // -------
    // A strong trend is critical only together with a high modulus.
    //
    // Given
    // -----
    // - y = t + small wiggle over 50 points (|slope·n/σ| ≈ √12 > 3).
    //
    // Expect
    // ------
    // - Modulus 0.95 → Critical, triggered.
    // - Modulus 0.5 → not triggered, Info.
    fn trend_needs_both_conditions() {
        // Arrange
        let values: Vec<f64> = (0..50).map(|t| t as f64 + 0.1 * (t as f64).sin()).collect();

        // Act
        let high = trend_check(&values, 0.95);
        let low = trend_check(&values, 0.5);

        // Assert
        assert!(high.triggered);
        assert_eq!(high.severity, Severity::Critical);
        assert!(high.value > TREND_THRESHOLD);
        assert!(!low.triggered);
        assert_eq!(low.severity, Severity::Info);
    }

    #[test]
    fn trend_of_constant_series_is_zero() {
        assert_eq!(normalized_trend(&[2.0; 20]), 0.0);
        assert!(!trend_check(&[2.0; 20], 0.99).triggered);
    }

    #[test]
    fn eigenvalue_band_table_edges() {
        assert_eq!(eigenvalue_band(10), 0.25);
        assert_eq!(eigenvalue_band(15), 0.20);
        assert_eq!(eigenvalue_band(29), 0.15);
        assert_eq!(eigenvalue_band(30), 0.10);
        assert_eq!(eigenvalue_band(99), 0.05);
        assert_eq!(eigenvalue_band(100), 0.03);
        assert_eq!(eigenvalue_band(200), 0.01);
    }

    #[test]
    fn eigenvalue_band_severity() {
        assert_eq!(eigenvalue_band_check(20, 0.9).severity, Severity::Critical);
        assert_eq!(eigenvalue_band_check(40, 0.5).severity, Severity::Warning);
        assert!(!eigenvalue_band_check(300, 0.5).triggered);
        assert_eq!(eigenvalue_band_check(300, 0.995).severity, Severity::Critical);
    }

    #[test]
    fn observations_per_parameter_thresholds() {
        // (n − 2) / 3: n = 8 → 2, n = 20 → 6, n = 32 → 10.
        assert_eq!(observations_per_parameter_check(8).severity, Severity::Critical);
        assert_eq!(observations_per_parameter_check(20).severity, Severity::Warning);
        assert!(!observations_per_parameter_check(32).triggered);
    }

    #[test]
    // Purpose
    // -------
    // A genuine third lag must be detected; the check degrades quietly on
    // series that are too short.
    //
    // Given
    // -----
    // - xₜ = 0.3xₜ₋₁ + 0.2xₜ₋₂ − 0.6xₜ₋₃ + N(0, 0.5²), 200 seeded points.
    //
    // Expect
    // ------
    // - Triggered with ΔAIC ≥ 2; a 5-point series is not triggered.
    fn model_order_detects_third_lag() {
        // Arrange
        let normal = Normal::new(0.0, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(33);
        let mut x = vec![0.5, -0.3, 0.8];
        for t in 3..200 {
            let noise = normal.sample(&mut rng);
            x.push(0.3 * x[t - 1] + 0.2 * x[t - 2] - 0.6 * x[t - 3] + noise);
        }

        // Act
        let check = model_order_check(&x);
        let short = model_order_check(&[1.0, 0.5, 0.2, 0.1, 0.0]);

        // Assert
        assert!(check.triggered, "{}", check.detail);
        assert!(check.value >= 2.0);
        assert!(!short.triggered);
    }

    #[test]
    fn residual_shape_checks() {
        assert!(nonlinearity_check(1.2, 0.0).triggered);
        assert!(nonlinearity_check(0.0, -3.5).triggered);
        assert!(!nonlinearity_check(0.4, 1.0).triggered);
        assert!(asymmetry_check(-0.6).triggered);
        assert_eq!(asymmetry_check(-0.6).severity, Severity::Info);
        assert!(!asymmetry_check(0.3).triggered);
    }

    #[test]
    fn unit_circle_window_is_inclusive() {
        assert!(unit_circle_check(0.93).triggered);
        assert!(unit_circle_check(1.07).triggered);
        assert!(!unit_circle_check(0.92).triggered);
        assert!(!unit_circle_check(1.08).triggered);
    }
}
