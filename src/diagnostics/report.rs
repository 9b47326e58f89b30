//! diagnostics::report — the aggregate diagnostics entry point.
//!
//! Purpose
//! -------
//! Run the full diagnostics suite on one numeric series: fit AR(2), test
//! the residuals, check stationarity, evaluate the seven edge cases and
//! score confidence. This is the entry point used both by the per-pair
//! PAR(2) pipeline and by external simulators that hand over arbitrary
//! arrays with no biological meaning attached.
//!
//! Key behaviors
//! -------------
//! - [`run_diagnostics`] never fails. Non-finite values are dropped; a
//!   series with fewer than `data::MIN_OBSERVATIONS` finite values, or one
//!   whose AR(2) fit is singular, yields an `Unreliable` result with score
//!   0 and a `failure` message. Such a result carries no penalties; the
//!   confidence table (including its `tiny_sample` row) is never consulted.
//! - Individual tests that cannot be computed appear as failed
//!   [`QualityCheck`]s with a "not computed" explanation and `None` in the
//!   corresponding statistic field.
//! - Every numeric field is finite; undefined quantities are `None`.
//!
//! Conventions
//! -----------
//! - Residual tests run on AR(2) residuals; ADF and the trend check run on
//!   the raw (filtered) series.
use crate::{
    data::MIN_OBSERVATIONS,
    diagnostics::{
        confidence::{
            AppliedPenalty, ConfidenceLevel, ConfidenceScore, ScoringContext, score_confidence,
        },
        edge_cases::{
            EdgeCaseDiagnostic, EdgeCaseKind, Severity, asymmetry_check, eigenvalue_band_check,
            model_order_check, nonlinearity_check, observations_per_parameter_check, std_dev,
            trend_check, unit_circle_check,
        },
        errors::DiagnosticsError,
        residual_tests::{
            AutocorrelationBand, DurbinWatson, JarqueBera, LjungBox, acf, durbin_watson,
            excess_kurtosis, jarque_bera, ljung_box, ljung_box_lags, skewness,
        },
        stationarity::{AdfResult, augmented_dickey_fuller},
    },
    eigen::EigenResult,
    models::ar::{AR2Fit, fit_ar2},
    options::DiagnosticsOptions,
};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// R² below which the AR(2) quality check fails.
const R_SQUARED_THRESHOLD: f64 = 0.3;
/// Two-sided 95 % normal quantile for ACF significance bands.
const ACF_Z: f64 = 1.96;

/// Ar2Summary — the AR(2) reading the diagnostics qualify.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ar2Summary {
    pub intercept: f64,
    pub phi1: f64,
    pub phi2: f64,
    pub r_squared: f64,
    pub modulus: f64,
    pub eigen: EigenResult,
    /// In units of `DiagnosticsOptions::sampling_interval`.
    pub eigenperiod: Option<f64>,
    pub half_life: Option<f64>,
    pub stable: bool,
}

impl Ar2Summary {
    fn from_fit(fit: &AR2Fit, sampling_interval: f64) -> Self {
        let stability = fit.eigen.stability();
        Ar2Summary {
            intercept: fit.intercept,
            phi1: fit.phi1,
            phi2: fit.phi2,
            r_squared: fit.r_squared,
            modulus: fit.modulus(),
            eigen: fit.eigen,
            eigenperiod: fit.eigen.eigenperiod(sampling_interval),
            half_life: stability.half_life.map(|h| h * sampling_interval),
            stable: stability.stable,
        }
    }
}

/// QualityCheck — pass/fail summary of one diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub name: String,
    pub passed: bool,
    pub value: f64,
    pub explanation: String,
    pub severity: Severity,
}

impl QualityCheck {
    fn new(name: &str, passed: bool, value: f64, explanation: String, failed: Severity) -> Self {
        QualityCheck {
            name: name.to_string(),
            passed,
            value: if value.is_finite() { value } else { 0.0 },
            explanation,
            severity: if passed { Severity::Info } else { failed },
        }
    }

    fn not_computed(name: &str, err: &DiagnosticsError) -> Self {
        QualityCheck::new(name, false, 0.0, format!("not computed: {err}"), Severity::Warning)
    }
}

/// DiagnosticsResult — everything [`run_diagnostics`] learned about a series.
///
/// Fields
/// ------
/// - `n`: finite observations analyzed.
/// - `ar2`: the AR(2) fit summary (`None` when no fit was possible).
/// - `durbin_watson`, `ljung_box`, `jarque_bera`, `adf`: individual test
///   outcomes, `None` when not computable.
/// - `edge_cases`: the seven heuristic checks in fixed order.
/// - `quality_checks`: pass/fail view of the tests.
/// - `score`, `level`, `penalties`: confidence scoring.
/// - `failure`: why the series could not be analyzed, if it could not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsResult {
    pub n: usize,
    pub ar2: Option<Ar2Summary>,
    pub durbin_watson: Option<DurbinWatson>,
    pub ljung_box: Option<LjungBox>,
    pub jarque_bera: Option<JarqueBera>,
    pub adf: Option<AdfResult>,
    pub edge_cases: Vec<EdgeCaseDiagnostic>,
    pub quality_checks: Vec<QualityCheck>,
    pub score: f64,
    pub level: ConfidenceLevel,
    pub penalties: Vec<AppliedPenalty>,
    pub failure: Option<String>,
}

impl DiagnosticsResult {
    fn unreliable(n: usize, failure: String) -> Self {
        let ConfidenceScore { score, level, penalties } = ConfidenceScore::unreliable();
        DiagnosticsResult {
            n,
            ar2: None,
            durbin_watson: None,
            ljung_box: None,
            jarque_bera: None,
            adf: None,
            edge_cases: Vec::new(),
            quality_checks: Vec::new(),
            score,
            level,
            penalties,
            failure: Some(failure),
        }
    }

    /// Look up an edge case by identifier.
    pub fn edge_case(&self, id: EdgeCaseKind) -> Option<&EdgeCaseDiagnostic> {
        self.edge_cases.iter().find(|e| e.id == id)
    }

    pub fn triggered_edge_cases(&self) -> impl Iterator<Item = &EdgeCaseDiagnostic> {
        self.edge_cases.iter().filter(|e| e.triggered)
    }
}

/// σ / |mean| of the series; +∞ for a (numerically) zero mean.
fn coefficient_of_variation(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let sd = std_dev(values);
    if mean.abs() <= f64::EPSILON * sd.max(1.0) { f64::INFINITY } else { sd / mean.abs() }
}

/// Share of residual ACF lags with |ρ̂ₖ| > 1.96/√n.
fn significant_acf_fraction(residuals: &[f64], max_lag: usize) -> f64 {
    let lags = ljung_box_lags(residuals.len(), max_lag);
    match acf(residuals, lags) {
        Ok(rho) if !rho.is_empty() => {
            let band = ACF_Z / (residuals.len() as f64).sqrt();
            rho.iter().filter(|r| r.abs() > band).count() as f64 / rho.len() as f64
        }
        _ => 0.0,
    }
}

/// Run the complete diagnostics suite on `values`.
///
/// Parameters
/// ----------
/// - `values`: `ArrayView1<f64>`
///   Any numeric sequence. NaN and ±∞ entries are dropped first.
/// - `options`: `&DiagnosticsOptions`
///   Sampling interval (for eigenperiods and half-lives), Ljung–Box lag
///   cap, whiteness level and whether to run the AR(3) check.
///
/// Returns
/// -------
/// `DiagnosticsResult`
///   Always returned; see the module docs for the degraded cases.
pub fn run_diagnostics(
    values: ArrayView1<'_, f64>, options: &DiagnosticsOptions,
) -> DiagnosticsResult {
    let clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = clean.len();
    if n < MIN_OBSERVATIONS {
        return DiagnosticsResult::unreliable(
            n,
            format!("{n} finite observations; at least {MIN_OBSERVATIONS} are required"),
        );
    }
    let fit = match fit_ar2(ArrayView1::from(clean.as_slice())) {
        Ok(fit) => fit,
        Err(err) => return DiagnosticsResult::unreliable(n, format!("AR(2) fit failed: {err}")),
    };
    let summary = Ar2Summary::from_fit(&fit, options.sampling_interval);
    let residuals = fit.residuals.to_vec();
    let modulus = summary.modulus;

    let dw = durbin_watson(&residuals);
    let lb = ljung_box(&residuals, options.max_ljung_box_lag);
    let jb = jarque_bera(&residuals);
    let adf = augmented_dickey_fuller(&clean);
    let skew = skewness(&residuals);
    let kurt = excess_kurtosis(&residuals);

    let model_order = if options.include_model_order_check {
        model_order_check(&clean)
    } else {
        EdgeCaseDiagnostic::new(
            EdgeCaseKind::ModelOrder,
            None,
            0.0,
            "AR(3) comparison disabled".to_string(),
        )
    };
    let edge_cases = vec![
        trend_check(&clean, modulus),
        eigenvalue_band_check(n, modulus),
        observations_per_parameter_check(n),
        model_order,
        nonlinearity_check(skew, kurt),
        asymmetry_check(skew),
        unit_circle_check(modulus),
    ];
    let flag = |id: EdgeCaseKind| edge_cases.iter().any(|e| e.id == id && e.triggered);

    let residuals_white = lb.as_ref().is_ok_and(|lb| lb.p_value >= options.whiteness_alpha);
    let context = ScoringContext {
        n,
        residuals_white,
        r_squared: summary.r_squared,
        modulus,
        phi1: summary.phi1,
        phi2: summary.phi2,
        significant_acf_fraction: significant_acf_fraction(
            &residuals,
            options.max_ljung_box_lag,
        ),
        coefficient_of_variation: coefficient_of_variation(&clean),
        trend: flag(EdgeCaseKind::Trend),
        model_order: flag(EdgeCaseKind::ModelOrder),
        nonlinearity: flag(EdgeCaseKind::Nonlinearity),
        adf_failed: adf.as_ref().is_ok_and(|a| !a.stationary),
    };
    let ConfidenceScore { score, level, penalties } = score_confidence(&context);

    let quality_checks = vec![
        match &dw {
            Ok(d) => QualityCheck::new(
                "durbin_watson",
                d.band == AutocorrelationBand::Neutral,
                d.statistic,
                format!("DW = {:.3} ({:?} autocorrelation band)", d.statistic, d.band),
                Severity::Warning,
            ),
            Err(err) => QualityCheck::not_computed("durbin_watson", err),
        },
        match &lb {
            Ok(q) => QualityCheck::new(
                "ljung_box",
                residuals_white,
                q.p_value,
                format!("Q = {:.3} over {} lags, p = {:.4}", q.statistic, q.lags, q.p_value),
                Severity::Warning,
            ),
            Err(err) => QualityCheck::not_computed("ljung_box", err),
        },
        match &jb {
            Ok(j) => QualityCheck::new(
                "jarque_bera",
                j.p_value >= options.whiteness_alpha,
                j.p_value,
                format!("JB = {:.3}, p = {:.4}", j.statistic, j.p_value),
                Severity::Info,
            ),
            Err(err) => QualityCheck::not_computed("jarque_bera", err),
        },
        match &adf {
            Ok(a) => QualityCheck::new(
                "adf_stationarity",
                a.stationary,
                a.statistic,
                format!(
                    "ADF = {:.3} vs 5% critical value {:.3} ({} lags)",
                    a.statistic, a.critical_values.five_percent, a.lags
                ),
                Severity::Warning,
            ),
            Err(err) => QualityCheck::not_computed("adf_stationarity", err),
        },
        QualityCheck::new(
            "stability",
            summary.stable,
            modulus,
            format!("Dominant eigenvalue modulus {modulus:.4}"),
            Severity::Critical,
        ),
        QualityCheck::new(
            "r_squared",
            summary.r_squared >= R_SQUARED_THRESHOLD,
            summary.r_squared,
            format!("AR(2) R² = {:.3}", summary.r_squared),
            Severity::Warning,
        ),
    ];

    DiagnosticsResult {
        n,
        ar2: Some(summary),
        durbin_watson: dw.ok(),
        ljung_box: lb.ok(),
        jarque_bera: jb.ok(),
        adf: adf.ok(),
        edge_cases,
        quality_checks,
        score,
        level,
        penalties,
        failure: None,
    }
}
