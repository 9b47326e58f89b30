//! models::par2 — phase-gated AR(2) fits for a (target, clock) pair.
//!
//! Purpose
//! -------
//! Test whether a target series' AR(2) dynamics are modulated by the
//! circadian phase of a companion clock series. The clock is summarized by
//! a single-harmonic cosinor fit; its phase φ gates both lag terms through
//! cosine/sine interactions:
//!
//! Rₜ = β₀ + β₁Rₜ₋₁ + β₂Rₜ₋₁cos φₜ₋₁ + β₃Rₜ₋₁sin φₜ₋₁
//!         + β₄Rₜ₋₂ + β₅Rₜ₋₂cos φₜ₋₂ + β₆Rₜ₋₂sin φₜ₋₂ + εₜ.
//!
//! Key behaviors
//! -------------
//! - [`fit_par2_core`] filters the pair, derives phases, fits the 7-term
//!   design and applies the within-pair Bonferroni rule to the four phase
//!   interaction terms.
//! - [`fit_par2`] adds the effect size against the nested AR(2) baseline
//!   and the optional comparison / diagnostics / cross-validation /
//!   bootstrap blocks requested in [`AnalysisOptions`].
//!
//! Invariants & assumptions
//! ------------------------
//! - At least `data::MIN_OBSERVATIONS` finite timestamps after pairwise
//!   filtering, giving n − 2 ≥ 8 design rows for 7 parameters.
//! - The AR(2) baseline is fitted on exactly the PAR(2) response rows.
//!
//! Conventions
//! -----------
//! - Term order and names follow [`PAR2_TERM_NAMES`]; indices
//!   [`PHASE_TERM_INDICES`] are the interaction terms.
//! - `significant_terms` uses raw per-term p-values; the pair-level
//!   `significant` flag uses the Bonferroni-corrected minimum.
use crate::{
    data::PairedSeries,
    diagnostics::{DiagnosticsResult, run_diagnostics},
    eigen::{EigenResult, solve_ar2},
    models::comparison::{ModelComparison, compare_models},
    multiple_testing::within_pair_bonferroni,
    options::{AnalysisOptions, DiagnosticsOptions},
    regression::{CosinorFit, FitResult, RegressionResult, fit_cosinor, ols},
    resampling::{BootstrapResult, CrossValidationResult, bootstrap_cosinor, leave_one_out},
    special::student_t_quantile,
};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Names of the seven PAR(2) terms in design-column order.
pub const PAR2_TERM_NAMES: [&str; 7] =
    ["const", "R_n_1", "R_n_1_cos", "R_n_1_sin", "R_n_2", "R_n_2_cos", "R_n_2_sin"];

/// Column indices of the four phase-interaction terms.
pub const PHASE_TERM_INDICES: [usize; 4] = [2, 3, 5, 6];

/// Column indices of the nested AR(2) baseline [1, Rₜ₋₁, Rₜ₋₂].
pub const AR2_BASELINE_INDICES: [usize; 3] = [0, 1, 4];

/// One estimated PAR(2) term with its 95% confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Par2Term {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_stat: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Par2Result — core PAR(2) fit for one pair.
///
/// Fields
/// ------
/// - `terms`: seven terms in [`PAR2_TERM_NAMES`] order.
/// - `significant_terms`: names of phase terms with raw p < threshold.
/// - `min_phase_p`: smallest raw p-value among the phase terms.
/// - `bonferroni_p`: min(1, 4 · `min_phase_p`).
/// - `significant`: `bonferroni_p < threshold`.
/// - `clock`: cosinor fit that produced the phases.
/// - `eigen`: roots of the phase-averaged lag coefficients (β₁, β₄).
/// - `regression`: full OLS output, including residuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Par2Result {
    pub terms: Vec<Par2Term>,
    pub significant_terms: Vec<String>,
    pub min_phase_p: f64,
    pub bonferroni_p: f64,
    pub significant: bool,
    pub threshold: f64,
    pub r_squared: f64,
    pub n: usize,
    pub clock: CosinorFit,
    pub eigen: EigenResult,
    pub regression: RegressionResult,
}

impl Par2Result {
    pub fn term(&self, name: &str) -> Option<&Par2Term> {
        self.terms.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectSizeLabel {
    Negligible,
    Small,
    Medium,
    Large,
}

/// Cohen's f² of the phase terms over the nested AR(2) baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    pub cohens_f2: f64,
    pub label: EffectSizeLabel,
    pub r_squared_par2: f64,
    pub r_squared_ar2: f64,
}

impl EffectSize {
    /// f² = (R²_full − R²_reduced) / (1 − R²_full), floored at zero.
    pub fn cohens_f2(r_squared_full: f64, r_squared_reduced: f64) -> Self {
        let gain = (r_squared_full - r_squared_reduced).max(0.0);
        let unexplained = 1.0 - r_squared_full;
        let f2 = if gain == 0.0 {
            0.0
        } else if unexplained <= 1e-12 {
            f64::INFINITY
        } else {
            gain / unexplained
        };
        let label = match f2 {
            f if f < 0.02 => EffectSizeLabel::Negligible,
            f if f < 0.15 => EffectSizeLabel::Small,
            f if f < 0.35 => EffectSizeLabel::Medium,
            _ => EffectSizeLabel::Large,
        };
        EffectSize {
            cohens_f2: f2,
            label,
            r_squared_par2: r_squared_full,
            r_squared_ar2: r_squared_reduced,
        }
    }
}

/// EnhancedPar2Result — PAR(2) fit plus the optional analysis blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedPar2Result {
    pub result: Par2Result,
    pub effect_size: EffectSize,
    pub comparison: Option<ModelComparison>,
    pub diagnostics: Option<DiagnosticsResult>,
    pub cross_validation: Option<CrossValidationResult>,
    pub bootstrap: Option<BootstrapResult>,
}

/// PAR(2) design matrix and response for rows t = 2..n.
///
/// `phases[t]` is the clock phase at timestamp t; `target` and `phases`
/// must have equal length.
pub fn par2_design(
    target: ArrayView1<'_, f64>, phases: ArrayView1<'_, f64>,
) -> (Array2<f64>, Array1<f64>) {
    let n = target.len().min(phases.len());
    let rows = n.saturating_sub(2);
    let mut design = Array2::ones((rows, 7));
    let mut response = Array1::zeros(rows);
    for r in 0..rows {
        let t = r + 2;
        let (lag1, lag2) = (target[t - 1], target[t - 2]);
        let (ph1, ph2) = (phases[t - 1], phases[t - 2]);
        design[[r, 1]] = lag1;
        design[[r, 2]] = lag1 * ph1.cos();
        design[[r, 3]] = lag1 * ph1.sin();
        design[[r, 4]] = lag2;
        design[[r, 5]] = lag2 * ph2.cos();
        design[[r, 6]] = lag2 * ph2.sin();
        response[r] = target[t];
    }
    (design, response)
}

/// Fit the core PAR(2) model for one pair.
///
/// Parameters
/// ----------
/// - `series`: paired (time, target, clock); non-finite timestamps are
///   dropped jointly.
/// - `period`: clock period for the cosinor phase.
/// - `threshold`: significance level for per-term and corrected tests.
///
/// Errors
/// ------
/// - `FitError::InsufficientData` when fewer than `data::MIN_OBSERVATIONS`
///   timestamps survive filtering.
/// - `FitError::InvalidPeriod` / `FitError::SingularMatrix` from the clock
///   cosinor or the PAR(2) regression.
pub fn fit_par2_core(series: &PairedSeries, period: f64, threshold: f64) -> FitResult<Par2Result> {
    let clean = series.filtered()?;
    let clock = fit_cosinor(clean.time.view(), clean.clock.view(), period)?;
    let phases = clock.phases(clean.time.view());
    par2_from_phases(clean.target.view(), phases.view(), clock, threshold)
}

pub(crate) fn par2_from_phases(
    target: ArrayView1<'_, f64>, phases: ArrayView1<'_, f64>, clock: CosinorFit, threshold: f64,
) -> FitResult<Par2Result> {
    let (design, response) = par2_design(target, phases);
    let regression = ols(design.view(), response.view())?;

    let t_crit = student_t_quantile(0.975, regression.df as f64);
    let terms: Vec<Par2Term> = PAR2_TERM_NAMES
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = regression.coefficients[j];
            let half = t_crit * regression.standard_errors[j];
            Par2Term {
                name: (*name).to_string(),
                estimate,
                std_error: regression.standard_errors[j],
                t_stat: regression.t_stats[j],
                p_value: regression.p_values[j],
                ci_lower: estimate - half,
                ci_upper: estimate + half,
            }
        })
        .collect();

    let significant_terms = PHASE_TERM_INDICES
        .iter()
        .filter(|&&j| regression.p_values[j] < threshold)
        .map(|&j| PAR2_TERM_NAMES[j].to_string())
        .collect();
    let min_phase_p =
        PHASE_TERM_INDICES.iter().map(|&j| regression.p_values[j]).fold(1.0_f64, f64::min);
    let bonferroni_p = within_pair_bonferroni(min_phase_p, PHASE_TERM_INDICES.len());

    Ok(Par2Result {
        terms,
        significant_terms,
        min_phase_p,
        bonferroni_p,
        significant: bonferroni_p < threshold,
        threshold,
        r_squared: regression.r_squared,
        n: target.len(),
        eigen: solve_ar2(regression.coefficients[1], regression.coefficients[4]),
        clock,
        regression,
    })
}

/// Fit PAR(2) for one pair with the blocks requested in `options`.
///
/// Optional blocks that fail (e.g. a singular ARX design or a bootstrap with
/// no valid resample) are reported as `None`; only the core fit can fail
/// the call.
pub fn fit_par2(series: &PairedSeries, options: &AnalysisOptions) -> FitResult<EnhancedPar2Result> {
    let clean = series.filtered()?;
    let clock = fit_cosinor(clean.time.view(), clean.clock.view(), options.period)?;
    let phases = clock.phases(clean.time.view());
    let result = par2_from_phases(
        clean.target.view(),
        phases.view(),
        clock,
        options.significance_threshold,
    )?;

    let (design, response) = par2_design(clean.target.view(), phases.view());
    let baseline = design.select(Axis(1), &AR2_BASELINE_INDICES);
    let r2_ar2 = ols(baseline.view(), response.view()).map(|f| f.r_squared).unwrap_or(0.0);
    let effect_size = EffectSize::cohens_f2(result.r_squared, r2_ar2);

    let comparison = if options.include_model_comparison {
        compare_models(
            clean.target.view(),
            clean.clock.view(),
            phases.view(),
            options.significance_threshold,
        )
        .map_err(|err| debug!(error = %err, "model comparison skipped"))
        .ok()
    } else {
        None
    };

    let diagnostics = options.include_diagnostics.then(|| {
        let diag_opts = DiagnosticsOptions {
            sampling_interval: clean.target_series().sampling_interval(),
            ..DiagnosticsOptions::default()
        };
        run_diagnostics(clean.target.view(), &diag_opts)
    });

    let cross_validation =
        options.include_cross_validation.then(|| leave_one_out(design.view(), response.view()));

    let bootstrap = if options.include_bootstrap {
        bootstrap_cosinor(
            clean.time.view(),
            clean.clock.view(),
            options.period,
            &options.resampling(options.bootstrap_iterations),
        )
        .map_err(|err| debug!(error = %err, "clock bootstrap skipped"))
        .ok()
    } else {
        None
    };

    Ok(EnhancedPar2Result {
        result,
        effect_size,
        comparison,
        diagnostics,
        cross_validation,
        bootstrap,
    })
}
