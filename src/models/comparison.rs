//! models::comparison — PAR(2) vs ARX vs AR(2) vs null on shared rows.
//!
//! Purpose
//! -------
//! Decide whether the phase-gated model earns its extra parameters. Four
//! models are fitted to the same response rows Rₜ, t = 2..n:
//!
//! | model | k | regressors                                   |
//! |-------|---|----------------------------------------------|
//! | null  | 1 | 1                                            |
//! | AR(2) | 3 | 1, Rₜ₋₁, Rₜ₋₂                                  |
//! | ARX   | 5 | 1, Rₜ₋₁, Rₜ₋₂, Cₜ₋₁, Cₜ₋₂                        |
//! | PAR(2)| 7 | AR(2) terms plus the four phase interactions |
//!
//! Key behaviors
//! -------------
//! - Nested pairs null ⊂ ARX, null ⊂ PAR(2) and AR(2) ⊂ PAR(2) get an
//!   F-test and a likelihood-ratio test.
//! - The richer model of a nested pair is preferred only when AIC or BIC
//!   improves by more than [`IC_MARGIN`] and at least one test rejects at
//!   the significance level; otherwise the pair is indistinguishable.
//! - PAR(2) vs ARX is non-nested and compared on information criteria
//!   alone: one side is preferred only when both AIC and BIC favour it by
//!   more than [`IC_MARGIN`].
use crate::{
    models::par2::{AR2_BASELINE_INDICES, par2_design},
    regression::{FitError, FitResult, RegressionResult, ols},
    special::{chi_squared_sf, f_sf},
};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Information-criterion improvement required to prefer a model.
pub const IC_MARGIN: f64 = 2.0;

const SSE_FLOOR: f64 = 1e-300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Null,
    AR2,
    ARX,
    PAR2,
}

impl ModelKind {
    pub fn parameter_count(self) -> usize {
        match self {
            ModelKind::Null => 1,
            ModelKind::AR2 => 3,
            ModelKind::ARX => 5,
            ModelKind::PAR2 => 7,
        }
    }
}

/// Fit summary of one candidate model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFit {
    pub kind: ModelKind,
    pub k: usize,
    pub n: usize,
    pub sse: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub r_squared: f64,
}

impl ModelFit {
    fn from_regression(kind: ModelKind, fit: &RegressionResult) -> Self {
        ModelFit {
            kind,
            k: fit.k,
            n: fit.n,
            sse: fit.sse,
            log_likelihood: fit.log_likelihood(),
            aic: fit.aic(),
            bic: fit.bic(),
            r_squared: fit.r_squared,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Preferred(ModelKind),
    Indistinguishable,
}

/// F-test and likelihood-ratio test of a restricted model inside a fuller
/// one. `delta_aic` / `delta_bic` are restricted minus full (positive
/// favours the full model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedTest {
    pub restricted: ModelKind,
    pub full: ModelKind,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub lr_statistic: f64,
    pub lr_p_value: f64,
    pub df: usize,
    pub delta_aic: f64,
    pub delta_bic: f64,
    pub verdict: Verdict,
}

/// Information-criterion comparison of two non-nested models; deltas are
/// `second − first` (positive favours `first`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonNestedComparison {
    pub first: ModelKind,
    pub second: ModelKind,
    pub delta_aic: f64,
    pub delta_bic: f64,
    pub verdict: Verdict,
}

/// ModelComparison — all fits, tests and the resulting verdicts.
///
/// Fields
/// ------
/// - `models`: null, AR(2), ARX and PAR(2) fit summaries.
/// - `nested`: tests for null ⊂ ARX, null ⊂ PAR(2), AR(2) ⊂ PAR(2).
/// - `par2_vs_arx`: non-nested comparison.
/// - `best_by_aic`: model with the lowest AIC.
/// - `par2_supported`: PAR(2) is preferred over both AR(2) and null and
///   ARX is not preferred over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub models: Vec<ModelFit>,
    pub nested: Vec<NestedTest>,
    pub par2_vs_arx: NonNestedComparison,
    pub best_by_aic: ModelKind,
    pub par2_supported: bool,
}

impl ModelComparison {
    pub fn model(&self, kind: ModelKind) -> Option<&ModelFit> {
        self.models.iter().find(|m| m.kind == kind)
    }

    pub fn nested_test(&self, restricted: ModelKind, full: ModelKind) -> Option<&NestedTest> {
        self.nested.iter().find(|t| t.restricted == restricted && t.full == full)
    }
}

/// Nested-model F-test and LRT between two fits on the same rows.
pub fn nested_test(
    restricted_kind: ModelKind, restricted: &ModelFit, full_kind: ModelKind, full: &ModelFit,
    alpha: f64,
) -> NestedTest {
    let df = full.k.saturating_sub(restricted.k);
    let df_resid = full.n.saturating_sub(full.k);
    let sse_r = restricted.sse.max(SSE_FLOOR);
    let sse_f = full.sse.max(SSE_FLOOR);
    let gain = (sse_r - sse_f).max(0.0);

    let (f_statistic, f_p_value) = if df == 0 || df_resid == 0 {
        (0.0, 1.0)
    } else {
        let f = (gain / df as f64) / (sse_f / df_resid as f64);
        (f, f_sf(f, df as f64, df_resid as f64))
    };
    let lr_statistic = (full.n as f64 * (sse_r / sse_f).ln()).max(0.0);
    let lr_p_value = if df == 0 { 1.0 } else { chi_squared_sf(lr_statistic, df as f64) };

    let delta_aic = restricted.aic - full.aic;
    let delta_bic = restricted.bic - full.bic;
    let ic_improves = delta_aic > IC_MARGIN || delta_bic > IC_MARGIN;
    let test_agrees = f_p_value < alpha || lr_p_value < alpha;
    let verdict = if ic_improves && test_agrees {
        Verdict::Preferred(full_kind)
    } else {
        Verdict::Indistinguishable
    };

    NestedTest {
        restricted: restricted_kind,
        full: full_kind,
        f_statistic,
        f_p_value,
        lr_statistic,
        lr_p_value,
        df,
        delta_aic,
        delta_bic,
        verdict,
    }
}

/// Information-criterion comparison of two non-nested fits.
pub fn non_nested_comparison(first: &ModelFit, second: &ModelFit) -> NonNestedComparison {
    let delta_aic = second.aic - first.aic;
    let delta_bic = second.bic - first.bic;
    let verdict = if delta_aic > IC_MARGIN && delta_bic > IC_MARGIN {
        Verdict::Preferred(first.kind)
    } else if delta_aic < -IC_MARGIN && delta_bic < -IC_MARGIN {
        Verdict::Preferred(second.kind)
    } else {
        Verdict::Indistinguishable
    };
    NonNestedComparison { first: first.kind, second: second.kind, delta_aic, delta_bic, verdict }
}

/// ARX design [1, Rₜ₋₁, Rₜ₋₂, Cₜ₋₁, Cₜ₋₂] for rows t = 2..n.
pub fn arx_design(target: ArrayView1<'_, f64>, clock: ArrayView1<'_, f64>) -> Array2<f64> {
    let rows = target.len().min(clock.len()).saturating_sub(2);
    let mut design = Array2::ones((rows, 5));
    for r in 0..rows {
        let t = r + 2;
        design[[r, 1]] = target[t - 1];
        design[[r, 2]] = target[t - 2];
        design[[r, 3]] = clock[t - 1];
        design[[r, 4]] = clock[t - 2];
    }
    design
}

/// Fit null, AR(2), ARX and PAR(2) to the same rows and compare them.
///
/// Parameters
/// ----------
/// - `target`, `clock`, `phases`: filtered, aligned arrays of equal length.
/// - `alpha`: significance level for the nested tests.
///
/// Errors
/// ------
/// - `FitError::LengthMismatch` if the arrays differ in length.
/// - Any `FitError` from the four regressions (e.g. a constant clock makes
///   the ARX design singular).
pub fn compare_models(
    target: ArrayView1<'_, f64>, clock: ArrayView1<'_, f64>, phases: ArrayView1<'_, f64>,
    alpha: f64,
) -> FitResult<ModelComparison> {
    for len in [clock.len(), phases.len()] {
        if len != target.len() {
            return Err(FitError::LengthMismatch { expected: target.len(), actual: len });
        }
    }
    let (par2_x, response) = par2_design(target, phases);
    let null_x = Array2::ones((response.len(), 1));
    let ar2_x = par2_x.select(Axis(1), &AR2_BASELINE_INDICES);
    let arx_x = arx_design(target, clock);

    let null = ModelFit::from_regression(ModelKind::Null, &ols(null_x.view(), response.view())?);
    let ar2 = ModelFit::from_regression(ModelKind::AR2, &ols(ar2_x.view(), response.view())?);
    let arx = ModelFit::from_regression(ModelKind::ARX, &ols(arx_x.view(), response.view())?);
    let par2 = ModelFit::from_regression(ModelKind::PAR2, &ols(par2_x.view(), response.view())?);

    let nested = vec![
        nested_test(ModelKind::Null, &null, ModelKind::ARX, &arx, alpha),
        nested_test(ModelKind::Null, &null, ModelKind::PAR2, &par2, alpha),
        nested_test(ModelKind::AR2, &ar2, ModelKind::PAR2, &par2, alpha),
    ];
    let par2_vs_arx = non_nested_comparison(&par2, &arx);

    let par2_supported = nested[1].verdict == Verdict::Preferred(ModelKind::PAR2)
        && nested[2].verdict == Verdict::Preferred(ModelKind::PAR2)
        && par2_vs_arx.verdict != Verdict::Preferred(ModelKind::ARX);

    let models = vec![null, ar2, arx, par2];
    let best_by_aic = models
        .iter()
        .min_by(|a, b| a.aic.total_cmp(&b.aic))
        .map(|m| m.kind)
        .unwrap_or(ModelKind::Null);

    Ok(ModelComparison { models, nested, par2_vs_arx, best_by_aic, par2_supported })
}
