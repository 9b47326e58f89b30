//! multiple_testing::fdr — Benjamini–Hochberg and Bonferroni corrections.
//!
//! Purpose
//! -------
//! Correct a batch of p-values for multiplicity. Benjamini–Hochberg bounds
//! the expected false-discovery proportion; Bonferroni bounds the
//! family-wise error rate and also serves as the within-pair correction of
//! the four PAR(2) phase-interaction tests.
//!
//! Key behaviors
//! -------------
//! - [`benjamini_hochberg`] sorts p ascending and walks from the largest
//!   rank down with q₍ᵢ₎ = min(q₍ᵢ₊₁₎, p₍ᵢ₎·m/i), capped at 1; q-values are
//!   returned in input order and a test is significant iff q < α.
//! - Non-finite p-values are treated as 1.
//! - `threshold` in the returned record is the largest raw p-value that was
//!   declared significant (0 when nothing is).
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionMethod {
    BenjaminiHochberg,
    Bonferroni,
}

/// FdrCorrection — corrected values for one family of tests.
///
/// Fields
/// ------
/// - `method`: correction applied.
/// - `alpha`: nominal level.
/// - `q_values`: adjusted p-values in input order.
/// - `significant`: `q_values[i] < alpha`, in input order.
/// - `significant_count`: number of `true` entries in `significant`.
/// - `threshold`: largest raw p-value declared significant, 0 if none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdrCorrection {
    pub method: CorrectionMethod,
    pub alpha: f64,
    pub q_values: Vec<f64>,
    pub significant: Vec<bool>,
    pub significant_count: usize,
    pub threshold: f64,
}

#[inline]
fn sanitize(p: f64) -> f64 {
    if p.is_finite() { p.clamp(0.0, 1.0) } else { 1.0 }
}

fn finish(method: CorrectionMethod, alpha: f64, raw: &[f64], q_values: Vec<f64>) -> FdrCorrection {
    let significant: Vec<bool> = q_values.iter().map(|&q| q < alpha).collect();
    let significant_count = significant.iter().filter(|&&s| s).count();
    let threshold = raw
        .iter()
        .zip(significant.iter())
        .filter(|(_, s)| **s)
        .map(|(&p, _)| p)
        .fold(0.0_f64, f64::max);
    FdrCorrection { method, alpha, q_values, significant, significant_count, threshold }
}

/// Benjamini–Hochberg step-up correction at level `alpha`.
pub fn benjamini_hochberg(p_values: &[f64], alpha: f64) -> FdrCorrection {
    let raw: Vec<f64> = p_values.iter().map(|&p| sanitize(p)).collect();
    let m = raw.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| raw[a].total_cmp(&raw[b]));

    let mut q_values = vec![1.0; m];
    let mut running = 1.0_f64;
    for (rank0, &idx) in order.iter().enumerate().rev() {
        let rank = (rank0 + 1) as f64;
        running = running.min(raw[idx] * m as f64 / rank).min(1.0);
        q_values[idx] = running;
    }
    finish(CorrectionMethod::BenjaminiHochberg, alpha, &raw, q_values)
}

/// Bonferroni correction: q = min(1, m·p).
pub fn bonferroni(p_values: &[f64], alpha: f64) -> FdrCorrection {
    let raw: Vec<f64> = p_values.iter().map(|&p| sanitize(p)).collect();
    let m = raw.len() as f64;
    let q_values = raw.iter().map(|&p| (p * m).min(1.0)).collect();
    finish(CorrectionMethod::Bonferroni, alpha, &raw, q_values)
}

/// Within-pair Bonferroni: min(1, `tests` · `min_p`).
#[inline]
pub fn within_pair_bonferroni(min_p: f64, tests: usize) -> f64 {
    (sanitize(min_p) * tests.max(1) as f64).min(1.0)
}
