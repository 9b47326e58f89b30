//! diagnostics::confidence — rule-table confidence scoring.
//!
//! Purpose
//! -------
//! Condense the individual diagnostics for one series into a single
//! 0–100 score and an ordinal [`ConfidenceLevel`]. Each penalty is a row in
//! [`CONFIDENCE_RULES`] — an identifier, a predicate over a
//! [`ScoringContext`], a fixed penalty, a severity and a message — and the
//! scorer applies every row uniformly.
//!
//! Key behaviors
//! -------------
//! - The score starts at 100, subtracts the penalties of every rule whose
//!   predicate holds, and is clamped to [0, 100].
//! - The sample-size tiers (n < 10 / < 30 / < 100) and the R² tiers
//!   (< 0.1 / < 0.3) are mutually exclusive: only the worst tier applies.
//! - Levels: High ≥ 75, Moderate ≥ 50, Low ≥ 25, else Unreliable.
//! - `tiny_sample` only fires for contexts scored directly through
//!   [`score_confidence`] or [`score_with`]: `run_diagnostics` returns an
//!   unscored Unreliable result below `data::MIN_OBSERVATIONS` first.
//!
//! Testing notes
//! -------------
//! - Predicates are plain `fn` items, so each rule is unit-tested against
//!   a hand-built context without running a fit.
use crate::diagnostics::edge_cases::Severity;
use serde::{Deserialize, Serialize};

/// Coefficient of variation at or above which the series is too noisy
/// relative to its level.
pub const CV_UPPER: f64 = 5.0;
/// Coefficient of variation below which the series is treated as constant.
pub const CV_FLOOR: f64 = 1e-3;
/// Fraction of significant residual ACF lags above which whiteness is
/// doubtful.
pub const ACF_LAG_FRACTION: f64 = 0.15;

/// Ordinal confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Unreliable,
    Low,
    Moderate,
    High,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            ConfidenceLevel::High
        } else if score >= 50.0 {
            ConfidenceLevel::Moderate
        } else if score >= 25.0 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::Unreliable
        }
    }
}

/// ScoringContext — the facts the confidence rules look at.
///
/// Fields
/// ------
/// - `n`: finite observations in the series.
/// - `residuals_white`: Ljung–Box did not reject whiteness.
/// - `r_squared`: AR(2) in-sample R².
/// - `modulus`: dominant eigenvalue modulus.
/// - `phi1`, `phi2`: AR(2) coefficients.
/// - `significant_acf_fraction`: share of residual ACF lags with
///   |ρ̂ₖ| > 1.96/√n.
/// - `coefficient_of_variation`: σ / |mean| of the raw series (∞ for a
///   zero-mean series).
/// - `trend`, `model_order`, `nonlinearity`: triggered edge-case flags.
/// - `adf_failed`: ADF did not call the series stationary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringContext {
    pub n: usize,
    pub residuals_white: bool,
    pub r_squared: f64,
    pub modulus: f64,
    pub phi1: f64,
    pub phi2: f64,
    pub significant_acf_fraction: f64,
    pub coefficient_of_variation: f64,
    pub trend: bool,
    pub model_order: bool,
    pub nonlinearity: bool,
    pub adf_failed: bool,
}

impl Default for ScoringContext {
    /// A context no rule fires on.
    fn default() -> Self {
        ScoringContext {
            n: 200,
            residuals_white: true,
            r_squared: 0.8,
            modulus: 0.6,
            phi1: 0.5,
            phi2: 0.2,
            significant_acf_fraction: 0.0,
            coefficient_of_variation: 0.3,
            trend: false,
            model_order: false,
            nonlinearity: false,
            adf_failed: false,
        }
    }
}

/// One row of the scoring table.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceRule {
    pub id: &'static str,
    pub applies: fn(&ScoringContext) -> bool,
    pub penalty: f64,
    pub severity: Severity,
    pub message: &'static str,
}

// Unreachable from `run_diagnostics`, which stops below 10 observations.
fn tiny_sample(c: &ScoringContext) -> bool {
    c.n < 10
}

fn small_sample(c: &ScoringContext) -> bool {
    (10..30).contains(&c.n)
}

fn moderate_sample(c: &ScoringContext) -> bool {
    (30..100).contains(&c.n)
}

fn non_white_residuals(c: &ScoringContext) -> bool {
    !c.residuals_white
}

fn very_low_r_squared(c: &ScoringContext) -> bool {
    c.r_squared < 0.1
}

fn low_r_squared(c: &ScoringContext) -> bool {
    (0.1..0.3).contains(&c.r_squared)
}

fn unstable(c: &ScoringContext) -> bool {
    c.modulus >= 1.0
}

fn implausible_coefficients(c: &ScoringContext) -> bool {
    c.phi1.abs() + c.phi2.abs() >= 3.0 || c.phi2.abs() >= 1.5
}

fn excess_acf_lags(c: &ScoringContext) -> bool {
    c.significant_acf_fraction > ACF_LAG_FRACTION
}

fn extreme_variation(c: &ScoringContext) -> bool {
    let cv = c.coefficient_of_variation;
    !cv.is_finite() || cv >= CV_UPPER || cv < CV_FLOOR
}

fn trend_flag(c: &ScoringContext) -> bool {
    c.trend
}

fn model_order_flag(c: &ScoringContext) -> bool {
    c.model_order
}

fn nonlinearity_flag(c: &ScoringContext) -> bool {
    c.nonlinearity
}

fn adf_failure(c: &ScoringContext) -> bool {
    c.adf_failed
}

pub const CONFIDENCE_RULES: &[ConfidenceRule] = &[
    ConfidenceRule {
        id: "tiny_sample",
        applies: tiny_sample,
        penalty: 40.0,
        severity: Severity::Critical,
        message: "Fewer than 10 observations",
    },
    ConfidenceRule {
        id: "small_sample",
        applies: small_sample,
        penalty: 20.0,
        severity: Severity::Warning,
        message: "Fewer than 30 observations",
    },
    ConfidenceRule {
        id: "moderate_sample",
        applies: moderate_sample,
        penalty: 5.0,
        severity: Severity::Info,
        message: "Fewer than 100 observations",
    },
    ConfidenceRule {
        id: "non_white_residuals",
        applies: non_white_residuals,
        penalty: 20.0,
        severity: Severity::Warning,
        message: "Residuals are autocorrelated (Ljung–Box)",
    },
    ConfidenceRule {
        id: "very_low_r_squared",
        applies: very_low_r_squared,
        penalty: 30.0,
        severity: Severity::Critical,
        message: "AR(2) explains less than 10% of the variance",
    },
    ConfidenceRule {
        id: "low_r_squared",
        applies: low_r_squared,
        penalty: 15.0,
        severity: Severity::Warning,
        message: "AR(2) explains less than 30% of the variance",
    },
    ConfidenceRule {
        id: "unstable",
        applies: unstable,
        penalty: 35.0,
        severity: Severity::Critical,
        message: "Dominant eigenvalue modulus is at or above 1",
    },
    ConfidenceRule {
        id: "implausible_coefficients",
        applies: implausible_coefficients,
        penalty: 15.0,
        severity: Severity::Warning,
        message: "AR coefficients are implausibly large",
    },
    ConfidenceRule {
        id: "excess_acf_lags",
        applies: excess_acf_lags,
        penalty: 10.0,
        severity: Severity::Warning,
        message: "More than 15% of residual ACF lags are significant",
    },
    ConfidenceRule {
        id: "extreme_variation",
        applies: extreme_variation,
        penalty: 15.0,
        severity: Severity::Warning,
        message: "Coefficient of variation is extreme (≥ 5 or ≈ 0)",
    },
    ConfidenceRule {
        id: "trend",
        applies: trend_flag,
        penalty: 20.0,
        severity: Severity::Critical,
        message: "Deterministic trend may inflate the modulus",
    },
    ConfidenceRule {
        id: "model_order",
        applies: model_order_flag,
        penalty: 10.0,
        severity: Severity::Warning,
        message: "AR(3) fits materially better than AR(2)",
    },
    ConfidenceRule {
        id: "nonlinearity",
        applies: nonlinearity_flag,
        penalty: 10.0,
        severity: Severity::Warning,
        message: "Residuals suggest nonlinear dynamics",
    },
    ConfidenceRule {
        id: "adf_failure",
        applies: adf_failure,
        penalty: 15.0,
        severity: Severity::Warning,
        message: "ADF does not reject a unit root",
    },
];

/// A rule that fired while scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPenalty {
    pub id: String,
    pub penalty: f64,
    pub severity: Severity,
    pub message: String,
}

/// ConfidenceScore — clamped 0–100 score, its level, and the penalties
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub score: f64,
    pub level: ConfidenceLevel,
    pub penalties: Vec<AppliedPenalty>,
}

impl ConfidenceScore {
    /// Score of a series that could not be analyzed at all.
    pub fn unreliable() -> Self {
        ConfidenceScore { score: 0.0, level: ConfidenceLevel::Unreliable, penalties: Vec::new() }
    }
}

/// Apply `rules` to `context`.
pub fn score_with(rules: &[ConfidenceRule], context: &ScoringContext) -> ConfidenceScore {
    let penalties: Vec<AppliedPenalty> = rules
        .iter()
        .filter(|rule| (rule.applies)(context))
        .map(|rule| AppliedPenalty {
            id: rule.id.to_string(),
            penalty: rule.penalty,
            severity: rule.severity,
            message: rule.message.to_string(),
        })
        .collect();
    let total: f64 = penalties.iter().map(|p| p.penalty).sum();
    let score = (100.0 - total).clamp(0.0, 100.0);
    ConfidenceScore { score, level: ConfidenceLevel::from_score(score), penalties }
}

/// Apply [`CONFIDENCE_RULES`] to `context`.
pub fn score_confidence(context: &ScoringContext) -> ConfidenceScore {
    score_with(CONFIDENCE_RULES, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> &'static ConfidenceRule {
        CONFIDENCE_RULES.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn clean_context_scores_full_marks() {
        let score = score_confidence(&ScoringContext::default());

        assert_eq!(score.score, 100.0);
        assert_eq!(score.level, ConfidenceLevel::High);
        assert!(score.penalties.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Only the worst sample-size tier applies.
    //
    // Given
    // -----
    // - n = 5, 20, 50, 150 with an otherwise clean context.
    //
    // Expect
    // ------
    // - Scores 60, 80, 95, 100.
    fn sample_size_tiers_are_exclusive() {
        // Arrange
        let at = |n| ScoringContext { n, ..Default::default() };

        // Act
        let scores: Vec<f64> =
            [5, 20, 50, 150].iter().map(|&n| score_confidence(&at(n)).score).collect();

        // Assert
        assert_eq!(scores, vec![60.0, 80.0, 95.0, 100.0]);
    }

    #[test]
    fn r_squared_tiers_are_exclusive() {
        assert!((rule("very_low_r_squared").applies)(&ScoringContext {
            r_squared: 0.05,
            ..Default::default()
        }));
        assert!(!(rule("low_r_squared").applies)(&ScoringContext {
            r_squared: 0.05,
            ..Default::default()
        }));
        assert!((rule("low_r_squared").applies)(&ScoringContext {
            r_squared: 0.2,
            ..Default::default()
        }));
    }

    #[test]
    fn coefficient_rules() {
        let implausible = rule("implausible_coefficients").applies;

        assert!(implausible(&ScoringContext { phi1: 2.0, phi2: -1.0, ..Default::default() }));
        assert!(implausible(&ScoringContext { phi1: 0.0, phi2: 1.5, ..Default::default() }));
        assert!(!implausible(&ScoringContext::default()));
        assert!((rule("unstable").applies)(&ScoringContext { modulus: 1.0, ..Default::default() }));
    }

    #[test]
    fn variation_rule_flags_both_extremes() {
        let extreme = rule("extreme_variation").applies;

        assert!(extreme(&ScoringContext { coefficient_of_variation: 6.0, ..Default::default() }));
        assert!(extreme(&ScoringContext {
            coefficient_of_variation: f64::INFINITY,
            ..Default::default()
        }));
        assert!(extreme(&ScoringContext { coefficient_of_variation: 0.0, ..Default::default() }));
        assert!(!extreme(&ScoringContext::default()));
    }

    #[test]
    // Purpose
    // -------
    // Stacked penalties clamp at zero and map onto the ordinal levels.
    fn score_is_clamped_and_levels_map() {
        // Arrange
        let worst = ScoringContext {
            n: 5,
            residuals_white: false,
            r_squared: 0.0,
            modulus: 1.2,
            trend: true,
            adf_failed: true,
            ..Default::default()
        };

        // Act
        let score = score_confidence(&worst);

        // Assert
        assert_eq!(score.score, 0.0);
        assert_eq!(score.level, ConfidenceLevel::Unreliable);
        assert_eq!(score.penalties.len(), 6);
        assert_eq!(ConfidenceLevel::from_score(75.0), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(74.9), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_score(50.0), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_score(25.0), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(24.9), ConfidenceLevel::Unreliable);
    }

    #[test]
    fn custom_rule_tables_are_supported() {
        let rules = [ConfidenceRule {
            id: "always",
            applies: |_| true,
            penalty: 30.0,
            severity: Severity::Info,
            message: "always applies",
        }];

        let score = score_with(&rules, &ScoringContext::default());

        assert_eq!(score.score, 70.0);
        assert_eq!(score.level, ConfidenceLevel::Moderate);
        assert_eq!(score.penalties[0].id, "always");
    }
}
