//! batch::orchestrator — screen every gene pair and correct across the batch.
//!
//! Purpose
//! -------
//! Fit PAR(2) to every (dataset × target × clock) pair in parallel, apply
//! the within-pair Bonferroni correction, run one Benjamini–Hochberg
//! correction across all successful pairs, and rank the hits.
//!
//! Key behaviors
//! -------------
//! - Pairs are independent units of work on rayon (optionally a dedicated
//!   pool of `AnalysisOptions::workers` threads); no state is shared.
//! - A failing pair (missing gene, too few points, singular design) is
//!   recorded and counted by [`PairFailureKind`]; the batch continues.
//! - BH runs on each pair's Bonferroni p-value (min phase p × 4, capped at
//!   1). Pairs are ranked by q-value, then by Cohen's f² (descending);
//!   `fdr.q_values[i]` and `fdr.significant[i]` correspond to `pairs[i]`.
//! - Each pair's resampling (clock bootstrap, optional surrogate or
//!   time-shuffle calibration) runs inside the batch's pool with its seed
//!   offset by the pair's job index.
//!
//! Conventions
//! -----------
//! - Logs at `info` for batch start and summary, `debug` for each pair
//!   failure.
use crate::{
    batch::{
        dataset::{BatchRequest, NullCalibration},
        errors::{BatchError, BatchResult, FailureCounts, PairFailureKind},
    },
    data::PairedSeries,
    models::par2::{EnhancedPar2Result, fit_par2},
    multiple_testing::{FdrCorrection, benjamini_hochberg},
    options::AnalysisOptions,
    resampling::{
        options::with_pool,
        permutation::{PermutationNull, time_shuffle_null},
        surrogate::{SurrogateTestResult, surrogate_test},
    },
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Null calibration attached to a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PairCalibration {
    Surrogate(SurrogateTestResult),
    TimeShuffle(PermutationNull),
}

impl PairCalibration {
    pub fn empirical_p(&self) -> f64 {
        match self {
            PairCalibration::Surrogate(s) => s.p_value,
            PairCalibration::TimeShuffle(p) => p.empirical_p,
        }
    }
}

/// PairResult — one successfully fitted pair.
///
/// Fields
/// ------
/// - `dataset`, `target`, `clock`: pair identity.
/// - `min_phase_p`: smallest raw p-value of the four phase terms.
/// - `bonferroni_p`: within-pair corrected p-value fed to BH.
/// - `q_value`, `significant`: batch-level BH outcome.
/// - `significant_terms`: phase terms with raw p < threshold (not
///   Bonferroni-corrected; see `bonferroni_p` for the pair-level call).
/// - `effect_size`: Cohen's f² of PAR(2) over AR(2).
/// - `fit`: full per-pair result.
/// - `calibration`: optional empirical null calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairResult {
    pub dataset: String,
    pub target: String,
    pub clock: String,
    pub min_phase_p: f64,
    pub bonferroni_p: f64,
    pub q_value: f64,
    pub significant: bool,
    pub significant_terms: Vec<String>,
    pub effect_size: f64,
    pub fit: EnhancedPar2Result,
    pub calibration: Option<PairCalibration>,
}

/// A pair that produced no result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairFailure {
    pub dataset: String,
    pub target: String,
    pub clock: String,
    pub kind: PairFailureKind,
    pub message: String,
}

/// BatchAnalysisResult — ranked pairs plus the batch FDR record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysisResult {
    pub pairs: Vec<PairResult>,
    pub fdr: FdrCorrection,
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: FailureCounts,
    pub failed_pairs: Vec<PairFailure>,
}

impl BatchAnalysisResult {
    /// Pairs significant after BH, in rank order.
    pub fn hits(&self) -> impl Iterator<Item = &PairResult> {
        self.pairs.iter().filter(|p| p.significant)
    }
}

/// Options for one pair's work inside the batch: resampling runs on the
/// batch's pool (`workers` cleared) and the seed is offset by `job`.
pub(crate) fn pair_options(options: &AnalysisOptions, job: usize) -> AnalysisOptions {
    AnalysisOptions {
        workers: None,
        seed: options.seed.wrapping_add(job as u64),
        ..options.clone()
    }
}

fn calibrate(
    series: &PairedSeries, calibration: NullCalibration, options: &AnalysisOptions, job: usize,
) -> Option<PairCalibration> {
    let outcome = match calibration {
        NullCalibration::Surrogate => {
            let opts = options.resampling(options.surrogate_count);
            surrogate_test(series, options.period, options.significance_threshold, &opts)
                .map(PairCalibration::Surrogate)
        }
        NullCalibration::TimeShuffle => {
            let opts = options.resampling(options.permutation_iterations);
            time_shuffle_null(series, options.period, options.significance_threshold, &opts)
                .map(PairCalibration::TimeShuffle)
        }
    };
    outcome.map_err(|err| debug!(job, error = %err, "null calibration skipped")).ok()
}

fn analyze_pair(
    request: &BatchRequest, options: &AnalysisOptions, job: usize, dataset: usize, target: &str,
    clock: &str,
) -> Result<PairResult, PairFailure> {
    let data = &request.datasets[dataset];
    let failure = |kind: PairFailureKind, message: String| PairFailure {
        dataset: data.name.clone(),
        target: target.to_string(),
        clock: clock.to_string(),
        kind,
        message,
    };
    let series = data
        .pair(target, clock)
        .map_err(|kind| failure(kind, format!("cannot pair `{target}` with `{clock}`")))?;
    let options = pair_options(options, job);
    let fit = fit_par2(&series, &options)
        .map_err(|err| failure(PairFailureKind::from(&err), err.to_string()))?;
    let calibration = request.calibration.and_then(|c| calibrate(&series, c, &options, job));

    Ok(PairResult {
        dataset: data.name.clone(),
        target: target.to_string(),
        clock: clock.to_string(),
        min_phase_p: fit.result.min_phase_p,
        bonferroni_p: fit.result.bonferroni_p,
        q_value: 1.0,
        significant: false,
        significant_terms: fit.result.significant_terms.clone(),
        effect_size: fit.effect_size.cohens_f2,
        fit,
        calibration,
    })
}

fn rank(a: &PairResult, b: &PairResult) -> Ordering {
    a.q_value.total_cmp(&b.q_value).then_with(|| b.effect_size.total_cmp(&a.effect_size))
}

/// Screen every pair in `request`.
///
/// Errors
/// ------
/// - `BatchError::Options` for invalid `options`.
/// - `BatchError::EmptyRequest` when datasets, targets or clocks are empty.
/// - `BatchError::Data` when a dataset's genes do not match its time axis.
///
/// Pair-level failures are never errors; see
/// [`BatchAnalysisResult::failures`].
pub fn run_batch(
    request: &BatchRequest, options: &AnalysisOptions,
) -> BatchResult<BatchAnalysisResult> {
    options.validate()?;
    if request.datasets.is_empty() || request.targets.is_empty() || request.clocks.is_empty() {
        return Err(BatchError::EmptyRequest);
    }
    for d in &request.datasets {
        d.validate().map_err(|source| BatchError::Data { dataset: d.name.clone(), source })?;
    }

    let jobs = request.jobs();
    info!(pairs = jobs.len(), datasets = request.datasets.len(), "batch started");

    let outcomes: Vec<Result<PairResult, PairFailure>> = with_pool(options.workers, || {
        jobs.par_iter()
            .enumerate()
            .map(|(job, &(dataset, target, clock))| {
                analyze_pair(request, options, job, dataset, target, clock)
            })
            .collect()
    });

    let mut pairs = Vec::with_capacity(outcomes.len());
    let mut failures = FailureCounts::default();
    let mut failed_pairs = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(pair) => pairs.push(pair),
            Err(failure) => {
                debug!(
                    dataset = %failure.dataset,
                    target = %failure.target,
                    clock = %failure.clock,
                    kind = ?failure.kind,
                    "pair skipped: {}",
                    failure.message
                );
                failures.record(failure.kind);
                failed_pairs.push(failure);
            }
        }
    }

    let corrected: Vec<f64> = pairs.iter().map(|p| p.bonferroni_p).collect();
    let fdr = benjamini_hochberg(&corrected, options.fdr_threshold);
    for (pair, (&q, &sig)) in pairs.iter_mut().zip(fdr.q_values.iter().zip(&fdr.significant)) {
        pair.q_value = q;
        pair.significant = sig;
    }
    pairs.sort_by(rank);
    let fdr = FdrCorrection {
        q_values: pairs.iter().map(|p| p.q_value).collect(),
        significant: pairs.iter().map(|p| p.significant).collect(),
        ..fdr
    };

    info!(
        attempted = jobs.len(),
        succeeded = pairs.len(),
        failed = failures.total(),
        significant = fdr.significant_count,
        "batch finished"
    );
    Ok(BatchAnalysisResult {
        attempted: jobs.len(),
        succeeded: pairs.len(),
        pairs,
        fdr,
        failures,
        failed_pairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::dataset::ExpressionDataset;
    use crate::multiple_testing::CorrectionMethod;
    use crate::synthetic::{Par2Simulation, simulate_par2};
    use ndarray::Array1;

    fn gated_dataset(name: &str, seed: u64) -> ExpressionDataset {
        let gated = simulate_par2(&Par2Simulation { gating: 1.2, seed, ..Default::default() })
            .unwrap();
        let null =
            simulate_par2(&Par2Simulation { seed: seed + 1, ..Default::default() }).unwrap();
        ExpressionDataset::new(name, gated.time.clone())
            .with_gene("BMAL1", gated.clock.clone())
            .unwrap()
            .with_gene("GATED", gated.target)
            .unwrap()
            .with_gene("NULL", null.target)
            .unwrap()
            .with_gene("SHORT", Array1::from_elem(gated.time.len(), f64::NAN))
            .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A batch mixing a gated target, a null target, a gene that is all
    // NaN and a gene that is missing must finish, count each failure, and
    // rank the gated pair first.
    //
    // Given
    // -----
    // - One dataset with BMAL1 (clock), GATED (g = 1.2), NULL (g = 0),
    //   SHORT (all NaN); targets also ask for an absent gene.
    //
    // Expect
    // ------
    // - attempted 4, succeeded 2, one insufficient-data and one
    //   missing-gene failure.
    // - GATED ranked first and significant; q-values aligned with pairs.
    fn batch_counts_failures_and_ranks_hits() {
        // Arrange
        let request = BatchRequest::new(
            vec![gated_dataset("liver", 12)],
            vec!["GATED".into(), "NULL".into(), "SHORT".into(), "ABSENT".into()],
            vec!["BMAL1".into()],
        );
        let options = AnalysisOptions { include_model_comparison: false, ..Default::default() };

        // Act
        let result = run_batch(&request, &options).unwrap();

        // Assert
        assert_eq!(result.attempted, 4);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failures.insufficient_data, 1);
        assert_eq!(result.failures.missing_gene, 1);
        assert_eq!(result.failed_pairs.len(), 2);
        assert_eq!(result.pairs[0].target, "GATED");
        assert!(result.pairs[0].significant);
        assert_eq!(result.fdr.method, CorrectionMethod::BenjaminiHochberg);
        assert_eq!(result.fdr.q_values.len(), 2);
        for (pair, &q) in result.pairs.iter().zip(&result.fdr.q_values) {
            assert_eq!(pair.q_value, q);
            assert!(q >= pair.bonferroni_p);
        }
    }

    #[test]
    fn invalid_requests_are_rejected_up_front() {
        let empty = BatchRequest::new(vec![], vec!["A".into()], vec!["B".into()]);
        let bad_options = AnalysisOptions { fdr_threshold: 2.0, ..Default::default() };
        let ok = BatchRequest::new(vec![gated_dataset("x", 1)], vec!["GATED".into()], vec![
            "BMAL1".into(),
        ]);

        assert_eq!(run_batch(&empty, &AnalysisOptions::default()), Err(BatchError::EmptyRequest));
        assert!(matches!(run_batch(&ok, &bad_options), Err(BatchError::Options(_))));
    }

    #[test]
    // Purpose
    // -------
    // Results must not depend on the worker pool, and optional surrogate
    // calibration is attached per pair.
    fn batch_is_deterministic_across_workers_with_calibration() {
        // Arrange
        let request = BatchRequest::new(
            vec![gated_dataset("a", 40), gated_dataset("b", 50)],
            vec!["GATED".into(), "NULL".into()],
            vec!["BMAL1".into()],
        )
        .with_calibration(NullCalibration::Surrogate);
        let options = AnalysisOptions { surrogate_count: 19, ..Default::default() };
        let single = AnalysisOptions { workers: Some(1), ..options.clone() };

        // Act
        let global = run_batch(&request, &options).unwrap();
        let pooled = run_batch(&request, &single).unwrap();

        // Assert
        assert_eq!(global, pooled);
        assert_eq!(global.succeeded, 4);
        assert!(global.pairs.iter().all(|p| p.calibration.is_some()));
        let p = global.pairs[0].calibration.as_ref().unwrap().empirical_p();
        assert!(p > 0.0 && p <= 1.0);
    }

    #[test]
    fn pair_options_clear_workers_and_offset_seed() {
        let options = AnalysisOptions { workers: Some(4), seed: u64::MAX, ..Default::default() };

        let first = pair_options(&options, 0);
        let third = pair_options(&options, 2);

        assert_eq!(first.workers, None);
        assert_eq!(first.seed, u64::MAX);
        assert_eq!(third.seed, 1);
        assert_eq!(third.bootstrap_iterations, options.bootstrap_iterations);
    }

    #[test]
    // Purpose
    // -------
    // The clock bootstrap inside a batch runs on the batch's pool and draws
    // a different stream for each pair.
    //
    // Given
    // -----
    // - One noisy clock shared by two targets, so both pairs bootstrap the
    //   same clock series.
    // - Bootstrap enabled with 30 iterations; global pool vs 2 workers.
    //
    // Expect
    // ------
    // - Identical batches with and without a dedicated pool.
    // - The two pairs' bootstrap summaries differ.
    fn batch_bootstrap_is_pool_independent_and_seeded_per_pair() {
        // Arrange
        let noisy =
            Par2Simulation { gating: 1.2, clock_noise_sd: 0.3, seed: 8, ..Default::default() };
        let sim = simulate_par2(&noisy).unwrap();
        let other = simulate_par2(&Par2Simulation { seed: 9, ..noisy.clone() }).unwrap();
        let data = ExpressionDataset::new("noisy", sim.time.clone())
            .with_gene("BMAL1", sim.clock.clone())
            .unwrap()
            .with_gene("A", sim.target)
            .unwrap()
            .with_gene("B", other.target)
            .unwrap();
        let request =
            BatchRequest::new(vec![data], vec!["A".into(), "B".into()], vec!["BMAL1".into()]);
        let options = AnalysisOptions {
            include_bootstrap: true,
            bootstrap_iterations: 30,
            include_model_comparison: false,
            ..Default::default()
        };
        let pooled = AnalysisOptions { workers: Some(2), ..options.clone() };

        // Act
        let global = run_batch(&request, &options).unwrap();
        let dedicated = run_batch(&request, &pooled).unwrap();

        // Assert
        assert_eq!(global, dedicated);
        let bootstrap = |target: &str| {
            let pair = global.pairs.iter().find(|p| p.target == target).unwrap();
            pair.fit.bootstrap.clone().unwrap()
        };
        let (a, b) = (bootstrap("A"), bootstrap("B"));
        assert_eq!(a.iterations, 30);
        assert_ne!(a.amplitude, b.amplitude);
    }

    #[test]
    fn significant_terms_use_raw_term_p_values() {
        let request = BatchRequest::new(
            vec![gated_dataset("liver", 12)],
            vec!["GATED".into(), "NULL".into()],
            vec!["BMAL1".into()],
        );

        let result = run_batch(&request, &AnalysisOptions::default()).unwrap();

        let gated = result.pairs.iter().find(|p| p.target == "GATED").unwrap();
        assert!(!gated.significant_terms.is_empty());
        for pair in &result.pairs {
            assert_eq!(pair.significant_terms, pair.fit.result.significant_terms);
            for name in &pair.significant_terms {
                let term = pair.fit.result.term(name).unwrap();
                assert!(term.p_value < pair.fit.result.threshold, "{name}: {}", term.p_value);
            }
        }
    }
}
