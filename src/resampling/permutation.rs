//! resampling::permutation — time-shuffle and block permutation nulls.
//!
//! Purpose
//! -------
//! Estimate how often the PAR(2) pipeline declares a pair significant when
//! the target's temporal order carries no information about the clock.
//!
//! Key behaviors
//! -------------
//! - [`time_shuffle_null`] permutes one pair's target values independently
//!   per iteration, refits PAR(2), and reports the empirical false-positive
//!   rate (share of corrected p-values below the threshold) with a
//!   bootstrap 95% interval, plus the empirical p-value of the observed
//!   minimum phase p-value.
//! - [`block_permutation_null`] draws one permutation per iteration and
//!   applies it to every series of a correlated group (e.g. tissues from
//!   the same cohort), so the shared covariance structure survives in the
//!   null.
//!
//! Invariants & assumptions
//! ------------------------
//! - Block permutation requires every group member to have the same number
//!   of finite timestamps after filtering.
use crate::{
    data::{DataError, PairedSeries},
    models::par2::fit_par2_core,
    resampling::{
        bootstrap::percentile,
        errors::{ResamplingError, ResamplingResult},
        options::{ResamplingOptions, iteration_rng},
        surrogate::empirical_p_value,
    },
};
use ndarray::Array1;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Resamples drawn for the bootstrap interval of a false-positive rate.
pub const FPR_BOOTSTRAP_DRAWS: usize = 1000;

/// Empirical rate with a bootstrap 95% percentile interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    pub rate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Null distribution from independent time shuffles of one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationNull {
    pub observed_min_p: f64,
    pub null_min_p: Vec<f64>,
    pub empirical_p: f64,
    pub false_positive_rate: RateEstimate,
    pub iterations: usize,
    pub successful: usize,
    pub cancelled: bool,
}

/// Null distributions from shared permutations across a group.
///
/// `null_min_p[s]` is the distribution for group member `s`;
/// `family_false_positive_rate` is the share of iterations in which at
/// least one member was declared significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPermutationNull {
    pub observed_min_p: Vec<f64>,
    pub null_min_p: Vec<Vec<f64>>,
    pub empirical_p: Vec<f64>,
    pub family_false_positive_rate: RateEstimate,
    pub iterations: usize,
    pub successful: usize,
    pub cancelled: bool,
}

/// Bootstrap 95% interval for the mean of 0/1 indicators.
pub fn rate_with_interval<R: Rng + ?Sized>(
    hits: &[bool], draws: usize, rng: &mut R,
) -> RateEstimate {
    let n = hits.len();
    if n == 0 {
        return RateEstimate { rate: 0.0, ci_lower: 0.0, ci_upper: 0.0 };
    }
    let rate = hits.iter().filter(|&&h| h).count() as f64 / n as f64;
    let mut rates: Vec<f64> = (0..draws)
        .map(|_| (0..n).filter(|_| hits[rng.gen_range(0..n)]).count() as f64 / n as f64)
        .collect();
    rates.sort_by(f64::total_cmp);
    RateEstimate { rate, ci_lower: percentile(&rates, 0.025), ci_upper: percentile(&rates, 0.975) }
}

/// Apply one permutation to the target of every group member.
pub fn permute_targets(group: &[PairedSeries], permutation: &[usize]) -> Vec<PairedSeries> {
    group
        .iter()
        .map(|s| PairedSeries {
            time: s.time.clone(),
            target: permutation.iter().map(|&i| s.target[i]).collect::<Array1<f64>>(),
            clock: s.clock.clone(),
        })
        .collect()
}

fn collect_outcome<T>(
    draws: Vec<Option<Option<T>>>, label: &'static str, requested: usize,
) -> ResamplingResult<(Vec<T>, bool)> {
    let cancelled = draws.iter().any(Option::is_none);
    let completed = draws.iter().filter(|d| d.is_some()).count();
    let values: Vec<T> = draws.into_iter().flatten().flatten().collect();
    if cancelled {
        warn!(completed, requested, procedure = label, "permutation run cancelled");
    }
    if values.is_empty() {
        return Err(if cancelled && completed == 0 {
            ResamplingError::Cancelled { completed }
        } else {
            ResamplingError::NoSuccessfulIterations { attempted: completed }
        });
    }
    Ok((values, cancelled))
}

/// Independent time-shuffle null for one pair.
pub fn time_shuffle_null(
    series: &PairedSeries, period: f64, threshold: f64, options: &ResamplingOptions,
) -> ResamplingResult<PermutationNull> {
    if options.iterations == 0 {
        return Err(ResamplingError::NoIterations);
    }
    let clean = series.filtered()?;
    let observed = fit_par2_core(&clean, period, threshold)?;
    let n = clean.len();

    let draws = options.run_parallel(|_, rng| {
        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(rng);
        let shuffled = permute_targets(std::slice::from_ref(&clean), &perm).pop()?;
        fit_par2_core(&shuffled, period, threshold)
            .ok()
            .map(|fit| (fit.min_phase_p, fit.significant))
    });
    let (outcomes, cancelled) = collect_outcome(draws, "time_shuffle", options.iterations)?;

    let null_min_p: Vec<f64> = outcomes.iter().map(|o| o.0).collect();
    let hits: Vec<bool> = outcomes.iter().map(|o| o.1).collect();
    let mut rng = iteration_rng(options.seed, u64::MAX);
    let false_positive_rate = rate_with_interval(&hits, FPR_BOOTSTRAP_DRAWS, &mut rng);
    debug!(fpr = false_positive_rate.rate, successful = hits.len(), "time-shuffle null finished");

    Ok(PermutationNull {
        observed_min_p: observed.min_phase_p,
        empirical_p: empirical_p_value(observed.min_phase_p, &null_min_p),
        successful: null_min_p.len(),
        null_min_p,
        false_positive_rate,
        iterations: options.iterations,
        cancelled,
    })
}

/// Block permutation null for a group of pairs sharing covariance.
///
/// Errors
/// ------
/// - `ResamplingError::EmptyInput` for an empty group.
/// - `ResamplingError::Data(LengthMismatch)` if filtered lengths differ.
/// - `ResamplingError::Fit` if any observed member cannot be fitted.
pub fn block_permutation_null(
    group: &[PairedSeries], period: f64, threshold: f64, options: &ResamplingOptions,
) -> ResamplingResult<BlockPermutationNull> {
    if options.iterations == 0 {
        return Err(ResamplingError::NoIterations);
    }
    if group.is_empty() {
        return Err(ResamplingError::EmptyInput);
    }
    let clean: Vec<PairedSeries> =
        group.iter().map(PairedSeries::filtered).collect::<Result<_, _>>()?;
    let n = clean[0].len();
    if let Some(bad) = clean.iter().find(|s| s.len() != n) {
        return Err(DataError::LengthMismatch { field: "target", expected: n, actual: bad.len() }
            .into());
    }
    let observed: Vec<f64> = clean
        .iter()
        .map(|s| fit_par2_core(s, period, threshold).map(|f| f.min_phase_p))
        .collect::<Result<_, _>>()?;

    let draws = options.run_parallel(|_, rng| {
        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(rng);
        permute_targets(&clean, &perm)
            .iter()
            .map(|s| {
                fit_par2_core(s, period, threshold).ok().map(|f| (f.min_phase_p, f.significant))
            })
            .collect::<Option<Vec<_>>>()
    });
    let (outcomes, cancelled) = collect_outcome(draws, "block_permutation", options.iterations)?;

    let members = clean.len();
    let null_min_p: Vec<Vec<f64>> =
        (0..members).map(|s| outcomes.iter().map(|o| o[s].0).collect()).collect();
    let hits: Vec<bool> = outcomes.iter().map(|o| o.iter().any(|m| m.1)).collect();
    let empirical_p = observed
        .iter()
        .zip(null_min_p.iter())
        .map(|(&p, null)| empirical_p_value(p, null))
        .collect();
    let mut rng = iteration_rng(options.seed, u64::MAX);
    let family_false_positive_rate = rate_with_interval(&hits, FPR_BOOTSTRAP_DRAWS, &mut rng);

    Ok(BlockPermutationNull {
        observed_min_p: observed,
        null_min_p,
        empirical_p,
        family_false_positive_rate,
        iterations: options.iterations,
        successful: outcomes.len(),
        cancelled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{Par2Simulation, simulate_par2};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    // Purpose
    // -------
    // One shared permutation must reorder every group member identically.
    fn permute_targets_applies_shared_order() {
        let time = Array1::from(vec![0.0, 1.0, 2.0, 3.0]);
        let values = Array1::from(vec![1.0, 2.0, 3.0, 4.0]);
        let a = PairedSeries::new(time.clone(), values, Array1::zeros(4)).unwrap();
        let b = PairedSeries::new(time, Array1::from(vec![10.0, 20.0, 30.0, 40.0]), Array1::ones(4))
            .unwrap();

        let out = permute_targets(&[a, b], &[2, 0, 3, 1]);

        assert_eq!(out[0].target.to_vec(), vec![3.0, 1.0, 4.0, 2.0]);
        assert_eq!(out[1].target.to_vec(), vec![30.0, 10.0, 40.0, 20.0]);
        assert_eq!(out[1].clock, Array1::<f64>::ones(4));
    }

    #[test]
    fn rate_interval_brackets_rate() {
        let hits: Vec<bool> = (0..100).map(|i| i % 10 == 0).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let est = rate_with_interval(&hits, 500, &mut rng);

        assert!((est.rate - 0.1).abs() < 1e-12);
        assert!(est.ci_lower <= 0.1 && 0.1 <= est.ci_upper);
        assert!(est.ci_upper - est.ci_lower < 0.2);
    }

    #[test]
    // Purpose
    // -------
    // Under shuffling, a null pair's false-positive rate must stay near
    // nominal and a gated pair must look extreme against its own null.
    fn time_shuffle_null_calibrates_false_positives() {
        let null_pair =
            simulate_par2(&Par2Simulation { gating: 0.0, seed: 8, ..Default::default() }).unwrap();
        let gated = simulate_par2(&Par2Simulation { gating: 1.0, seed: 9, ..Default::default() })
            .unwrap();
        let opts = ResamplingOptions::new(100, 5);

        let null = time_shuffle_null(&null_pair, 24.0, 0.05, &opts).unwrap();
        let hit = time_shuffle_null(&gated, 24.0, 0.05, &opts).unwrap();

        assert_eq!(null.successful, 100);
        assert!(null.false_positive_rate.rate <= 0.15, "fpr {}", null.false_positive_rate.rate);
        assert!(hit.empirical_p <= 0.02, "p {}", hit.empirical_p);
    }

    #[test]
    fn block_permutation_rejects_unequal_members() {
        let a = simulate_par2(&Par2Simulation { n: 40, seed: 1, ..Default::default() }).unwrap();
        let b = simulate_par2(&Par2Simulation { n: 41, seed: 2, ..Default::default() }).unwrap();

        let err = block_permutation_null(&[a, b], 24.0, 0.05, &ResamplingOptions::new(5, 1));

        assert!(matches!(err, Err(ResamplingError::Data(DataError::LengthMismatch { .. }))));
    }

    #[test]
    fn block_permutation_reports_per_member_nulls() {
        let group: Vec<PairedSeries> = (0..3)
            .map(|s| simulate_par2(&Par2Simulation { n: 60, seed: 30 + s, ..Default::default() }))
            .collect::<Result<_, _>>()
            .unwrap();

        let opts = ResamplingOptions::new(20, 2);
        let out = block_permutation_null(&group, 24.0, 0.05, &opts).unwrap();

        assert_eq!(out.null_min_p.len(), 3);
        assert!(out.null_min_p.iter().all(|d| d.len() == out.successful));
        assert!(out.empirical_p.iter().all(|&p| p > 0.0 && p <= 1.0));
    }
}
