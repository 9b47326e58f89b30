//! resampling::options — iteration count, seeding, workers and cancellation.
//!
//! Purpose
//! -------
//! Give every resampling loop the same execution knobs: how many
//! iterations, which base seed, how many workers, and a coarse cancel
//! flag checked between iterations.
//!
//! Key behaviors
//! -------------
//! - [`iteration_rng`] derives an independent `StdRng` per iteration from
//!   `(seed, iteration)`, so results do not depend on scheduling or on the
//!   worker count.
//! - [`ResamplingOptions::run_parallel`] maps iterations on rayon, inside a
//!   dedicated pool when `workers` is set, and skips iterations once the
//!   cancel flag is raised.
use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::warn;

/// Shared abort signal checked between resampling iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl PartialEq for CancelFlag {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// ResamplingOptions — execution settings shared by every resampling loop.
///
/// Fields
/// ------
/// - `iterations`: number of resamples / permutations / surrogates.
/// - `seed`: base seed; iteration `i` uses [`iteration_rng`]`(seed, i)`.
/// - `workers`: `Some(n)` runs inside a dedicated n-thread rayon pool;
///   `None` uses the global pool.
/// - `cancel`: coarse abort flag (not serialized).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResamplingOptions {
    pub iterations: usize,
    pub seed: u64,
    pub workers: Option<usize>,
    #[serde(skip)]
    pub cancel: CancelFlag,
}

impl Default for ResamplingOptions {
    fn default() -> Self {
        ResamplingOptions {
            iterations: 500,
            seed: 42,
            workers: None,
            cancel: CancelFlag::default(),
        }
    }
}

impl ResamplingOptions {
    pub fn new(iterations: usize, seed: u64) -> Self {
        ResamplingOptions { iterations, seed, ..Default::default() }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Evaluate `f(iteration, rng)` for every iteration in parallel.
    ///
    /// Returns the per-iteration outputs in iteration order; iterations
    /// skipped after cancellation yield `None`.
    pub fn run_parallel<T, F>(&self, f: F) -> Vec<Option<T>>
    where
        T: Send,
        F: Fn(usize, &mut StdRng) -> T + Sync + Send,
    {
        let cancel = &self.cancel;
        let seed = self.seed;
        let job = || {
            (0..self.iterations)
                .into_par_iter()
                .map(|i| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let mut rng = iteration_rng(seed, i as u64);
                    Some(f(i, &mut rng))
                })
                .collect::<Vec<_>>()
        };
        with_pool(self.workers, job)
    }
}

/// Run `job` inside a dedicated `workers`-thread rayon pool, or on the
/// global pool when `workers` is `None` or the pool cannot be built.
pub(crate) fn with_pool<R, J>(workers: Option<usize>, job: J) -> R
where
    R: Send,
    J: FnOnce() -> R + Send,
{
    match workers {
        Some(n) if n > 0 => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(job),
            Err(err) => {
                warn!(workers = n, error = %err, "could not build worker pool; using global");
                job()
            }
        },
        _ => job(),
    }
}

/// Deterministic RNG for one iteration of a seeded resampling run.
pub fn iteration_rng(seed: u64, iteration: u64) -> StdRng {
    StdRng::seed_from_u64(splitmix64(seed ^ splitmix64(iteration.wrapping_add(1))))
}

#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
