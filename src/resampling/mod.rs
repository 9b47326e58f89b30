//! resampling — cross-validation, bootstrap, surrogates and permutation nulls.
//!
//! Purpose
//! -------
//! Validate individual fits by resampling: leave-one-out prediction error,
//! bootstrap uncertainty of clock phase and amplitude, FFT phase-randomized
//! surrogates, and time-shuffle / block permutation nulls.
//!
//! Key behaviors
//! -------------
//! - Every loop is driven by [`ResamplingOptions`]: iteration count, base
//!   seed (per-iteration streams derived with [`iteration_rng`]), optional
//!   dedicated worker pool, and a [`CancelFlag`] checked between
//!   iterations.
//! - Iterations run in parallel on rayon and share no mutable state;
//!   results are identical for a given seed regardless of worker count.
//! - Failed refits inside a loop are dropped and counted, never fatal.
//!
//! Conventions
//! -----------
//! - Empirical p-values use the (1 + count) / (1 + N) convention.
//! - Loops log cancellation at `warn` and completion at `debug` through
//!   `tracing`; the FFT and surrogate kernels do not log.

pub mod bootstrap;
pub mod cross_validation;
pub mod errors;
pub mod fft;
pub mod options;
pub mod permutation;
pub mod surrogate;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bootstrap::{BootstrapResult, BootstrapSummary, bootstrap_cosinor};
pub use self::cross_validation::{CrossValidationResult, leave_one_out};
pub use self::errors::{ResamplingError, ResamplingResult};
pub use self::fft::{fft, fft_real_padded, ifft, next_power_of_two};
pub use self::options::{CancelFlag, ResamplingOptions, iteration_rng};
pub use self::permutation::{
    BlockPermutationNull, PermutationNull, RateEstimate, block_permutation_null, permute_targets,
    time_shuffle_null,
};
pub use self::surrogate::{
    SurrogateTestResult, empirical_p_value, phase_randomized_surrogate, surrogate_test,
};

pub mod prelude {
    pub use super::{
        BootstrapResult, CancelFlag, CrossValidationResult, PermutationNull, ResamplingError,
        ResamplingOptions, ResamplingResult, SurrogateTestResult, block_permutation_null,
        bootstrap_cosinor, leave_one_out, surrogate_test, time_shuffle_null,
    };
}
