//! synthetic — seeded generators for controls and tests.
//!
//! Purpose
//! -------
//! Produce reproducible synthetic series with known structure: stationary
//! AR(2) noise, cosine clocks, phase-gated PAR(2) targets paired with their
//! clock, and random walks for null batches.
//!
//! Key behaviors
//! -------------
//! - Every generator takes an explicit `u64` seed and draws from
//!   `StdRng::seed_from_u64`, so identical settings give identical output.
//! - [`simulate_par2`] generates
//!   Rₜ = φ₁Rₜ₋₁ + φ₂Rₜ₋₂ + g·Rₜ₋₁·cos(ω tₜ₋₁) + εₜ, εₜ ~ N(0, σ²),
//!   against the clock Cₜ = M + A cos(ω tₜ) (+ optional noise), whose
//!   cosinor phase is exactly ω t.
//!
//! Conventions
//! -----------
//! - Time starts at 0 and advances by `dt`.
//! - g = 0 yields a pure AR(2) target, used as a negative control.
use crate::data::{DataError, PairedSeries};
use ndarray::{Array1, ArrayView1};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::TAU;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Draws discarded before [`simulate_ar2`] output starts.
pub const AR2_BURN_IN: usize = 100;

/// SimulationError — invalid generator settings.
///
/// Variants
/// --------
/// - `InvalidLength { n, required }`
///   Requested fewer points than the recursion needs.
/// - `InvalidParameter { name, value }`
///   A scale, period or spacing is non-finite or out of range.
/// - `Data(DataError)`
///   The generated arrays could not be assembled into a series.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    InvalidLength { n: usize, required: usize },
    InvalidParameter { name: &'static str, value: f64 },
    Data(DataError),
}

impl std::error::Error for SimulationError {}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidLength { n, required } => {
                write!(f, "Cannot simulate {n} points; need at least {required}")
            }
            SimulationError::InvalidParameter { name, value } => {
                write!(f, "Invalid simulation parameter `{name}` = {value}")
            }
            SimulationError::Data(err) => write!(f, "Simulated series is malformed: {err}"),
        }
    }
}

impl From<DataError> for SimulationError {
    fn from(err: DataError) -> Self {
        SimulationError::Data(err)
    }
}

type SimResult<T> = Result<T, SimulationError>;

fn normal(name: &'static str, sd: f64) -> SimResult<Normal<f64>> {
    if !(sd.is_finite() && sd >= 0.0) {
        return Err(SimulationError::InvalidParameter { name, value: sd });
    }
    Normal::new(0.0, sd).map_err(|_| SimulationError::InvalidParameter { name, value: sd })
}

fn positive(name: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

/// Par2Simulation — settings for [`simulate_par2`].
///
/// Fields
/// ------
/// - `n`: number of time points (default 120).
/// - `dt`: sampling interval in hours (default 1).
/// - `period`: clock period in hours (default 24).
/// - `phi1`, `phi2`: AR(2) coefficients (default 0.5, 0.2).
/// - `gating`: phase-gating coefficient g on Rₜ₋₁·cos φₜ₋₁ (default 0).
/// - `noise_sd`: target innovation σ (default 0.3).
/// - `clock_mesor`, `clock_amplitude`: clock level and amplitude
///   (default 5, 2).
/// - `clock_noise_sd`: additive clock noise σ (default 0).
/// - `initial`: R₀, R₁ (default 1.0, 1.5).
/// - `seed`: RNG seed (default 0).
#[derive(Debug, Clone, PartialEq)]
pub struct Par2Simulation {
    pub n: usize,
    pub dt: f64,
    pub period: f64,
    pub phi1: f64,
    pub phi2: f64,
    pub gating: f64,
    pub noise_sd: f64,
    pub clock_mesor: f64,
    pub clock_amplitude: f64,
    pub clock_noise_sd: f64,
    pub initial: [f64; 2],
    pub seed: u64,
}

impl Default for Par2Simulation {
    fn default() -> Self {
        Par2Simulation {
            n: 120,
            dt: 1.0,
            period: 24.0,
            phi1: 0.5,
            phi2: 0.2,
            gating: 0.0,
            noise_sd: 0.3,
            clock_mesor: 5.0,
            clock_amplitude: 2.0,
            clock_noise_sd: 0.0,
            initial: [1.0, 1.5],
            seed: 0,
        }
    }
}

/// Noiseless cosine clock M + A cos(2π t / period).
pub fn clock_series(
    time: ArrayView1<'_, f64>, mesor: f64, amplitude: f64, period: f64,
) -> Array1<f64> {
    let omega = TAU / period;
    time.mapv(|t| mesor + amplitude * (omega * t).cos())
}

/// Simulate a phase-gated PAR(2) target paired with its clock.
///
/// Errors
/// ------
/// - `SimulationError::InvalidLength` for `n < 3`.
/// - `SimulationError::InvalidParameter` for a non-positive `dt` or
///   `period`, or a negative / non-finite noise scale.
pub fn simulate_par2(settings: &Par2Simulation) -> SimResult<PairedSeries> {
    let n = settings.n;
    if n < 3 {
        return Err(SimulationError::InvalidLength { n, required: 3 });
    }
    let dt = positive("dt", settings.dt)?;
    let period = positive("period", settings.period)?;
    let target_noise = normal("noise_sd", settings.noise_sd)?;
    let clock_noise = normal("clock_noise_sd", settings.clock_noise_sd)?;
    let mut rng = StdRng::seed_from_u64(settings.seed);

    let time: Array1<f64> = (0..n).map(|i| i as f64 * dt).collect();
    let omega = TAU / period;
    let mut target = Array1::zeros(n);
    target[0] = settings.initial[0];
    target[1] = settings.initial[1];
    for t in 2..n {
        let gate = settings.gating * (omega * time[t - 1]).cos();
        target[t] = settings.phi1 * target[t - 1]
            + settings.phi2 * target[t - 2]
            + gate * target[t - 1]
            + target_noise.sample(&mut rng);
    }

    let mut clock =
        clock_series(time.view(), settings.clock_mesor, settings.clock_amplitude, period);
    if settings.clock_noise_sd > 0.0 {
        clock.mapv_inplace(|c| c + clock_noise.sample(&mut rng));
    }
    Ok(PairedSeries::new(time, target, clock)?)
}

/// Stationary-start AR(2) series xₜ = φ₁xₜ₋₁ + φ₂xₜ₋₂ + εₜ (zero mean).
///
/// The recursion starts at zero and discards [`AR2_BURN_IN`] draws.
pub fn simulate_ar2(
    n: usize, phi1: f64, phi2: f64, noise_sd: f64, seed: u64,
) -> SimResult<Array1<f64>> {
    if n < 2 {
        return Err(SimulationError::InvalidLength { n, required: 2 });
    }
    let noise = normal("noise_sd", noise_sd)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let (mut prev2, mut prev1) = (0.0, 0.0);
    let mut out = Vec::with_capacity(n);
    for step in 0..AR2_BURN_IN + n {
        let x = phi1 * prev1 + phi2 * prev2 + noise.sample(&mut rng);
        prev2 = prev1;
        prev1 = x;
        if step >= AR2_BURN_IN {
            out.push(x);
        }
    }
    Ok(Array1::from(out))
}

/// Gaussian random walk starting at `start`.
pub fn random_walk(n: usize, start: f64, step_sd: f64, seed: u64) -> SimResult<Array1<f64>> {
    let step = normal("step_sd", step_sd)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut level = start;
    Ok((0..n)
        .map(|_| {
            level += step.sample(&mut rng);
            level
        })
        .collect())
}

#[cfg(feature = "python-bindings")]
impl From<SimulationError> for PyErr {
    fn from(err: SimulationError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
