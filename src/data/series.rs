//! data::series — time-stamped series containers with pairwise filtering.
//!
//! Purpose
//! -------
//! Hold the caller's already-aligned arrays (timestamps in hours plus one or
//! two value arrays) and apply the non-finite filtering rule before any fit:
//! a timestamp is dropped from every array when any of its values is NaN or
//! ±∞.
//!
//! Key behaviors
//! -------------
//! - [`TimeSeries::new`] / [`PairedSeries::new`] validate equal lengths and
//!   non-emptiness; they do not reject non-finite values.
//! - [`TimeSeries::finite_pairs`] and [`PairedSeries::filtered`] perform the
//!   pairwise filtering. `filtered` additionally enforces
//!   [`MIN_OBSERVATIONS`] and reports a shortfall as
//!   `FitError::InsufficientData`.
//!
//! Conventions
//! -----------
//! - Index 0 is the oldest observation; timestamps are assumed sorted
//!   ascending by the caller.
use crate::{
    data::errors::{DataError, DataResult},
    regression::{FitError, FitResult},
};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Minimum usable observations after filtering for a PAR(2) pair.
pub const MIN_OBSERVATIONS: usize = 10;

/// TimeSeries — one value array on a time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub time: Array1<f64>,
    pub value: Array1<f64>,
}

impl TimeSeries {
    /// Construct a series; `time` and `value` must have equal, non-zero
    /// length.
    pub fn new(time: Array1<f64>, value: Array1<f64>) -> DataResult<Self> {
        if time.is_empty() {
            return Err(DataError::EmptySeries);
        }
        if value.len() != time.len() {
            return Err(DataError::LengthMismatch {
                field: "value",
                expected: time.len(),
                actual: value.len(),
            });
        }
        Ok(TimeSeries { time, value })
    }

    /// Unit-spaced series (t = 0, 1, 2, …) for callers without timestamps.
    pub fn from_values(value: Array1<f64>) -> DataResult<Self> {
        let time = Array1::from_iter((0..value.len()).map(|i| i as f64));
        TimeSeries::new(time, value)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Copy of the series with every non-finite (time, value) pair dropped.
    pub fn finite_pairs(&self) -> TimeSeries {
        let (time, value): (Vec<f64>, Vec<f64>) = self
            .time
            .iter()
            .zip(self.value.iter())
            .filter(|(t, v)| t.is_finite() && v.is_finite())
            .map(|(&t, &v)| (t, v))
            .unzip();
        TimeSeries { time: Array1::from(time), value: Array1::from(value) }
    }

    /// Median spacing between consecutive timestamps; 1.0 when undefined.
    pub fn sampling_interval(&self) -> f64 {
        sampling_interval(self.time.view())
    }
}

/// PairedSeries — target and clock observed on a shared time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedSeries {
    pub time: Array1<f64>,
    pub target: Array1<f64>,
    pub clock: Array1<f64>,
}

impl PairedSeries {
    pub fn new(time: Array1<f64>, target: Array1<f64>, clock: Array1<f64>) -> DataResult<Self> {
        if time.is_empty() {
            return Err(DataError::EmptySeries);
        }
        for (field, len) in [("target", target.len()), ("clock", clock.len())] {
            if len != time.len() {
                return Err(DataError::LengthMismatch { field, expected: time.len(), actual: len });
            }
        }
        Ok(PairedSeries { time, target, clock })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Drop every timestamp at which time, target or clock is non-finite.
    ///
    /// Errors
    /// ------
    /// - `FitError::InsufficientData` if fewer than [`MIN_OBSERVATIONS`]
    ///   timestamps survive.
    pub fn filtered(&self) -> FitResult<PairedSeries> {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| {
                self.time[i].is_finite() && self.target[i].is_finite() && self.clock[i].is_finite()
            })
            .collect();
        if keep.len() < MIN_OBSERVATIONS {
            return Err(FitError::InsufficientData { n: keep.len(), required: MIN_OBSERVATIONS });
        }
        let pick = |a: &Array1<f64>| keep.iter().map(|&i| a[i]).collect::<Array1<f64>>();
        Ok(PairedSeries {
            time: pick(&self.time),
            target: pick(&self.target),
            clock: pick(&self.clock),
        })
    }

    pub fn target_series(&self) -> TimeSeries {
        TimeSeries { time: self.time.clone(), value: self.target.clone() }
    }

    pub fn clock_series(&self) -> TimeSeries {
        TimeSeries { time: self.time.clone(), value: self.clock.clone() }
    }
}

/// Median positive spacing of `time`; falls back to 1.0.
pub fn sampling_interval(time: ArrayView1<'_, f64>) -> f64 {
    let mut gaps: Vec<f64> = time
        .windows(2)
        .into_iter()
        .map(|w| w[1] - w[0])
        .filter(|d| d.is_finite() && *d > 0.0)
        .collect();
    if gaps.is_empty() {
        return 1.0;
    }
    gaps.sort_by(f64::total_cmp);
    let mid = gaps.len() / 2;
    if gaps.len() % 2 == 0 { 0.5 * (gaps[mid - 1] + gaps[mid]) } else { gaps[mid] }
}
