//! data — validated containers for caller-supplied series.
//!
//! Inputs arrive already aligned and resolved (one timestamp array in hours
//! plus parallel value arrays). This module validates shapes and applies
//! the pairwise non-finite filter; it performs no I/O.

pub mod errors;
pub mod series;

pub use self::errors::{DataError, DataResult};
pub use self::series::{MIN_OBSERVATIONS, PairedSeries, TimeSeries, sampling_interval};
