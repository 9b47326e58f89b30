//! eigen — AR(2) eigenstructure: roots, modulus, eigenperiod, stability.
//!
//! The solver is closed-form (quadratic formula on the characteristic
//! polynomial); see [`ar2`] for the conventions on root ordering and
//! arguments.

pub mod ar2;

pub use self::ar2::{EigenResult, Stability, is_ar2_stable, solve_ar2};
