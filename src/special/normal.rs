//! special::normal — error function and standard normal CDF.
//!
//! `erf` uses the Abramowitz & Stegun 7.1.26 rational approximation
//! (|error| ≤ 1.5e-7), which is ample for the normal approximations used in
//! the diagnostics (ACF significance bands, z-scores).

const ERF_P: f64 = 0.327_591_1;
const ERF_A: [f64; 5] =
    [0.254_829_592, -0.284_496_736, 1.421_413_741, -1.453_152_027, 1.061_405_429];

/// Error function erf(x).
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + ERF_P * x);
    let poly = ERF_A.iter().rev().fold(0.0, |acc, &a| acc * t + a) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF Φ(z).
pub fn normal_cdf(z: f64) -> f64 {
    (0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::distribution::{ContinuousCDF, Normal};

    #[test]
    fn normal_cdf_agrees_with_statrs_within_approximation_error() {
        let reference = Normal::new(0.0, 1.0).unwrap();
        for i in -40..=40 {
            let z = i as f64 * 0.1;
            let got = normal_cdf(z);
            assert!((got - reference.cdf(z)).abs() < 2e-7, "z={z}: {got}");
        }
    }

    #[test]
    fn erf_is_odd_and_saturates() {
        assert!((erf(0.7) + erf(-0.7)).abs() < 1e-15);
        assert!((erf(6.0) - 1.0).abs() < 1e-7);
        assert!(erf(0.0).abs() < 1e-8);
    }
}
