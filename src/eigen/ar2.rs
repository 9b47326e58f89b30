//! eigen::ar2 — closed-form characteristic roots of an AR(2) recursion.
//!
//! Purpose
//! -------
//! Solve λ² − φ₁λ − φ₂ = 0 and derive the quantities the diagnostics and
//! reports rely on: whether the roots oscillate, their common modulus, the
//! implied eigenperiod, and stability margins.
//!
//! Key behaviors
//! -------------
//! - Discriminant D = φ₁² + 4φ₂. D ≥ 0 gives two real roots (φ₁ ± √D)/2 with
//!   no argument; D < 0 gives the conjugate pair φ₁/2 ± i√(−D)/2.
//! - [`EigenResult::eigenperiod`] = 2π / |arg| × sampling interval, defined
//!   only for complex roots.
//! - [`EigenResult::stability`] reports stable iff max |λ| < 1, margin
//!   1 − max |λ|, and half-life ln ½ / ln max |λ| for 0 < max |λ| < 1.
//! - [`is_ar2_stable`] is literally `solve_ar2(..).max_modulus() < 1`, so the
//!   two can never disagree near the unit circle.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; the solver is a pure function of (φ₁, φ₂).
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// EigenResult — roots of λ² − φ₁λ − φ₂ = 0.
///
/// Fields
/// ------
/// - `roots`: both roots; for a complex pair `roots[1]` is the conjugate of
///   `roots[0]` and `roots[0]` has the positive imaginary part.
/// - `is_complex`: `true` iff D < 0.
/// - `moduli`: |λ| per root (equal for a complex pair).
/// - `arguments`: `Some([θ, −θ])` with θ = atan2(Im, Re) for a complex pair,
///   `None` for real roots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EigenResult {
    pub phi1: f64,
    pub phi2: f64,
    pub discriminant: f64,
    pub roots: [Complex64; 2],
    pub is_complex: bool,
    pub moduli: [f64; 2],
    pub arguments: Option<[f64; 2]>,
}

/// Stability summary derived from the dominant root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stability {
    pub stable: bool,
    /// 1 − max |λ|; negative for explosive dynamics.
    pub margin: f64,
    /// Periods until a perturbation halves; `None` unless 0 < max |λ| < 1.
    pub half_life: Option<f64>,
}

impl EigenResult {
    /// Largest root modulus.
    #[inline]
    pub fn max_modulus(&self) -> f64 {
        self.moduli[0].max(self.moduli[1])
    }

    /// Oscillation period implied by a complex root, in units of `dt`.
    ///
    /// Returns `None` for real roots or a non-positive sampling interval.
    pub fn eigenperiod(&self, dt: f64) -> Option<f64> {
        let [theta, _] = self.arguments?;
        if theta.abs() <= f64::EPSILON || !(dt.is_finite() && dt > 0.0) {
            return None;
        }
        Some(TAU / theta.abs() * dt)
    }

    pub fn stability(&self) -> Stability {
        let m = self.max_modulus();
        let half_life = (m > 0.0 && m < 1.0).then(|| 0.5f64.ln() / m.ln());
        Stability { stable: m < 1.0, margin: 1.0 - m, half_life }
    }
}

/// Solve the AR(2) characteristic equation λ² − φ₁λ − φ₂ = 0.
pub fn solve_ar2(phi1: f64, phi2: f64) -> EigenResult {
    let discriminant = phi1 * phi1 + 4.0 * phi2;
    if discriminant >= 0.0 {
        let sqrt_d = discriminant.sqrt();
        let r1 = 0.5 * (phi1 + sqrt_d);
        let r2 = 0.5 * (phi1 - sqrt_d);
        EigenResult {
            phi1,
            phi2,
            discriminant,
            roots: [Complex64::new(r1, 0.0), Complex64::new(r2, 0.0)],
            is_complex: false,
            moduli: [r1.abs(), r2.abs()],
            arguments: None,
        }
    } else {
        let re = 0.5 * phi1;
        let im = 0.5 * (-discriminant).sqrt();
        let root = Complex64::new(re, im);
        let modulus = re.hypot(im);
        let theta = im.atan2(re);
        EigenResult {
            phi1,
            phi2,
            discriminant,
            roots: [root, root.conj()],
            is_complex: true,
            moduli: [modulus, modulus],
            arguments: Some([theta, -theta]),
        }
    }
}

/// `true` iff every root of the AR(2) characteristic equation lies strictly
/// inside the unit circle.
#[inline]
pub fn is_ar2_stable(phi1: f64, phi2: f64) -> bool {
    solve_ar2(phi1, phi2).max_modulus() < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Residual of the characteristic polynomial at the returned roots.
    // - Real vs complex branching on the sign of the discriminant.
    // - Agreement of `is_ar2_stable` with the solver on the unit circle.
    // - Eigenperiod and half-life formulas.
    // -------------------------------------------------------------------------

    fn char_poly(lambda: Complex64, phi1: f64, phi2: f64) -> Complex64 {
        lambda * lambda - lambda * phi1 - phi2
    }

    proptest! {
        #[test]
        fn roots_satisfy_characteristic_equation(phi1 in -3.0f64..3.0, phi2 in -2.0f64..2.0) {
            let eig = solve_ar2(phi1, phi2);
            for root in eig.roots {
                prop_assert!(char_poly(root, phi1, phi2).norm() < 1e-9);
            }
            prop_assert_eq!(eig.is_complex, eig.discriminant < 0.0);
            if eig.is_complex {
                prop_assert_eq!(eig.roots[1], eig.roots[0].conj());
                prop_assert!((eig.moduli[0] - eig.moduli[1]).abs() < 1e-15);
            } else {
                prop_assert!(eig.roots.iter().all(|r| r.im == 0.0));
                prop_assert!(eig.arguments.is_none());
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The stability predicate must agree with the solver's modulus on a
    // dense grid and right at the unit circle.
    //
    // Given
    // -----
    // - A 121×81 grid over φ₁ ∈ [−3, 3], φ₂ ∈ [−2, 2].
    // - Complex pairs with modulus 1 ± 1e-9 (φ₂ = −m²).
    //
    // Expect
    // ------
    // - `is_ar2_stable` equals `max_modulus() < 1` everywhere.
    fn stability_predicate_agrees_with_solver() {
        for i in 0..=120 {
            for j in 0..=80 {
                let phi1 = -3.0 + 0.05 * i as f64;
                let phi2 = -2.0 + 0.05 * j as f64;
                let eig = solve_ar2(phi1, phi2);
                assert_eq!(is_ar2_stable(phi1, phi2), eig.max_modulus() < 1.0);
            }
        }
        for &m in &[1.0 - 1e-9, 1.0, 1.0 + 1e-9] {
            let phi2: f64 = -(m * m);
            let phi1 = 0.3;
            let eig = solve_ar2(phi1, phi2);
            assert!(eig.is_complex);
            assert_eq!(is_ar2_stable(phi1, phi2), eig.max_modulus() < 1.0);
        }
        assert!(is_ar2_stable(0.5, 0.2));
        assert!(!is_ar2_stable(1.2, 0.2));
    }

    #[test]
    fn complex_roots_report_eigenperiod() {
        // φ₁ = 2r cos θ, φ₂ = −r² with r = 0.8, θ = 2π/12.
        let r: f64 = 0.8;
        let theta = TAU / 12.0;
        let eig = solve_ar2(2.0 * r * theta.cos(), -r * r);

        assert!((eig.max_modulus() - r).abs() < 1e-12);
        let period = eig.eigenperiod(2.0).unwrap();
        assert!((period - 24.0).abs() < 1e-9, "period = {period}");
        assert!(solve_ar2(0.5, 0.2).eigenperiod(1.0).is_none());
    }

    #[test]
    fn stability_margin_and_half_life() {
        let eig = solve_ar2(0.5, 0.0);
        let s = eig.stability();

        assert!(s.stable);
        assert!((s.margin - 0.5).abs() < 1e-12);
        assert!((s.half_life.unwrap() - 1.0).abs() < 1e-12);

        let explosive = solve_ar2(1.5, 0.0).stability();
        assert!(!explosive.stable);
        assert!(explosive.half_life.is_none());
        assert!(solve_ar2(0.0, 0.0).stability().half_life.is_none());
    }
}
