//! Property tests for the FFT and phase-randomized surrogates.
//!
//! Purpose
//! -------
//! - Check the radix-2 transform against `rustfft` on random input.
//! - Check that surrogates keep the power spectrum and mean of the input.
use num_complex::Complex64;
use par2_timeseries::resampling::{fft, ifft, phase_randomized_surrogate};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use rustfft::FftPlanner;

fn power_of_two_signal() -> impl Strategy<Value = Vec<f64>> {
    (2u32..8).prop_flat_map(|exp| prop::collection::vec(-50.0f64..50.0, 1usize << exp))
}

proptest! {
    #[test]
    fn fft_agrees_with_rustfft(values in power_of_two_signal()) {
        let input: Vec<Complex64> = values.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        let mut reference = input.clone();
        FftPlanner::<f64>::new().plan_fft_forward(input.len()).process(&mut reference);

        let ours = fft(&input).unwrap();

        for (a, b) in ours.iter().zip(&reference) {
            prop_assert!((a - b).norm() < 1e-7 * (1.0 + b.norm()));
        }
    }

    #[test]
    fn inverse_undoes_forward(values in power_of_two_signal()) {
        let input: Vec<Complex64> = values.iter().map(|&v| Complex64::new(v, 0.0)).collect();

        let back = ifft(&fft(&input).unwrap()).unwrap();

        for (a, b) in back.iter().zip(&input) {
            prop_assert!((a - b).norm() < 1e-8);
        }
    }

    #[test]
    // Surrogates of power-of-two length keep every Fourier magnitude.
    fn surrogate_preserves_power_spectrum(values in power_of_two_signal(), seed in 0u64..1000) {
        let original = ndarray::Array1::from(values);
        let mut rng = StdRng::seed_from_u64(seed);

        let surrogate = phase_randomized_surrogate(original.view(), &mut rng).unwrap();

        let spec = |x: &ndarray::Array1<f64>| {
            let c: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
            fft(&c).unwrap()
        };
        let before = spec(&original);
        let after = spec(&surrogate);
        for (a, b) in before.iter().zip(&after) {
            prop_assert!((a.norm() - b.norm()).abs() < 1e-6 * (1.0 + a.norm()));
        }
        let mean_gap = (original.mean().unwrap() - surrogate.mean().unwrap()).abs();
        prop_assert!(mean_gap < 1e-8);
    }
}
