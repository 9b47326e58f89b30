//! resampling::fft — recursive radix-2 Cooley–Tukey transform.
//!
//! Forward transform X_k = Σ x_j e^{−2πi jk/N}; the inverse divides by N.
//! Lengths must be powers of two; [`fft_real_padded`] zero-pads real input
//! to the next power of two first.
use crate::resampling::errors::{ResamplingError, ResamplingResult};
use num_complex::Complex64;
use std::f64::consts::TAU;

/// Smallest power of two ≥ `n` (1 for n = 0).
#[inline]
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

fn check_len(len: usize) -> ResamplingResult<()> {
    if len == 0 {
        return Err(ResamplingError::EmptyInput);
    }
    if !len.is_power_of_two() {
        return Err(ResamplingError::NotPowerOfTwo { len });
    }
    Ok(())
}

fn transform(input: &[Complex64], sign: f64) -> Vec<Complex64> {
    let n = input.len();
    if n == 1 {
        return vec![input[0]];
    }
    let even: Vec<Complex64> = input.iter().step_by(2).copied().collect();
    let odd: Vec<Complex64> = input.iter().skip(1).step_by(2).copied().collect();
    let even = transform(&even, sign);
    let odd = transform(&odd, sign);

    let half = n / 2;
    let mut out = vec![Complex64::new(0.0, 0.0); n];
    for k in 0..half {
        let twiddle = Complex64::from_polar(1.0, sign * TAU * k as f64 / n as f64) * odd[k];
        out[k] = even[k] + twiddle;
        out[k + half] = even[k] - twiddle;
    }
    out
}

/// Forward DFT of a power-of-two length sequence.
pub fn fft(input: &[Complex64]) -> ResamplingResult<Vec<Complex64>> {
    check_len(input.len())?;
    Ok(transform(input, -1.0))
}

/// Inverse DFT (normalized by 1/N) of a power-of-two length sequence.
pub fn ifft(input: &[Complex64]) -> ResamplingResult<Vec<Complex64>> {
    check_len(input.len())?;
    let scale = 1.0 / input.len() as f64;
    Ok(transform(input, 1.0).into_iter().map(|z| z * scale).collect())
}

/// FFT of real data zero-padded to the next power of two.
pub fn fft_real_padded(values: &[f64]) -> ResamplingResult<Vec<Complex64>> {
    if values.is_empty() {
        return Err(ResamplingError::EmptyInput);
    }
    let len = next_power_of_two(values.len());
    let mut buf: Vec<Complex64> = values.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    buf.resize(len, Complex64::new(0.0, 0.0));
    fft(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::FftPlanner;

    #[test]
    fn fft_matches_rustfft() {
        let input: Vec<Complex64> = (0..32)
            .map(|i| Complex64::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect();
        let mut reference = input.clone();
        FftPlanner::<f64>::new().plan_fft_forward(32).process(&mut reference);

        let ours = fft(&input).unwrap();

        for (a, b) in ours.iter().zip(reference.iter()) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // ifft(fft(x)) must reconstruct any real sequence of length ≥ 4.
    fn inverse_reconstructs_real_input() {
        for &n in &[4usize, 8, 64, 256] {
            let x: Vec<Complex64> =
                (0..n).map(|i| Complex64::new(((i * 7919) % 13) as f64 - 6.0, 0.0)).collect();

            let back = ifft(&fft(&x).unwrap()).unwrap();

            for (a, b) in back.iter().zip(x.iter()) {
                assert!((a - b).norm() < 1e-6, "n = {n}");
            }
        }
    }

    #[test]
    fn non_power_of_two_is_rejected_and_padding_works() {
        let x = vec![Complex64::new(1.0, 0.0); 6];

        assert_eq!(fft(&x), Err(ResamplingError::NotPowerOfTwo { len: 6 }));
        assert_eq!(fft(&[]), Err(ResamplingError::EmptyInput));
        let padded = fft_real_padded(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(padded.len(), 4);
        assert!((padded[0].re - 6.0).abs() < 1e-12);
        assert_eq!(next_power_of_two(17), 32);
    }
}
