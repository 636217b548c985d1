//! FFT wrappers around `rustfft`: windows, power spectra, Hermitian inversion.

use rustfft::{num_complex::Complex64, FftPlanner};
use std::f64::consts::PI;

/// Hann window of length `n`.
pub fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / n as f64).cos()))
        .collect()
}

/// Compute the power spectrum of a real-valued frame.
///
/// Input: `frame` of length N (window the frame beforehand if needed).
/// Output: the first `N/2 + 1` slots of `spectrum` receive |X[k]|^2 for
/// bins k in 0..=N/2.
pub fn power_spectrum(frame: &[f64], spectrum: &mut [f64]) {
    let n = frame.len();
    assert!(n > 0);
    assert!(spectrum.len() >= n / 2 + 1);

    let mut buffer: Vec<Complex64> = frame.iter().map(|&s| Complex64::new(s, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    for (k, slot) in spectrum.iter_mut().take(n / 2 + 1).enumerate() {
        *slot = buffer[k].norm_sqr();
    }
}

/// Reconstruct a real signal from a half spectrum via Hermitian symmetry.
///
/// Input: `half` of length `bins` covering k in 0..=N/2, where N = 2*(bins-1).
/// Bins 0 and N/2 contribute only their real parts.
/// Output: the first N slots of `out` receive the 1/N-normalized inverse
/// transform, so a half spectrum with `half[k] = N/2` at one interior bin
/// comes back as a unit-amplitude cosine.
pub fn inverse_half_spectrum(half: &[Complex64], out: &mut [f64]) {
    let bins = half.len();
    assert!(bins >= 2);
    let n = (bins - 1) * 2;
    assert!(out.len() >= n);

    let mut buffer = vec![Complex64::new(0.0, 0.0); n];
    buffer[0] = Complex64::new(half[0].re, 0.0);
    buffer[n / 2] = Complex64::new(half[bins - 1].re, 0.0);
    for k in 1..bins - 1 {
        buffer[k] = half[k];
        buffer[n - k] = half[k].conj();
    }

    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut buffer);

    for (i, slot) in out.iter_mut().take(n).enumerate() {
        *slot = buffer[i].re / n as f64;
    }
}
