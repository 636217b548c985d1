//! Spectral envelope estimation: waveform + F0 contour → per-frame envelope.
//!
//! Each frame gets a pitch-adaptive Hann window (three periods of its F0),
//! a zero-padded FFT power spectrum scaled to squared harmonic amplitude,
//! and a moving average one harmonic spacing wide to flatten the comb.

use crate::analyzer::AnalyzerConfig;
use crate::fft;

/// Window width reference for unvoiced frames, Hz. Keeps unvoiced analysis
/// windows short instead of stretching them to the pitch floor.
pub(crate) const UNVOICED_F0: f64 = 500.0;

/// Envelope values never drop below this, so sqrt/log/divide stay finite.
pub(crate) const ENVELOPE_FLOOR: f64 = 1e-12;

/// Estimate a smoothed power-spectrum envelope for every frame.
///
/// Output: `f0.len()` rows of `config.spectrum_bins()` non-negative values.
pub fn estimate(x: &[f64], f0: &[f64], config: &AnalyzerConfig) -> Vec<Vec<f64>> {
    let fs = config.sample_rate() as f64;
    let nfft = config.fft_size();
    let bins = config.spectrum_bins();

    let mut out = Vec::with_capacity(f0.len());
    let mut padded = vec![0.0; nfft];
    let mut raw = vec![0.0; bins];

    for (t, &f) in f0.iter().enumerate() {
        let f_ref = if f > 0.0 { f } else { UNVOICED_F0 };

        // Three pitch periods, capped at the FFT length.
        let span = ((3.0 * fs / f_ref).round() as usize).clamp(2, nfft);
        let window = fft::hann_window(span);
        let wsum: f64 = window.iter().sum();

        let center = config.frame_position(t);
        padded.iter_mut().for_each(|s| *s = 0.0);
        for (i, &w) in window.iter().enumerate() {
            let idx = center as isize - (span / 2) as isize + i as isize;
            if idx >= 0 && (idx as usize) < x.len() {
                padded[i] = x[idx as usize] * w;
            }
        }

        fft::power_spectrum(&padded, &mut raw);

        // (2|X[k]|/Σw)^2 recovers the squared amplitude of a sine at bin k.
        let scale = 4.0 / (wsum * wsum);
        let mut sp: Vec<f64> = raw
            .iter()
            .map(|&p| (p * scale).max(ENVELOPE_FLOOR))
            .collect();

        smooth(&mut sp, harmonic_width(f_ref, nfft, fs));
        out.push(sp);
    }
    out
}

/// Moving-average width covering one harmonic spacing, in bins.
fn harmonic_width(f0: f64, nfft: usize, fs: f64) -> usize {
    ((f0 * nfft as f64 / fs).round() as usize).max(1)
}

/// Centered moving average; the averaging range clamps at the edges.
fn smooth(sp: &mut [f64], width: usize) {
    if width <= 1 {
        return;
    }
    let half = width / 2;
    let src = sp.to_vec();
    for (k, slot) in sp.iter_mut().enumerate() {
        let lo = k.saturating_sub(half);
        let hi = (k + half).min(src.len() - 1);
        let sum: f64 = src[lo..=hi].iter().sum();
        *slot = sum / (hi - lo + 1) as f64;
    }
}
