//! Synthesis: F0 + envelope + aperiodicity → time-domain waveform.
//!
//! Harmonic-plus-noise model. A phase-locked sinusoid bank renders the
//! periodic part sample by sample from the interpolated F0 contour; the
//! noise part renders per frame as a random-phase spectrum through an
//! inverse FFT, Hann-windowed and overlap-added. Noise phases come from a
//! fixed-seed PRNG, so equal inputs synthesize bit-equal output.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

use crate::analyzer::AnalyzerConfig;
use crate::envelope::UNVOICED_F0;
use crate::fft;

/// Seed for the noise-phase PRNG.
const NOISE_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Render a waveform from analysis features.
///
/// `f0`, `envelope` and `aperiodicity` must already agree on frame count and
/// bin count (the caller validates). Output length is
/// `floor((frames - 1) * hop) + 1` samples, where hop is the frame period in
/// samples, which lands within one frame period of the analyzed length.
pub fn render(
    f0: &[f64],
    envelope: &[Vec<f64>],
    aperiodicity: &[Vec<f64>],
    config: &AnalyzerConfig,
) -> Vec<f64> {
    assert!(!f0.is_empty());
    assert_eq!(envelope.len(), f0.len());
    assert_eq!(aperiodicity.len(), f0.len());

    let hop = config.frame_hop();
    let n_out = (((f0.len() - 1) as f64 * hop) as usize).saturating_add(1);

    let mut y = vec![0.0; n_out];
    harmonic_part(f0, envelope, aperiodicity, config, &mut y);
    noise_part(f0, envelope, aperiodicity, config, &mut y);
    y
}

/// Per-sample sinusoid bank for the periodic component.
///
/// Harmonic k of the instantaneous F0 takes its amplitude from
/// `sqrt(envelope * (1 - aperiodicity))` at the harmonic's bin, linearly
/// interpolated between the two frames around the sample.
fn harmonic_part(
    f0: &[f64],
    envelope: &[Vec<f64>],
    aperiodicity: &[Vec<f64>],
    config: &AnalyzerConfig,
    y: &mut [f64],
) {
    let fs = config.sample_rate() as f64;
    let nyquist = fs / 2.0;
    let hop = config.frame_hop();
    let frames = f0.len();
    let bins = envelope[0].len();
    let nfft = (bins - 1) * 2;

    let mut phase = 0.0f64;
    for (n, out) in y.iter_mut().enumerate() {
        let pos = n as f64 / hop;
        let t0 = (pos as usize).min(frames - 1);
        let t1 = (t0 + 1).min(frames - 1);
        let frac = pos - t0 as f64;

        let v0 = f0[t0] > 0.0;
        let v1 = f0[t1] > 0.0;
        if !v0 && !v1 {
            phase = 0.0;
            continue;
        }

        // Frequency holds steady across a voicing boundary; the amplitude
        // ramp below fades the bank in or out instead.
        let fa = if v0 { f0[t0] } else { f0[t1] };
        let fb = if v1 { f0[t1] } else { f0[t0] };
        let f_inst = fa + (fb - fa) * frac;
        let vmix = (if v0 { 1.0 - frac } else { 0.0 }) + (if v1 { frac } else { 0.0 });

        phase += 2.0 * PI * f_inst / fs;
        if phase >= 2.0 * PI {
            // Wrapping the fundamental keeps every k*phase exact mod 2pi.
            phase -= 2.0 * PI;
        }

        let harmonics = ((nyquist / f_inst).ceil() as usize)
            .saturating_sub(1)
            .min(bins);

        let mut sample = 0.0;
        for k in 1..=harmonics {
            let freq = k as f64 * f_inst;
            let bin = ((freq * nfft as f64 / fs).round() as usize).min(bins - 1);

            let e0 = envelope[t0][bin];
            let e1 = envelope[t1][bin];
            let a0 = aperiodicity[t0][bin].clamp(0.0, 1.0);
            let a1 = aperiodicity[t1][bin].clamp(0.0, 1.0);
            let e = e0 + (e1 - e0) * frac;
            let a = a0 + (a1 - a0) * frac;

            let power = (e * (1.0 - a)).max(0.0);
            sample += power.sqrt() * (k as f64 * phase).sin();
        }
        *out += sample * vmix;
    }
}

/// Per-frame spectral noise for the aperiodic component.
///
/// Each frame builds a half spectrum with magnitude
/// `sqrt(envelope * aperiodicity)` and random phase, shares one harmonic
/// spacing's worth of power across its bins, and overlap-adds the inverse
/// transform under a Hann window. The accumulated window sum normalizes the
/// result so frame overlap cannot change the level.
fn noise_part(
    f0: &[f64],
    envelope: &[Vec<f64>],
    aperiodicity: &[Vec<f64>],
    config: &AnalyzerConfig,
    y: &mut [f64],
) {
    let fs = config.sample_rate() as f64;
    let bins = envelope[0].len();
    let nfft = (bins - 1) * 2;

    let window = fft::hann_window(nfft);
    let mut rng = Pcg32::seed_from_u64(NOISE_SEED);
    let mut half = vec![Complex64::new(0.0, 0.0); bins];
    let mut frame = vec![0.0; nfft];
    let mut acc = vec![0.0; y.len()];
    let mut wsum = vec![0.0; y.len()];

    for t in 0..f0.len() {
        let f_ref = if f0[t] > 0.0 { f0[t] } else { UNVOICED_F0 };
        // Bins per harmonic spacing: that many bins share one harmonic's power.
        let spread = (f_ref * nfft as f64 / fs).max(1.0);

        for (k, slot) in half.iter_mut().enumerate() {
            let power = (envelope[t][k] * aperiodicity[t][k].clamp(0.0, 1.0)).max(0.0);
            let amp = (power / spread).sqrt();
            // Scaled so the inverse transform yields cosines of amplitude `amp`.
            let mag = amp * nfft as f64 / 2.0;
            let theta = if k == 0 || k == bins - 1 {
                0.0
            } else {
                rng.gen::<f64>() * 2.0 * PI
            };
            *slot = Complex64::new(mag * theta.cos(), mag * theta.sin());
        }

        fft::inverse_half_spectrum(&half, &mut frame);

        let start = config.frame_position(t) as isize - (nfft / 2) as isize;
        for (i, &w) in window.iter().enumerate() {
            let idx = start + i as isize;
            if idx >= 0 && (idx as usize) < acc.len() {
                acc[idx as usize] += frame[i] * w;
                wsum[idx as usize] += w;
            }
        }
    }

    for (n, out) in y.iter_mut().enumerate() {
        if wsum[n] > 1e-9 {
            *out += acc[n] / wsum[n];
        }
    }
}
