//! Aperiodicity estimation: per-bin noise-to-total energy ratio per frame.
//!
//! Unvoiced frames are fully aperiodic. Voiced frames get a base ratio from
//! autocorrelation periodicity at the pitch lag, rising quadratically to 1.0
//! at Nyquist: voicing is strongest low in the spectrum and breathier above.

use crate::analyzer::AnalyzerConfig;

/// Lower bound on any voiced-frame aperiodicity value.
const MIN_APERIODICITY: f64 = 0.001;

/// Estimate per-bin aperiodicity in [0, 1] for every frame.
///
/// Output: `f0.len()` rows of `config.spectrum_bins()` values. Rows for
/// unvoiced frames (f0 = 0) are all 1.0.
pub fn estimate(x: &[f64], f0: &[f64], config: &AnalyzerConfig) -> Vec<Vec<f64>> {
    let fs = config.sample_rate() as f64;
    let bins = config.spectrum_bins();

    let mut out = Vec::with_capacity(f0.len());
    for (t, &f) in f0.iter().enumerate() {
        if f <= 0.0 {
            out.push(vec![1.0; bins]);
            continue;
        }

        let p = periodicity(x, config.frame_position(t), fs, f);
        let base = (1.0 - p).max(MIN_APERIODICITY);

        let mut row = Vec::with_capacity(bins);
        for k in 0..bins {
            let rel = k as f64 / (bins - 1) as f64;
            let ap = base + (1.0 - base) * rel * rel;
            row.push(ap.clamp(MIN_APERIODICITY, 1.0));
        }
        out.push(row);
    }
    out
}

/// Normalized autocorrelation at the pitch lag over a two-period window
/// centered on `center`, corrected for the shortened overlap and clamped
/// to [0, 1]. 1.0 means perfectly periodic.
fn periodicity(x: &[f64], center: usize, fs: f64, f0: f64) -> f64 {
    // Lags past the signal length never overlap any samples.
    let lag = ((fs / f0).round() as usize).min(x.len());
    if lag < 1 {
        return 0.0;
    }
    let n = 2 * lag;

    let mut frame = vec![0.0; n];
    for (i, slot) in frame.iter_mut().enumerate() {
        let idx = center as isize - lag as isize + i as isize;
        *slot = if idx >= 0 && (idx as usize) < x.len() {
            x[idx as usize]
        } else {
            0.0
        };
    }

    let mean = frame.iter().sum::<f64>() / n as f64;
    let r0: f64 = frame.iter().map(|&s| (s - mean) * (s - mean)).sum();
    if r0 <= 0.0 {
        return 0.0;
    }

    let mut r = 0.0;
    for i in 0..n - lag {
        r += (frame[i] - mean) * (frame[i + lag] - mean);
    }

    // Only n - lag of the n terms overlap at this lag; undo that shrinkage.
    let corrected = (r / r0) * (n as f64 / (n - lag) as f64);
    corrected.clamp(0.0, 1.0)
}
