//! Pitch tracking: waveform → per-frame F0 contour.
//!
//! Normalized autocorrelation per frame over a window of two maximum pitch
//! periods. Frames below the silence gate or without a convincing
//! correlation peak report F0 = 0 (unvoiced).

use crate::analyzer::AnalyzerConfig;

/// Frames quieter than this RMS count as silence.
const SILENCE_RMS: f64 = 1e-6;

/// Minimum normalized correlation peak for a frame to count as voiced.
const VOICING_THRESHOLD: f64 = 0.3;

/// Estimate F0 for every analysis frame of `x`.
///
/// Returns `config.frame_count(x.len())` values, one per frame, 0.0 for
/// unvoiced/silent frames and otherwise inside [f0_floor, f0_ceil].
pub fn track(x: &[f64], config: &AnalyzerConfig) -> Vec<f64> {
    let fs = config.sample_rate() as f64;
    let frames = config.frame_count(x.len());

    // Lags past the signal length never overlap any samples, so the cap
    // loses nothing and keeps degenerate pitch floors from blowing the
    // window size.
    let cap = x.len().max(2);
    let min_lag = ((fs / config.f0_ceil()).floor() as usize).clamp(2, cap);
    let max_lag = ((fs / config.f0_floor()).ceil() as usize).clamp(min_lag + 2, cap + 2);
    let window = 2 * max_lag;

    let mut f0 = Vec::with_capacity(frames);
    let mut frame = vec![0.0; window];
    for t in 0..frames {
        gather(x, config.frame_position(t), &mut frame);
        f0.push(estimate_frame(&frame, min_lag, max_lag, fs, config));
    }

    median3(&mut f0);
    f0
}

/// Copy a window of `x` centered on `center` into `frame`, zero-padding
/// past the signal edges.
fn gather(x: &[f64], center: usize, frame: &mut [f64]) {
    let half = frame.len() / 2;
    for (i, slot) in frame.iter_mut().enumerate() {
        let idx = center as isize - half as isize + i as isize;
        *slot = if idx >= 0 && (idx as usize) < x.len() {
            x[idx as usize]
        } else {
            0.0
        };
    }
}

/// Single-frame estimate: silence gate, r(lag)/r(0) local-maximum search,
/// parabolic lag refinement, range clamp.
fn estimate_frame(
    frame: &[f64],
    min_lag: usize,
    max_lag: usize,
    fs: f64,
    config: &AnalyzerConfig,
) -> f64 {
    let n = frame.len();
    let rms = (frame.iter().map(|&s| s * s).sum::<f64>() / n as f64).sqrt();
    if rms < SILENCE_RMS {
        return 0.0;
    }

    // Remove DC before correlating so offset signals don't fake periodicity.
    let mean = frame.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = frame.iter().map(|&s| s - mean).collect();

    let r0: f64 = centered.iter().map(|&s| s * s).sum();
    if r0 <= 0.0 {
        return 0.0;
    }

    let hi = max_lag.min(n - 1);
    let mut corr = vec![0.0; hi + 1];
    for lag in min_lag - 1..=hi {
        let mut r = 0.0;
        for i in 0..n - lag {
            r += centered[i] * centered[i + lag];
        }
        corr[lag] = r / r0;
    }

    // Strongest local maximum wins. Steps left by zero padding at the
    // signal edges correlate as a monotone ramp and must not count as
    // periodicity, so a lag only qualifies when it beats both neighbors.
    let mut best_lag = 0;
    let mut best_r = VOICING_THRESHOLD;
    for lag in min_lag..hi {
        let r = corr[lag];
        if r > best_r && r >= corr[lag - 1] && r > corr[lag + 1] {
            best_r = r;
            best_lag = lag;
        }
    }
    if best_lag == 0 {
        return 0.0;
    }

    let lag = refine(&corr, best_lag, min_lag, hi);
    let f0 = fs / lag;
    if f0 < config.f0_floor() || f0 > config.f0_ceil() {
        return 0.0;
    }
    f0
}

/// Parabolic interpolation around the winning lag, clamped to one sample.
fn refine(corr: &[f64], lag: usize, lo: usize, hi: usize) -> f64 {
    if lag <= lo || lag >= hi {
        return lag as f64;
    }
    let (a, b, c) = (corr[lag - 1], corr[lag], corr[lag + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() < 1e-12 {
        return lag as f64;
    }
    let delta = (0.5 * (a - c) / denom).clamp(-1.0, 1.0);
    lag as f64 + delta
}

/// 3-point median filter, in place. Endpoints stay untouched, so constant
/// and all-zero contours pass through unchanged.
fn median3(f0: &mut [f64]) {
    if f0.len() < 3 {
        return;
    }
    let src = f0.to_vec();
    for t in 1..src.len() - 1 {
        f0[t] = median(src[t - 1], src[t], src[t + 1]);
    }
}

fn median(a: f64, b: f64, c: f64) -> f64 {
    a.max(b).min(a.min(b).max(c))
}
