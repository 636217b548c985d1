//! WORLD-style speech analysis and resynthesis: F0, envelope, aperiodicity.
//!
//! Decompose a mono f64 waveform into a fundamental-frequency contour, a
//! spectral envelope, and per-bin aperiodicity, then rebuild a waveform from
//! those features. The three sequences share one frame grid: one frame every
//! `period` milliseconds, `fft_size()/2 + 1` bins per spectral row. Unvoiced
//! and silent frames carry F0 = 0.
//!
//! # Example
//!
//! ```
//! use voder::{Analyzer, AnalyzerConfig};
//!
//! let config = AnalyzerConfig::new(5.0, 16000, 60.0, 400.0).unwrap();
//! let analyzer = Analyzer::new(config);
//!
//! let x: Vec<f64> = (0..16000)
//!     .map(|n| (2.0 * std::f64::consts::PI * 220.0 * n as f64 / 16000.0).sin())
//!     .collect();
//!
//! let (f0, envelope, aperiodicity) = analyzer.analyze(&x).unwrap();
//! let y = analyzer.synthesis(&f0, &envelope, &aperiodicity).unwrap();
//!
//! // Lossy resynthesis, but the duration survives to within one frame period.
//! assert!((y.len() as i64 - x.len() as i64).unsigned_abs() < 80);
//! ```

pub mod analyzer;
pub mod aperiodicity;
pub mod envelope;
pub mod fft;
pub mod pitch;
pub mod synth;

pub use analyzer::{Analyzer, AnalyzerConfig};

/// Errors returned by configuration and analysis/synthesis operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Construction parameters out of range; rejected before any analysis.
    #[error("invalid config: {parameter} = {value} ({requirement})")]
    InvalidConfig {
        parameter: &'static str,
        value: f64,
        requirement: &'static str,
    },

    /// Malformed analysis/synthesis input: empty, or non-finite values.
    #[error("invalid input: {0}")]
    AnalysisError(String),

    /// Synthesis feature sequences disagree on frame or bin count.
    #[error("shape mismatch: {sequence}: expected {expected}, got {got}")]
    ShapeMismatch {
        sequence: &'static str,
        expected: usize,
        got: usize,
    },
}
