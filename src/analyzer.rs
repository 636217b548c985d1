//! Analyzer facade: validated configuration plus analyze/analyze_f0/synthesis.

use crate::{aperiodicity, envelope, pitch, synth, Error};

/// Analysis/synthesis parameters, validated once at construction and
/// immutable afterwards.
///
/// `period` is the frame period in milliseconds, `sample_rate` in Hz,
/// `f0_floor`/`f0_ceil` bound the pitch search in Hz.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    period: f64,
    sample_rate: u32,
    f0_floor: f64,
    f0_ceil: f64,
}

impl AnalyzerConfig {
    pub const DEFAULT_PERIOD: f64 = 5.0;
    pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
    pub const DEFAULT_F0_FLOOR: f64 = 40.0;
    pub const DEFAULT_F0_CEIL: f64 = 700.0;

    /// Build a config. Fails with [`Error::InvalidConfig`] unless
    /// `sample_rate > 0`, `period` is finite and positive, and
    /// `0 < f0_floor < f0_ceil` (both finite).
    pub fn new(period: f64, sample_rate: u32, f0_floor: f64, f0_ceil: f64) -> Result<Self, Error> {
        if sample_rate == 0 {
            return Err(Error::InvalidConfig {
                parameter: "sample_rate",
                value: 0.0,
                requirement: "must be > 0",
            });
        }
        if !period.is_finite() || period <= 0.0 {
            return Err(Error::InvalidConfig {
                parameter: "period",
                value: period,
                requirement: "must be finite and > 0",
            });
        }
        if !f0_floor.is_finite() || f0_floor <= 0.0 {
            return Err(Error::InvalidConfig {
                parameter: "f0_floor",
                value: f0_floor,
                requirement: "must be finite and > 0",
            });
        }
        if !f0_ceil.is_finite() || f0_ceil <= f0_floor {
            return Err(Error::InvalidConfig {
                parameter: "f0_ceil",
                value: f0_ceil,
                requirement: "must be finite and > f0_floor",
            });
        }
        Ok(Self {
            period,
            sample_rate,
            f0_floor,
            f0_ceil,
        })
    }

    /// Frame period in milliseconds.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Sampling rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Pitch search floor in Hz.
    pub fn f0_floor(&self) -> f64 {
        self.f0_floor
    }

    /// Pitch search ceiling in Hz.
    pub fn f0_ceil(&self) -> f64 {
        self.f0_ceil
    }

    /// Analysis FFT length: the power of two that fits three periods of the
    /// lowest trackable pitch.
    pub fn fft_size(&self) -> usize {
        let span = 3.0 * self.sample_rate as f64 / self.f0_floor + 1.0;
        // Exponent clamped so degenerate floors cannot blow the shift.
        let exp = (span.log2().floor() as i64 + 1).clamp(1, 30);
        1usize << exp
    }

    /// Bins per spectral frame: `fft_size() / 2 + 1`.
    pub fn spectrum_bins(&self) -> usize {
        self.fft_size() / 2 + 1
    }

    /// Number of analysis frames for an `n`-sample signal.
    pub fn frame_count(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        // The cast saturates for degenerate hops; the add must not wrap
        // the count back past usize::MAX.
        ((n as f64 / self.frame_hop()) as usize).saturating_add(1)
    }

    /// Samples between consecutive frame centers (fractional).
    pub(crate) fn frame_hop(&self) -> f64 {
        // Floored at 1e-3 samples so degenerate periods cannot blow the
        // frame grid.
        (self.sample_rate as f64 * self.period / 1000.0).max(1e-3)
    }

    /// Sample index of frame `t`'s center.
    pub(crate) fn frame_position(&self, t: usize) -> usize {
        (t as f64 * self.frame_hop()).round() as usize
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            f0_floor: Self::DEFAULT_F0_FLOOR,
            f0_ceil: Self::DEFAULT_F0_CEIL,
        }
    }
}

/// Speech analyzer/synthesizer bound to one immutable [`AnalyzerConfig`].
///
/// Every method is a pure function of the configuration and its input, so
/// one instance can serve many threads by reference and repeated calls on
/// equal input return equal output.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Full analysis: F0 contour, spectral envelope, and aperiodicity.
    ///
    /// The three sequences share one frame grid: `frame_count(x.len())`
    /// frames, with `spectrum_bins()` bins per envelope/aperiodicity row.
    /// Unvoiced and silent frames report F0 = 0.
    ///
    /// Fails with [`Error::AnalysisError`] if `x` is empty or contains
    /// non-finite samples.
    #[allow(clippy::type_complexity)]
    pub fn analyze(&self, x: &[f64]) -> Result<(Vec<f64>, Vec<Vec<f64>>, Vec<Vec<f64>>), Error> {
        check_waveform(x)?;
        let f0 = pitch::track(x, &self.config);
        let sp = envelope::estimate(x, &f0, &self.config);
        let ap = aperiodicity::estimate(x, &f0, &self.config);
        Ok((f0, sp, ap))
    }

    /// F0 contour only. Cheaper than [`Analyzer::analyze`] and returns the
    /// identical contour for the same input and configuration.
    pub fn analyze_f0(&self, x: &[f64]) -> Result<Vec<f64>, Error> {
        check_waveform(x)?;
        Ok(pitch::track(x, &self.config))
    }

    /// Rebuild a waveform from analysis features.
    ///
    /// The three inputs must agree on frame count, and every
    /// envelope/aperiodicity row must carry the same bin count; otherwise
    /// this fails with [`Error::ShapeMismatch`]. Empty or non-finite input
    /// fails with [`Error::AnalysisError`]. Aperiodicity values are clamped
    /// to [0, 1] and negative envelope values are treated as zero.
    ///
    /// The output holds `floor((frames - 1) * period_samples) + 1` samples
    /// at the configured rate, within one frame period of the originally
    /// analyzed length.
    pub fn synthesis(
        &self,
        f0: &[f64],
        envelope: &[Vec<f64>],
        aperiodicity: &[Vec<f64>],
    ) -> Result<Vec<f64>, Error> {
        if f0.is_empty() {
            return Err(Error::AnalysisError("f0 sequence is empty".into()));
        }
        if envelope.len() != f0.len() {
            return Err(Error::ShapeMismatch {
                sequence: "envelope frames",
                expected: f0.len(),
                got: envelope.len(),
            });
        }
        if aperiodicity.len() != f0.len() {
            return Err(Error::ShapeMismatch {
                sequence: "aperiodicity frames",
                expected: f0.len(),
                got: aperiodicity.len(),
            });
        }

        let bins = envelope[0].len();
        if bins < 2 {
            return Err(Error::AnalysisError(format!(
                "spectrum rows need at least 2 bins, got {bins}"
            )));
        }
        check_rows("envelope", "envelope bins", envelope, bins)?;
        check_rows("aperiodicity", "aperiodicity bins", aperiodicity, bins)?;

        if let Some(t) = f0.iter().position(|v| !v.is_finite()) {
            return Err(Error::AnalysisError(format!(
                "non-finite f0 value at frame {t}"
            )));
        }

        Ok(synth::render(f0, envelope, aperiodicity, &self.config))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

fn check_waveform(x: &[f64]) -> Result<(), Error> {
    if x.is_empty() {
        return Err(Error::AnalysisError("waveform is empty".into()));
    }
    if let Some(i) = x.iter().position(|s| !s.is_finite()) {
        return Err(Error::AnalysisError(format!(
            "non-finite sample at index {i}"
        )));
    }
    Ok(())
}

fn check_rows(
    name: &'static str,
    sequence: &'static str,
    rows: &[Vec<f64>],
    bins: usize,
) -> Result<(), Error> {
    for (t, row) in rows.iter().enumerate() {
        if row.len() != bins {
            return Err(Error::ShapeMismatch {
                sequence,
                expected: bins,
                got: row.len(),
            });
        }
        if let Some(k) = row.iter().position(|v| !v.is_finite()) {
            return Err(Error::AnalysisError(format!(
                "non-finite {name} value at frame {t}, bin {k}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.period(), 5.0);
        assert_eq!(config.sample_rate(), 44100);
        assert_eq!(config.f0_floor(), 40.0);
        assert_eq!(config.f0_ceil(), 700.0);
    }

    #[test]
    fn test_default_matches_explicit_construction() {
        let explicit = AnalyzerConfig::new(5.0, 44100, 40.0, 700.0).unwrap();
        assert_eq!(explicit, AnalyzerConfig::default());
    }

    #[test]
    fn test_fft_size_for_default_config() {
        // 3 * 44100 / 40 + 1 = 3308.5, next power of two above is 4096.
        let config = AnalyzerConfig::default();
        assert_eq!(config.fft_size(), 4096);
        assert_eq!(config.spectrum_bins(), 2049);
    }

    #[test]
    fn test_fft_size_tracks_floor_and_rate() {
        let config = AnalyzerConfig::new(5.0, 16000, 60.0, 400.0).unwrap();
        assert_eq!(config.fft_size(), 1024);
        assert_eq!(config.spectrum_bins(), 513);

        let config = AnalyzerConfig::new(5.0, 16000, 40.0, 400.0).unwrap();
        assert_eq!(config.fft_size(), 2048);

        let config = AnalyzerConfig::new(5.0, 8000, 80.0, 400.0).unwrap();
        assert_eq!(config.fft_size(), 512);
    }

    #[test]
    fn test_frame_count() {
        let config = AnalyzerConfig::default();
        // One second at 5 ms framing: 200 hops plus the frame at t = 0.
        assert_eq!(config.frame_count(44100), 201);
        assert_eq!(config.frame_count(0), 0);
        assert_eq!(config.frame_count(1), 1);

        let config = AnalyzerConfig::new(10.0, 16000, 60.0, 400.0).unwrap();
        assert_eq!(config.frame_count(16000), 101);
    }

    #[test]
    fn test_frame_count_bounded_for_degenerate_period() {
        // A subnormal-scale period passes validation (finite, positive) but
        // would put the raw frame formula far past usize. The floored hop
        // keeps the grid proportional to the input: three samples at a
        // millisample hop make 3000 hops plus the frame at t = 0.
        let config = AnalyzerConfig::new(5e-306, 16000, 60.0, 400.0).unwrap();
        assert_eq!(config.frame_count(3), 3001);
        assert_eq!(config.frame_count(0), 0);
    }

    #[test]
    fn test_frame_position_rounds() {
        let config = AnalyzerConfig::new(5.5, 16000, 60.0, 400.0).unwrap();
        // hop = 88 samples exactly
        assert_eq!(config.frame_position(0), 0);
        assert_eq!(config.frame_position(2), 176);

        let config = AnalyzerConfig::new(5.0, 22050, 60.0, 400.0).unwrap();
        // hop = 110.25: positions round to nearest sample
        assert_eq!(config.frame_position(1), 110);
        assert_eq!(config.frame_position(2), 221);
    }

    #[test]
    fn test_invalid_sample_rate() {
        assert!(matches!(
            AnalyzerConfig::new(5.0, 0, 40.0, 700.0),
            Err(Error::InvalidConfig {
                parameter: "sample_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_period() {
        for period in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                AnalyzerConfig::new(period, 44100, 40.0, 700.0),
                Err(Error::InvalidConfig {
                    parameter: "period",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_invalid_f0_bounds() {
        // floor must be positive and finite
        for floor in [0.0, -40.0, f64::NAN] {
            assert!(matches!(
                AnalyzerConfig::new(5.0, 44100, floor, 700.0),
                Err(Error::InvalidConfig {
                    parameter: "f0_floor",
                    ..
                })
            ));
        }
        // ceil must exceed floor and be finite
        for ceil in [40.0, 30.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                AnalyzerConfig::new(5.0, 44100, 40.0, ceil),
                Err(Error::InvalidConfig {
                    parameter: "f0_ceil",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_valid_config_matrix() {
        for &(period, rate, floor, ceil) in &[
            (5.0, 44100u32, 40.0, 700.0),
            (2.5, 16000, 60.0, 400.0),
            (10.0, 8000, 80.0, 300.0),
            (1.0, 48000, 50.0, 1000.0),
            (20.0, 22050, 40.0, 41.0),
        ] {
            assert!(
                AnalyzerConfig::new(period, rate, floor, ceil).is_ok(),
                "({period}, {rate}, {floor}, {ceil}) rejected"
            );
        }
    }

    #[test]
    fn test_analyzer_exposes_config() {
        let config = AnalyzerConfig::new(5.0, 16000, 60.0, 400.0).unwrap();
        let analyzer = Analyzer::new(config.clone());
        assert_eq!(analyzer.config(), &config);
    }

    #[test]
    fn test_default_analyzer_uses_default_config() {
        let analyzer = Analyzer::default();
        assert_eq!(analyzer.config(), &AnalyzerConfig::default());
    }
}
