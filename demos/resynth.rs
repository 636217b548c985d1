use std::f64::consts::PI;
use voder::{Analyzer, AnalyzerConfig};

const SAMPLE_RATE: u32 = 16000;

fn write_wav(path: &str, samples: &[f64]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        w.write_sample((s * 32767.0).clamp(-32768.0, 32767.0) as i16)
            .unwrap();
    }
    w.finalize().unwrap();
}

/// Sung-vowel stand-in: gliding fundamental, formant-weighted harmonics,
/// a touch of breath noise.
fn make_voice(secs: f64) -> Vec<f64> {
    let fs = SAMPLE_RATE as f64;
    let n = (fs * secs) as usize;
    let formants = [(700.0, 0.9), (1200.0, 0.5), (2600.0, 0.2)];

    let mut phase = 0.0f64;
    let mut state = 0x600DF00Du32;
    (0..n)
        .map(|i| {
            let t = i as f64 / fs;
            let f0 = 130.0 + 50.0 * (2.0 * PI * 0.4 * t).sin();
            phase += 2.0 * PI * f0 / fs;

            let mut s = 0.0;
            let mut k = 1.0;
            while k * f0 < 3500.0 {
                // Weight each harmonic by its distance to the nearest formant.
                let freq = k * f0;
                let w: f64 = formants
                    .iter()
                    .map(|&(fc, g)| g / (1.0 + ((freq - fc) / 300.0).powi(2)))
                    .sum();
                s += w * (k * phase).sin();
                k += 1.0;
            }

            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let breath = ((state as f64 / u32::MAX as f64) * 2.0 - 1.0) * 0.01;

            0.25 * s + breath
        })
        .collect()
}

fn rms(x: &[f64]) -> f64 {
    (x.iter().map(|&s| s * s).sum::<f64>() / x.len() as f64).sqrt()
}

fn main() {
    let config = AnalyzerConfig::new(5.0, SAMPLE_RATE, 60.0, 400.0).unwrap();
    let analyzer = Analyzer::new(config);

    let x = make_voice(2.0);
    eprintln!(
        "Input: {} samples ({:.2}s), rms {:.3}",
        x.len(),
        x.len() as f64 / SAMPLE_RATE as f64,
        rms(&x)
    );

    let (f0, envelope, aperiodicity) = analyzer.analyze(&x).unwrap();
    let voiced = f0.iter().filter(|&&v| v > 0.0).count();
    eprintln!(
        "Analysis: {} frames ({} voiced), {} bins/frame",
        f0.len(),
        voiced,
        envelope[0].len()
    );

    let y = analyzer.synthesis(&f0, &envelope, &aperiodicity).unwrap();
    eprintln!(
        "Resynthesis: {} samples ({:.2}s), rms {:.3}",
        y.len(),
        y.len() as f64 / SAMPLE_RATE as f64,
        rms(&y)
    );

    let in_path = "/tmp/voder_input.wav";
    let out_path = "/tmp/voder_resynth.wav";
    write_wav(in_path, &x);
    write_wav(out_path, &y);
    eprintln!("Wrote {in_path} and {out_path}");
}
