use std::f64::consts::PI;
use voder::{Analyzer, AnalyzerConfig};

const SAMPLE_RATE: u32 = 16000;

/// Three-part test signal: low tone, silence, rising tone.
fn make_signal() -> Vec<f64> {
    let fs = SAMPLE_RATE as f64;
    let seg = (fs * 0.4) as usize;

    let mut x = Vec::with_capacity(3 * seg);
    for i in 0..seg {
        x.push(0.6 * (2.0 * PI * 110.0 * i as f64 / fs).sin());
    }
    x.extend(std::iter::repeat(0.0).take(seg));
    let mut phase = 0.0f64;
    for i in 0..seg {
        let f = 180.0 + 120.0 * i as f64 / seg as f64;
        phase += 2.0 * PI * f / fs;
        x.push(0.6 * phase.sin());
    }
    x
}

fn main() {
    let config = AnalyzerConfig::new(10.0, SAMPLE_RATE, 60.0, 400.0).unwrap();
    let analyzer = Analyzer::new(config);

    let x = make_signal();
    let f0 = analyzer.analyze_f0(&x).unwrap();

    println!("{:>7} {:>8}  contour", "time", "F0 (Hz)");
    for (t, &v) in f0.iter().enumerate() {
        let time = t as f64 * 10.0 / 1000.0;
        if v == 0.0 {
            println!("{time:>6.2}s {:>8}  .", "-");
        } else {
            let bar = "#".repeat(((v - 50.0) / 10.0) as usize);
            println!("{time:>6.2}s {v:>8.1}  {bar}");
        }
    }

    let voiced = f0.iter().filter(|&&v| v > 0.0).count();
    eprintln!("{} frames, {} voiced", f0.len(), voiced);
}
