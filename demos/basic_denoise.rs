//! Basic denoise example for haar-denoise.
//!
//! ```sh
//! cargo run --example basic_denoise
//! ```

#![allow(clippy::cast_possible_truncation)]

use haar_denoise::{metrics, DenoiseConfig, Denoiser};

fn main() {
    let rows = 64usize;
    let cols = 64usize;

    // Smooth gradient plus a deterministic +-3 speckle.
    let clean: Vec<u8> = (0..rows * cols)
        .map(|i| ((i % cols) * 255 / (cols - 1)) as u8)
        .collect();
    let noisy: Vec<u8> = clean
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let n = (i.wrapping_mul(2_654_435_761) >> 7) % 7;
            (i32::from(v) + n as i32 - 3).clamp(0, 255) as u8
        })
        .collect();

    for threshold in [0.0, 0.02, 0.08, 0.2] {
        let denoiser = Denoiser::new(DenoiseConfig::default().with_threshold(threshold)).unwrap();
        let out = denoiser.process(&noisy, rows, cols).unwrap();

        let vs_noisy = metrics::psnr(&noisy, &out.samples).unwrap();
        let vs_clean = metrics::psnr(&clean, &out.samples).unwrap();
        println!(
            "threshold {threshold:<5} zeroed {:5.1}%  PSNR vs noisy {vs_noisy:6.2} dB  vs clean {vs_clean:6.2} dB",
            out.stats.sparsity() * 100.0,
        );
    }
}
