use criterion::{black_box, criterion_group, criterion_main, Criterion};

use haar_denoise::{Denoiser, Haar1D, Haar2D, SampleMatrix, Thresholder};

fn bench_haar_1d(c: &mut Criterion) {
    let wavelet = Haar1D::new();
    let original: Vec<f64> = (0..1024).map(|i| f64::from((i * 7 + 13) % 256) / 255.0).collect();

    c.bench_function("haar_1d_forward_1024", |b| {
        let mut signal = original.clone();
        b.iter(|| {
            signal.copy_from_slice(&original);
            wavelet.forward(black_box(&mut signal)).unwrap();
        });
    });

    c.bench_function("haar_1d_inverse_1024", |b| {
        let mut signal = original.clone();
        wavelet.forward(&mut signal).unwrap();
        let transformed = signal.clone();
        b.iter(|| {
            signal.copy_from_slice(&transformed);
            wavelet.inverse(black_box(&mut signal)).unwrap();
        });
    });
}

fn bench_haar_2d(c: &mut Criterion) {
    let wavelet = Haar2D::new();
    let original: Vec<f64> = (0..256 * 256).map(|i| f64::from((i * 3 + 10) % 256) / 255.0).collect();

    c.bench_function("haar_2d_forward_256x256", |b| {
        let mut image = original.clone();
        b.iter(|| {
            image.copy_from_slice(&original);
            wavelet.forward_slice(black_box(&mut image), 256, 256).unwrap();
        });
    });

    c.bench_function("haar_2d_roundtrip_owned_256x256", |b| {
        b.iter(|| {
            let m = SampleMatrix::from_vec(original.clone(), 256, 256).unwrap();
            let coeffs = wavelet.forward(black_box(m)).unwrap();
            wavelet.inverse(coeffs).unwrap()
        });
    });
}

fn bench_threshold(c: &mut Criterion) {
    let thresholder = Thresholder::default();
    let input: Vec<f64> = (0..65536).map(|i| f64::from(i - 32768) / 65536.0).collect();
    let mut buf = input.clone();

    c.bench_function("threshold_65536", |b| {
        b.iter(|| {
            buf.copy_from_slice(&input);
            thresholder.apply_slice(black_box(&mut buf))
        });
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let denoiser = Denoiser::default();
    let samples: Vec<u8> = (0..512 * 512).map(|i| ((i * 7) % 256) as u8).collect();

    c.bench_function("denoise_512x512", |b| {
        b.iter(|| denoiser.process(black_box(&samples), 512, 512).unwrap());
    });
}

criterion_group!(
    benches,
    bench_haar_1d,
    bench_haar_2d,
    bench_threshold,
    bench_pipeline,
);
criterion_main!(benches);
