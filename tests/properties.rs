use haar_denoise::{
    denoise, DenoiseConfig, DenoiseError, Denoiser, DimensionFault, Haar1D, Haar2D, SampleMatrix,
    SubBand, Thresholder,
};
use proptest::prelude::*;

const TOL: f64 = 1e-9;

fn vec_f64(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0..1.0f64, len)
}

/// Power-of-two shape between 2 and 32 on each side, with matching data.
fn pow2_matrix() -> impl Strategy<Value = (usize, usize, Vec<f64>)> {
    (1u32..=5, 1u32..=5).prop_flat_map(|(r, c)| {
        let (rows, cols) = (1usize << r, 1usize << c);
        vec_f64(rows * cols).prop_map(move |data| (rows, cols, data))
    })
}

#[test]
fn haar_1d_roundtrip() {
    proptest!(|(half in 1usize..64, seed in vec_f64(128))| {
        let original = seed[..half * 2].to_vec();
        let mut signal = original.clone();
        let wavelet = Haar1D::new();
        wavelet.forward(&mut signal).unwrap();
        wavelet.inverse(&mut signal).unwrap();
        for (a, b) in signal.iter().zip(original.iter()) {
            prop_assert!((a - b).abs() < TOL);
        }
    });
}

#[test]
fn haar_2d_roundtrip() {
    proptest!(|((rows, cols, data) in pow2_matrix())| {
        let wavelet = Haar2D::new();
        let m = SampleMatrix::from_vec(data.clone(), rows, cols).unwrap();
        let restored = wavelet.inverse(wavelet.forward(m).unwrap()).unwrap();
        prop_assert_eq!(restored.shape(), (rows, cols));
        for (a, b) in restored.as_slice().iter().zip(data.iter()) {
            prop_assert!((a - b).abs() < TOL);
        }
    });
}

#[test]
fn haar_2d_preserves_energy() {
    proptest!(|((rows, cols, data) in pow2_matrix())| {
        let m = SampleMatrix::from_vec(data, rows, cols).unwrap();
        let before = m.energy();
        let coeffs = Haar2D::new().forward(m).unwrap();
        prop_assert!((coeffs.energy() - before).abs() < TOL * (1.0 + before));
    });
}

#[test]
fn threshold_is_monotone() {
    proptest!(|(coeffs in vec_f64(64), t1 in 0.0..1.0f64, t2 in 0.0..1.0f64)| {
        let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let mut a = coeffs.clone();
        let mut b = coeffs;
        let kept_lo = Thresholder::new(lo).unwrap().apply_slice(&mut a).retained;
        let kept_hi = Thresholder::new(hi).unwrap().apply_slice(&mut b).retained;
        prop_assert!(kept_hi <= kept_lo);
        let nonzero_lo = a.iter().filter(|&&v| v != 0.0).count();
        let nonzero_hi = b.iter().filter(|&&v| v != 0.0).count();
        prop_assert!(nonzero_hi <= nonzero_lo);
    });
}

#[test]
fn threshold_is_idempotent() {
    proptest!(|(coeffs in vec_f64(64), t in 0.0..1.0f64)| {
        let thresholder = Thresholder::new(t).unwrap();
        let mut once = coeffs;
        thresholder.apply_slice(&mut once);
        let mut twice = once.clone();
        thresholder.apply_slice(&mut twice);
        prop_assert_eq!(once, twice);
    });
}

#[test]
fn denoise_preserves_shape() {
    proptest!(|(r in 1u32..=5, c in 1u32..=5, fill in any::<u8>())| {
        let (rows, cols) = (1usize << r, 1usize << c);
        let out = denoise(&vec![fill; rows * cols], rows, cols).unwrap();
        prop_assert_eq!(out.samples.len(), rows * cols);
        prop_assert_eq!((out.rows, out.cols), (rows, cols));
    });
}

#[test]
fn constant_2x2_block() {
    let m = SampleMatrix::from_vec(vec![128.0; 4], 2, 2).unwrap();
    let haar = Haar2D::new();
    let mut coeffs = haar.forward(m).unwrap();

    let ll = coeffs.band(SubBand::LL)[0];
    assert!((ll - 256.0).abs() < TOL);
    for band in [SubBand::LH, SubBand::HL, SubBand::HH] {
        assert_eq!(coeffs.band(band), vec![0.0]);
    }

    // Any cutoff at or below LL leaves the block intact.
    Thresholder::new(255.0).unwrap().apply(&mut coeffs);
    let restored = haar.inverse(coeffs).unwrap();
    for &v in restored.as_slice() {
        assert!((v - 128.0).abs() < TOL);
    }
}

#[test]
fn uniform_8x8_end_to_end() {
    let out = denoise(&[200u8; 64], 8, 8).unwrap();
    assert!(out.samples.iter().all(|&v| v.abs_diff(200) <= 1));
}

#[test]
fn rejects_3x5_at_transform() {
    let m = SampleMatrix::from_vec(vec![0.0; 15], 3, 5).unwrap();
    assert_eq!(
        Haar2D::new().forward(m),
        Err(DenoiseError::InvalidDimensions {
            rows: 3,
            cols: 5,
            fault: DimensionFault::NotPowerOfTwo
        })
    );

    let mut raw = vec![0.0; 15];
    assert!(matches!(
        Haar2D::new().forward_slice(&mut raw, 5, 3),
        Err(DenoiseError::InvalidDimensions { .. })
    ));
}

#[test]
fn rejects_3x5_in_pipeline() {
    let denoiser = Denoiser::new(DenoiseConfig::default()).unwrap();
    assert!(matches!(
        denoiser.process(&[0u8; 15], 3, 5),
        Err(DenoiseError::InvalidDimensions {
            fault: DimensionFault::NotPowerOfTwo,
            ..
        })
    ));
}

#[test]
fn concurrent_invocations_agree() {
    let denoiser = Denoiser::default();
    let input: Vec<u8> = (0..32 * 32).map(|i| (i * 13 % 256) as u8).collect();
    let expected = denoiser.process(&input, 32, 32).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| denoiser.process(&input, 32, 32).unwrap()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}
