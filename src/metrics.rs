//! How far a denoised image moved from its input.
//!
//! [`psnr`] compares 8-bit grids before and after the pipeline; a lower value
//! means the threshold discarded more. [`band_energy`] shows where the
//! coefficient energy sits before anything is discarded.

use crate::error::DenoiseError;
use crate::matrix::CoefficientMatrix;
use crate::SubBand;

fn check_same_len(reference: &[u8], denoised: &[u8]) -> Result<(), DenoiseError> {
    if reference.len() == denoised.len() {
        Ok(())
    } else {
        Err(DenoiseError::InvalidBufferSize {
            expected: reference.len(),
            got: denoised.len(),
        })
    }
}

/// Mean squared per-sample difference between `reference` and `denoised`.
///
/// Empty grids differ by nothing and give `0.0`.
///
/// # Errors
///
/// [`DenoiseError::InvalidBufferSize`] when the grids hold different sample
/// counts, e.g. a resized output compared with the original.
pub fn mse(reference: &[u8], denoised: &[u8]) -> Result<f64, DenoiseError> {
    check_same_len(reference, denoised)?;
    if reference.is_empty() {
        return Ok(0.0);
    }
    let squared: f64 = reference
        .iter()
        .zip(denoised)
        .map(|(&r, &d)| (f64::from(r) - f64::from(d)).powi(2))
        .sum();
    Ok(squared / reference.len() as f64)
}

/// Peak signal-to-noise ratio in dB, with 255 as the peak.
///
/// A zero threshold typically reconstructs the input exactly, which
/// reports `f64::INFINITY`.
///
/// # Errors
///
/// As for [`mse`].
///
/// ```
/// use haar_denoise::{denoise, metrics::psnr};
///
/// let input: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
/// let out = denoise(&input, 8, 8).unwrap();
/// assert!(psnr(&input, &out.samples).unwrap() > 25.0);
/// ```
pub fn psnr(reference: &[u8], denoised: &[u8]) -> Result<f64, DenoiseError> {
    let err = mse(reference, denoised)?;
    Ok(if err == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (255.0_f64.powi(2) / err).log10()
    })
}

/// Sum of squares of a buffer.
#[inline]
#[must_use]
pub fn energy(values: &[f64]) -> f64 {
    values.iter().map(|&v| v * v).sum()
}

/// Energy held by each quadrant, in [`SubBand::ALL`] order.
#[must_use]
pub fn band_energy(coeffs: &CoefficientMatrix) -> [(SubBand, f64); 4] {
    SubBand::ALL.map(|band| (band, energy(&coeffs.band(band))))
}
