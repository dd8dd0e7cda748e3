//! Orthonormal Haar Wavelet Transform
//!
//! Single-level Haar butterfly on `f64` data, normalised by `√2` so the
//! transform is energy-preserving and exactly invertible up to rounding.
//!
//! ```text
//! forward:  a[i] = (x[2i] + x[2i+1]) / √2     inverse:  x[2i]   = (a[i] + d[i]) / √2
//!           d[i] = (x[2i] - x[2i+1]) / √2               x[2i+1] = (a[i] - d[i]) / √2
//!
//! layout:   [x0 x1 x2 x3 ... ]  ->  [a0 a1 ... | d0 d1 ...]
//! ```
//!
//! The 2D transform runs the 1D transform over every row and then every
//! column; the inverse runs columns first and rows last.

use core::f64::consts::SQRT_2;

use crate::error::{DenoiseError, DimensionFault};
use crate::matrix::{check_transform_shape, CoefficientMatrix, SampleMatrix};

/// 1D Haar transform
#[derive(Clone, Copy, Debug, Default)]
pub struct Haar1D;

impl Haar1D {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Forward transform (analysis), in place.
    ///
    /// Output: `[averages..., details...]`
    ///
    /// # Errors
    ///
    /// [`DenoiseError::InvalidDimensions`] if the length is odd or below 2.
    pub fn forward(&self, signal: &mut [f64]) -> Result<(), DenoiseError> {
        check_len(signal.len())?;
        let mut temp = vec![0.0; signal.len()];
        self.analyze(signal, &mut temp);
        signal.copy_from_slice(&temp);
        Ok(())
    }

    /// Inverse transform (synthesis), in place.
    ///
    /// # Errors
    ///
    /// [`DenoiseError::InvalidDimensions`] if the length is odd or below 2.
    pub fn inverse(&self, signal: &mut [f64]) -> Result<(), DenoiseError> {
        check_len(signal.len())?;
        let mut temp = vec![0.0; signal.len()];
        self.synthesize(signal, &mut temp);
        signal.copy_from_slice(&temp);
        Ok(())
    }

    /// Pairs → [averages | details]. Lengths are checked by the caller.
    #[inline]
    fn analyze(&self, src: &[f64], dst: &mut [f64]) {
        let half = src.len() / 2;
        for i in 0..half {
            let (a, b) = (src[2 * i], src[2 * i + 1]);
            dst[i] = (a + b) / SQRT_2;
            dst[half + i] = (a - b) / SQRT_2;
        }
    }

    /// [averages | details] → pairs.
    #[inline]
    fn synthesize(&self, src: &[f64], dst: &mut [f64]) {
        let half = src.len() / 2;
        for i in 0..half {
            let (a, d) = (src[i], src[half + i]);
            dst[2 * i] = (a + d) / SQRT_2;
            dst[2 * i + 1] = (a - d) / SQRT_2;
        }
    }
}

fn check_len(n: usize) -> Result<(), DenoiseError> {
    if n < 2 {
        Err(DenoiseError::dimensions(1, n, DimensionFault::TooSmall))
    } else if n % 2 != 0 {
        Err(DenoiseError::dimensions(1, n, DimensionFault::OddLength))
    } else {
        Ok(())
    }
}

/// 2D Haar transform
#[derive(Clone, Copy, Debug, Default)]
pub struct Haar2D {
    haar_1d: Haar1D,
}

impl Haar2D {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            haar_1d: Haar1D::new(),
        }
    }

    /// Forward 2D transform
    ///
    /// Applies the 1D transform to rows, then columns. The sample buffer is
    /// reused for the coefficients.
    /// Result: `[LL, LH; HL, HH]` quadrants
    ///
    /// # Errors
    ///
    /// [`DenoiseError::InvalidDimensions`] unless both dimensions are powers
    /// of two and at least 2.
    pub fn forward(&self, samples: SampleMatrix) -> Result<CoefficientMatrix, DenoiseError> {
        let (height, width) = samples.shape();
        check_transform_shape(height, width)?;
        samples.ensure_consistent()?;

        let mut image = samples.into_vec();
        transform_rows(&mut image, width, |src, dst| self.haar_1d.analyze(src, dst));
        transform_cols(&mut image, width, height, |src, dst| self.haar_1d.analyze(src, dst));

        Ok(CoefficientMatrix::from_parts(image, height, width))
    }

    /// Inverse 2D transform: columns first, then rows.
    ///
    /// # Errors
    ///
    /// Same shape rules as [`forward`](Self::forward).
    pub fn inverse(&self, coeffs: CoefficientMatrix) -> Result<SampleMatrix, DenoiseError> {
        let (height, width) = coeffs.shape();
        check_transform_shape(height, width)?;
        coeffs.ensure_consistent()?;

        let mut image = coeffs.into_vec();
        transform_cols(&mut image, width, height, |src, dst| self.haar_1d.synthesize(src, dst));
        transform_rows(&mut image, width, |src, dst| self.haar_1d.synthesize(src, dst));

        Ok(SampleMatrix::from_parts(image, height, width))
    }

    /// Forward transform on a raw row-major buffer.
    ///
    /// # Errors
    ///
    /// [`DenoiseError::InvalidBufferSize`] if `image.len() != width * height`,
    /// otherwise as for [`forward`](Self::forward).
    pub fn forward_slice(&self, image: &mut [f64], width: usize, height: usize) -> Result<(), DenoiseError> {
        check_slice(image, width, height)?;
        transform_rows(image, width, |src, dst| self.haar_1d.analyze(src, dst));
        transform_cols(image, width, height, |src, dst| self.haar_1d.analyze(src, dst));
        Ok(())
    }

    /// Inverse transform on a raw row-major buffer.
    ///
    /// # Errors
    ///
    /// As for [`forward_slice`](Self::forward_slice).
    pub fn inverse_slice(&self, image: &mut [f64], width: usize, height: usize) -> Result<(), DenoiseError> {
        check_slice(image, width, height)?;
        transform_cols(image, width, height, |src, dst| self.haar_1d.synthesize(src, dst));
        transform_rows(image, width, |src, dst| self.haar_1d.synthesize(src, dst));
        Ok(())
    }
}

fn check_slice(image: &[f64], width: usize, height: usize) -> Result<(), DenoiseError> {
    check_transform_shape(height, width)?;
    if image.len() != width * height {
        return Err(DenoiseError::InvalidBufferSize {
            expected: width * height,
            got: image.len(),
        });
    }
    Ok(())
}

fn transform_rows<F>(image: &mut [f64], width: usize, kernel: F)
where
    F: Fn(&[f64], &mut [f64]),
{
    let mut temp = vec![0.0; width];
    for row in image.chunks_exact_mut(width) {
        kernel(&*row, &mut temp);
        row.copy_from_slice(&temp);
    }
}

fn transform_cols<F>(image: &mut [f64], width: usize, height: usize, kernel: F)
where
    F: Fn(&[f64], &mut [f64]),
{
    let mut col = vec![0.0; height];
    let mut temp = vec![0.0; height];
    for x in 0..width {
        // Extract column
        for y in 0..height {
            col[y] = image[y * width + x];
        }

        kernel(&col, &mut temp);

        // Insert back
        for y in 0..height {
            image[y * width + x] = temp[y];
        }
    }
}
