//! Row-major `f64` grids for the transform stages
//!
//! A [`Matrix`] carries a zero-sized tag saying what its values mean:
//!
//! ```text
//! SampleMatrix       intensities in [0, 1] (or reconstructed approximations)
//! CoefficientMatrix  wavelet coefficients: [LL | LH]
//!                                          [HL | HH]
//! ```
//!
//! Only [`crate::Haar2D`] converts between the two, so pixel data cannot be
//! handed to the inverse transform by accident.

use core::marker::PhantomData;

use crate::error::{DenoiseError, DimensionFault};
use crate::SubBand;

/// Tag for intensity samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Samples {}

/// Tag for wavelet coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coefficients {}

/// Rectangular grid stored row by row.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<K> {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    _kind: PhantomData<K>,
}

/// Intensity samples.
pub type SampleMatrix = Matrix<Samples>;

/// Wavelet coefficients produced by the forward transform.
pub type CoefficientMatrix = Matrix<Coefficients>;

/// Check that `rows x cols` can go through the 2D transform.
///
/// # Errors
///
/// Returns [`DenoiseError::InvalidDimensions`] for an empty grid, a
/// dimension of 1, or a dimension that is not a power of two.
pub fn check_transform_shape(rows: usize, cols: usize) -> Result<(), DenoiseError> {
    if rows == 0 || cols == 0 {
        return Err(DenoiseError::dimensions(rows, cols, DimensionFault::Empty));
    }
    if !rows.is_power_of_two() || !cols.is_power_of_two() {
        return Err(DenoiseError::dimensions(
            rows,
            cols,
            DimensionFault::NotPowerOfTwo,
        ));
    }
    if rows < 2 || cols < 2 {
        return Err(DenoiseError::dimensions(rows, cols, DimensionFault::TooSmall));
    }
    Ok(())
}

impl<K> Matrix<K> {
    /// Wrap a row-major buffer.
    ///
    /// Only the buffer length is checked here; power-of-two constraints are
    /// enforced by the transform.
    ///
    /// # Errors
    ///
    /// [`DenoiseError::InvalidDimensions`] if either dimension is zero,
    /// [`DenoiseError::InvalidBufferSize`] if `data.len() != rows * cols`.
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self, DenoiseError> {
        if rows == 0 || cols == 0 {
            return Err(DenoiseError::dimensions(rows, cols, DimensionFault::Empty));
        }
        let expected = rows
            .checked_mul(cols)
            .ok_or(DenoiseError::InvalidBufferSize {
                expected: usize::MAX,
                got: data.len(),
            })?;
        if data.len() != expected {
            return Err(DenoiseError::InvalidBufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self::from_parts(data, rows, cols))
    }

    /// Build from nested rows, all of the same length.
    ///
    /// # Errors
    ///
    /// Same as [`from_vec`](Self::from_vec); a ragged row reports its own
    /// length as `got`.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, DenoiseError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(DenoiseError::InvalidBufferSize {
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(data, rows.len(), cols)
    }

    pub(crate) fn from_parts(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self {
            rows,
            cols,
            data,
            _kind: PhantomData,
        }
    }

    /// Reinterpret the buffer under another tag without copying.
    pub(crate) fn retag<K2>(self) -> Matrix<K2> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data,
            _kind: PhantomData,
        }
    }

    /// Internal consistency check used before a stage touches the buffer.
    pub(crate) fn ensure_consistent(&self) -> Result<(), DenoiseError> {
        let expected = self.rows * self.cols;
        if self.data.len() == expected {
            Ok(())
        } else {
            Err(DenoiseError::SizeMismatch {
                expected,
                got: self.data.len(),
            })
        }
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    #[inline]
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// One row as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()`.
    #[inline]
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Sum of squared values.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.data.iter().map(|&v| v * v).sum()
    }

    /// Number of entries that are not exactly zero.
    #[must_use]
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0.0).count()
    }
}

impl SampleMatrix {
    /// Normalize 8-bit samples by dividing each by `scale`.
    ///
    /// # Errors
    ///
    /// As for [`Matrix::from_vec`].
    pub fn from_u8(samples: &[u8], rows: usize, cols: usize, scale: f64) -> Result<Self, DenoiseError> {
        let data = samples.iter().map(|&s| f64::from(s) / scale).collect();
        Self::from_vec(data, rows, cols)
    }

    /// Scale back to 8-bit: multiply, round half away from zero, clamp.
    #[must_use]
    pub fn to_u8(&self, scale: f64) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| {
                let scaled = (v * scale).round();
                if scaled.is_nan() {
                    0
                } else {
                    // Clamped to [0, 255] so the cast is exact.
                    scaled.clamp(0.0, 255.0) as u8
                }
            })
            .collect()
    }
}

impl CoefficientMatrix {
    /// Copy out one quadrant, row-major, `(rows / 2) x (cols / 2)`.
    #[must_use]
    pub fn band(&self, band: SubBand) -> Vec<f64> {
        let (hr, hc) = (self.rows / 2, self.cols / 2);
        let (r0, c0) = band.origin(hr, hc);
        let mut out = Vec::with_capacity(hr * hc);
        for r in r0..r0 + hr {
            out.extend_from_slice(&self.row(r)[c0..c0 + hc]);
        }
        out
    }

    /// Quadrant that holds the coefficient at `(row, col)`.
    #[must_use]
    pub fn band_at(&self, row: usize, col: usize) -> SubBand {
        SubBand::at(row, col, self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_transform_shape() {
        assert!(check_transform_shape(2, 2).is_ok());
        assert!(check_transform_shape(8, 256).is_ok());
        assert_eq!(
            check_transform_shape(0, 4),
            Err(DenoiseError::dimensions(0, 4, DimensionFault::Empty))
        );
        assert_eq!(
            check_transform_shape(3, 5),
            Err(DenoiseError::dimensions(3, 5, DimensionFault::NotPowerOfTwo))
        );
        assert_eq!(
            check_transform_shape(1, 8),
            Err(DenoiseError::dimensions(1, 8, DimensionFault::TooSmall))
        );
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        let err = SampleMatrix::from_vec(vec![0.0; 5], 2, 2);
        assert_eq!(
            err,
            Err(DenoiseError::InvalidBufferSize {
                expected: 4,
                got: 5
            })
        );
    }

    #[test]
    fn test_from_rows_ragged() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            SampleMatrix::from_rows(&rows),
            Err(DenoiseError::InvalidBufferSize { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_from_rows_empty() {
        assert!(matches!(
            SampleMatrix::from_rows(&[]),
            Err(DenoiseError::InvalidDimensions {
                fault: DimensionFault::Empty,
                ..
            })
        ));
    }

    #[test]
    fn test_normalize_denormalize() {
        let raw = [0u8, 51, 128, 255];
        let m = SampleMatrix::from_u8(&raw, 2, 2, 255.0).unwrap();
        assert!((m.get(0, 1).unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(m.to_u8(255.0), raw.to_vec());
    }

    #[test]
    fn test_to_u8_clamps_and_rounds() {
        let m = SampleMatrix::from_vec(vec![-0.5, 1.5, 0.6 / 255.0, f64::NAN], 2, 2).unwrap();
        assert_eq!(m.to_u8(255.0), vec![0, 255, 1, 0]);
    }

    #[test]
    fn test_band_extraction() {
        let data: Vec<f64> = (0..16).map(f64::from).collect();
        let m: CoefficientMatrix = Matrix::from_vec(data, 4, 4).unwrap();
        assert_eq!(m.band(SubBand::LL), vec![0.0, 1.0, 4.0, 5.0]);
        assert_eq!(m.band(SubBand::LH), vec![2.0, 3.0, 6.0, 7.0]);
        assert_eq!(m.band(SubBand::HL), vec![8.0, 9.0, 12.0, 13.0]);
        assert_eq!(m.band(SubBand::HH), vec![10.0, 11.0, 14.0, 15.0]);
        assert_eq!(m.band_at(3, 0), SubBand::HL);
    }

    #[test]
    fn test_energy_and_nonzero() {
        let m = SampleMatrix::from_vec(vec![1.0, 0.0, -2.0, 0.0], 2, 2).unwrap();
        assert!((m.energy() - 5.0).abs() < f64::EPSILON);
        assert_eq!(m.count_nonzero(), 2);
    }
}
