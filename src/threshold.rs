//! Hard Thresholding
//!
//! The only lossy stage of the pipeline. Coefficients whose magnitude falls
//! strictly below the cutoff are replaced by exactly `0.0`; everything else
//! passes through untouched.
//!
//! ```text
//! |c| <  t   →  0.0
//! |c| >= t   →  c
//! ```
//!
//! This is the dead-zone of a quantizer without the quantization: there is
//! no step, only the zone.
//!
//! The cutoff is flat across all four sub-bands and is expressed in the
//! units of the transformed coefficients.

use crate::error::DenoiseError;
use crate::matrix::CoefficientMatrix;
use crate::DEFAULT_THRESHOLD;

/// Outcome of one thresholding pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThresholdStats {
    /// Coefficients inspected.
    pub total: usize,
    /// Coefficients below the cutoff, now zero.
    pub zeroed: usize,
    /// Coefficients left as they were.
    pub retained: usize,
}

impl ThresholdStats {
    /// Fraction of coefficients that were zeroed, in `[0, 1]`.
    #[must_use]
    pub fn sparsity(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.zeroed as f64 / self.total as f64
        }
    }
}

/// Hard thresholder with a fixed cutoff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholder {
    cutoff: f64,
}

impl Thresholder {
    /// # Errors
    ///
    /// [`DenoiseError::InvalidConfig`] if `cutoff` is negative, NaN, or
    /// infinite.
    pub fn new(cutoff: f64) -> Result<Self, DenoiseError> {
        if !cutoff.is_finite() || cutoff < 0.0 {
            return Err(DenoiseError::InvalidConfig {
                field: "threshold",
                value: cutoff,
            });
        }
        Ok(Self { cutoff })
    }

    #[inline]
    #[must_use]
    pub const fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Threshold a single coefficient.
    #[inline]
    #[must_use]
    pub fn threshold(&self, value: f64) -> f64 {
        if value.abs() < self.cutoff {
            0.0
        } else {
            value
        }
    }

    /// Threshold a buffer in place.
    pub fn apply_slice(&self, coeffs: &mut [f64]) -> ThresholdStats {
        let mut zeroed = 0;
        for c in coeffs.iter_mut() {
            if c.abs() < self.cutoff {
                *c = 0.0;
                zeroed += 1;
            }
        }
        ThresholdStats {
            total: coeffs.len(),
            zeroed,
            retained: coeffs.len() - zeroed,
        }
    }

    /// Threshold every coefficient of the matrix in place.
    pub fn apply(&self, coeffs: &mut CoefficientMatrix) -> ThresholdStats {
        self.apply_slice(coeffs.as_mut_slice())
    }
}

impl Default for Thresholder {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_THRESHOLD,
        }
    }
}
