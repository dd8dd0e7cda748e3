//! End-to-end denoise pipeline
//!
//! Wires together normalization, the 2D Haar transform, and hard
//! thresholding into a single API.
//!
//! # Pipeline
//!
//! ```text
//! u8 samples -> / scale -> Haar2D forward -> threshold -> Haar2D inverse -> * scale -> round/clamp -> u8
//! ```
//!
//! The pipeline never resizes. Input must already have power-of-two
//! dimensions; see [`crate::io::resize_to_pow2`] for the boundary step that
//! gets arbitrary images there.

use tracing::debug;

use crate::error::DenoiseError;
use crate::matrix::SampleMatrix;
use crate::threshold::{ThresholdStats, Thresholder};
use crate::wavelet::Haar2D;
use crate::{DEFAULT_SAMPLE_SCALE, DEFAULT_THRESHOLD};

// ── Configuration ──────────────────────────────────────────────

/// Parameters of one denoise run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DenoiseConfig {
    /// Coefficients with `|c| < threshold` are zeroed. Normalized units.
    pub threshold: f64,
    /// Divisor that maps raw samples into `[0, 1]`.
    pub sample_scale: f64,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            sample_scale: DEFAULT_SAMPLE_SCALE,
        }
    }
}

impl DenoiseConfig {
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_sample_scale(mut self, sample_scale: f64) -> Self {
        self.sample_scale = sample_scale;
        self
    }

    /// # Errors
    ///
    /// [`DenoiseError::InvalidConfig`] for a negative or non-finite
    /// threshold, or a scale that is not finite and positive.
    pub fn validate(&self) -> Result<(), DenoiseError> {
        Thresholder::new(self.threshold)?;
        if !self.sample_scale.is_finite() || self.sample_scale <= 0.0 {
            return Err(DenoiseError::InvalidConfig {
                field: "sample_scale",
                value: self.sample_scale,
            });
        }
        Ok(())
    }
}

// ── Output ─────────────────────────────────────────────────────

/// Reconstructed image plus what the threshold did to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenoisedImage {
    /// Row-major 8-bit samples, `rows * cols` long.
    pub samples: Vec<u8>,
    pub rows: usize,
    pub cols: usize,
    pub stats: ThresholdStats,
}

impl DenoisedImage {
    /// Split the samples back into nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.samples
            .chunks_exact(self.cols)
            .map(<[u8]>::to_vec)
            .collect()
    }
}

// ── Denoiser ───────────────────────────────────────────────────

/// Grayscale Haar denoiser.
///
/// Holds only validated configuration; every call owns its buffers, so one
/// instance can be shared freely across threads.
#[derive(Clone, Copy, Debug)]
pub struct Denoiser {
    config: DenoiseConfig,
    wavelet: Haar2D,
    thresholder: Thresholder,
}

impl Denoiser {
    /// # Errors
    ///
    /// Fails if `config` does not [`validate`](DenoiseConfig::validate).
    pub fn new(config: DenoiseConfig) -> Result<Self, DenoiseError> {
        config.validate()?;
        Ok(Self {
            config,
            wavelet: Haar2D::new(),
            thresholder: Thresholder::new(config.threshold)?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DenoiseConfig {
        &self.config
    }

    /// Denoise a row-major grid of 8-bit samples.
    ///
    /// # Arguments
    ///
    /// * `samples` - `rows * cols` intensities, row after row.
    /// * `rows`, `cols` - Grid shape; both powers of two, both at least 2.
    ///
    /// # Errors
    ///
    /// - [`DenoiseError::InvalidDimensions`] for an empty, too small, or
    ///   non-power-of-two shape.
    /// - [`DenoiseError::InvalidBufferSize`] if `samples.len() != rows * cols`.
    pub fn process(&self, samples: &[u8], rows: usize, cols: usize) -> Result<DenoisedImage, DenoiseError> {
        // --- 1. Normalize ---
        let normalized = SampleMatrix::from_u8(samples, rows, cols, self.config.sample_scale)?;

        // --- 2. Forward transform (rejects non-power-of-two shapes) ---
        let mut coeffs = self.wavelet.forward(normalized)?;
        debug!(
            rows,
            cols,
            energy = coeffs.energy(),
            "forward haar transform"
        );

        // --- 3. Threshold ---
        let stats = self.thresholder.apply(&mut coeffs);
        debug!(
            threshold = self.thresholder.cutoff(),
            zeroed = stats.zeroed,
            retained = stats.retained,
            sparsity = stats.sparsity(),
            "thresholded coefficients"
        );

        // --- 4. Inverse transform ---
        let restored = self.wavelet.inverse(coeffs)?;

        // --- 5. Denormalize ---
        Ok(DenoisedImage {
            samples: restored.to_u8(self.config.sample_scale),
            rows,
            cols,
            stats,
        })
    }

    /// Denoise a nested grid, one `Vec` per row.
    ///
    /// # Errors
    ///
    /// As for [`process`](Self::process); ragged rows are reported as
    /// [`DenoiseError::InvalidBufferSize`].
    pub fn process_rows(&self, grid: &[Vec<u8>]) -> Result<DenoisedImage, DenoiseError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(rows * cols);
        for row in grid {
            if row.len() != cols {
                return Err(DenoiseError::InvalidBufferSize {
                    expected: cols,
                    got: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        self.process(&flat, rows, cols)
    }
}

impl Default for Denoiser {
    fn default() -> Self {
        Self {
            config: DenoiseConfig::default(),
            wavelet: Haar2D::new(),
            thresholder: Thresholder::default(),
        }
    }
}

/// Denoise with the default threshold (0.08) and scale (255).
///
/// # Errors
///
/// See [`Denoiser::process`].
///
/// # Example
///
/// ```
/// let flat = vec![200u8; 8 * 8];
/// let out = haar_denoise::denoise(&flat, 8, 8).unwrap();
/// assert!(out.samples.iter().all(|&v| v.abs_diff(200) <= 1));
/// ```
pub fn denoise(samples: &[u8], rows: usize, cols: usize) -> Result<DenoisedImage, DenoiseError> {
    Denoiser::default().process(samples, rows, cols)
}

// ── Thread-safety compile-time assertions ──────────────────────

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    const fn check() {
        assert_send_sync::<Denoiser>();
        assert_send_sync::<Haar2D>();
        assert_send_sync::<Thresholder>();
        assert_send_sync::<DenoiseConfig>();
        assert_send_sync::<DenoisedImage>();
        assert_send_sync::<DenoiseError>();
    }
};

// ── Tests ──────────────────────────────────────────────────────
