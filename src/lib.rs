//! haar-denoise: Single-Level 2D Haar Wavelet Denoising
//!
//! Lossy denoising/compression of one grayscale image: transform, drop the
//! small coefficients, transform back.
//!
//! # Architecture
//!
//! ```text
//! u8 grid → normalize → Haar2D forward → threshold → Haar2D inverse → denormalize → u8 grid
//! ```
//!
//! The core (everything except [`io`]) is pure: no I/O, no global state, no
//! resizing. It accepts power-of-two grids only. The [`io`] module is the
//! boundary layer that loads images, resizes them to powers of two with
//! cubic interpolation, and writes results back. With the `server` feature,
//! [`http`] exposes the same flow as a `POST /process-image` endpoint.
//!
//! # Invariants
//!
//! - **Orthonormal**: the forward transform preserves energy (sum of squares).
//! - **Invertible**: inverse(forward(x)) == x up to rounding.
//! - **Single lossy step**: only thresholding discards information.
//!
//! # Example
//!
//! ```rust
//! use haar_denoise::{Haar2D, SampleMatrix, Thresholder};
//!
//! let samples = SampleMatrix::from_u8(&[10, 12, 200, 202], 2, 2, 255.0).unwrap();
//! let haar = Haar2D::new();
//!
//! let mut coeffs = haar.forward(samples).unwrap();
//! let stats = Thresholder::new(0.08).unwrap().apply(&mut coeffs);
//! let restored = haar.inverse(coeffs).unwrap();
//!
//! assert_eq!(stats.total, 4);
//! assert_eq!(restored.shape(), (2, 2));
//! ```

pub mod error;
#[cfg(feature = "server")]
pub mod http;
pub mod io;
pub mod matrix;
pub mod metrics;
pub mod pipeline;
pub mod threshold;
pub mod wavelet;

#[cfg(feature = "python")]
mod python;

// Re-exports
pub use error::{DenoiseError, DimensionFault};
pub use matrix::{CoefficientMatrix, Matrix, SampleMatrix};
pub use pipeline::{denoise, DenoiseConfig, DenoisedImage, Denoiser};
pub use threshold::{ThresholdStats, Thresholder};
pub use wavelet::{Haar1D, Haar2D};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default cutoff, in normalized coefficient units.
pub const DEFAULT_THRESHOLD: f64 = 0.08;

/// Default divisor mapping 8-bit samples into `[0, 1]`.
pub const DEFAULT_SAMPLE_SCALE: f64 = 255.0;

/// Quadrant of a single-level 2D decomposition.
///
/// First letter: column (vertical) filter. Second letter: row (horizontal)
/// filter.
///
/// ```text
/// ┌────┬────┐
/// │ LL │ LH │
/// ├────┼────┤
/// │ HL │ HH │
/// └────┴────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SubBand {
    /// Low-Low (approximation, carries the mean)
    LL = 0,
    /// Low-High (row detail: vertical edges)
    LH = 1,
    /// High-Low (column detail: horizontal edges)
    HL = 2,
    /// High-High (diagonal detail, mostly noise)
    HH = 3,
}

impl SubBand {
    /// All quadrants in storage order.
    pub const ALL: [SubBand; 4] = [SubBand::LL, SubBand::LH, SubBand::HL, SubBand::HH];

    /// Returns true if this is the approximation band
    #[inline]
    #[must_use]
    pub const fn is_dc(&self) -> bool {
        matches!(self, SubBand::LL)
    }

    /// Returns true if the band holds detail (difference) coefficients
    #[inline]
    #[must_use]
    pub const fn is_detail(&self) -> bool {
        !self.is_dc()
    }

    /// Quadrant containing `(row, col)` of a `rows x cols` coefficient grid.
    #[inline]
    #[must_use]
    pub const fn at(row: usize, col: usize, rows: usize, cols: usize) -> SubBand {
        match (row >= rows / 2, col >= cols / 2) {
            (false, false) => SubBand::LL,
            (false, true) => SubBand::LH,
            (true, false) => SubBand::HL,
            (true, true) => SubBand::HH,
        }
    }

    /// Top-left corner of the quadrant given the half dimensions.
    #[inline]
    #[must_use]
    pub const fn origin(&self, half_rows: usize, half_cols: usize) -> (usize, usize) {
        match self {
            SubBand::LL => (0, 0),
            SubBand::LH => (0, half_cols),
            SubBand::HL => (half_rows, 0),
            SubBand::HH => (half_rows, half_cols),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            SubBand::LL => "LL",
            SubBand::LH => "LH",
            SubBand::HL => "HL",
            SubBand::HH => "HH",
        }
    }
}
