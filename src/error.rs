//! Error types for haar-denoise
//!
//! All core APIs that can fail return `Result<T, DenoiseError>`. Boundary
//! code (image files) wraps these in [`crate::io::BoundaryError`].

use core::fmt;

use thiserror::Error;

/// Why a shape was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DimensionFault {
    /// Zero rows or zero columns.
    Empty,
    /// A dimension of 1: there is no pair to transform.
    TooSmall,
    /// A dimension that cannot be halved evenly at every level.
    NotPowerOfTwo,
    /// A 1D sequence of odd length.
    OddLength,
    /// No power of two at or above the dimension fits in 32 bits.
    TooLarge,
}

impl fmt::Display for DimensionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Empty => "empty input",
            Self::TooSmall => "each dimension must be at least 2",
            Self::NotPowerOfTwo => "dimensions must be powers of two",
            Self::OddLength => "length must be even",
            Self::TooLarge => "dimension exceeds the largest 32-bit power of two",
        };
        f.write_str(msg)
    }
}

/// Errors raised by the transform stages and the pipeline.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DenoiseError {
    /// The grid shape cannot be transformed.
    #[error("invalid dimensions {rows}x{cols}: {fault}")]
    InvalidDimensions {
        rows: usize,
        cols: usize,
        fault: DimensionFault,
    },
    /// Input is not single-channel intensity data.
    #[error("expected single-channel grayscale input, got {channels} channels")]
    ChannelMismatch { channels: usize },
    /// Array input is neither `(height, width)` nor `(height, width, 1)`.
    #[error("expected a (height, width) array, got {ndim} dimensions")]
    UnsupportedRank { ndim: usize },
    /// Caller-supplied buffer does not match the declared shape.
    #[error("buffer size mismatch: expected {expected}, got {got}")]
    InvalidBufferSize { expected: usize, got: usize },
    /// Two stage buffers disagree in shape. Never caused by user input.
    #[error("internal shape mismatch: expected {expected} elements, got {got}")]
    SizeMismatch { expected: usize, got: usize },
    /// A configuration value is out of range.
    #[error("invalid {field}: {value}")]
    InvalidConfig { field: &'static str, value: f64 },
}

impl DenoiseError {
    pub(crate) const fn dimensions(rows: usize, cols: usize, fault: DimensionFault) -> Self {
        Self::InvalidDimensions { rows, cols, fault }
    }

    /// True for invariant violations inside the crate, false for bad input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::SizeMismatch { .. })
    }
}
