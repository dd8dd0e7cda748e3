//! Boundary layer: image files and power-of-two resizing
//!
//! Everything the pure core refuses to do lives here:
//!
//! ```text
//! file → decode → (luma) → resize to 2^m x 2^n → Denoiser → (resize back) → encode → file
//! ```
//!
//! Resizing is lossy on its own, independently of thresholding. It happens
//! before the transform, so the transform's invertibility guarantee does not
//! cover it.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{DenoiseError, DimensionFault};
use crate::pipeline::Denoiser;
use crate::threshold::ThresholdStats;

/// Resampling filter for both directions. Catmull-Rom is a cubic kernel.
const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Errors from loading, saving, or processing image files.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error(transparent)]
    Denoise(#[from] DenoiseError),
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}

/// What to do with images that carry more than one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelPolicy {
    /// Reject anything that is not single-channel.
    #[default]
    Strict,
    /// Convert to luma, dropping color and alpha.
    Convert,
}

/// Turn a decoded image into 8-bit luma according to `policy`.
///
/// Single-channel images of any bit depth are accepted under both policies.
///
/// # Errors
///
/// [`DenoiseError::ChannelMismatch`] under [`ChannelPolicy::Strict`] for
/// images with more than one channel.
pub fn gray_from_dynamic(img: DynamicImage, policy: ChannelPolicy) -> Result<GrayImage, DenoiseError> {
    let channels = usize::from(img.color().channel_count());
    match (channels, policy) {
        (1, _) => Ok(match img {
            DynamicImage::ImageLuma8(gray) => gray,
            other => other.to_luma8(),
        }),
        (_, ChannelPolicy::Convert) => {
            debug!(channels, "converting to grayscale");
            Ok(img.to_luma8())
        }
        (_, ChannelPolicy::Strict) => Err(DenoiseError::ChannelMismatch { channels }),
    }
}

/// Load an image file as 8-bit grayscale.
///
/// # Errors
///
/// [`BoundaryError::Image`] if the file cannot be read or decoded,
/// [`BoundaryError::Denoise`] for a channel mismatch.
pub fn load_gray(path: impl AsRef<Path>, policy: ChannelPolicy) -> Result<GrayImage, BoundaryError> {
    let path = path.as_ref();
    let img = image::open(path)?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "loaded image");
    Ok(gray_from_dynamic(img, policy)?)
}

/// Write a grayscale image; the format follows the file extension.
///
/// # Errors
///
/// [`BoundaryError::Image`] if encoding or writing fails.
pub fn save_gray(img: &GrayImage, path: impl AsRef<Path>) -> Result<(), BoundaryError> {
    let path = path.as_ref();
    img.save(path)?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "saved image");
    Ok(())
}

/// Smallest power of two `>= n`, never below 2.
///
/// `None` when `n > 2^31`, since the next power of two does not fit in a `u32`.
#[inline]
#[must_use]
pub fn next_pow2(n: u32) -> Option<u32> {
    n.max(2).checked_next_power_of_two()
}

/// Target `(width, height)` for the transform.
///
/// # Errors
///
/// [`DenoiseError::InvalidDimensions`] with [`DimensionFault::Empty`] for a
/// zero dimension, [`DimensionFault::TooLarge`] when no 32-bit power of two
/// covers a dimension.
pub fn pow2_dims(width: u32, height: u32) -> Result<(u32, u32), DenoiseError> {
    let fault = |fault| DenoiseError::dimensions(height as usize, width as usize, fault);
    if width == 0 || height == 0 {
        return Err(fault(DimensionFault::Empty));
    }
    match (next_pow2(width), next_pow2(height)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(fault(DimensionFault::TooLarge)),
    }
}

/// Resample to power-of-two dimensions.
///
/// Returns an unchanged copy when the image already conforms.
///
/// # Errors
///
/// As for [`pow2_dims`].
pub fn resize_to_pow2(img: &GrayImage) -> Result<GrayImage, DenoiseError> {
    let (w, h) = img.dimensions();
    let (tw, th) = pow2_dims(w, h)?;
    if (tw, th) == (w, h) {
        return Ok(img.clone());
    }
    warn!(from_w = w, from_h = h, to_w = tw, to_h = th, "resizing to power-of-two dimensions (lossy)");
    Ok(imageops::resize(img, tw, th, RESIZE_FILTER))
}

/// Resample back to a caller-chosen size.
#[must_use]
pub fn restore_size(img: &GrayImage, width: u32, height: u32) -> GrayImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    debug!(width, height, "restoring original size");
    imageops::resize(img, width, height, RESIZE_FILTER)
}

/// Build a grayscale image from row-major pixels of an array with `shape`.
///
/// Accepts `(height, width)` and `(height, width, 1)`.
///
/// # Errors
///
/// - [`DenoiseError::ChannelMismatch`] for `(height, width, c)` with `c > 1`.
/// - [`DenoiseError::UnsupportedRank`] for any other rank.
/// - [`DenoiseError::InvalidBufferSize`] if `pixels` does not fill the shape.
pub fn gray_from_shape(pixels: Vec<u8>, shape: &[usize]) -> Result<GrayImage, DenoiseError> {
    let (h, w) = match *shape {
        [h, w] | [h, w, 1] => (h, w),
        [_, _, channels] => return Err(DenoiseError::ChannelMismatch { channels }),
        _ => return Err(DenoiseError::UnsupportedRank { ndim: shape.len() }),
    };
    let too_large = || DenoiseError::dimensions(h, w, DimensionFault::TooLarge);
    let width = u32::try_from(w).map_err(|_| too_large())?;
    let height = u32::try_from(h).map_err(|_| too_large())?;

    let got = pixels.len();
    GrayImage::from_raw(width, height, pixels).ok_or(DenoiseError::InvalidBufferSize {
        expected: h.saturating_mul(w),
        got,
    })
}

/// Resize, denoise, and optionally resize back to the input size.
///
/// Returns the image together with what the threshold did to the
/// coefficients.
///
/// # Errors
///
/// [`DenoiseError::InvalidDimensions`] for an empty or oversized image;
/// anything else the pipeline reports.
pub fn denoise_image(
    img: &GrayImage,
    denoiser: &Denoiser,
    restore: bool,
) -> Result<(GrayImage, ThresholdStats), DenoiseError> {
    let (w, h) = img.dimensions();
    let resized = resize_to_pow2(img)?;
    let (rw, rh) = resized.dimensions();
    let out = denoiser.process(resized.as_raw(), rh as usize, rw as usize)?;
    info!(
        width = rw,
        height = rh,
        sparsity = out.stats.sparsity(),
        "denoised"
    );

    let got = out.samples.len();
    let denoised = GrayImage::from_raw(rw, rh, out.samples).ok_or(DenoiseError::SizeMismatch {
        expected: rw as usize * rh as usize,
        got,
    })?;

    let image = if restore {
        restore_size(&denoised, w, h)
    } else {
        denoised
    };
    Ok((image, out.stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn test_next_pow2() {
        assert_eq!(next_pow2(0), Some(2));
        assert_eq!(next_pow2(1), Some(2));
        assert_eq!(next_pow2(2), Some(2));
        assert_eq!(next_pow2(3), Some(4));
        assert_eq!(next_pow2(512), Some(512));
        assert_eq!(next_pow2(513), Some(1024));
    }

    #[test]
    fn test_next_pow2_never_rounds_down() {
        assert_eq!(next_pow2(1 << 31), Some(1 << 31));
        assert_eq!(next_pow2((1 << 31) + 1), None);
        assert_eq!(next_pow2(u32::MAX), None);
        for n in [(1 << 30) + 1, (1 << 31) - 1, 1 << 31] {
            assert!(next_pow2(n).is_some_and(|p| p >= n));
        }
    }

    #[test]
    fn test_pow2_dims() {
        assert_eq!(pow2_dims(640, 480), Ok((1024, 512)));
        assert_eq!(pow2_dims(5, 3), Ok((8, 4)));
    }

    #[test]
    fn test_pow2_dims_rejects_oversized_and_empty() {
        assert_eq!(
            pow2_dims(3, (1 << 31) + 1),
            Err(DenoiseError::InvalidDimensions {
                rows: (1 << 31) + 1,
                cols: 3,
                fault: DimensionFault::TooLarge
            })
        );
        assert!(matches!(
            pow2_dims(0, 4),
            Err(DenoiseError::InvalidDimensions {
                fault: DimensionFault::Empty,
                ..
            })
        ));
    }

    #[test]
    fn test_resize_to_pow2() {
        let img = GrayImage::from_pixel(5, 3, Luma([90]));
        let resized = resize_to_pow2(&img).unwrap();
        assert_eq!(resized.dimensions(), (8, 4));
        // A flat image stays flat under cubic resampling.
        assert!(resized.pixels().all(|p| p.0[0].abs_diff(90) <= 1));
    }

    #[test]
    fn test_resize_noop_when_conforming() {
        let img = GrayImage::from_fn(4, 8, |x, y| Luma([(x * 8 + y) as u8]));
        assert_eq!(resize_to_pow2(&img), Ok(img));
    }

    #[test]
    fn test_strict_policy_rejects_rgb() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
        assert_eq!(
            gray_from_dynamic(rgb, ChannelPolicy::Strict),
            Err(DenoiseError::ChannelMismatch { channels: 3 })
        );
    }

    #[test]
    fn test_convert_policy_accepts_rgb() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([50, 50, 50])));
        let gray = gray_from_dynamic(rgb, ChannelPolicy::Convert).unwrap();
        assert_eq!(gray.dimensions(), (4, 4));
        assert!(gray.pixels().all(|p| p.0[0].abs_diff(50) <= 1));
    }

    #[test]
    fn test_strict_policy_accepts_luma() {
        let luma = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([7])));
        let gray = gray_from_dynamic(luma, ChannelPolicy::Strict).unwrap();
        assert_eq!(gray.as_raw(), &vec![7u8; 4]);
    }

    #[test]
    fn test_denoise_image_odd_size() {
        let img = GrayImage::from_pixel(6, 5, Luma([180]));
        let denoiser = Denoiser::default();

        let (padded, stats) = denoise_image(&img, &denoiser, false).unwrap();
        assert_eq!(padded.dimensions(), (8, 8));
        assert_eq!(stats.total, 64);

        let (restored, _) = denoise_image(&img, &denoiser, true).unwrap();
        assert_eq!(restored.dimensions(), (6, 5));
        assert!(restored.pixels().all(|p| p.0[0].abs_diff(180) <= 2));
    }

    #[test]
    fn test_gray_from_shape() {
        let flat = gray_from_shape(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        assert_eq!(flat.dimensions(), (3, 2));
        assert_eq!(flat.get_pixel(2, 1).0, [6]);

        // A trailing singleton channel axis is plain grayscale.
        let single = gray_from_shape(vec![1, 2, 3, 4, 5, 6], &[2, 3, 1]).unwrap();
        assert_eq!(single, flat);
    }

    #[test]
    fn test_gray_from_shape_rejections() {
        assert_eq!(
            gray_from_shape(vec![0; 12], &[2, 2, 3]),
            Err(DenoiseError::ChannelMismatch { channels: 3 })
        );
        assert_eq!(
            gray_from_shape(vec![0; 4], &[4]),
            Err(DenoiseError::UnsupportedRank { ndim: 1 })
        );
        assert_eq!(
            gray_from_shape(vec![0; 8], &[2, 2, 1, 2]),
            Err(DenoiseError::UnsupportedRank { ndim: 4 })
        );
        assert_eq!(
            gray_from_shape(vec![0; 5], &[2, 3]),
            Err(DenoiseError::InvalidBufferSize { expected: 6, got: 5 })
        );
    }

    #[test]
    fn test_denoise_image_empty() {
        let img = GrayImage::new(0, 4);
        assert!(matches!(
            denoise_image(&img, &Denoiser::default(), false),
            Err(DenoiseError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_save_and_load_png() {
        let dir = std::env::temp_dir().join(format!("haar-denoise-io-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.png");

        let img = GrayImage::from_fn(4, 4, |x, y| Luma([(x * 40 + y * 10) as u8]));
        save_gray(&img, &path).unwrap();
        let loaded = load_gray(&path, ChannelPolicy::Strict).unwrap();
        assert_eq!(loaded, img);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
