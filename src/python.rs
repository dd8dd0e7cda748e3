//! Python bindings for haar-denoise
//!
//! | Layer | Technique | Effect |
//! |-------|-----------|--------|
//! | L1 | GIL Release (`py.allow_threads`) | Other Python threads keep running |
//! | L2 | NumPy in/out (strided `iter`/`into_pyarray_bound`) | One copy in, none out |
//! | L3 | Rust backend (resize, wavelet, threshold) | Native speed |

use image::GrayImage;
use numpy::ndarray::ArrayViewD;
use numpy::{IntoPyArray, PyArray2, PyArrayMethods, PyReadonlyArrayDyn};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::error::DenoiseError;
use crate::io::{denoise_image, gray_from_shape};
use crate::pipeline::{DenoiseConfig, Denoiser};
use crate::DEFAULT_THRESHOLD;

fn to_py_err(err: DenoiseError) -> PyErr {
    if err.is_internal() {
        PyRuntimeError::new_err(err.to_string())
    } else {
        PyValueError::new_err(err.to_string())
    }
}

/// Copy an array view in logical (row-major) order, whatever its strides.
fn gray_from_view(view: ArrayViewD<'_, u8>) -> Result<GrayImage, DenoiseError> {
    let pixels: Vec<u8> = view.iter().copied().collect();
    gray_from_shape(pixels, view.shape())
}

/// Denoise a grayscale image with a single-level Haar wavelet.
///
/// Args:
///     input: Grayscale image (H, W) or (H, W, 1) as uint8 NumPy array.
///         Any strides are accepted, including sliced views.
///     threshold: Coefficient cutoff in normalized units (default: 0.08)
///     restore_size: Resize the result back to (H, W) (default: False)
///
/// Returns:
///     Denoised image as uint8 NumPy array. Without `restore_size` its
///     shape is (H, W) rounded up to powers of two.
#[pyfunction]
#[pyo3(signature = (input, threshold=DEFAULT_THRESHOLD, restore_size=false))]
fn process_image<'py>(
    py: Python<'py>,
    input: PyReadonlyArrayDyn<'py, u8>,
    threshold: f64,
    restore_size: bool,
) -> PyResult<Bound<'py, PyArray2<u8>>> {
    let img = gray_from_view(input.as_array()).map_err(to_py_err)?;
    let denoiser = Denoiser::new(DenoiseConfig::default().with_threshold(threshold)).map_err(to_py_err)?;

    // GIL release: the image is owned, nothing borrows from Python.
    let (out, _) = py
        .allow_threads(move || denoise_image(&img, &denoiser, restore_size))
        .map_err(to_py_err)?;

    let (ow, oh) = out.dimensions();
    out.into_raw()
        .into_pyarray_bound(py)
        .reshape([oh as usize, ow as usize])
        .map_err(|e| PyRuntimeError::new_err(format!("{:?}", e)))
}

/// Get library version
#[pyfunction]
fn version() -> &'static str {
    crate::VERSION
}

/// Haar wavelet denoising for grayscale images
#[pymodule]
fn haar_denoise(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(process_image, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add("DEFAULT_THRESHOLD", DEFAULT_THRESHOLD)?;
    Ok(())
}
