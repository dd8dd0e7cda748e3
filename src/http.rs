//! HTTP front end (feature `server`)
//!
//! ```text
//! POST /process-image   multipart field "file"
//!   200 image/png       denoised result
//!   400 text/plain      missing field, undecodable image, unusable shape
//!   500 text/plain      encoding, archiving, or internal failure
//! ```
//!
//! Uploads are decoded and converted to grayscale, then sent through
//! [`denoise_image`]. When an archive directory is configured, every result
//! is also written there as `output_<timestamp>.png`.

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::extract::multipart::MultipartError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use chrono::Local;
use image::{GrayImage, ImageFormat};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::DenoiseError;
use crate::io::{denoise_image, gray_from_dynamic, ChannelPolicy};
use crate::pipeline::Denoiser;
use crate::threshold::ThresholdStats;

/// Default cap on request bodies.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Multipart field holding the image.
const UPLOAD_FIELD: &str = "file";

/// Listener and handler settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Where to keep a copy of every result; `None` disables archiving.
    pub archive_dir: Option<PathBuf>,
    /// Resize results back to the upload's dimensions.
    pub restore_size: bool,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            archive_dir: None,
            restore_size: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Request failures, each mapped onto a status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing multipart field \"file\"")]
    MissingFile,
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error(transparent)]
    Denoise(#[from] DenoiseError),
    #[error("could not encode result: {0}")]
    Encode(#[source] image::ImageError),
    #[error("could not archive result: {0}")]
    Archive(#[from] std::io::Error),
    #[error("denoise task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile | Self::Multipart(_) | Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Denoise(e) if !e.is_internal() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, "request rejected");
        }
        (status, format!("Error: {self}")).into_response()
    }
}

#[derive(Clone)]
struct AppState {
    denoiser: Denoiser,
    archive_dir: Option<PathBuf>,
    restore_size: bool,
}

/// Decode an uploaded file, denoise it, and encode the result as PNG.
///
/// Color uploads are converted to luma, as a grayscale decode would.
///
/// # Errors
///
/// [`ServiceError::Decode`] for bytes no enabled codec understands,
/// [`ServiceError::Denoise`] for shapes the pipeline rejects,
/// [`ServiceError::Encode`] if PNG encoding fails.
pub fn denoise_png(
    bytes: &[u8],
    denoiser: &Denoiser,
    restore: bool,
) -> Result<(Vec<u8>, ThresholdStats), ServiceError> {
    let decoded = image::load_from_memory(bytes).map_err(ServiceError::Decode)?;
    let gray = gray_from_dynamic(decoded, ChannelPolicy::Convert)?;
    let (out, stats) = denoise_image(&gray, denoiser, restore)?;
    Ok((encode_png(&out)?, stats))
}

fn encode_png(img: &GrayImage) -> Result<Vec<u8>, ServiceError> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(ServiceError::Encode)?;
    Ok(png)
}

async fn archive(dir: &Path, png: &[u8]) -> Result<PathBuf, std::io::Error> {
    tokio::fs::create_dir_all(dir).await?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S_%6f");
    let path = dir.join(format!("output_{stamp}.png"));
    tokio::fs::write(&path, png).await?;
    Ok(path)
}

async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, ServiceError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(ServiceError::MissingFile)
}

async fn process_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ServiceError> {
    let upload = read_upload(&mut multipart).await?;
    debug!(bytes = upload.len(), "received upload");

    let denoiser = state.denoiser;
    let restore = state.restore_size;
    let (png, stats) =
        tokio::task::spawn_blocking(move || denoise_png(&upload, &denoiser, restore)).await??;

    if let Some(dir) = &state.archive_dir {
        let path = archive(dir, &png).await?;
        info!(path = %path.display(), "archived result");
    }
    info!(bytes = png.len(), sparsity = stats.sparsity(), "processed image");

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Routes of the service, ready to be served or driven directly in tests.
pub fn router(denoiser: Denoiser, config: &ServerConfig) -> Router {
    let state = AppState {
        denoiser,
        archive_dir: config.archive_dir.clone(),
        restore_size: config.restore_size,
    };
    Router::new()
        .route("/process-image", post(process_image))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state)
}

/// Bind `config.addr` and serve until the listener fails.
///
/// # Errors
///
/// Binding or accepting connections failed.
pub async fn serve(denoiser: Denoiser, config: ServerConfig) -> std::io::Result<()> {
    let app = router(denoiser, &config);
    let listener = TcpListener::bind(config.addr).await?;
    info!(
        addr = %listener.local_addr()?,
        archive = ?config.archive_dir,
        threshold = denoiser.config().threshold,
        "listening"
    );
    axum::serve(listener, app).await
}
