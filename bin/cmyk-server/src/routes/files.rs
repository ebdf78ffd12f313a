//! Download and preview of converted images.
//!
//! Both endpoints resolve `{image_id}` by prefix scan of the output
//! directory (see [`crate::store::JobStore::find_output`]).

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use cmyk_types::ErrorBody;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::handlers::ConversionService;
use crate::state::AppState;
use crate::store::StoredOutput;

#[derive(OpenApi)]
#[openapi(paths(download_file, view_file), components(schemas(ErrorBody)))]
pub struct FilesApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/download/{image_id}", get(download_file))
        .route("/view/{image_id}", get(view_file))
}

/// Raw CMYK TIFF as an attachment (`GET /download/{image_id}`).
#[utoipa::path(
    get,
    path = "/download/{image_id}",
    tag = "files",
    params(("image_id" = String, Path, description = "Job identifier returned by the convert endpoint")),
    responses(
        (status = 200, description = "CMYK TIFF", content_type = "image/tiff"),
        (status = 404, description = "No converted file for this id", body = ErrorBody),
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<String>,
) -> Result<Response, ServerError> {
    let stored = lookup(&state, &image_id).await?;
    let file = tokio::fs::File::open(&stored.path).await?;
    let len = file.metadata().await?.len();
    debug!(image_id = %image_id, path = %stored.path.display(), size_bytes = len, "serving download");

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/tiff")),
            (header::CONTENT_LENGTH, HeaderValue::from(len)),
            (
                header::CONTENT_DISPOSITION,
                disposition("attachment", &stored.file_name),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

/// Browser-renderable JPEG of the converted image (`GET /view/{image_id}`).
///
/// CMYK is converted back to RGB since browsers cannot render it.
#[utoipa::path(
    get,
    path = "/view/{image_id}",
    tag = "files",
    params(("image_id" = String, Path, description = "Job identifier returned by the convert endpoint")),
    responses(
        (status = 200, description = "JPEG preview", content_type = "image/jpeg"),
        (status = 404, description = "No converted file for this id", body = ErrorBody),
        (status = 500, description = "Preview could not be rendered", body = ErrorBody),
    )
)]
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<String>,
) -> Result<Response, ServerError> {
    let stored = lookup(&state, &image_id).await?;
    let jpeg = ConversionService::preview(stored.path.clone(), state.config.preview_quality)
        .await
        .map_err(|e| ServerError::conversion("Error converting image for viewing", e))?;
    info!(image_id = %image_id, size_bytes = jpeg.len(), "rendered preview");

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (
                header::CONTENT_DISPOSITION,
                disposition("inline", &preview_name(&stored.file_name)),
            ),
        ],
        jpeg,
    )
        .into_response())
}

async fn lookup(state: &AppState, image_id: &str) -> Result<StoredOutput, ServerError> {
    state
        .store
        .find_output(image_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("File not found".into()))
}

/// `{stem}.jpg` for a stored TIFF name.
fn preview_name(file_name: &str) -> String {
    let stem = FsPath::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    format!("{stem}.jpg")
}

/// Falls back to a bare `kind` when the name is not a valid header value.
fn disposition(kind: &'static str, file_name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{kind}; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static(kind))
}
