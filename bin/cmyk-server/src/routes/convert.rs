//! Upload-and-convert endpoint.
//!
//! Accepts a multipart upload, stores the original, converts it to a CMYK
//! TIFF and answers with absolute links to the download and preview
//! endpoints.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, header};
use axum::routing::post;
use axum::{Json, Router};
use cmyk_types::{ConvertResponse, ErrorBody, UPLOAD_FIELD};
use tracing::{debug, info};
use utoipa::{OpenApi, ToSchema};

use crate::config::Config;
use crate::error::ServerError;
use crate::handlers::ConversionService;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(convert_to_cmyk),
    components(schemas(ConvertResponse, ErrorBody, UploadForm))
)]
pub struct ConvertApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/convert-to-cmyk/", post(convert_to_cmyk))
        .route("/convert-to-cmyk", post(convert_to_cmyk))
}

/// Multipart body of `POST /convert-to-cmyk/`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// The image to convert. Its part must declare an `image/*` content type.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// The `file` part of an upload.
#[derive(Debug)]
struct Upload {
    file_name: String,
    content_type: String,
    bytes: Bytes,
}

/// Convert an uploaded image to CMYK (`POST /convert-to-cmyk/`).
///
/// The declared content type of the `file` part must start with `image/`.
/// On any processing failure both stored files of the job are removed.
#[utoipa::path(
    post,
    path = "/convert-to-cmyk/",
    tag = "convert",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image converted", body = ConvertResponse),
        (status = 400, description = "Not an image upload", body = ErrorBody),
        (status = 500, description = "Image could not be processed", body = ErrorBody),
    )
)]
pub async fn convert_to_cmyk(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ServerError> {
    let upload = read_upload(&mut multipart).await?;

    let job = state.store.new_job(&upload.file_name);
    info!(
        image_id = %job.id,
        file_name = %upload.file_name,
        content_type = %upload.content_type,
        size_bytes = upload.bytes.len(),
        "accepted upload"
    );

    ConversionService::run(&state.store, &job, &upload.bytes)
        .await
        .map_err(|e| ServerError::conversion("Error processing image", e))?;

    let base = external_base(&state.config, &headers);
    Ok(Json(ConvertResponse {
        download_url: format!("{base}/download/{}", job.id),
        view_url: format!("{base}/view/{}", job.id),
        image_id: job.id,
    }))
}

/// Pull the `file` part out of the form, rejecting non-image content types
/// before any byte is written to disk. Other parts are skipped.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Failed to read multipart field: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!(field = ?field.name(), "skipping multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        if !content_type.starts_with("image/") {
            return Err(ServerError::BadRequest("File must be an image".into()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Failed to read uploaded file: {e}")))?;
        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(ServerError::BadRequest(format!(
        "No file uploaded: expected multipart field '{UPLOAD_FIELD}'"
    )))
}

/// Scheme and authority the caller used to reach us, e.g.
/// `http://localhost:8045`. `CMYK_PUBLIC_URL` wins when set.
fn external_base(config: &Config, headers: &HeaderMap) -> String {
    if let Some(url) = &config.public_url {
        return url.clone();
    }
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(&config.bind_address);
    format!("{scheme}://{host}")
}

#[cfg(test)]
mod test {
    use super::*;

    fn config() -> Config {
        Config::for_dir(std::path::Path::new("/tmp"))
    }

    #[test]
    fn base_comes_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "img.local:8045".parse().unwrap());
        assert_eq!(external_base(&config(), &headers), "http://img.local:8045");
    }

    #[test]
    fn forwarded_proto_is_honoured() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "img.example.com".parse().unwrap());
        headers.insert("x-forwarded-proto", "https, http".parse().unwrap());
        assert_eq!(external_base(&config(), &headers), "https://img.example.com");
    }

    #[test]
    fn public_url_overrides_headers() {
        let mut cfg = config();
        cfg.public_url = Some("https://cdn.example.com/cmyk".into());
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "internal:8045".parse().unwrap());
        assert_eq!(external_base(&cfg, &headers), "https://cdn.example.com/cmyk");
    }

    #[test]
    fn bind_address_is_the_last_resort() {
        assert_eq!(external_base(&config(), &HeaderMap::new()), "http://127.0.0.1:0");
    }
}
