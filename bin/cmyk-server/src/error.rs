//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are converted to a
//! `{"detail": "..."}` JSON body with an appropriate status code.
//!
//! Processing failures carry their cause to the caller; I/O and other
//! internal errors are logged in full and answered with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cmyk_types::ErrorBody;
use thiserror::Error;
use tracing::error;

use crate::handlers::ConversionError;

/// All errors that can occur in the cmyk-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The caller referenced a job that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Decoding, converting or encoding an image failed.
    #[error("processing failed: {0}")]
    Processing(String),

    /// Filesystem error outside of image processing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ServerError::Processing(m) => {
                error!(message = %m, "image processing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
            ServerError::Io(e) => {
                error!(error = %e, "filesystem error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            }
        };
        (status, Json(ErrorBody::new(detail))).into_response()
    }
}

impl ServerError {
    /// Image failures become [`ServerError::Processing`] prefixed with
    /// `context`; a crashed worker task is internal.
    pub fn conversion(context: &str, e: ConversionError) -> Self {
        match e {
            ConversionError::Join(e) => ServerError::Internal(format!("blocking task failed: {e}")),
            e => ServerError::Processing(format!("{context}: {e}")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: ServerError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_expose_their_message() {
        let (status, body) = body_of(ServerError::BadRequest("File must be an image".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "File must be an image");

        let (status, body) = body_of(ServerError::NotFound("File not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "File not found");
    }

    #[tokio::test]
    async fn processing_errors_expose_their_cause() {
        let (status, body) =
            body_of(ServerError::Processing("Error processing image: bad header".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Error processing image: bad header");

        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad header");
        let err = ServerError::conversion("Error processing image", ConversionError::Io(io));
        assert!(matches!(err, ServerError::Processing(m) if m == "Error processing image: bad header"));
    }

    #[tokio::test]
    async fn io_errors_are_hidden() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/secret denied");
        let (status, body) = body_of(ServerError::from(io)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "internal server error");
    }
}
