use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can be returned by cmyk-client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The local image does not exist.
    #[error("File {} not found.", .0.display())]
    InputNotFound(PathBuf),

    /// The base URL or a returned link could not be parsed.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request never produced a response (connect, TLS, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status and a `{"detail": ...}` body.
    #[error("{status}: {detail}")]
    Api { status: StatusCode, detail: String },

    /// The server answered with an error status and an unstructured body.
    #[error("{status}")]
    Status { status: StatusCode, body: String },

    /// A 2xx response from the convert endpoint without a usable download URL.
    #[error("No download URL in response")]
    MissingDownloadUrl { body: String },

    /// A local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
