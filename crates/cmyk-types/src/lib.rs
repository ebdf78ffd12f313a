//! Wire types shared by `cmyk-server` and `cmyk-client`.
//!
//! Every body the server sends as JSON is defined here so that both ends of
//! the connection agree on field names.

use serde::{Deserialize, Serialize};

/// Multipart field name carrying the uploaded image.
pub const UPLOAD_FIELD: &str = "file";

/// Path of the conversion endpoint, relative to the service root.
pub const CONVERT_PATH: &str = "convert-to-cmyk/";

/// Successful response of `POST /convert-to-cmyk/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConvertResponse {
    /// Job identifier; every stored file of the job is prefixed with it.
    pub image_id: String,
    /// Absolute URL of the raw CMYK TIFF.
    pub download_url: String,
    /// Absolute URL of the browser-friendly JPEG preview.
    pub view_url: String,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WelcomeMessage {
    pub message: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn convert_response_uses_snake_case_fields() {
        let body = ConvertResponse {
            image_id: "abc".into(),
            download_url: "http://h/download/abc".into(),
            view_url: "http://h/view/abc".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["image_id"], "abc");
        assert_eq!(json["download_url"], "http://h/download/abc");
        assert_eq!(json["view_url"], "http://h/view/abc");
    }

    #[test]
    fn error_body_parses_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"File must be an image"}"#).unwrap();
        assert_eq!(body, ErrorBody::new("File must be an image"));
    }
}
