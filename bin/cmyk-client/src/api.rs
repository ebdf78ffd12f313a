use std::path::Path;

use cmyk_types::{CONVERT_PATH, ConvertResponse, ErrorBody, UPLOAD_FIELD};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response, Url};
use tracing::debug;

use crate::error::ClientError;

/// Declared for files whose extension does not name an image type. The
/// server sniffs the actual format from the content.
const FALLBACK_IMAGE_MIME: &str = "image/png";

/// Thin HTTP client for the conversion service.
pub struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    /// `base_url` is the service root, e.g. `http://127.0.0.1:8045`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = parse_base(base_url)?;
        let http = Client::builder()
            .user_agent(concat!("cmyk-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base, http })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute links are used as-is; anything else is joined onto the base.
    pub fn resolve(&self, link: &str) -> Result<Url, ClientError> {
        let resolved = if link.starts_with("http://") || link.starts_with("https://") {
            Url::parse(link)
        } else {
            self.base.join(link)
        };
        resolved.map_err(|e| ClientError::InvalidUrl {
            url: link.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Upload `image` to the convert endpoint.
    ///
    /// The file is streamed from an open handle owned by the request body,
    /// so it is closed exactly once whether the request succeeds or not.
    pub async fn upload(&self, image: &Path) -> Result<ConvertResponse, ClientError> {
        let file = tokio::fs::File::open(image).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ClientError::InputNotFound(image.to_path_buf()),
            _ => ClientError::Io(e),
        })?;
        let len = file.metadata().await?.len();

        let file_name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_owned());
        let mime = upload_mime(image);
        let part = Part::stream_with_length(Body::from(file), len)
            .file_name(file_name)
            .mime_str(mime)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let url = self.resolve(CONVERT_PATH)?;
        debug!(%url, mime, size_bytes = len, "uploading image");
        let res = check_status(self.http.post(url).multipart(form).send().await?).await?;

        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|_| ClientError::MissingDownloadUrl { body })
    }

    /// Fetch the converted file at `url`.
    pub async fn download(&self, url: Url) -> Result<Vec<u8>, ClientError> {
        debug!(%url, "downloading converted image");
        let res = check_status(self.http.get(url).send().await?).await?;
        Ok(res.bytes().await?.to_vec())
    }
}

/// Ensure the base ends with `/` so relative joins append instead of
/// replacing the last path segment.
fn parse_base(base_url: &str) -> Result<Url, ClientError> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|e| ClientError::InvalidUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// Content type of the upload part: the extension's guess when it is an
/// `image/*` type, otherwise [`FALLBACK_IMAGE_MIME`].
fn upload_mime(image: &Path) -> &'static str {
    mime_guess::from_path(image)
        .iter_raw()
        .find(|m| m.starts_with("image/"))
        .unwrap_or(FALLBACK_IMAGE_MIME)
}

/// Turn a non-2xx response into [`ClientError::Api`] when the body is a
/// structured error, or [`ClientError::Status`] otherwise.
async fn check_status(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => Err(ClientError::Api {
            status,
            detail: err.detail,
        }),
        Err(_) => Err(ClientError::Status { status, body }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base_without_slash_gets_one() {
        let client = ApiClient::new("http://localhost:8045").unwrap();
        assert_eq!(client.base().as_str(), "http://localhost:8045/");
        let client = ApiClient::new("http://localhost:8045/api").unwrap();
        assert_eq!(client.base().as_str(), "http://localhost:8045/api/");
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn upload_mime_always_names_an_image() {
        assert_eq!(upload_mime(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(upload_mime(Path::new("scan.TIFF")), "image/tiff");
        assert_eq!(upload_mime(Path::new("scan")), FALLBACK_IMAGE_MIME);
        assert_eq!(upload_mime(Path::new("notes.txt")), FALLBACK_IMAGE_MIME);
        assert_eq!(upload_mime(Path::new("raw.unknownext")), FALLBACK_IMAGE_MIME);
    }

    #[test]
    fn links_resolve_against_base() {
        let client = ApiClient::new("http://localhost:8045/api").unwrap();
        assert_eq!(
            client.resolve("https://cdn.example.com/download/x").unwrap().as_str(),
            "https://cdn.example.com/download/x"
        );
        assert_eq!(
            client.resolve("/download/x").unwrap().as_str(),
            "http://localhost:8045/download/x"
        );
        assert_eq!(
            client.resolve("download/x").unwrap().as_str(),
            "http://localhost:8045/api/download/x"
        );
        assert_eq!(
            client.resolve(CONVERT_PATH).unwrap().as_str(),
            "http://localhost:8045/api/convert-to-cmyk/"
        );
    }
}
