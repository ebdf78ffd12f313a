//! cmyk-client – upload an image to the conversion service and save the
//! CMYK TIFF it produces.

pub mod api;
pub mod error;

use std::path::{Path, PathBuf};

pub use api::ApiClient;
pub use error::ClientError;

/// Service address used when neither `--url` nor `CMYK_URL` is given.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8045";

/// Upload `image`, download the converted result and write it to `output`
/// (or [`default_output_path`]). Progress is printed to stdout.
pub async fn convert_image(
    client: &ApiClient,
    image: &Path,
    output: Option<&Path>,
) -> Result<PathBuf, ClientError> {
    if !tokio::fs::try_exists(image).await.unwrap_or(false) {
        return Err(ClientError::InputNotFound(image.to_path_buf()));
    }
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(image));

    println!("Uploading {}...", image.display());
    let converted = client.upload(image).await?;

    let url = client.resolve(&converted.download_url)?;
    println!("Downloading from: {url}");
    let bytes = client.download(url).await?;

    tokio::fs::write(&output, &bytes).await?;
    println!("Saved CMYK file to: {}", output.display());
    Ok(output)
}

/// `{stem}_cmyk.tiff` in the current directory.
pub fn default_output_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());
    PathBuf::from(format!("{stem}_cmyk.tiff"))
}

/// Print `err` to stdout with as much server detail as is available.
pub fn report(err: &ClientError) {
    match err {
        ClientError::InputNotFound(_) => println!("Error: {err}"),
        ClientError::Api { status, detail } => {
            println!("Error communicating with API: {status}");
            println!("API Error: {detail}");
        }
        ClientError::Status { status, body } => {
            println!("Error communicating with API: {status}");
            println!("Status Code: {}", status.as_u16());
            println!("Response: {body}");
        }
        ClientError::MissingDownloadUrl { body } => {
            println!("Error: {err}");
            println!("Response: {body}");
        }
        ClientError::Http(_) => println!("Error communicating with API: {err}"),
        ClientError::InvalidUrl { .. } | ClientError::Io(_) => println!("Error: {err}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_output_drops_directory_and_extension() {
        assert_eq!(
            default_output_path(Path::new("/photos/holiday.png")),
            PathBuf::from("holiday_cmyk.tiff")
        );
        assert_eq!(default_output_path(Path::new("scan")), PathBuf::from("scan_cmyk.tiff"));
    }
}
