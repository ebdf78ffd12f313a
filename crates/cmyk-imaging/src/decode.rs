//! Decoding of uploaded files.
//!
//! The format is sniffed from the file content, never from its name or the
//! declared MIME type, so a PNG uploaded as `photo.jpg` still decodes.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageReader, RgbImage};
use tracing::debug;

use crate::Result;

/// Decode the image at `path` into 8-bit RGB.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(into_rgb(img))
}

/// Decode an in-memory image into 8-bit RGB.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    let img = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?.decode()?;
    Ok(into_rgb(img))
}

/// Gray, gray-alpha, RGBA and 16/32-bit inputs are all flattened to RGB8.
/// Alpha is dropped, not composited.
fn into_rgb(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => {
            debug!(color = ?other.color(), "converting decoded image to RGB8");
            other.into_rgb8()
        }
    }
}
