//! In-memory JPEG rendering for browser previews.

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;

use crate::Result;

/// Encode `rgb` as a baseline JPEG. `quality` is clamped to `1..=100`.
pub fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode_image(rgb)?;
    Ok(buf)
}
