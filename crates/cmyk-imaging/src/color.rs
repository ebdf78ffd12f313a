//! RGB → CMYK pixel transform.
//!
//! `image` has no CMYK colour type, so CMYK pixels live in [`CmykImage`], a
//! packed `C M Y K` buffer with one byte per sample. The transform is the
//! customary naive one: invert each channel and leave black empty. Going back
//! to RGB is left to `image`'s TIFF decoder.

use image::RgbImage;

use crate::{ImagingError, Result};

/// `C = 255 - R`, `M = 255 - G`, `Y = 255 - B`, `K = 0`.
#[inline]
pub fn rgb_to_cmyk([r, g, b]: [u8; 3]) -> [u8; 4] {
    [255 - r, 255 - g, 255 - b, 0]
}

/// A four-channel, 8-bit CMYK raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmykImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CmykImage {
    /// Wrap a packed `CMYK` buffer. Fails when the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(ImagingError::BufferSize { width, height, len: data.len() });
        }
        Ok(Self { width, height, data })
    }

    pub fn from_rgb(rgb: &RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for px in rgb.as_raw().chunks_exact(3) {
            data.extend_from_slice(&rgb_to_cmyk([px[0], px[1], px[2]]));
        }
        Self { width, height, data }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Samples of the pixel at `(x, y)`. Panics when out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}
