//! cmyk-imaging – the image half of the conversion service.
//!
//! - [`decode`]: sniff and decode an uploaded file into 8-bit RGB.
//! - [`color`]: per-pixel RGB → CMYK transform.
//! - [`tiff_io`]: write and read four-channel (separated) TIFF files.
//! - [`preview`]: encode RGB as an in-memory JPEG.
//!
//! The HTTP layer only needs [`convert_to_cmyk_tiff`] and [`render_preview`].

pub mod color;
pub mod decode;
mod error;
pub mod preview;
pub mod tiff_io;

use std::path::Path;

pub use color::CmykImage;
pub use error::ImagingError;

pub type Result<T> = std::result::Result<T, ImagingError>;

/// Default quality of the JPEG preview.
pub const DEFAULT_PREVIEW_QUALITY: u8 = 90;

/// Decode `input`, convert it to CMYK and write an uncompressed TIFF to
/// `output`. Returns the pixel dimensions of the written image.
pub fn convert_to_cmyk_tiff(input: &Path, output: &Path) -> Result<(u32, u32)> {
    let rgb = decode::load_rgb(input)?;
    let cmyk = CmykImage::from_rgb(&rgb);
    tiff_io::save_cmyk_tiff(output, &cmyk)?;
    Ok(cmyk.dimensions())
}

/// Load the stored TIFF at `path` and return JPEG bytes suitable for a
/// browser. CMYK samples are converted to RGB by `image`'s TIFF decoder.
pub fn render_preview(path: &Path, quality: u8) -> Result<Vec<u8>> {
    let rgb = decode::load_rgb(path)?;
    preview::encode_jpeg(&rgb, quality)
}

#[cfg(test)]
mod test {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    #[test]
    fn png_round_trips_through_cmyk_tiff_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("red.png");
        let output = dir.path().join("red_cmyk.tiff");
        RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]))
            .save_with_format(&input, ImageFormat::Png)
            .unwrap();

        assert_eq!(convert_to_cmyk_tiff(&input, &output).unwrap(), (10, 10));

        let cmyk = tiff_io::load_cmyk_tiff(&output).unwrap();
        assert_eq!(cmyk.dimensions(), (10, 10));
        assert_eq!(cmyk.get_pixel(3, 7), [0, 255, 255, 0]);

        let jpeg = render_preview(&output, DEFAULT_PREVIEW_QUALITY).unwrap();
        let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
        assert_eq!(decoded.color().channel_count(), 3);
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
    }

    #[test]
    fn undecodable_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.png");
        let output = dir.path().join("notes_cmyk.tiff");
        std::fs::write(&input, b"definitely not pixels").unwrap();

        assert!(convert_to_cmyk_tiff(&input, &output).is_err());
        assert!(!output.exists());
    }
}
