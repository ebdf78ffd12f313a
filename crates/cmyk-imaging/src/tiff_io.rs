//! Reading and writing separated (CMYK) TIFF files.
//!
//! `image` cannot encode CMYK, so the `tiff` codec is driven directly. Files
//! are written uncompressed with `PhotometricInterpretation = Separated`.
//! Reading back to RGB goes through `image` (see [`crate::decode::load_rgb`]);
//! [`read_cmyk_tiff`] returns the raw samples.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype};

use crate::color::CmykImage;
use crate::{ImagingError, Result};

/// Encode `img` as an uncompressed CMYK TIFF into `writer`.
pub fn write_cmyk_tiff<W: Write + Seek>(writer: W, img: &CmykImage) -> Result<()> {
    let (width, height) = img.dimensions();
    let mut encoder = TiffEncoder::new(writer)?;
    encoder.write_image::<colortype::CMYK8>(width, height, img.as_raw())?;
    Ok(())
}

/// Encode `img` to a new file at `path`, flushed and synced before returning.
pub fn save_cmyk_tiff(path: &Path, img: &CmykImage) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_cmyk_tiff(&mut writer, img)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(())
}

/// Decode an 8-bit CMYK TIFF. Any other sample layout is rejected.
pub fn read_cmyk_tiff<R: Read + Seek>(reader: R) -> Result<CmykImage> {
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let color = decoder.colortype()?;
    if color != ColorType::CMYK(8) {
        return Err(ImagingError::UnsupportedLayout(format!("{color:?}, expected CMYK(8)")));
    }
    match decoder.read_image()? {
        DecodingResult::U8(data) => CmykImage::from_raw(width, height, data),
        _ => Err(ImagingError::UnsupportedLayout("non 8-bit CMYK samples".into())),
    }
}

pub fn load_cmyk_tiff(path: &Path) -> Result<CmykImage> {
    read_cmyk_tiff(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod test {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tiff::tags::Tag;

    use crate::decode;

    fn sample() -> CmykImage {
        let mut data = Vec::new();
        for i in 0..6u8 {
            data.extend_from_slice(&[i, 10 + i, 20 + i, 30 + i]);
        }
        CmykImage::from_raw(3, 2, data).unwrap()
    }

    #[test]
    fn written_tiff_reads_back_as_cmyk() {
        let mut buf = Cursor::new(Vec::new());
        write_cmyk_tiff(&mut buf, &sample()).unwrap();
        buf.set_position(0);
        assert_eq!(read_cmyk_tiff(buf).unwrap(), sample());
    }

    #[test]
    fn written_tiff_is_uncompressed_and_separated() {
        let mut buf = Cursor::new(Vec::new());
        write_cmyk_tiff(&mut buf, &sample()).unwrap();
        buf.set_position(0);
        let mut decoder = Decoder::new(buf).unwrap();
        assert_eq!(decoder.get_tag_u32(Tag::Compression).unwrap(), 1);
        assert_eq!(decoder.get_tag_u32(Tag::PhotometricInterpretation).unwrap(), 5);
        assert_eq!(decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap(), 4);
    }

    #[test]
    fn rgb_tiff_is_not_cmyk_but_still_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.tiff");
        RgbImage::from_pixel(4, 4, Rgb([0, 128, 255]))
            .save_with_format(&path, ImageFormat::Tiff)
            .unwrap();

        assert!(matches!(load_cmyk_tiff(&path), Err(ImagingError::UnsupportedLayout(_))));
        let rgb = decode::load_rgb(&path).unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 128, 255]);
    }

    #[test]
    fn saved_file_decodes_back_to_the_same_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed_cmyk.tiff");
        let mut rgb = RgbImage::new(5, 2);
        for (x, y, px) in rgb.enumerate_pixels_mut() {
            *px = Rgb([(x * 50) as u8, (y * 200) as u8, 255 - (x * 40) as u8]);
        }
        save_cmyk_tiff(&path, &CmykImage::from_rgb(&rgb)).unwrap();
        assert_eq!(load_cmyk_tiff(&path).unwrap(), CmykImage::from_rgb(&rgb));
        // With K = 0 the decoder's inverse transform is exact.
        assert_eq!(decode::load_rgb(&path).unwrap(), rgb);
    }
}
