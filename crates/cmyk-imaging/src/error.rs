use thiserror::Error;

/// Errors raised while decoding, converting or encoding images.
#[derive(Debug, Error)]
pub enum ImagingError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `image` crate could not identify, decode or encode the data.
    #[error("{0}")]
    Image(#[from] image::ImageError),

    /// The TIFF codec rejected the file or the pixel buffer.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// The TIFF decoded fine but its sample layout is not one we can render.
    #[error("unsupported TIFF layout: {0}")]
    UnsupportedLayout(String),

    /// A raw pixel buffer does not hold `width * height` pixels.
    #[error("pixel buffer of {len} bytes does not fit {width}x{height}")]
    BufferSize { width: u32, height: u32, len: usize },
}
