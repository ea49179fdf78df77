//! Image processing port definition.
//!
//! Processing is CPU-bound and synchronous; services call it from
//! `spawn_blocking`.

use thiserror::Error;

use crate::domain::ImageSize;

/// Errors from decoding, transforming or encoding images.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageProcessingError {
    /// The input bytes are not a readable image.
    #[error("Failed to read image data: {0}")]
    Decode(String),

    /// The output could not be encoded.
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Requested dimensions are unusable.
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Port for image transformations. All outputs are PNG bytes.
pub trait ImageProcessorPort: Send + Sync {
    /// Scale to `size`. With no dimensions requested the input is returned unchanged.
    fn scale(&self, data: &[u8], size: ImageSize) -> Result<Vec<u8>, ImageProcessingError>;

    /// Scale to cover `width` x `height` and centre, cropping the overflow.
    fn scale_and_center(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ImageProcessingError>;

    /// Render a 1-bit Floyd-Steinberg dithered rendition.
    fn dither(&self, data: &[u8]) -> Result<Vec<u8>, ImageProcessingError>;
}
