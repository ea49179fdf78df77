//! Imaging error types.

use potd_core::ImageProcessingError;
use thiserror::Error;

/// Errors from the codec stack.
#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to render SVG: {0}")]
    Svg(String),

    #[error("Failed to encode PNG: {0}")]
    Png(#[from] png::EncodingError),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

impl From<ImagingError> for ImageProcessingError {
    fn from(err: ImagingError) -> Self {
        match err {
            ImagingError::Decode(e) => Self::Decode(e.to_string()),
            ImagingError::Svg(msg) => Self::Decode(msg),
            ImagingError::Png(e) => Self::Encode(e.to_string()),
            ImagingError::InvalidDimensions(msg) => Self::InvalidDimensions(msg),
        }
    }
}
