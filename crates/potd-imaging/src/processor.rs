//! `ImageProcessorPort` implementation.

use potd_core::{ImageProcessingError, ImageProcessorPort, ImageSize};

use crate::dither::{DEFAULT_NOISE_AMPLITUDE, dither};
use crate::transform::{scale, scale_and_center};

/// Image processor backed by the `image` and `resvg` crates.
#[derive(Debug, Clone, Copy)]
pub struct ImageProcessor {
    noise_amplitude: f32,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessor {
    pub const fn new() -> Self {
        Self {
            noise_amplitude: DEFAULT_NOISE_AMPLITUDE,
        }
    }

    /// Set the dither noise amplitude. Zero disables noise.
    #[must_use]
    pub const fn with_noise_amplitude(mut self, amplitude: f32) -> Self {
        self.noise_amplitude = amplitude;
        self
    }
}

impl ImageProcessorPort for ImageProcessor {
    fn scale(&self, data: &[u8], size: ImageSize) -> Result<Vec<u8>, ImageProcessingError> {
        Ok(scale(data, size)?)
    }

    fn scale_and_center(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ImageProcessingError> {
        Ok(scale_and_center(data, width, height)?)
    }

    fn dither(&self, data: &[u8]) -> Result<Vec<u8>, ImageProcessingError> {
        Ok(dither(data, self.noise_amplitude)?)
    }
}
