#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod dither;
mod error;
mod processor;
pub mod svg;
pub mod transform;

pub use dither::{DEFAULT_NOISE_AMPLITUDE, dither_luma, encode_one_bit_png};
pub use error::ImagingError;
pub use processor::ImageProcessor;
pub use svg::{is_svg, svg_to_png};
pub use transform::{decode, encode_png, scale, scale_and_center};
