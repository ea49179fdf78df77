//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (database, HTTP, image codecs).
//!
//! # Structure
//!
//! - `picture` - Stored picture records and their JSON representation
//! - `featured` - Extraction of today's featured picture from the main page
//! - `image` - Image variants and requested output sizes

pub mod featured;
pub mod image;
mod picture;

pub use featured::{
    ExtractionError, FeaturedPicture, original_image_url, parse_featured_picture, split_credit,
};
pub use image::{ImageSize, ImageVariant, TRMNL_HEIGHT, TRMNL_WIDTH};
pub use picture::{
    DESCRIPTION_UNAVAILABLE, MAX_DESCRIPTION_CHARS, MAX_SHORT_DESCRIPTION_CHARS, NewPicture,
    Picture, PictureDto, truncate_chars,
};
