//! Decoding, scaling and cover-fit.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use potd_core::ImageSize;

use crate::error::ImagingError;
use crate::svg::{is_svg, svg_to_png};

/// Decode raster or SVG bytes.
pub fn decode(data: &[u8]) -> Result<DynamicImage, ImagingError> {
    if is_svg(data) {
        let png = svg_to_png(data)?;
        return Ok(image::load_from_memory(&png)?);
    }
    Ok(image::load_from_memory(data)?)
}

/// Encode as PNG, dropping any alpha channel.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ImagingError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)?;
    Ok(out)
}

/// Scale to `size`.
///
/// With neither dimension requested the input bytes come back untouched.
/// With one dimension the other follows the aspect ratio.
pub fn scale(data: &[u8], size: ImageSize) -> Result<Vec<u8>, ImagingError> {
    if size.is_original() {
        return Ok(data.to_vec());
    }
    if size.width == Some(0) || size.height == Some(0) {
        return Err(ImagingError::InvalidDimensions(format!(
            "{size:?} must be positive"
        )));
    }

    let img = decode(data)?;
    let Some((width, height)) = size.resolve(img.width(), img.height()) else {
        return Ok(data.to_vec());
    };
    tracing::debug!(
        from_width = img.width(),
        from_height = img.height(),
        width,
        height,
        "Scaling image"
    );

    encode_png(&img.resize_exact(width, height, FilterType::CatmullRom))
}

/// Scale to cover `width` x `height`, centre, and crop the overflow.
///
/// The image is scaled by `max(width / w, height / h)` and drawn centred on
/// a white canvas of exactly the target size.
pub fn scale_and_center(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ImagingError> {
    if width == 0 || height == 0 {
        return Err(ImagingError::InvalidDimensions(format!(
            "{width}x{height} must be positive"
        )));
    }

    let img = decode(data)?;
    let (src_w, src_h) = (img.width().max(1), img.height().max(1));
    let factor = (f64::from(width) / f64::from(src_w)).max(f64::from(height) / f64::from(src_h));
    let new_w = ((f64::from(src_w) * factor) as u32).max(1);
    let new_h = ((f64::from(src_h) * factor) as u32).max(1);
    tracing::debug!(new_w, new_h, width, height, "Cover-fitting image");

    let resized = img
        .resize_exact(new_w, new_h, FilterType::CatmullRom)
        .to_rgba8();

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let x = (i64::from(width) - i64::from(new_w)) / 2;
    let y = (i64::from(height) - i64::from(new_h)) / 2;
    imageops::overlay(&mut canvas, &resized, x, y);

    encode_png(&DynamicImage::ImageRgba8(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        encode_png(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb(color),
        )))
        .unwrap()
    }

    fn dims(data: &[u8]) -> (u32, u32) {
        image::load_from_memory(data).unwrap().dimensions()
    }

    #[test]
    fn test_scale_without_size_returns_input() {
        let input = png(10, 10, [1, 2, 3]);
        assert_eq!(scale(&input, ImageSize::ORIGINAL).unwrap(), input);
    }

    #[test]
    fn test_scale_width_only_keeps_aspect() {
        let out = scale(&png(200, 100, [0, 0, 0]), ImageSize::new(Some(50), None)).unwrap();
        assert_eq!(dims(&out), (50, 25));
    }

    #[test]
    fn test_scale_both_is_exact() {
        let out = scale(&png(200, 100, [0, 0, 0]), ImageSize::new(Some(30), Some(70))).unwrap();
        assert_eq!(dims(&out), (30, 70));
    }

    #[test]
    fn test_scale_rejects_zero() {
        assert!(scale(&png(4, 4, [0, 0, 0]), ImageSize::new(Some(0), None)).is_err());
    }

    #[test]
    fn test_scale_garbage_is_decode_error() {
        let err = scale(b"definitely not an image", ImageSize::new(Some(5), None)).unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
    }

    #[test]
    fn test_cover_fills_target_exactly() {
        // Tall source: width is the constraining side, top and bottom are cropped.
        let out = scale_and_center(&png(100, 400, [200, 10, 10]), 800, 480).unwrap();
        let img = image::load_from_memory(&out).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (800, 480));
        for (x, y) in [(0, 0), (799, 479), (400, 240)] {
            let Rgb([r, g, b]) = *img.get_pixel(x, y);
            assert!(r > 190 && g < 30 && b < 30, "pixel ({x},{y}) = {r},{g},{b}");
        }
    }

    #[test]
    fn test_cover_accepts_svg() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="80" height="48"><rect width="80" height="48" fill="blue"/></svg>"#;
        let out = scale_and_center(svg, 800, 480).unwrap();
        assert_eq!(dims(&out), (800, 480));
    }
}
