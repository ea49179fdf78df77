//! Floyd-Steinberg dithering to 1-bit output.

use image::{DynamicImage, GrayImage, Luma};
use rand::Rng;

use crate::error::ImagingError;
use crate::transform::decode;

/// Default amplitude of the uniform noise added to each luma sample.
pub const DEFAULT_NOISE_AMPLITUDE: f32 = 5.0;

const THRESHOLD: f32 = 128.0;

/// Dither `img` to a grayscale image holding only 0 and 255.
///
/// Luma is `0.299 R + 0.587 G + 0.114 B` plus noise drawn uniformly from
/// `[-noise_amplitude, noise_amplitude)`, clamped to `0..=255`. The
/// quantisation error is spread right, down-left, down and down-right with
/// weights 7/16, 3/16, 5/16 and 1/16.
pub fn dither_luma<R: Rng>(
    img: &DynamicImage,
    noise_amplitude: f32,
    rng: &mut R,
) -> GrayImage {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let (wu, hu) = (w as usize, h as usize);

    let mut pixels: Vec<f32> = rgb
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            let mut gray = f32::from(r) * 0.299 + f32::from(g) * 0.587 + f32::from(b) * 0.114;
            if noise_amplitude > 0.0 {
                gray += rng.gen_range(-noise_amplitude..noise_amplitude);
            }
            gray.clamp(0.0, 255.0)
        })
        .collect();

    for y in 0..hu {
        for x in 0..wu {
            let idx = y * wu + x;
            let old = pixels[idx];
            let new = if old < THRESHOLD { 0.0 } else { 255.0 };
            pixels[idx] = new;
            let err = old - new;

            if x + 1 < wu {
                pixels[idx + 1] += err * 7.0 / 16.0;
            }
            if y + 1 < hu {
                let below = idx + wu;
                if x > 0 {
                    pixels[below - 1] += err * 3.0 / 16.0;
                }
                pixels[below] += err * 5.0 / 16.0;
                if x + 1 < wu {
                    pixels[below + 1] += err * 1.0 / 16.0;
                }
            }
        }
    }

    GrayImage::from_fn(w, h, |x, y| {
        let v = pixels[y as usize * wu + x as usize];
        Luma([if v < THRESHOLD { 0 } else { 255 }])
    })
}

/// Encode a black and white image as a 1-bit grayscale PNG.
pub fn encode_one_bit_png(img: &GrayImage) -> Result<Vec<u8>, ImagingError> {
    let (w, h) = img.dimensions();
    let row_bytes = (w as usize).div_ceil(8);
    let mut packed = vec![0u8; row_bytes * h as usize];

    for (x, y, Luma([v])) in img.enumerate_pixels() {
        if *v >= 128 {
            packed[y as usize * row_bytes + x as usize / 8] |= 0x80 >> (x % 8);
        }
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, w, h);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::One);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&packed)?;
        writer.finish()?;
    }
    Ok(out)
}

/// Decode, dither and encode in one step.
pub fn dither(data: &[u8], noise_amplitude: f32) -> Result<Vec<u8>, ImagingError> {
    let img = decode(data)?;
    let bw = dither_luma(&img, noise_amplitude, &mut rand::thread_rng());
    tracing::debug!(
        width = bw.width(),
        height = bw.height(),
        "Dithered image"
    );
    encode_one_bit_png(&bw)
}
