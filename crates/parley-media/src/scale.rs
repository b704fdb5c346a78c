//! Downscale-and-re-encode transform applied to images before upload.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::error::MediaError;

/// Dimensions after capping the longer side at `bound`, aspect ratio
/// preserved.  Images already within the bound are returned unchanged.
pub fn scaled_dimensions(width: u32, height: u32, bound: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= bound {
        return (width, height);
    }

    let factor = f64::from(longer) / f64::from(bound);
    let scale = |side: u32| ((f64::from(side) / factor).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Decode `bytes`, downscale so neither side exceeds `bound`, and re-encode
/// as JPEG at `quality` (0-100).
///
/// Same input, same bound, same quality: same output bytes.
pub fn prepare_image_for_upload(
    bytes: &[u8],
    bound: u32,
    quality: u8,
) -> Result<Vec<u8>, MediaError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(MediaError::EmptyImage);
    }

    let (target_w, target_h) = scaled_dimensions(width, height, bound);
    let img = if (target_w, target_h) == (width, height) {
        img
    } else {
        debug!(
            from = %format!("{width}x{height}"),
            to = %format!("{target_w}x{target_h}"),
            "Downscaling image for upload"
        );
        img.resize_exact(target_w, target_h, FilterType::Triangle)
    };

    // JPEG has no alpha channel; flatten before encoding.
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    img.write_with_encoder(encoder)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn landscape_scales_down_to_the_bound() {
        assert_eq!(scaled_dimensions(1000, 500, 480), (480, 240));
    }

    #[test]
    fn portrait_scales_down_to_the_bound() {
        assert_eq!(scaled_dimensions(500, 1000, 480), (240, 480));
    }

    #[test]
    fn small_image_keeps_its_dimensions() {
        assert_eq!(scaled_dimensions(300, 200, 480), (300, 200));
    }

    #[test]
    fn exact_bound_is_left_alone() {
        assert_eq!(scaled_dimensions(480, 480, 480), (480, 480));
    }

    #[test]
    fn prepared_image_is_jpeg_within_the_bound() {
        let out = prepare_image_for_upload(&png_bytes(1000, 500), 480, 40).unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (480, 240));
    }

    #[test]
    fn small_image_is_re_encoded_without_resizing() {
        let out = prepare_image_for_upload(&png_bytes(300, 200), 480, 40).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 200));
    }

    #[test]
    fn transform_is_deterministic() {
        let input = png_bytes(640, 360);
        let a = prepare_image_for_upload(&input, 480, 40).unwrap();
        let b = prepare_image_for_upload(&input, 480, 40).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(prepare_image_for_upload(b"not an image", 480, 40).is_err());
    }
}
