//! Raster decoding: PNG/JPEG bytes → `DynamicImage`, and back to PNG.
//!
//! The declared MIME type only picks the OCR path; the actual format is
//! sniffed from the bytes, so a PNG uploaded as `image/jpeg` still decodes.

use crate::error::AnalyzerError;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Decode an uploaded image into a pixel buffer.
pub fn decode_image(bytes: &[u8], filename: &str) -> Result<DynamicImage, AnalyzerError> {
    let img = image::load_from_memory(bytes).map_err(|e| AnalyzerError::ImageDecodeFailed {
        filename: filename.to_string(),
        detail: e.to_string(),
    })?;
    debug!("Decoded '{}' → {}x{} px", filename, img.width(), img.height());
    Ok(img)
}

/// Encode a pixel buffer as lossless PNG for engines that read files.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 8, Rgba([10, 20, 30, 255])))
    }

    #[test]
    fn png_round_trips_dimensions() {
        let png = encode_png(&sample()).expect("encode should succeed");
        assert_eq!(&png[..4], b"\x89PNG");
        let img = decode_image(&png, "chart.png").expect("decode should succeed");
        assert_eq!((img.width(), img.height()), (12, 8));
    }

    #[test]
    fn decodes_jpeg() {
        let mut jpg = Vec::new();
        DynamicImage::ImageRgb8(sample().to_rgb8())
            .write_to(&mut Cursor::new(&mut jpg), image::ImageFormat::Jpeg)
            .unwrap();
        let img = decode_image(&jpg, "scan.jpg").expect("jpeg should decode");
        assert_eq!(img.width(), 12);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_image(b"not an image", "x.png").unwrap_err();
        assert!(
            matches!(err, AnalyzerError::ImageDecodeFailed { ref filename, .. } if filename == "x.png"),
            "got {err:?}"
        );
    }
}
