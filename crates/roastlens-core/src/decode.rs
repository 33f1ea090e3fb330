//! Decoding of uploaded image bytes.
//!
//! Requests carry raw bytes with no trustworthy filename, so the format is
//! sniffed from content. Anything the decoder rejects becomes a
//! `BadImage` error carrying the decoder's own message.

use image::RgbImage;
use std::io::Cursor;

use crate::error::AnalysisError;

/// Decode an uploaded byte blob into an RGB8 image.
///
/// Alpha channels and non-RGB color types are converted; the caller always
/// receives 3-channel data.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, AnalysisError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AnalysisError::BadImage(format!("Cannot detect image format: {e}")))?;

    if reader.format().is_none() {
        return Err(AnalysisError::BadImage(
            "Unrecognized image format".to_string(),
        ));
    }

    let image = reader
        .decode()
        .map_err(|e| AnalysisError::BadImage(e.to_string()))?;

    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_valid_png() {
        let bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::new(32, 24)));
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (32, 24));
    }

    #[test]
    fn test_decode_converts_rgba_to_rgb() {
        let bytes = png_bytes(DynamicImage::ImageRgba8(RgbaImage::new(8, 8)));
        let decoded = decode_image(&bytes).unwrap();
        // RgbImage is 3 bytes per pixel by construction.
        assert_eq!(decoded.as_raw().len(), 8 * 8 * 3);
    }

    #[test]
    fn test_decode_rejects_text_bytes() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AnalysisError::BadImage(_)));
    }

    #[test]
    fn test_decode_rejects_truncated_png() {
        let mut bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::new(64, 64)));
        bytes.truncate(bytes.len() / 2);
        let err = decode_image(&bytes).unwrap_err();
        assert!(matches!(err, AnalysisError::BadImage(_)));
    }

    #[test]
    fn test_decode_rejects_empty_bytes() {
        let err = decode_image(&[]).unwrap_err();
        assert!(matches!(err, AnalysisError::BadImage(_)));
    }
}
