//! Image encoding for QuickEdit exports.
//!
//! This module provides functionality for:
//! - Encoding rasters to JPEG with a configurable quality factor
//! - Encoding rasters to PNG and WebP losslessly
//! - Picking the encoder from an [`OutputFormat`]
//!
//! All encoders take straight-alpha RGBA rasters. JPEG has no alpha channel,
//! so transparent pixels are composited onto black first, which is what a
//! browser canvas produces for `toBlob("image/jpeg")`.

mod jpeg;
mod lossless;

use thiserror::Error;

use crate::decode::{DecodedImage, CHANNELS};
use crate::media::OutputFormat;

pub use jpeg::encode_jpeg;
pub use lossless::{encode_png, encode_webp};

/// Errors that can occur during encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// The encoder finished without producing any bytes
    #[error("Encoder produced no output")]
    EmptyOutput,
}

/// Encode `image` in `format`. `jpeg_quality` (1-100) only applies to JPEG.
pub fn encode_raster(
    image: &DecodedImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let bytes = match format {
        OutputFormat::Jpeg => encode_jpeg(image, jpeg_quality)?,
        OutputFormat::Png => encode_png(image)?,
        OutputFormat::WebP => encode_webp(image)?,
    };

    if bytes.is_empty() {
        return Err(EncodeError::EmptyOutput);
    }
    Ok(bytes)
}

/// Check dimensions and buffer length before handing pixels to an encoder.
fn validate(image: &DecodedImage) -> Result<(), EncodeError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * CHANNELS;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            width,
            height,
            pixels: [128u8, 128, 128, 255].repeat((width * height) as usize),
        }
    }

    #[test]
    fn test_dispatch_by_format() {
        let img = gray(8, 8);

        let jpeg = encode_raster(&img, OutputFormat::Jpeg, 92).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);

        let png = encode_raster(&img, OutputFormat::Png, 92).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let webp = encode_raster(&img, OutputFormat::WebP, 92).unwrap();
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_validate_rejects_mismatched_buffer() {
        let img = DecodedImage {
            width: 4,
            height: 4,
            pixels: vec![0u8; 10],
        };
        assert_eq!(
            encode_raster(&img, OutputFormat::Png, 92),
            Err(EncodeError::InvalidPixelData {
                expected: 64,
                actual: 10
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        let img = DecodedImage {
            width: 0,
            height: 4,
            pixels: vec![],
        };
        assert!(matches!(
            encode_raster(&img, OutputFormat::Jpeg, 92),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }
}
