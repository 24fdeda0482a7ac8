//! Lossless PNG and WebP encoding.

use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate, EncodeError};
use crate::decode::DecodedImage;

/// Encode an RGBA raster to PNG bytes, keeping alpha.
pub fn encode_png(image: &DecodedImage) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(buffer)
}

/// Encode an RGBA raster to lossless WebP bytes, keeping alpha.
pub fn encode_webp(image: &DecodedImage) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(buffer)
}
