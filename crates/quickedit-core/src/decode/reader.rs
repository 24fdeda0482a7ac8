//! Image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};

use super::{DecodeError, DecodedImage, ExifOrientation};

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// The container format is sniffed from the bytes rather than trusted from
/// the declared media type. The result is always RGBA8 so that transparent
/// sources survive the round trip through rasterization.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are not a recognizable image.
/// Returns `DecodeError::UnsupportedFormat` if the format is recognized but not built in.
/// Returns `DecodeError::CorruptedFile` if decoding fails part way.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = extract_orientation(bytes);
    let img = decode_dynamic(bytes)?;
    let oriented = apply_orientation(img, orientation);
    Ok(DecodedImage::from_rgba_image(oriented.into_rgba8()))
}

fn guessed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    Ok(reader)
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    guessed_reader(bytes)?.decode().map_err(map_image_error)
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(e) => DecodeError::UnsupportedFormat(e.to_string()),
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

/// Extract EXIF orientation from image bytes.
///
/// Returns `ExifOrientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn extract_orientation(bytes: &[u8]) -> ExifOrientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(ExifOrientation::from)
            .unwrap_or_default(),
        Err(_) => ExifOrientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: ExifOrientation) -> DynamicImage {
    match orientation {
        ExifOrientation::Normal => img,
        ExifOrientation::FlipHorizontal => img.fliph(),
        ExifOrientation::Rotate180 => img.rotate180(),
        ExifOrientation::FlipVertical => img.flipv(),
        ExifOrientation::Transpose => img.rotate90().fliph(),
        ExifOrientation::Rotate90CW => img.rotate90(),
        ExifOrientation::Transverse => img.rotate270().fliph(),
        ExifOrientation::Rotate270CW => img.rotate270(),
    }
}
