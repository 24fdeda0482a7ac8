//! Drawing a source image onto an oriented canvas.
//!
//! Uses inverse mapping: for each pixel center of the canvas we find the
//! point of the source it came from and sample there.
//!
//! - Rotations by multiples of 90 degrees sample the nearest pixel. Each
//!   canvas pixel center maps exactly onto a source pixel center, so the
//!   result is a pure permutation of the source pixels.
//! - Any other angle samples bilinearly; canvas pixels whose preimage
//!   falls outside the source stay transparent.

use thiserror::Error;

use super::geometry::Geometry;
use crate::decode::{DecodedImage, CHANNELS};

/// The output raster could not be created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("Cannot allocate a {width}x{height} render target")]
    Unavailable { width: u32, height: u32 },
}

/// Allocate a transparent RGBA raster.
///
/// Fails for zero-sized targets, targets with a side longer than
/// `max_dimension`, and allocations the platform refuses.
pub fn allocate_raster(
    width: u32,
    height: u32,
    max_dimension: u32,
) -> Result<DecodedImage, RasterError> {
    let unavailable = RasterError::Unavailable { width, height };
    if width == 0 || height == 0 || width > max_dimension || height > max_dimension {
        return Err(unavailable);
    }

    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| unavailable.clone())?;

    let mut pixels = Vec::new();
    pixels.try_reserve_exact(len).map_err(|_| unavailable)?;
    pixels.resize(len, 0);

    Ok(DecodedImage {
        width,
        height,
        pixels,
    })
}

/// Draw `source` into `target` through the geometry's transform.
///
/// `target` must have the geometry's canvas dimensions. Pixels that receive
/// no source sample are left as they were.
pub fn rasterize(source: &DecodedImage, geometry: &Geometry, target: &mut DecodedImage) {
    debug_assert_eq!(
        (target.width, target.height),
        (geometry.canvas_width, geometry.canvas_height),
        "Render target does not match canvas size"
    );
    if source.is_empty() || target.is_empty() {
        return;
    }

    // Canvas -> source pixel space.
    let Some(inverse) = geometry.source_to_canvas().invert() else {
        return;
    };

    let width = target.width as usize;
    for (idx, out) in target.pixels.chunks_exact_mut(CHANNELS).enumerate() {
        let x = (idx % width) as f64 + 0.5;
        let y = (idx / width) as f64 + 0.5;
        let (u, v) = inverse.apply(x, y);

        let sample = if geometry.pixel_aligned {
            sample_nearest(source, u, v)
        } else {
            sample_bilinear(source, u - 0.5, v - 0.5)
        };
        if let Some(pixel) = sample {
            out.copy_from_slice(&pixel);
        }
    }
}

/// Nearest source pixel containing the continuous point `(u, v)`.
#[inline]
fn sample_nearest(image: &DecodedImage, u: f64, v: f64) -> Option<[u8; 4]> {
    if u < 0.0 || v < 0.0 {
        return None;
    }
    let (px, py) = (u.floor() as u64, v.floor() as u64);
    if px >= image.width as u64 || py >= image.height as u64 {
        return None;
    }
    Some(image.pixel(px as u32, py as u32))
}

/// Get a pixel as [f64; 4] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &DecodedImage, px: usize, py: usize) -> [f64; 4] {
    let idx = (py * image.width as usize + px) * CHANNELS;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
        image.pixels[idx + 3] as f64,
    ]
}

/// Sample a pixel using bilinear interpolation.
///
/// `(x, y)` is in pixel-center coordinates: `(0, 0)` is the center of the
/// top-left pixel. Points within half a pixel of the border clamp to the
/// edge; points further out are transparent.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> Option<[u8; 4]> {
    let (w, h) = (image.width as f64, image.height as f64);
    if x < -0.5 || y < -0.5 || x >= w - 0.5 || y >= h - 0.5 {
        return None;
    }

    let max_x = image.width as usize - 1;
    let max_y = image.height as usize - 1;
    let x = x.clamp(0.0, max_x as f64);
    let y = y.clamp(0.0, max_y as f64);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Orientation;
    use crate::transform::resolve_geometry;

    /// Create a test image where every pixel is unique.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8 * 10, y as u8 * 10, (x + y) as u8, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn render(source: &DecodedImage, orientation: Orientation) -> DecodedImage {
        let geometry = resolve_geometry(source.width, source.height, &orientation);
        let mut target =
            allocate_raster(geometry.canvas_width, geometry.canvas_height, 4096).unwrap();
        rasterize(source, &geometry, &mut target);
        target
    }

    fn to_rgba(image: &DecodedImage) -> image::RgbaImage {
        image.clone().into_rgba_image().unwrap()
    }

    fn from_rgba(image: image::RgbaImage) -> DecodedImage {
        DecodedImage::from_rgba_image(image)
    }

    fn orientation(degrees: i32, flip_horizontal: bool, flip_vertical: bool) -> Orientation {
        Orientation {
            rotation_degrees: degrees,
            flip_horizontal,
            flip_vertical,
        }
    }

    #[test]
    fn test_identity_copies_pixels() {
        let src = test_image(5, 3);
        assert_eq!(render(&src, Orientation::default()), src);
    }

    #[test]
    fn test_quarter_turns_match_reference_rotations() {
        let src = test_image(5, 3);
        let rgba = to_rgba(&src);
        let cases = [
            (90, image::imageops::rotate90(&rgba)),
            (180, image::imageops::rotate180(&rgba)),
            (270, image::imageops::rotate270(&rgba)),
            (-90, image::imageops::rotate270(&rgba)),
            (450, image::imageops::rotate90(&rgba)),
        ];
        for (degrees, expected) in cases {
            let result = render(&src, orientation(degrees, false, false));
            assert_eq!(result, from_rgba(expected), "rotation {}", degrees);
        }
    }

    #[test]
    fn test_flips_match_reference() {
        let src = test_image(4, 3);
        let rgba = to_rgba(&src);
        assert_eq!(
            render(&src, orientation(0, true, false)),
            from_rgba(image::imageops::flip_horizontal(&rgba))
        );
        assert_eq!(
            render(&src, orientation(0, false, true)),
            from_rgba(image::imageops::flip_vertical(&rgba))
        );
    }

    #[test]
    fn test_flip_horizontal_then_rotate_order() {
        // Canvas calls are translate, scale, rotate, so a point is rotated
        // first and mirrored in canvas space afterwards.
        let src = test_image(4, 3);
        let rgba = to_rgba(&src);
        let result = render(&src, orientation(90, true, false));

        let expected = image::imageops::flip_horizontal(&image::imageops::rotate90(&rgba));
        assert_eq!(result, from_rgba(expected));

        let other_order = image::imageops::rotate90(&image::imageops::flip_horizontal(&rgba));
        assert_ne!(result, from_rgba(other_order));
    }

    #[test]
    fn test_both_flips_equal_half_turn() {
        let src = test_image(4, 3);
        assert_eq!(
            render(&src, orientation(0, true, true)),
            render(&src, orientation(180, false, false))
        );
    }

    #[test]
    fn test_full_turn_is_identity() {
        let src = test_image(6, 2);
        assert_eq!(render(&src, orientation(360, false, false)), src);
        assert_eq!(render(&src, orientation(-720, false, false)), src);
    }

    #[test]
    fn test_arbitrary_angle_leaves_corners_transparent() {
        let src = DecodedImage::new(20, 20, [200u8, 100, 50, 255].repeat(400));
        let result = render(&src, orientation(45, false, false));
        assert_eq!((result.width, result.height), (20, 20));
        assert_eq!(result.pixel(0, 0)[3], 0, "Corner should be transparent");
        assert_eq!(result.pixel(10, 10), [200, 100, 50, 255], "Center keeps color");
    }

    #[test]
    fn test_allocate_rejects_bad_targets() {
        assert_eq!(
            allocate_raster(0, 10, 100),
            Err(RasterError::Unavailable {
                width: 0,
                height: 10
            })
        );
        assert!(allocate_raster(101, 10, 100).is_err());

        let raster = allocate_raster(3, 2, 100).unwrap();
        assert_eq!(raster.pixels, vec![0u8; 24]);
    }
}
