//! Per-pixel application of a filter chain.
//!
//! Color operations follow the CSS Filter Effects definitions and work on
//! straight-alpha RGB in 0.0 to 1.0, clamping after every operation. Alpha
//! is left untouched. Runs of consecutive color operations are fused into a
//! single pass over the raster; blur splits the chain into passes because
//! it needs the neighbouring pixels of the previous stage. Blur works on
//! premultiplied color with transparent black beyond the raster edges.

use image::{Rgba, Rgba32FImage};

use crate::decode::{DecodedImage, CHANNELS};

use super::{FilterChain, FilterKind, FilterOp};

/// Rec. 709 luma weights as used by the CSS color matrices.
const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

type Matrix3 = [[f32; 3]; 3];

/// A color operation precomputed from its magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PixelOp {
    /// `out = in * slope + intercept` on each channel.
    Linear { slope: f32, intercept: f32 },
    /// `out = m * in`.
    Matrix(Matrix3),
}

impl PixelOp {
    fn from_filter(op: &FilterOp) -> Option<Self> {
        let amount = op.magnitude / 100.0;
        match op.kind {
            FilterKind::Brightness => Some(PixelOp::Linear {
                slope: amount,
                intercept: 0.0,
            }),
            FilterKind::Contrast => Some(PixelOp::Linear {
                slope: amount,
                intercept: 0.5 - 0.5 * amount,
            }),
            FilterKind::Saturate => Some(PixelOp::Matrix(saturate_matrix(amount))),
            FilterKind::HueRotate => Some(PixelOp::Matrix(hue_rotate_matrix(op.magnitude))),
            FilterKind::Sepia => Some(PixelOp::Matrix(sepia_matrix(amount))),
            FilterKind::Blur => None,
        }
    }

    #[inline]
    fn apply(&self, r: f32, g: f32, b: f32) -> (f32, f32, f32) {
        let (r, g, b) = match *self {
            PixelOp::Linear { slope, intercept } => (
                r * slope + intercept,
                g * slope + intercept,
                b * slope + intercept,
            ),
            PixelOp::Matrix(m) => (
                m[0][0] * r + m[0][1] * g + m[0][2] * b,
                m[1][0] * r + m[1][1] * g + m[1][2] * b,
                m[2][0] * r + m[2][1] * g + m[2][2] * b,
            ),
        };
        (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }
}

/// Saturation matrix. `s = 1` is identity, `s = 0` is grayscale.
fn saturate_matrix(s: f32) -> Matrix3 {
    [
        [LUMA_R + 0.787 * s, LUMA_G - 0.715 * s, LUMA_B - 0.072 * s],
        [LUMA_R - 0.213 * s, LUMA_G + 0.285 * s, LUMA_B - 0.072 * s],
        [LUMA_R - 0.213 * s, LUMA_G - 0.715 * s, LUMA_B + 0.928 * s],
    ]
}

/// Hue rotation matrix for an angle in degrees.
fn hue_rotate_matrix(degrees: f32) -> Matrix3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            LUMA_R + cos * 0.787 - sin * 0.213,
            LUMA_G - cos * 0.715 - sin * 0.715,
            LUMA_B - cos * 0.072 + sin * 0.928,
        ],
        [
            LUMA_R - cos * 0.213 + sin * 0.143,
            LUMA_G + cos * 0.285 + sin * 0.140,
            LUMA_B - cos * 0.072 - sin * 0.283,
        ],
        [
            LUMA_R - cos * 0.213 - sin * 0.787,
            LUMA_G - cos * 0.715 + sin * 0.715,
            LUMA_B + cos * 0.928 + sin * 0.072,
        ],
    ]
}

/// Sepia matrix. `amount = 0` is identity, `amount = 1` is full sepia.
fn sepia_matrix(amount: f32) -> Matrix3 {
    let inv = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * inv, 0.769 - 0.769 * inv, 0.189 - 0.189 * inv],
        [0.349 - 0.349 * inv, 0.686 + 0.314 * inv, 0.168 - 0.168 * inv],
        [0.272 - 0.272 * inv, 0.534 - 0.534 * inv, 0.131 + 0.869 * inv],
    ]
}

/// Apply every operation of `chain` to `image` in chain order.
pub fn apply_filter_chain(chain: &FilterChain, image: &mut DecodedImage) {
    let mut pending: Vec<PixelOp> = Vec::new();

    for op in chain.ops() {
        match PixelOp::from_filter(op) {
            Some(pixel_op) => pending.push(pixel_op),
            None => {
                apply_pixel_ops(&pending, &mut image.pixels);
                pending.clear();
                apply_blur(image, op.magnitude);
            }
        }
    }

    apply_pixel_ops(&pending, &mut image.pixels);
}

fn apply_pixel_ops(ops: &[PixelOp], pixels: &mut [u8]) {
    if ops.is_empty() {
        return;
    }

    for chunk in pixels.chunks_exact_mut(CHANNELS) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        for op in ops {
            (r, g, b) = op.apply(r, g, b);
        }

        chunk[0] = (r * 255.0).round() as u8;
        chunk[1] = (g * 255.0).round() as u8;
        chunk[2] = (b * 255.0).round() as u8;
    }
}

/// Gaussian blur with standard deviation `radius` pixels.
///
/// Blurs premultiplied color so transparent pixels contribute no color, and
/// treats everything outside the raster as transparent black, so edges fade
/// out the way they do on a canvas.
fn apply_blur(image: &mut DecodedImage, radius: f32) {
    if !radius.is_normal() || radius < 0.0 || image.is_empty() {
        return;
    }
    if image.pixels.len() != image.pixel_count() * CHANNELS {
        debug_assert!(false, "Pixel buffer size mismatch");
        return;
    }

    let pad = (3.0 * radius).ceil() as u32;
    let (Some(padded_width), Some(padded_height)) = (
        image.width.checked_add(pad.saturating_mul(2)),
        image.height.checked_add(pad.saturating_mul(2)),
    ) else {
        return;
    };

    let width = image.width as usize;
    let mut padded = Rgba32FImage::new(padded_width, padded_height);
    for (i, px) in image.pixels.chunks_exact(CHANNELS).enumerate() {
        let alpha = px[3] as f32 / 255.0;
        let premultiply = |c: u8| c as f32 / 255.0 * alpha;
        padded.put_pixel(
            (i % width) as u32 + pad,
            (i / width) as u32 + pad,
            Rgba([premultiply(px[0]), premultiply(px[1]), premultiply(px[2]), alpha]),
        );
    }

    // The blur clamps reads to the border, which is the transparent margin.
    let blurred = image::imageops::blur(&padded, radius);

    for (i, px) in image.pixels.chunks_exact_mut(CHANNELS).enumerate() {
        let (x, y) = ((i % width) as u32 + pad, (i / width) as u32 + pad);
        let Rgba([r, g, b, a]) = *blurred.get_pixel(x, y);
        if a <= 0.0 {
            px.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let unpremultiply = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        px[0] = unpremultiply(r);
        px[1] = unpremultiply(g);
        px[2] = unpremultiply(b);
        px[3] = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}
