//! Output canvas sizing and the orientation transform.

use serde::{Deserialize, Serialize};

use super::affine::Affine;
use crate::params::Orientation;

/// Canvas size and the transform that draws the source onto it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Natural (unrotated) source dimensions.
    pub source_width: u32,
    pub source_height: u32,
    /// Canvas-center transform: translate, flip, rotate. The source is drawn
    /// centered on this transform's origin.
    pub transform: Affine,
    /// True when the rotation is a multiple of 90 degrees, so every canvas
    /// pixel maps onto exactly one source pixel.
    pub pixel_aligned: bool,
}

impl Geometry {
    /// True when the canvas dimensions are swapped relative to the source.
    pub fn swaps_dimensions(&self) -> bool {
        self.canvas_width != self.canvas_height
            && (self.canvas_width, self.canvas_height) == (self.source_height, self.source_width)
    }

    /// Full mapping from source pixel coordinates to canvas coordinates.
    pub fn source_to_canvas(&self) -> Affine {
        self.transform.then_translate(
            -(self.source_width as f64) / 2.0,
            -(self.source_height as f64) / 2.0,
        )
    }
}

/// Resolve the canvas size and transform for a source of the given size.
///
/// The rotation is reduced modulo 360 and made absolute; a remainder of 90
/// modulo 180 swaps width and height. The transform translates to the
/// canvas center, applies flips, then rotates, so for a point the rotation
/// happens first and the mirror is taken in canvas space.
pub fn resolve_geometry(
    source_width: u32,
    source_height: u32,
    orientation: &Orientation,
) -> Geometry {
    let (canvas_width, canvas_height) = if orientation.is_quarter_turn() {
        (source_height, source_width)
    } else {
        (source_width, source_height)
    };

    let scale_x = if orientation.flip_horizontal { -1.0 } else { 1.0 };
    let scale_y = if orientation.flip_vertical { -1.0 } else { 1.0 };

    let transform = Affine::IDENTITY
        .then_translate(canvas_width as f64 / 2.0, canvas_height as f64 / 2.0)
        .then_scale(scale_x, scale_y)
        .then_rotate_degrees(orientation.rotation_degrees);

    Geometry {
        canvas_width,
        canvas_height,
        source_width,
        source_height,
        transform,
        pixel_aligned: orientation.rotation_degrees % 90 == 0,
    }
}
