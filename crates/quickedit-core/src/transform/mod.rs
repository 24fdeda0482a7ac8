//! Orientation geometry and rasterization.
//!
//! # Transform Order
//!
//! The canvas transform is built the way a 2D canvas context is driven:
//! 1. Translate to the canvas center
//! 2. Scale by -1 on the mirrored axes
//! 3. Rotate by the stored angle
//! 4. Draw the source centered on the origin at its natural size
//!
//! Flip and rotate both pivot on the center. Reordering them changes the
//! output for combined flip and rotate states.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downward
//! - Positive angles rotate clockwise on screen
//! - Pixel `(x, y)` covers the unit square starting at `(x, y)`

mod affine;
mod geometry;
mod raster;

pub use affine::{sin_cos_degrees, Affine};
pub use geometry::{resolve_geometry, Geometry};
pub use raster::{allocate_raster, rasterize, RasterError};
