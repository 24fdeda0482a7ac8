//! Image decoding for QuickEdit.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG, WebP, GIF and BMP sources into RGBA rasters
//! - Applying EXIF orientation so pixels match what a browser displays
//!
//! # Architecture
//!
//! Decoding is synchronous. The export pipeline wraps it in a resource
//! handle (see [`crate::resource`]) and yields to the executor before calling
//! it, so a long decode never starts while a parameter update is pending.

mod reader;
mod types;

pub use reader::{decode_image, extract_orientation};
pub use types::{DecodeError, DecodedImage, ExifOrientation, CHANNELS};
