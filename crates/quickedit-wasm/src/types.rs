//! WASM-compatible wrapper types for export results.
//!
//! This module provides JavaScript-friendly types that wrap the core QuickEdit
//! types, handling the conversion between Rust and JavaScript data representations.

use quickedit_core::{ExportedImage, FilterField};
use wasm_bindgen::prelude::*;

/// An encoded export wrapper for JavaScript.
///
/// # Memory Management
///
/// The encoded bytes are stored in WASM memory. When you call `bytes()`, a copy
/// is made to JavaScript memory as a `Uint8Array`, ready to be wrapped in a
/// `Blob` and downloaded under `suggestedFilename`.
///
/// The `free()` method can be called to explicitly release WASM memory, but this is
/// optional as wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsExportedImage {
    inner: ExportedImage,
}

#[wasm_bindgen]
impl JsExportedImage {
    /// Output width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Output height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// MIME type of the encoded bytes, for the `Blob` constructor
    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.clone()
    }

    /// Download name, e.g. `edited-1700000000000.jpg`
    #[wasm_bindgen(getter, js_name = suggestedFilename)]
    pub fn suggested_filename(&self) -> String {
        self.inner.suggested_filename.clone()
    }

    /// Number of encoded bytes
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.bytes.len()
    }

    /// Returns the encoded file as Uint8Array (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsExportedImage {
    pub(crate) fn from_exported(inner: ExportedImage) -> Self {
        Self { inner }
    }
}

/// Resolve a filter name coming from JavaScript.
///
/// Accepts the parameter names (`saturation`, `hue`) as well as the CSS
/// function names (`saturate`, `hue-rotate`).
pub(crate) fn field_from_str(name: &str) -> Result<FilterField, String> {
    FilterField::from_name(name).ok_or_else(|| format!("Unknown filter '{}'", name))
}

/// Convert any displayable error into a JavaScript error string.
pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exported() -> ExportedImage {
        ExportedImage {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            suggested_filename: "edited-42.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            width: 600,
            height: 800,
        }
    }

    #[test]
    fn test_js_exported_image_accessors() {
        let img = JsExportedImage::from_exported(exported());
        assert_eq!(img.width(), 600);
        assert_eq!(img.height(), 800);
        assert_eq!(img.byte_length(), 4);
        assert_eq!(img.mime_type(), "image/jpeg");
        assert_eq!(img.suggested_filename(), "edited-42.jpg");
        assert_eq!(img.bytes(), vec![0xFF, 0xD8, 0xFF, 0xD9]);
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!(field_from_str("brightness"), Ok(FilterField::Brightness));
        assert_eq!(field_from_str("hue-rotate"), Ok(FilterField::Hue));
        assert_eq!(field_from_str("Saturate"), Ok(FilterField::Saturation));
        assert_eq!(
            field_from_str("exposure"),
            Err("Unknown filter 'exposure'".to_string())
        );
    }
}
