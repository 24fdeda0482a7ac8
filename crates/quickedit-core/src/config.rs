//! Editor configuration.
//!
//! All fields have defaults, so a host may pass a partial object (or none).

use serde::{Deserialize, Serialize};

/// Quality factor a browser canvas uses for lossy exports (0.92).
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Size above which a selected file is logged as larger than recommended.
pub const DEFAULT_ADVISORY_MAX_BYTES: usize = 25 * 1024 * 1024;

/// Largest side length of a 2D canvas in mainstream browsers.
pub const DEFAULT_MAX_CANVAS_DIMENSION: u32 = 32_767;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// JPEG quality (1-100) for lossy exports.
    pub jpeg_quality: u8,
    /// First part of suggested export names: `<prefix>-<millis>.<ext>`.
    pub filename_prefix: String,
    /// Extension used when the source file name has none.
    pub fallback_extension: String,
    /// Longest allowed side of the export raster.
    pub max_canvas_dimension: u32,
    /// Advisory source size limit. Exceeding it only logs a warning; the
    /// file picker is expected to enforce it.
    pub advisory_max_bytes: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            filename_prefix: "edited".to_string(),
            fallback_extension: "png".to_string(),
            max_canvas_dimension: DEFAULT_MAX_CANVAS_DIMENSION,
            advisory_max_bytes: DEFAULT_ADVISORY_MAX_BYTES,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy with out-of-range values pulled back to something usable.
    pub fn sanitized(mut self) -> Self {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.max_canvas_dimension = self.max_canvas_dimension.max(1);
        if self.fallback_extension.trim().is_empty() {
            self.fallback_extension = EditorConfig::default().fallback_extension;
        }
        self
    }
}
