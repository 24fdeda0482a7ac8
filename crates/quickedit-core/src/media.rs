//! Declared media types of selected files and the output formats they map to.

use serde::{Deserialize, Serialize};

/// The encoded format an export is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lossy, encoded with the configured quality factor.
    Jpeg,
    /// Lossless.
    Png,
    /// Lossless (the encoder has no lossy mode).
    WebP,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }
}

/// A parsed `type/subtype` media type, lowercased with parameters stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaType {
    essence: String,
}

impl MediaType {
    /// Parse a declared media type such as `"image/JPEG; charset=binary"`.
    pub fn parse(declared: &str) -> Self {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self { essence }
    }

    pub fn as_str(&self) -> &str {
        &self.essence
    }

    /// True for any `image/*` type.
    pub fn is_image(&self) -> bool {
        self.essence
            .strip_prefix("image/")
            .is_some_and(|subtype| !subtype.is_empty())
    }

    /// The format a rasterized export of this source is encoded in.
    ///
    /// Types without an encoder (GIF, BMP, SVG, ...) fall back to PNG, which
    /// is what a browser canvas does for unsupported `toBlob` types.
    pub fn output_format(&self) -> OutputFormat {
        match self.essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => OutputFormat::Jpeg,
            "image/webp" => OutputFormat::WebP,
            _ => OutputFormat::Png,
        }
    }

    /// True when [`MediaType::output_format`] is a substitute, not the same type.
    pub fn is_output_fallback(&self) -> bool {
        self.output_format().mime_type() != self.essence
            && !matches!(self.essence.as_str(), "image/jpg" | "image/pjpeg")
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.essence)
    }
}

/// Extension of a file name: the text after the last `.`, or `None` when
/// there is no dot or nothing follows it.
pub fn file_extension(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        let media = MediaType::parse(" Image/JPEG ; charset=binary");
        assert_eq!(media.as_str(), "image/jpeg");
        assert!(media.is_image());
    }

    #[test]
    fn test_non_image_types() {
        assert!(!MediaType::parse("application/pdf").is_image());
        assert!(!MediaType::parse("text/plain").is_image());
        assert!(!MediaType::parse("").is_image());
        assert!(!MediaType::parse("image/").is_image());
        assert!(!MediaType::parse("video/image").is_image());
    }

    #[test]
    fn test_output_format_mapping() {
        assert_eq!(MediaType::parse("image/jpeg").output_format(), OutputFormat::Jpeg);
        assert_eq!(MediaType::parse("image/jpg").output_format(), OutputFormat::Jpeg);
        assert_eq!(MediaType::parse("image/png").output_format(), OutputFormat::Png);
        assert_eq!(MediaType::parse("image/webp").output_format(), OutputFormat::WebP);
        assert_eq!(MediaType::parse("image/gif").output_format(), OutputFormat::Png);
    }

    #[test]
    fn test_output_fallback_detection() {
        assert!(!MediaType::parse("image/jpeg").is_output_fallback());
        assert!(!MediaType::parse("image/jpg").is_output_fallback());
        assert!(!MediaType::parse("image/png").is_output_fallback());
        assert!(MediaType::parse("image/gif").is_output_fallback());
        assert!(MediaType::parse("image/bmp").is_output_fallback());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.jpg"), Some("jpg"));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
    }
}
