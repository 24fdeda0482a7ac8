//! Export pipeline.
//!
//! An export runs these stages in order:
//! 1. Wait for the session's export gate
//! 2. Decode the source bytes into a tracked handle
//! 3. Resolve the output geometry from the decoded dimensions
//! 4. Allocate the output raster and draw the source through the transform
//! 5. Apply the filter chain
//! 6. Encode in the output format of the source media type
//! 7. Derive the suggested file name
//!
//! The future yields to the executor before decoding and before encoding.
//! The stages themselves are synchronous: decoding, rasterizing, filtering
//! and encoding each block the polling thread until they finish. On wasm
//! that is the browser's main thread, so a large export stalls the UI for
//! its duration.
//!
//! The future owns everything it needs, so the session may be mutated or replaced
//! while it is pending; replacing the selection makes it fail with
//! [`ExportError::SelectionReleased`] at the next stage boundary.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::decode::DecodeError;
use crate::encode::{encode_raster, EncodeError};
use crate::filters::{apply_filter_chain, compose_filter_chain};
use crate::media::MediaType;
use crate::params::EditParameters;
use crate::resource::{Lease, ResourceTracker};
use crate::session::EditSession;
use crate::transform::{allocate_raster, rasterize, resolve_geometry, RasterError};

/// Errors that end an export. None of them affect the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Unable to load the image for export: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to export your edited image: {0}")]
    Encode(#[from] EncodeError),

    #[error("Cannot create a {width}x{height} render target")]
    RenderTargetUnavailable { width: u32, height: u32 },

    #[error("The selected image was replaced before the export finished")]
    SelectionReleased,
}

impl From<RasterError> for ExportError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::Unavailable { width, height } => {
                ExportError::RenderTargetUnavailable { width, height }
            }
        }
    }
}

/// An encoded export ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedImage {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub suggested_filename: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

/// Everything an export needs, detached from the session.
#[derive(Debug)]
pub struct ExportRequest {
    source: Arc<[u8]>,
    lease: Lease,
    media_type: MediaType,
    extension: Option<String>,
    params: EditParameters,
    gate: Arc<Mutex<()>>,
    tracker: ResourceTracker,
    config: Arc<EditorConfig>,
}

impl ExportRequest {
    /// Snapshot the session's selection and current parameters.
    pub fn new(session: &EditSession) -> Result<Self, ExportError> {
        let selection = &session.selection;
        let source = selection.bytes().ok_or(ExportError::SelectionReleased)?;
        Ok(Self {
            source,
            lease: selection.lease(),
            media_type: selection.media_type().clone(),
            extension: selection.extension().map(str::to_string),
            params: *session.params(),
            gate: Arc::clone(&session.export_gate),
            tracker: session.tracker.clone(),
            config: Arc::clone(&session.config),
        })
    }

    pub fn params(&self) -> &EditParameters {
        &self.params
    }

    /// Run every stage. Transient resources are released on all paths.
    pub async fn run(self) -> Result<ExportedImage, ExportError> {
        let _gate = self.gate.lock().await;
        let started = Utc::now();
        self.ensure_live("waiting")?;

        tokio::task::yield_now().await;
        self.ensure_live("decode")?;
        let decoded = self.tracker.acquire(&self.source)?;
        let Some(source) = decoded.get() else {
            return Err(ExportError::SelectionReleased);
        };

        let geometry = resolve_geometry(source.width, source.height, &self.params.orientation);
        debug!(
            source_width = geometry.source_width,
            source_height = geometry.source_height,
            canvas_width = geometry.canvas_width,
            canvas_height = geometry.canvas_height,
            rotation = self.params.orientation.rotation_degrees,
            swapped = geometry.swaps_dimensions(),
            "export geometry resolved"
        );

        let mut raster = allocate_raster(
            geometry.canvas_width,
            geometry.canvas_height,
            self.config.max_canvas_dimension,
        )?;
        rasterize(source, &geometry, &mut raster);
        drop(decoded);

        let chain = compose_filter_chain(&self.params.filters);
        apply_filter_chain(&chain, &mut raster);
        debug!(
            filter = %chain.to_css(),
            elapsed_ms = (Utc::now() - started).num_milliseconds(),
            "export raster rendered"
        );

        tokio::task::yield_now().await;
        self.ensure_live("encode")?;
        let format = self.media_type.output_format();
        if self.media_type.is_output_fallback() {
            warn!(
                source_type = %self.media_type,
                output_type = format.mime_type(),
                "no encoder for source type, falling back"
            );
        }
        let bytes = encode_raster(&raster, format, self.config.jpeg_quality)?;
        self.ensure_live("finish")?;

        let exported = ExportedImage {
            suggested_filename: self.suggested_filename(Utc::now().timestamp_millis()),
            mime_type: format.mime_type().to_string(),
            width: raster.width,
            height: raster.height,
            bytes,
        };
        info!(
            width = exported.width,
            height = exported.height,
            bytes = exported.bytes.len(),
            filename = %exported.suggested_filename,
            elapsed_ms = (Utc::now() - started).num_milliseconds(),
            "export finished"
        );
        Ok(exported)
    }

    /// `<prefix>-<millis>.<extension>`, using the fallback extension when
    /// the source name has none.
    pub fn suggested_filename(&self, timestamp_millis: i64) -> String {
        let extension = self
            .extension
            .as_deref()
            .unwrap_or(&self.config.fallback_extension);
        format!(
            "{}-{}.{}",
            self.config.filename_prefix, timestamp_millis, extension
        )
    }

    fn ensure_live(&self, stage: &str) -> Result<(), ExportError> {
        if self.lease.is_live() {
            return Ok(());
        }
        warn!(stage, "export abandoned, selection was released");
        Err(ExportError::SelectionReleased)
    }
}

impl EditSession {
    /// Snapshot this session into a detached export request.
    pub fn export_request(&self) -> Result<ExportRequest, ExportError> {
        ExportRequest::new(self)
    }

    /// Export the current state. The returned future does not borrow the
    /// session.
    pub fn export(&self) -> impl Future<Output = Result<ExportedImage, ExportError>> + 'static {
        let request = self.export_request();
        async move { request?.run().await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::pin::pin;
    use std::task::{Context, Poll, Wake, Waker};

    use crate::decode::decode_image;
    use crate::params::{FilterField, OrientationOp, QuarterTurn};
    use crate::session::Editor;

    fn gradient(width: u32, height: u32) -> image::RgbaImage {
        image::RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255])
        })
    }

    fn encode_fixture(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        let img = gradient(width, height);
        match format {
            image::ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(img)
                .into_rgb8()
                .write_to(&mut Cursor::new(&mut bytes), format)
                .unwrap(),
            _ => img.write_to(&mut Cursor::new(&mut bytes), format).unwrap(),
        }
        bytes
    }

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        encode_fixture(width, height, image::ImageFormat::Png)
    }

    struct NoopWake;

    impl Wake for NoopWake {
        fn wake(self: Arc<Self>) {}
    }

    #[tokio::test]
    async fn test_identity_export_preserves_dimensions() {
        let mut editor = Editor::new(EditorConfig::default());
        let session = editor
            .select_file("photo.png", "image/png", png_fixture(40, 30))
            .unwrap();

        let exported = session.export().await.unwrap();
        assert_eq!((exported.width, exported.height), (40, 30));
        assert_eq!(exported.mime_type, "image/png");

        let decoded = decode_image(&exported.bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (40, 30));
        assert_eq!(decoded.into_rgba_image().unwrap(), gradient(40, 30));
    }

    #[tokio::test]
    async fn test_quarter_turn_swaps_output_dimensions() {
        let mut editor = Editor::new(EditorConfig::default());
        let session = editor
            .select_file("wide.png", "image/png", png_fixture(800, 600))
            .unwrap();
        session.set_orientation(OrientationOp::RotateBy(QuarterTurn::Clockwise));

        let exported = session.export().await.unwrap();
        assert_eq!((exported.width, exported.height), (600, 800));
        let decoded = decode_image(&exported.bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (600, 800));
    }

    #[tokio::test]
    async fn test_four_turns_export_like_identity() {
        let mut editor = Editor::new(EditorConfig::default());
        let session = editor
            .select_file("a.png", "image/png", png_fixture(12, 7))
            .unwrap();
        for _ in 0..4 {
            session.set_orientation(OrientationOp::RotateBy(QuarterTurn::Clockwise));
        }
        let exported = session.export().await.unwrap();
        let decoded = decode_image(&exported.bytes).unwrap();
        assert_eq!(decoded.into_rgba_image().unwrap(), gradient(12, 7));
    }

    #[tokio::test]
    async fn test_filters_are_applied() {
        let mut editor = Editor::new(EditorConfig::default());
        let session = editor
            .select_file("a.png", "image/png", png_fixture(8, 8))
            .unwrap();
        session.set_filter(FilterField::Brightness, 40.0);
        session.set_filter(FilterField::Sepia, 100.0);

        let exported = session.export().await.unwrap();
        let decoded = decode_image(&exported.bytes).unwrap();
        let [r, g, b, a] = decoded.pixel(7, 7);
        // Sepia output keeps red >= green >= blue.
        assert!(r >= g && g >= b, "got {:?}", (r, g, b));
        assert!(r < 128, "brightness 40% should darken, got {}", r);
        assert_eq!(a, 255);
    }

    #[tokio::test]
    async fn test_jpeg_source_exports_jpeg() {
        let mut editor = Editor::new(EditorConfig::default());
        let bytes = encode_fixture(16, 9, image::ImageFormat::Jpeg);
        let session = editor.select_file("shot.JPG", "image/jpeg", bytes).unwrap();

        let exported = session.export().await.unwrap();
        assert_eq!(exported.mime_type, "image/jpeg");
        assert_eq!(&exported.bytes[0..2], &[0xFF, 0xD8]);
        assert!(exported.suggested_filename.starts_with("edited-"));
        assert!(exported.suggested_filename.ends_with(".JPG"));
    }

    #[tokio::test]
    async fn test_webp_source_exports_lossless_webp() {
        let mut editor = Editor::new(EditorConfig::default());
        let bytes = encode_fixture(10, 6, image::ImageFormat::WebP);
        let session = editor.select_file("pic.webp", "image/webp", bytes).unwrap();

        let exported = session.export().await.unwrap();
        assert_eq!(exported.mime_type, "image/webp");
        assert_eq!(&exported.bytes[0..4], b"RIFF");
        let decoded = decode_image(&exported.bytes).unwrap();
        assert_eq!(decoded.into_rgba_image().unwrap(), gradient(10, 6));
    }

    #[tokio::test]
    async fn test_gif_source_falls_back_to_png() {
        let mut editor = Editor::new(EditorConfig::default());
        let bytes = encode_fixture(5, 5, image::ImageFormat::Gif);
        let session = editor.select_file("anim.gif", "image/gif", bytes).unwrap();

        let exported = session.export().await.unwrap();
        assert_eq!(exported.mime_type, "image/png");
        assert!(exported.suggested_filename.ends_with(".gif"));
    }

    #[tokio::test]
    async fn test_invalid_bytes_fail_with_decode_error() {
        let mut editor = Editor::new(EditorConfig::default());
        let session = editor
            .select_file("broken.png", "image/png", b"definitely not a png".to_vec())
            .unwrap();

        let err = session.export().await.unwrap_err();
        assert!(matches!(err, ExportError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_oversized_target_is_unavailable() {
        let config = EditorConfig {
            max_canvas_dimension: 8,
            ..Default::default()
        };
        let mut editor = Editor::new(config);
        let session = editor
            .select_file("a.png", "image/png", png_fixture(10, 4))
            .unwrap();

        assert_eq!(
            session.export().await.unwrap_err(),
            ExportError::RenderTargetUnavailable {
                width: 10,
                height: 4
            }
        );
    }

    #[tokio::test]
    async fn test_session_usable_after_failure() {
        let mut editor = Editor::new(EditorConfig::default());
        let session = editor
            .select_file("broken.png", "image/png", vec![0u8; 8])
            .unwrap();
        assert!(session.export().await.is_err());
        // The gate was released and no decoded handle leaked.
        assert!(session.export().await.is_err());
        session.set_filter(FilterField::Hue, 90.0);
        assert_eq!(editor.resource_stats().live, 1);

        let session = editor
            .select_file("ok.png", "image/png", png_fixture(3, 3))
            .unwrap();
        assert!(session.export().await.is_ok());
        assert_eq!(editor.resource_stats().live, 1);
    }

    #[tokio::test]
    async fn test_export_uses_parameters_at_request_time() {
        let mut editor = Editor::new(EditorConfig::default());
        let session = editor
            .select_file("a.png", "image/png", png_fixture(6, 2))
            .unwrap();
        let pending = session.export();
        session.set_orientation(OrientationOp::RotateBy(QuarterTurn::Clockwise));

        let exported = pending.await.unwrap();
        assert_eq!((exported.width, exported.height), (6, 2));
    }

    #[test]
    fn test_replacing_selection_mid_export_releases_it() {
        let mut editor = Editor::new(EditorConfig::default());
        let session = editor
            .select_file("a.png", "image/png", png_fixture(4, 4))
            .unwrap();
        let mut export = pin!(session.export());

        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);
        assert!(export.as_mut().poll(&mut cx).is_pending());

        editor
            .select_file("b.png", "image/png", png_fixture(2, 2))
            .unwrap();
        match export.as_mut().poll(&mut cx) {
            Poll::Ready(result) => assert_eq!(result, Err(ExportError::SelectionReleased)),
            Poll::Pending => panic!("export should stop at the next stage"),
        }
        assert_eq!(editor.resource_stats().live, 1);
    }

    #[test]
    fn test_export_yields_only_before_decode_and_encode() {
        let mut editor = Editor::new(EditorConfig::default());
        let session = editor
            .select_file("a.png", "image/png", png_fixture(6, 6))
            .unwrap();
        session.set_filter(FilterField::Blur, 2.0);
        let mut export = pin!(session.export());

        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);
        assert!(export.as_mut().poll(&mut cx).is_pending(), "yield before decode");
        assert!(export.as_mut().poll(&mut cx).is_pending(), "yield before encode");
        match export.as_mut().poll(&mut cx) {
            // Decode, raster, filter and encode all ran inside the polls above.
            Poll::Ready(result) => assert_eq!(result.unwrap().width, 6),
            Poll::Pending => panic!("export should finish after two yields"),
        }
    }

    #[test]
    fn test_export_of_closed_session_fails_immediately() {
        let mut editor = Editor::new(EditorConfig::default());
        editor
            .select_file("a.png", "image/png", png_fixture(2, 2))
            .unwrap();
        let session = editor.session_mut().unwrap();
        session.selection.release();
        assert_eq!(
            session.export_request().unwrap_err(),
            ExportError::SelectionReleased
        );
    }

    #[test]
    fn test_suggested_filename() {
        let mut editor = Editor::new(EditorConfig::default());
        let request = editor
            .select_file("holiday.photo.webp", "image/webp", vec![1u8])
            .unwrap()
            .export_request()
            .unwrap();
        assert_eq!(
            request.suggested_filename(1_700_000_000_000),
            "edited-1700000000000.webp"
        );

        let request = editor
            .select_file("scan", "image/png", vec![1u8])
            .unwrap()
            .export_request()
            .unwrap();
        assert_eq!(request.suggested_filename(5), "edited-5.png");
    }
}
