//! The editor and its single edit session.
//!
//! An [`Editor`] holds at most one [`EditSession`]. Selecting a new file
//! releases the current session (and its source buffer) before the new one
//! is created, so exactly one selection is live at any time.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::media::{file_extension, MediaType};
use crate::params::{EditParameters, FilterField, FilterParameters, Orientation, OrientationOp};
use crate::resource::{Handle, Lease, ResourceStats, ResourceTracker, SourceBuffer};

/// Errors raised when a file is offered to the editor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("Unsupported media type '{0}': please choose an image file (PNG, JPG, WebP, etc)")]
    UnsupportedMediaType(String),
}

/// The currently loaded source file.
#[derive(Debug)]
pub struct ImageSelection {
    source: Handle<SourceBuffer>,
    byte_len: usize,
    media_type: MediaType,
    file_name: String,
    extension: Option<String>,
}

impl ImageSelection {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// Extension taken from the file name, if it has one.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Shared source bytes, or `None` once released.
    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        self.source.get().map(SourceBuffer::shared)
    }

    pub fn lease(&self) -> Lease {
        self.source.lease()
    }

    pub fn is_live(&self) -> bool {
        self.source.is_live()
    }

    /// Release the source buffer. In-flight exports observe this through
    /// their lease.
    pub fn release(&mut self) {
        self.source.release();
    }
}

/// One selection plus its current edit parameters.
#[derive(Debug)]
pub struct EditSession {
    pub(crate) selection: ImageSelection,
    params: EditParameters,
    revision: u64,
    pub(crate) export_gate: Arc<Mutex<()>>,
    pub(crate) tracker: ResourceTracker,
    pub(crate) config: Arc<EditorConfig>,
}

impl EditSession {
    fn new(selection: ImageSelection, tracker: ResourceTracker, config: Arc<EditorConfig>) -> Self {
        Self {
            selection,
            params: EditParameters::default(),
            revision: 0,
            export_gate: Arc::new(Mutex::new(())),
            tracker,
            config,
        }
    }

    pub fn selection(&self) -> &ImageSelection {
        &self.selection
    }

    pub fn params(&self) -> &EditParameters {
        &self.params
    }

    pub fn filters(&self) -> &FilterParameters {
        &self.params.filters
    }

    pub fn orientation(&self) -> &Orientation {
        &self.params.orientation
    }

    /// Number of mutations since the session was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Set one filter intensity, clamped into its range.
    pub fn set_filter(&mut self, field: FilterField, value: f32) {
        self.params.set_filter(field, value);
        self.bump();
    }

    pub fn set_orientation(&mut self, op: OrientationOp) {
        self.params.set_orientation(op);
        self.bump();
    }

    /// Replace all parameters at once. Filter values are clamped.
    pub fn set_params(&mut self, params: EditParameters) {
        self.params = EditParameters {
            filters: params.filters.clamped(),
            orientation: params.orientation,
        };
        self.bump();
    }

    /// Restore filters and orientation to their defaults.
    pub fn reset(&mut self) {
        self.params.reset();
        self.bump();
        debug!(revision = self.revision, "parameters reset");
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Owner of the current session and the resource tracker.
#[derive(Debug, Default)]
pub struct Editor {
    tracker: ResourceTracker,
    config: Arc<EditorConfig>,
    session: Option<EditSession>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            tracker: ResourceTracker::new(),
            config: Arc::new(config.sanitized()),
            session: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn resource_stats(&self) -> ResourceStats {
        self.tracker.stats()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    /// Offer a file to the editor.
    ///
    /// Non-image types are rejected and the current session, if any, is
    /// kept. Otherwise the current session is released and replaced by a
    /// fresh one with default parameters.
    pub fn select_file(
        &mut self,
        file_name: &str,
        media_type: &str,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<&mut EditSession, SelectError> {
        let media = MediaType::parse(media_type);
        if !media.is_image() {
            return Err(SelectError::UnsupportedMediaType(media_type.to_string()));
        }

        self.close_session();

        let source = self.tracker.register_source(bytes);
        let byte_len = source.get().map_or(0, SourceBuffer::len);
        if byte_len > self.config.advisory_max_bytes {
            warn!(
                file_name,
                byte_len,
                limit = self.config.advisory_max_bytes,
                "selected file is larger than recommended"
            );
        }
        debug!(file_name, media_type = %media, byte_len, "file selected");

        let selection = ImageSelection {
            source,
            byte_len,
            media_type: media,
            extension: file_extension(file_name).map(str::to_string),
            file_name: file_name.to_string(),
        };
        let session = EditSession::new(selection, self.tracker.clone(), Arc::clone(&self.config));
        Ok(self.session.insert(session))
    }

    /// Release the current session. Safe to call when there is none.
    pub fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.selection.release();
            debug!(file_name = session.selection.file_name(), "session closed");
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.close_session();
    }
}
