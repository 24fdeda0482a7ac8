//! Image editor WASM bindings.
//!
//! This module exposes a stateful editor to JavaScript. The editor owns the
//! selected file and its parameters; the UI calls the mutators on user input,
//! re-reads `preview()` to restyle the on-screen image, and awaits
//! `exportImage()` when the user asks for a download.
//!
//! # Example
//!
//! ```typescript
//! import init, { JsImageEditor } from '@quickedit/wasm';
//!
//! await init();
//! const editor = new JsImageEditor({ jpegQuality: 92 });
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! editor.selectFile(file.name, file.type, bytes);
//! editor.setFilter('sepia', 60);
//! editor.rotateRight();
//!
//! const { cssFilter, cssTransform } = editor.preview();
//! img.style.filter = cssFilter;
//! img.style.transform = cssTransform;
//!
//! const exported = await editor.exportImage();
//! const blob = new Blob([exported.bytes()], { type: exported.mimeType });
//! ```

use quickedit_core::{
    render_preview, EditSession, Editor, EditorConfig, OrientationOp, QuarterTurn,
    RenderDescriptor,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::types::{field_from_str, to_js_error, JsExportedImage};

const NO_SELECTION: &str = "No image selected";

/// Single-image editor for JavaScript.
#[wasm_bindgen]
pub struct JsImageEditor {
    inner: Editor,
}

#[wasm_bindgen]
impl JsImageEditor {
    /// Create an editor.
    ///
    /// # Arguments
    /// * `config` - Optional partial `EditorConfig` object
    ///   (`{ jpegQuality, filenamePrefix, fallbackExtension, maxCanvasDimension, advisoryMaxBytes }`)
    ///
    /// # Errors
    /// Returns error if the config object cannot be deserialized
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsImageEditor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid editor config: {}", e)))?
        };
        Ok(Self::with_config(config))
    }

    /// Load a file. Resets all parameters.
    ///
    /// # Errors
    /// Returns error if `mime_type` is not an `image/*` type. The current
    /// image, if any, stays selected in that case.
    #[wasm_bindgen(js_name = selectFile)]
    pub fn select_file(
        &mut self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), JsValue> {
        self.inner
            .select_file(name, mime_type, bytes)
            .map(|_| ())
            .map_err(to_js_error)
    }

    /// Whether a file is currently selected
    #[wasm_bindgen(getter, js_name = hasSelection)]
    pub fn has_selection(&self) -> bool {
        self.inner.session().is_some()
    }

    /// Mutation counter of the current session (0 without a selection)
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> u64 {
        self.inner.session().map_or(0, EditSession::revision)
    }

    /// Set one filter and return the value actually stored (after clamping).
    ///
    /// # Arguments
    /// * `field` - `brightness`, `contrast`, `saturation`, `hue`, `blur` or `sepia`
    /// * `value` - Requested intensity
    #[wasm_bindgen(js_name = setFilter)]
    pub fn set_filter(&mut self, field: &str, value: f32) -> Result<f32, JsValue> {
        let field = field_from_str(field).map_err(to_js_error)?;
        let session = self.session_mut()?;
        session.set_filter(field, value);
        Ok(session.filters().get(field))
    }

    /// Rotate 90 degrees counter-clockwise
    #[wasm_bindgen(js_name = rotateLeft)]
    pub fn rotate_left(&mut self) -> Result<(), JsValue> {
        self.orient(OrientationOp::RotateBy(QuarterTurn::CounterClockwise))
    }

    /// Rotate 90 degrees clockwise
    #[wasm_bindgen(js_name = rotateRight)]
    pub fn rotate_right(&mut self) -> Result<(), JsValue> {
        self.orient(OrientationOp::RotateBy(QuarterTurn::Clockwise))
    }

    /// Toggle horizontal mirroring
    #[wasm_bindgen(js_name = flipHorizontal)]
    pub fn flip_horizontal(&mut self) -> Result<(), JsValue> {
        self.orient(OrientationOp::FlipHorizontal)
    }

    /// Toggle vertical mirroring
    #[wasm_bindgen(js_name = flipVertical)]
    pub fn flip_vertical(&mut self) -> Result<(), JsValue> {
        self.orient(OrientationOp::FlipVertical)
    }

    /// Restore all filters and the orientation to their defaults
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.session_mut()?.reset();
        Ok(())
    }

    /// Current preview descriptor as a plain object
    /// (`{ revision, filterChain, cssFilter, cssTransform, rotationDegrees, flipHorizontal, flipVertical }`).
    pub fn preview(&self) -> Result<JsValue, JsValue> {
        let descriptor = self.descriptor().ok_or_else(|| to_js_error(NO_SELECTION))?;
        serde_wasm_bindgen::to_value(&descriptor).map_err(to_js_error)
    }

    /// Current filter values as a plain object
    pub fn filters(&self) -> Result<JsValue, JsValue> {
        let session = self.session()?;
        serde_wasm_bindgen::to_value(session.filters()).map_err(to_js_error)
    }

    /// Current orientation as a plain object
    pub fn orientation(&self) -> Result<JsValue, JsValue> {
        let session = self.session()?;
        serde_wasm_bindgen::to_value(session.orientation()).map_err(to_js_error)
    }

    /// Export the current state.
    ///
    /// Resolves to a `JsExportedImage`, or rejects with an error message.
    /// Parameters are captured when this is called; later changes do not
    /// affect a pending export. Selecting another file while the export is
    /// pending makes it reject.
    #[wasm_bindgen(js_name = exportImage)]
    pub fn export_image(&self) -> js_sys::Promise {
        let pending = self.inner.session().map(EditSession::export);
        future_to_promise(async move {
            let Some(pending) = pending else {
                return Err(to_js_error(NO_SELECTION));
            };
            match pending.await {
                Ok(exported) => Ok(JsExportedImage::from_exported(exported).into()),
                Err(err) => {
                    web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
                    Err(to_js_error(err))
                }
            }
        })
    }

    /// Drop the current selection and release its buffer
    pub fn clear(&mut self) {
        self.inner.close_session();
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the selection
    }
}

impl JsImageEditor {
    pub(crate) fn with_config(config: EditorConfig) -> Self {
        Self {
            inner: Editor::new(config),
        }
    }

    pub(crate) fn descriptor(&self) -> Option<RenderDescriptor> {
        self.inner.session().map(render_preview)
    }

    fn session(&self) -> Result<&EditSession, JsValue> {
        self.inner.session().ok_or_else(|| to_js_error(NO_SELECTION))
    }

    fn session_mut(&mut self) -> Result<&mut EditSession, JsValue> {
        self.inner
            .session_mut()
            .ok_or_else(|| to_js_error(NO_SELECTION))
    }

    fn orient(&mut self, op: OrientationOp) -> Result<(), JsValue> {
        self.session_mut()?.set_orientation(op);
        Ok(())
    }
}
