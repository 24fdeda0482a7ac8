//! QuickEdit WASM - WebAssembly bindings for QuickEdit
//!
//! This crate provides WASM bindings to expose the quickedit-core editor
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `editor` - The stateful `JsImageEditor` (selection, filters, orientation, export)
//! - `types` - WASM-compatible wrapper types for export results
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsImageEditor } from '@quickedit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const editor = new JsImageEditor();
//! editor.selectFile(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! const exported = await editor.exportImage();
//! console.log(`Exported ${exported.width}x${exported.height} as ${exported.suggestedFilename}`);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod types;

// Re-export public types
pub use editor::JsImageEditor;
pub use types::JsExportedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    quickedit_core::VERSION.to_string()
}
