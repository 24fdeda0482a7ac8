//! QuickEdit Core - Image editing library
//!
//! This crate provides the core functionality for QuickEdit: a single-image
//! editor with color filters, quarter-turn rotation and mirroring, a cheap
//! preview descriptor and a full-resolution export pipeline.
//!
//! # Example flow
//!
//! 1. [`Editor::select_file`] registers the chosen file and opens a session
//! 2. [`EditSession::set_filter`] and [`EditSession::set_orientation`]
//!    mutate the parameters
//! 3. [`render_preview`] describes the on-screen preview after each change
//! 4. [`EditSession::export`] decodes, transforms, filters and re-encodes
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod filters;
pub mod media;
pub mod params;
pub mod preview;
pub mod resource;
pub mod session;
pub mod transform;

pub use config::EditorConfig;
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use encode::{encode_raster, EncodeError};
pub use export::{ExportError, ExportRequest, ExportedImage};
pub use filters::{apply_filter_chain, compose_filter_chain, FilterChain, FilterKind, FilterOp};
pub use media::{MediaType, OutputFormat};
pub use params::{
    EditParameters, FilterField, FilterParameters, Orientation, OrientationOp, QuarterTurn,
};
pub use preview::{render_preview, RenderDescriptor};
pub use resource::{Handle, Lease, ResourceStats, ResourceTracker, SourceBuffer};
pub use session::{EditSession, Editor, ImageSelection, SelectError};
pub use transform::{resolve_geometry, Affine, Geometry};

/// Crate version, reported to hosts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
