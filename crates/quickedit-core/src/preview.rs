//! Preview rendering.
//!
//! The preview never touches pixels. It describes the current parameters in
//! the form a display layer applies to the selected image directly: a CSS
//! `filter` and a CSS `transform`. Both come from the same chain and
//! orientation the export pipeline uses.

use serde::Serialize;

use crate::filters::{compose_filter_chain, FilterChain};
use crate::params::Orientation;
use crate::session::EditSession;

/// What the display layer needs to draw the preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDescriptor {
    /// Session revision this descriptor was built from.
    pub revision: u64,
    pub filter_chain: FilterChain,
    /// CSS `filter` value, `none` when the chain is empty.
    pub css_filter: String,
    /// CSS `transform` value, mirroring listed before rotation.
    pub css_transform: String,
    pub rotation_degrees: i32,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

/// Describe how the session's image should currently be displayed.
pub fn render_preview(session: &EditSession) -> RenderDescriptor {
    let orientation = session.orientation();
    let filter_chain = compose_filter_chain(session.filters());
    RenderDescriptor {
        revision: session.revision(),
        css_filter: filter_chain.to_css(),
        css_transform: css_transform(orientation),
        filter_chain,
        rotation_degrees: orientation.rotation_degrees,
        flip_horizontal: orientation.flip_horizontal,
        flip_vertical: orientation.flip_vertical,
    }
}

/// CSS `transform` for an orientation, e.g. `scaleX(-1) rotate(90deg)`.
pub fn css_transform(orientation: &Orientation) -> String {
    let mut parts = Vec::with_capacity(3);
    if orientation.flip_horizontal {
        parts.push("scaleX(-1)".to_string());
    }
    if orientation.flip_vertical {
        parts.push("scaleY(-1)".to_string());
    }
    parts.push(format!("rotate({}deg)", orientation.rotation_degrees));
    parts.join(" ")
}
