//! Filter chain composition.
//!
//! Turns [`FilterParameters`] into an ordered, deterministic list of
//! operations. The same chain drives both the live preview (as a CSS
//! `filter` value) and the export rasterizer, so the two match.
//!
//! ## Chain Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//! 4. Hue rotation
//! 5. Blur
//! 6. Sepia
//!
//! Operations at their neutral value are left out of the chain.

mod apply;

use serde::{Deserialize, Serialize};

use crate::params::{FilterField, FilterParameters};

pub use apply::apply_filter_chain;

/// A single filter operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    Brightness,
    Contrast,
    Saturate,
    HueRotate,
    Blur,
    Sepia,
}

impl FilterKind {
    /// Name of the equivalent CSS filter function.
    pub fn css_name(self) -> &'static str {
        match self {
            FilterKind::Brightness => "brightness",
            FilterKind::Contrast => "contrast",
            FilterKind::Saturate => "saturate",
            FilterKind::HueRotate => "hue-rotate",
            FilterKind::Blur => "blur",
            FilterKind::Sepia => "sepia",
        }
    }

    /// Unit suffix of the magnitude in CSS.
    pub fn css_unit(self) -> &'static str {
        match self {
            FilterKind::HueRotate => "deg",
            FilterKind::Blur => "px",
            _ => "%",
        }
    }

    /// The parameter field this operation is driven by.
    pub fn field(self) -> FilterField {
        match self {
            FilterKind::Brightness => FilterField::Brightness,
            FilterKind::Contrast => FilterField::Contrast,
            FilterKind::Saturate => FilterField::Saturation,
            FilterKind::HueRotate => FilterField::Hue,
            FilterKind::Blur => FilterField::Blur,
            FilterKind::Sepia => FilterField::Sepia,
        }
    }

    /// Magnitude at which the operation leaves pixels unchanged.
    pub fn neutral(self) -> f32 {
        self.field().default_value()
    }
}

/// Chain order. Changing it changes output pixels.
const CHAIN_ORDER: [FilterKind; 6] = [
    FilterKind::Brightness,
    FilterKind::Contrast,
    FilterKind::Saturate,
    FilterKind::HueRotate,
    FilterKind::Blur,
    FilterKind::Sepia,
];

/// One (operation, magnitude) pair of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterOp {
    pub kind: FilterKind,
    /// Percent for color operations, degrees for hue, pixels for blur.
    pub magnitude: f32,
}

impl FilterOp {
    pub fn new(kind: FilterKind, magnitude: f32) -> Self {
        Self { kind, magnitude }
    }

    pub fn is_neutral(&self) -> bool {
        self.magnitude == self.kind.neutral()
    }

    /// CSS function form, e.g. `hue-rotate(45deg)`.
    pub fn to_css(&self) -> String {
        format!(
            "{}({}{})",
            self.kind.css_name(),
            self.magnitude,
            self.kind.css_unit()
        )
    }
}

/// An ordered list of non-neutral filter operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterChain {
    ops: Vec<FilterOp>,
}

impl FilterChain {
    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Magnitude of `kind` if it is part of the chain.
    pub fn magnitude(&self, kind: FilterKind) -> Option<f32> {
        self.ops.iter().find(|op| op.kind == kind).map(|op| op.magnitude)
    }

    /// CSS `filter` property value; `none` for an empty chain.
    pub fn to_css(&self) -> String {
        if self.ops.is_empty() {
            return "none".to_string();
        }
        self.ops
            .iter()
            .map(FilterOp::to_css)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Compose the filter chain for a set of parameters.
pub fn compose_filter_chain(params: &FilterParameters) -> FilterChain {
    let ops = CHAIN_ORDER
        .iter()
        .map(|&kind| FilterOp::new(kind, params.get(kind.field())))
        .filter(|op| !op.is_neutral())
        .collect();
    FilterChain { ops }
}
