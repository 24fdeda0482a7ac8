//! Adjustable edit parameters: filter intensities and orientation.
//!
//! Every filter field carries a declared range and is clamped at assignment
//! time. Orientation is stepped incrementally and the rotation is stored
//! unreduced, so `-90` followed by `+90` reads back as `0` rather than `360`.
//!
//! | Field | Range | Default |
//! |---|---|---|
//! | brightness | 40 to 160 | 100 |
//! | contrast | 40 to 160 | 100 |
//! | saturation | 0 to 200 | 100 |
//! | hue | -180 to 180 | 0 |
//! | blur | 0 to 12 | 0 |
//! | sepia | 0 to 100 | 0 |

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Identifies one of the six filter intensities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Blur,
    Sepia,
}

impl FilterField {
    /// All fields in filter-chain order.
    pub const ALL: [FilterField; 6] = [
        FilterField::Brightness,
        FilterField::Contrast,
        FilterField::Saturation,
        FilterField::Hue,
        FilterField::Blur,
        FilterField::Sepia,
    ];

    /// The inclusive range values of this field are clamped into.
    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            FilterField::Brightness | FilterField::Contrast => 40.0..=160.0,
            FilterField::Saturation => 0.0..=200.0,
            FilterField::Hue => -180.0..=180.0,
            FilterField::Blur => 0.0..=12.0,
            FilterField::Sepia => 0.0..=100.0,
        }
    }

    /// The default value, which is also the neutral value of the operation.
    pub fn default_value(self) -> f32 {
        match self {
            FilterField::Brightness | FilterField::Contrast | FilterField::Saturation => 100.0,
            FilterField::Hue | FilterField::Blur | FilterField::Sepia => 0.0,
        }
    }

    /// Clamp a raw value into this field's range.
    ///
    /// NaN has no meaningful position in the range and maps to the default.
    pub fn clamp(self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }

    /// Parse a field from its lowercase name (`"brightness"`, `"hue"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "brightness" => Some(FilterField::Brightness),
            "contrast" => Some(FilterField::Contrast),
            "saturation" | "saturate" => Some(FilterField::Saturation),
            "hue" | "hue-rotate" => Some(FilterField::Hue),
            "blur" => Some(FilterField::Blur),
            "sepia" => Some(FilterField::Sepia),
            _ => None,
        }
    }
}

/// The six filter intensities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    /// Brightness percentage (40 to 160)
    pub brightness: f32,
    /// Contrast percentage (40 to 160)
    pub contrast: f32,
    /// Saturation percentage (0 to 200)
    pub saturation: f32,
    /// Hue rotation in degrees (-180 to 180)
    pub hue: f32,
    /// Blur radius in pixels (0 to 12)
    pub blur: f32,
    /// Sepia percentage (0 to 100)
    pub sepia: f32,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            brightness: FilterField::Brightness.default_value(),
            contrast: FilterField::Contrast.default_value(),
            saturation: FilterField::Saturation.default_value(),
            hue: FilterField::Hue.default_value(),
            blur: FilterField::Blur.default_value(),
            sepia: FilterField::Sepia.default_value(),
        }
    }
}

impl FilterParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a single field.
    pub fn get(&self, field: FilterField) -> f32 {
        match field {
            FilterField::Brightness => self.brightness,
            FilterField::Contrast => self.contrast,
            FilterField::Saturation => self.saturation,
            FilterField::Hue => self.hue,
            FilterField::Blur => self.blur,
            FilterField::Sepia => self.sepia,
        }
    }

    /// Clamp `value` into the field's range and replace only that field.
    pub fn set(&mut self, field: FilterField, value: f32) {
        let value = field.clamp(value);
        let slot = match field {
            FilterField::Brightness => &mut self.brightness,
            FilterField::Contrast => &mut self.contrast,
            FilterField::Saturation => &mut self.saturation,
            FilterField::Hue => &mut self.hue,
            FilterField::Blur => &mut self.blur,
            FilterField::Sepia => &mut self.sepia,
        };
        *slot = value;
    }

    /// Re-clamp every field, e.g. after deserializing values from outside.
    pub fn clamped(mut self) -> Self {
        for field in FilterField::ALL {
            self.set(field, self.get(field));
        }
        self
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Direction of a quarter-turn rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuarterTurn {
    /// +90 degrees
    Clockwise,
    /// -90 degrees
    CounterClockwise,
}

impl QuarterTurn {
    pub fn degrees(self) -> i32 {
        match self {
            QuarterTurn::Clockwise => 90,
            QuarterTurn::CounterClockwise => -90,
        }
    }
}

/// An incremental orientation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrientationOp {
    /// Add a quarter turn to the current rotation.
    RotateBy(QuarterTurn),
    /// Toggle horizontal mirroring.
    FlipHorizontal,
    /// Toggle vertical mirroring.
    FlipVertical,
}

/// Rotation and mirroring applied to the whole frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orientation {
    /// Cumulative rotation in degrees, not reduced modulo 360.
    pub rotation_degrees: i32,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Orientation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an incremental change.
    pub fn apply(&mut self, op: OrientationOp) {
        match op {
            OrientationOp::RotateBy(turn) => {
                let step = turn.degrees();
                self.rotation_degrees = match self.rotation_degrees.checked_add(step) {
                    Some(sum) => sum,
                    // Only the value modulo 360 matters to rendering.
                    None => self.rotation_degrees % 360 + step,
                };
            }
            OrientationOp::FlipHorizontal => self.flip_horizontal = !self.flip_horizontal,
            OrientationOp::FlipVertical => self.flip_vertical = !self.flip_vertical,
        }
    }

    /// Absolute rotation reduced into `0..360`, as used for canvas sizing.
    pub fn reduced_rotation(&self) -> u32 {
        (self.rotation_degrees % 360).unsigned_abs()
    }

    /// True when the rotation is an odd multiple of 90 degrees.
    pub fn is_quarter_turn(&self) -> bool {
        self.reduced_rotation() % 180 == 90
    }

    pub fn is_identity(&self) -> bool {
        self.rotation_degrees % 360 == 0 && !self.flip_horizontal && !self.flip_vertical
    }
}

/// Filter intensities and orientation together, the mutable half of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EditParameters {
    pub filters: FilterParameters,
    pub orientation: Orientation,
}

impl EditParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_filter(&mut self, field: FilterField, value: f32) {
        self.filters.set(field, value);
    }

    pub fn set_orientation(&mut self, op: OrientationOp) {
        self.orientation.apply(op);
    }

    /// Restore both filters and orientation to their defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        self.filters.is_default() && self.orientation == Orientation::default()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn field_strategy() -> impl Strategy<Value = FilterField> {
        prop::sample::select(FilterField::ALL.to_vec())
    }

    proptest! {
        /// Property: a stored value is always inside the field's range.
        #[test]
        fn prop_set_never_stores_out_of_range(field in field_strategy(), value in any::<f32>()) {
            let mut filters = FilterParameters::new();
            filters.set(field, value);
            let stored = filters.get(field);
            prop_assert!(field.range().contains(&stored), "{:?} stored {}", field, stored);
        }

        /// Property: clamping an already-clamped value is a no-op.
        #[test]
        fn prop_clamp_is_idempotent(field in field_strategy(), value in -1000.0f32..1000.0) {
            let once = field.clamp(value);
            prop_assert_eq!(field.clamp(once), once);
        }

        /// Property: four clockwise steps return to the same reduced rotation.
        #[test]
        fn prop_four_quarter_turns_are_periodic(start in -10_000i32..10_000) {
            let mut orientation = Orientation { rotation_degrees: start, ..Default::default() };
            let before = orientation.rotation_degrees.rem_euclid(360);
            let swapped = orientation.is_quarter_turn();
            for _ in 0..4 {
                orientation.apply(OrientationOp::RotateBy(QuarterTurn::Clockwise));
            }
            prop_assert_eq!(orientation.rotation_degrees.rem_euclid(360), before);
            prop_assert_eq!(orientation.is_quarter_turn(), swapped);
            prop_assert_eq!(orientation.rotation_degrees, start + 360);
        }
    }
}
