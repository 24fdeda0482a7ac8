//! 2D affine matrices in canvas `setTransform(a, b, c, d, e, f)` form.
//!
//! ```text
//! | a c e |   x' = a*x + c*y + e
//! | b d f |   y' = b*x + d*y + f
//! ```
//!
//! The `then_*` builders post-multiply, so operations read in the same
//! order as canvas context calls: the last one added is applied to a point
//! first.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// `self * other`: `other` is applied to a point first.
    pub fn multiply(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn then_translate(&self, tx: f64, ty: f64) -> Affine {
        self.multiply(&Affine {
            e: tx,
            f: ty,
            ..Affine::IDENTITY
        })
    }

    pub fn then_scale(&self, sx: f64, sy: f64) -> Affine {
        self.multiply(&Affine {
            a: sx,
            d: sy,
            ..Affine::IDENTITY
        })
    }

    /// Rotate by an angle given as its sine and cosine (clockwise on a y-down canvas).
    pub fn then_rotate_sin_cos(&self, sin: f64, cos: f64) -> Affine {
        self.multiply(&Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        })
    }

    /// Rotate by whole degrees. Multiples of 90 use exact sine and cosine.
    pub fn then_rotate_degrees(&self, degrees: i32) -> Affine {
        let (sin, cos) = sin_cos_degrees(degrees);
        self.then_rotate_sin_cos(sin, cos)
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse matrix, or `None` when singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }
        Some(Affine {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }

    pub fn approx_eq(&self, other: &Affine, epsilon: f64) -> bool {
        [
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
            self.e - other.e,
            self.f - other.f,
        ]
        .iter()
        .all(|delta| delta.abs() <= epsilon)
    }
}

/// Sine and cosine of an integer angle, exact for multiples of 90 degrees.
pub fn sin_cos_degrees(degrees: i32) -> (f64, f64) {
    match degrees.rem_euclid(360) {
        0 => (0.0, 1.0),
        90 => (1.0, 0.0),
        180 => (0.0, -1.0),
        270 => (-1.0, 0.0),
        other => (other as f64).to_radians().sin_cos(),
    }
}
