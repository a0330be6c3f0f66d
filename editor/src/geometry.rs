//! Canvas geometry: positions, sizes, drag displacements, and canvas fitting.
//!
//! All values are in canvas-relative units (CSS pixels of the rendering
//! surface). Sizes coming from the outside world are normalized so that the
//! store never holds a negative or non-finite dimension.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A position in canvas-relative units. `(0, 0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This point displaced by `delta`.
    #[must_use]
    pub fn offset(self, delta: Delta) -> Self {
        Self { x: self.x + delta.dx, y: self.y + delta.dy }
    }
}

/// Cumulative displacement of a drag gesture, reported once at gesture end.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
}

impl Delta {
    #[must_use]
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Measured dimensions of the rendering surface.
pub type CanvasSize = Size;

impl Size {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, i.e. the surface has not been measured.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Copy with negative and non-finite dimensions replaced by zero.
    #[must_use]
    pub fn non_negative(self) -> Self {
        Self { width: non_negative(self.width), height: non_negative(self.height) }
    }

    /// Fit an image of size `image` to `container_width`, preserving its
    /// aspect ratio. Degenerate inputs produce [`Size::ZERO`].
    #[must_use]
    pub fn fit(image: Size, container_width: f64) -> Self {
        let image = image.non_negative();
        let container_width = non_negative(container_width);
        if image.is_zero() || container_width <= 0.0 {
            return Self::ZERO;
        }
        let scale = container_width / image.width;
        Self { width: container_width, height: image.height * scale }
    }
}

/// `value` if it is finite and positive, zero otherwise.
#[must_use]
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}
