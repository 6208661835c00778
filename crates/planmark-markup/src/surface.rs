//! Surface geometry and plan-space coordinate mapping.
//!
//! Device pointer positions are normalized into plan-space percentages
//! against the surface rectangle captured at the moment of the event. The
//! rectangle is recomputed for every pointer event rather than cached,
//! because the surface may resize or scroll between events.
//!
//! The inverse direction (`to_surface`) exists for rendering and
//! measurement: percentages are re-expanded against the live surface size
//! at paint time, never stored.

use crate::model::PlanPoint;

/// The rendering surface's current on-screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    /// Creates a surface rectangle from its on-screen position and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Creates a surface rectangle at the screen origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// A surface that has not been laid out yet has no usable geometry.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Converts a device pixel position into plan-space percentages,
    /// clamped independently per axis to [0, 100].
    ///
    /// A degenerate surface (zero width or height) maps everything to the
    /// origin; the conversion never divides by zero or propagates NaN.
    pub fn to_plan_space(&self, device_x: f64, device_y: f64) -> PlanPoint {
        if self.is_degenerate() {
            return PlanPoint::new(0.0, 0.0);
        }
        PlanPoint::new(
            (device_x - self.left) / self.width * 100.0,
            (device_y - self.top) / self.height * 100.0,
        )
    }

    /// Re-expands plan-space percentages into surface-local pixels.
    pub fn to_surface(&self, point: &PlanPoint) -> (f64, f64) {
        (
            point.x / 100.0 * self.width,
            point.y / 100.0 * self.height,
        )
    }

    /// Euclidean distance between two plan points in surface pixels.
    ///
    /// Percentage space is anisotropic whenever the surface aspect ratio
    /// is not 1, so lengths must be taken after expansion to pixels.
    pub fn pixel_distance(&self, a: &PlanPoint, b: &PlanPoint) -> f64 {
        let (ax, ay) = self.to_surface(a);
        let (bx, by) = self.to_surface(b);
        let dx = bx - ax;
        let dy = by - ay;
        (dx * dx + dy * dy).sqrt()
    }
}
