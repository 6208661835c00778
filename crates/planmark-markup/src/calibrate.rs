//! Scale calibration and derived measurement.
//!
//! A calibration is an explicit value object scoped to the current plan
//! and owned by the host: the engine reports the user-drawn reference
//! segment, the host prompts for the real-world length and unit, and the
//! resulting `Calibration` is fed back in as a parameter to measurement
//! derivation and rendering. It is never hidden global state.
//!
//! Re-calibration does not retroactively update persisted measurements;
//! they keep the value computed at creation time. Callers that need live
//! re-scaling call `distance`/`area` against the raw geometry on demand.

use tracing::debug;

use crate::model::{Measurement, PlanPoint, Shape};
use crate::surface::SurfaceRect;

/// Pixels-per-real-world-unit ratio plus the unit label.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub pixels_per_unit: f64,
    /// Unit label supplied by the host, e.g. "ft" or "m".
    pub unit: String,
}

impl Calibration {
    /// Establishes a calibration from a user-drawn reference segment of
    /// known real-world length.
    ///
    /// The segment length is taken in surface pixels, not raw percentage
    /// deltas, because percentage space is anisotropic when the surface
    /// aspect ratio is not 1. Returns `None` when the real length is not
    /// positive or the segment is degenerate on the given surface;
    /// otherwise `pixels_per_unit` is strictly positive.
    pub fn from_reference(
        start: &PlanPoint,
        end: &PlanPoint,
        surface: &SurfaceRect,
        real_length: f64,
        unit: impl Into<String>,
    ) -> Option<Self> {
        if !(real_length > 0.0) {
            return None;
        }
        let pixel_length = surface.pixel_distance(start, end);
        if !(pixel_length > 0.0) {
            return None;
        }
        let calibration = Self {
            pixels_per_unit: pixel_length / real_length,
            unit: unit.into(),
        };
        debug!(
            pixels_per_unit = calibration.pixels_per_unit,
            unit = %calibration.unit,
            "calibration established"
        );
        Some(calibration)
    }

    /// Real-world length of a segment on the given surface.
    pub fn distance(&self, start: &PlanPoint, end: &PlanPoint, surface: &SurfaceRect) -> f64 {
        surface.pixel_distance(start, end) / self.pixels_per_unit
    }

    /// Real-world area of an implicitly closed polygon on the given
    /// surface, in square units.
    pub fn area(&self, path: &[PlanPoint], surface: &SurfaceRect) -> f64 {
        polygon_area_px(path, surface) / (self.pixels_per_unit * self.pixels_per_unit)
    }
}

/// Shoelace area of an implicitly closed polygon, in square surface
/// pixels. The absolute value makes the result independent of winding
/// direction and starting vertex.
pub fn polygon_area_px(path: &[PlanPoint], surface: &SurfaceRect) -> f64 {
    if path.len() < 3 {
        return 0.0;
    }
    let px: Vec<(f64, f64)> = path.iter().map(|p| surface.to_surface(p)).collect();
    let mut sum = 0.0;
    for i in 0..px.len() {
        let j = (i + 1) % px.len();
        sum += px[i].0 * px[j].1 - px[j].0 * px[i].1;
    }
    (sum / 2.0).abs()
}

/// Fills in the derived measurement for a freshly completed measurement
/// shape; every other kind is left untouched. Without a calibration the
/// shape keeps `measurement = None` and renders as an unlabeled shape.
pub fn attach_measurement(
    shape: &mut Shape,
    calibration: Option<&Calibration>,
    surface: &SurfaceRect,
) {
    let Some(calibration) = calibration else {
        return;
    };
    match shape {
        Shape::MeasureDistance {
            start,
            end,
            measurement,
        } => {
            *measurement = Some(Measurement {
                value: calibration.distance(start, end, surface),
                unit: calibration.unit.clone(),
            });
        }
        Shape::MeasureArea { path, measurement } => {
            *measurement = Some(Measurement {
                value: calibration.area(path, surface),
                unit: calibration.unit.clone(),
            });
        }
        _ => {}
    }
}
