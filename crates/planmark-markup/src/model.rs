//! Annotation data model for the markup engine.
//!
//! All geometry is stored in plan-space percentage coordinates: both axes
//! range over [0, 100] as a fraction of the plan surface's width/height.
//! Storing percentages instead of absolute pixels is what keeps an
//! annotation resolution- and zoom-independent: the same annotation
//! renders correctly regardless of the viewport used to display the plan.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use planmark_core::constants::{MIN_PATH_POINTS, MIN_POLYLINE_POINTS, TEXT_BOX_EXTENT};

/// Unique identifier for a persisted annotation, assigned by the backend
/// at persistence time. In-progress and preview geometry carries no id.
pub type AnnotationId = uuid::Uuid;

/// A point in plan-space percentage coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanPoint {
    /// Creates a point, clamping each axis independently into [0, 100].
    /// Non-finite input maps to 0.0 so NaN never enters the model.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_axis(x),
            y: clamp_axis(y),
        }
    }

    /// Euclidean distance to another point, in plan-space units.
    pub fn distance_to(&self, other: &PlanPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between this point and another.
    pub fn midpoint(&self, other: &PlanPoint) -> PlanPoint {
        PlanPoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

fn clamp_axis(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Annotation kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Line,
    Arrow,
    Rectangle,
    Freehand,
    Text,
    MeasureDistance,
    MeasureArea,
}

impl AnnotationKind {
    /// Wire-format name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Rectangle => "rectangle",
            Self::Freehand => "freehand",
            Self::Text => "text",
            Self::MeasureDistance => "measure_distance",
            Self::MeasureArea => "measure_area",
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnnotationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(Self::Line),
            "arrow" => Ok(Self::Arrow),
            "rectangle" => Ok(Self::Rectangle),
            "freehand" => Ok(Self::Freehand),
            "text" => Ok(Self::Text),
            "measure_distance" => Ok(Self::MeasureDistance),
            "measure_area" => Ok(Self::MeasureArea),
            _ => Err(format!("Unknown annotation kind: {}", s)),
        }
    }
}

/// A derived real-world measurement. Present on a measurement shape iff a
/// calibration existed when the shape was created; never user-entered.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Value in real-world units (length, or area in square units).
    pub value: f64,
    /// Unit label supplied by the calibration, e.g. "ft" or "m".
    pub unit: String,
}

/// Annotation geometry. Each variant carries exactly the fields its kind
/// needs; two-point shapes always hold both endpoints once finalized.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line {
        start: PlanPoint,
        end: PlanPoint,
    },
    Arrow {
        start: PlanPoint,
        end: PlanPoint,
    },
    Rectangle {
        start: PlanPoint,
        end: PlanPoint,
    },
    /// Open polyline recorded from a freehand drag.
    Freehand {
        path: Vec<PlanPoint>,
    },
    Text {
        anchor: PlanPoint,
        text: String,
    },
    MeasureDistance {
        start: PlanPoint,
        end: PlanPoint,
        measurement: Option<Measurement>,
    },
    /// Implicitly closed polygon: the last point connects back to the first.
    MeasureArea {
        path: Vec<PlanPoint>,
        measurement: Option<Measurement>,
    },
}

impl Shape {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Shape::Line { .. } => AnnotationKind::Line,
            Shape::Arrow { .. } => AnnotationKind::Arrow,
            Shape::Rectangle { .. } => AnnotationKind::Rectangle,
            Shape::Freehand { .. } => AnnotationKind::Freehand,
            Shape::Text { .. } => AnnotationKind::Text,
            Shape::MeasureDistance { .. } => AnnotationKind::MeasureDistance,
            Shape::MeasureArea { .. } => AnnotationKind::MeasureArea,
        }
    }

    /// Axis-aligned bounding box as (min_x, min_y, max_x, max_y) in
    /// plan-space units.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        match self {
            Shape::Line { start, end }
            | Shape::Arrow { start, end }
            | Shape::Rectangle { start, end }
            | Shape::MeasureDistance { start, end, .. } => (
                start.x.min(end.x),
                start.y.min(end.y),
                start.x.max(end.x),
                start.y.max(end.y),
            ),
            Shape::Freehand { path } | Shape::MeasureArea { path, .. } => path_bounds(path),
            Shape::Text { anchor, .. } => {
                let (w, h) = TEXT_BOX_EXTENT;
                (anchor.x, anchor.y, anchor.x + w, anchor.y + h)
            }
        }
    }

    /// Kind-appropriate hit test: segment distance with a tolerance band
    /// for line-like shapes, bounding-box containment for rectangles and
    /// text, point-in-polygon for area shapes.
    pub fn contains_point(&self, point: &PlanPoint, tolerance: f64) -> bool {
        match self {
            Shape::Line { start, end }
            | Shape::Arrow { start, end }
            | Shape::MeasureDistance { start, end, .. } => {
                point_near_segment(point, start, end, tolerance)
            }
            Shape::Rectangle { .. } => {
                let (min_x, min_y, max_x, max_y) = self.bounding_box();
                point.x >= min_x - tolerance
                    && point.x <= max_x + tolerance
                    && point.y >= min_y - tolerance
                    && point.y <= max_y + tolerance
            }
            Shape::Freehand { path } => path
                .windows(2)
                .any(|w| point_near_segment(point, &w[0], &w[1], tolerance)),
            Shape::MeasureArea { path, .. } => {
                point_in_polygon(point, path)
                    || polygon_edges(path)
                        .any(|(a, b)| point_near_segment(point, a, b, tolerance))
            }
            Shape::Text { .. } => {
                let (min_x, min_y, max_x, max_y) = self.bounding_box();
                point.x >= min_x && point.x <= max_x && point.y >= min_y && point.y <= max_y
            }
        }
    }

    /// Anchor position for a measurement label: segment midpoint or
    /// polygon centroid. `None` for kinds that carry no label.
    pub fn label_anchor(&self) -> Option<PlanPoint> {
        match self {
            Shape::MeasureDistance { start, end, .. } => Some(start.midpoint(end)),
            Shape::MeasureArea { path, .. } => centroid(path),
            _ => None,
        }
    }

    /// The derived measurement, if this is a measurement shape and a
    /// calibration existed when it was created.
    pub fn measurement(&self) -> Option<&Measurement> {
        match self {
            Shape::MeasureDistance { measurement, .. }
            | Shape::MeasureArea { measurement, .. } => measurement.as_ref(),
            _ => None,
        }
    }

    /// Whether the shape has enough geometry to be drawn at all. Persisted
    /// rows that normalized to fewer points than their kind needs are
    /// silently not drawn rather than failing the whole surface.
    pub fn is_drawable(&self) -> bool {
        match self {
            Shape::Freehand { path } => path.len() >= MIN_POLYLINE_POINTS,
            Shape::MeasureArea { path, .. } => path.len() >= MIN_PATH_POINTS,
            Shape::Text { text, .. } => !text.is_empty(),
            _ => true,
        }
    }
}

/// A persisted annotation: the identity envelope plus its geometry.
///
/// Annotations are immutable once persisted; "editing" is delete +
/// recreate in the host application, not a mutation here.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    /// The plan sheet this annotation belongs to. Ownership lives with the
    /// plan, not the annotation engine.
    pub plan_id: uuid::Uuid,
    pub project_id: uuid::Uuid,
    /// Stroke/fill color token.
    pub color: String,
    pub stroke_width: f64,
    /// Free-form grouping string, defaults to "default".
    pub layer: String,
    pub shape: Shape,
    /// Persistence timestamp, passed through from the backend row.
    pub created_at: Option<DateTime<Utc>>,
}

impl Annotation {
    /// Hit test for selection.
    pub fn hit_test(&self, point: &PlanPoint, tolerance: f64) -> bool {
        self.shape.contains_point(point, tolerance)
    }
}

/// A finalized gesture awaiting persistence: the envelope without
/// identity. The backend assigns the id and echoes the row back.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnotation {
    pub plan_id: uuid::Uuid,
    pub project_id: uuid::Uuid,
    pub color: String,
    pub stroke_width: f64,
    pub layer: String,
    pub shape: Shape,
}

fn path_bounds(path: &[PlanPoint]) -> (f64, f64, f64, f64) {
    let Some(first) = path.first() else {
        return (0.0, 0.0, 0.0, 0.0);
    };
    let mut bounds = (first.x, first.y, first.x, first.y);
    for p in path.iter().skip(1) {
        bounds.0 = bounds.0.min(p.x);
        bounds.1 = bounds.1.min(p.y);
        bounds.2 = bounds.2.max(p.x);
        bounds.3 = bounds.3.max(p.y);
    }
    bounds
}

/// Distance-to-segment check used for line-like hit testing.
pub(crate) fn point_near_segment(
    point: &PlanPoint,
    start: &PlanPoint,
    end: &PlanPoint,
    tolerance: f64,
) -> bool {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-9 {
        return point.distance_to(start) <= tolerance;
    }

    let t = ((point.x - start.x) * dx + (point.y - start.y) * dy) / length_sq;
    let t = t.clamp(0.0, 1.0);
    let closest = PlanPoint::new(start.x + t * dx, start.y + t * dy);
    point.distance_to(&closest) <= tolerance
}

/// Ray-cast point-in-polygon test over an implicitly closed path.
pub(crate) fn point_in_polygon(point: &PlanPoint, path: &[PlanPoint]) -> bool {
    if path.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = path.len() - 1;
    for i in 0..path.len() {
        let (pi, pj) = (&path[i], &path[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = pj.x + (point.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn polygon_edges(path: &[PlanPoint]) -> impl Iterator<Item = (&PlanPoint, &PlanPoint)> {
    let n = path.len();
    (0..n).filter_map(move |i| {
        let a = path.get(i)?;
        let b = path.get((i + 1) % n)?;
        Some((a, b))
    })
}

fn centroid(path: &[PlanPoint]) -> Option<PlanPoint> {
    if path.is_empty() {
        return None;
    }
    let n = path.len() as f64;
    let sum_x: f64 = path.iter().map(|p| p.x).sum();
    let sum_y: f64 = path.iter().map(|p| p.y).sum();
    Some(PlanPoint::new(sum_x / n, sum_y / n))
}
