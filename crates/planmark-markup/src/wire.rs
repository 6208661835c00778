//! Persistence-boundary codec.
//!
//! Annotation rows cross the boundary as JSON with camelCase fields. The
//! `path` field may arrive either as a structured array of points or as a
//! JSON-encoded string, depending on the persistence layer's transport;
//! both forms are normalized here, at the edge, so the internal model
//! always holds a structured sequence. Geometry and rendering code never
//! branch on representation.
//!
//! A row that cannot be normalized is skipped with a warning. Malformed
//! persisted data never takes down the drawing surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use planmark_core::constants::{
    DEFAULT_COLOR, DEFAULT_LAYER, DEFAULT_STROKE_WIDTH, MIN_PATH_POINTS, MIN_POLYLINE_POINTS,
};
use planmark_core::error::{DecodeError, GeometryError};

use crate::model::{
    Annotation, AnnotationId, AnnotationKind, Measurement, NewAnnotation, PlanPoint, Shape,
};

/// A raw, unvalidated point as it appears in persisted rows. Clamped into
/// plan space during decoding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawPoint {
    pub x: f64,
    pub y: f64,
}

impl From<&PlanPoint> for RawPoint {
    fn from(p: &PlanPoint) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Path payload as stored: a structured sequence, or the same sequence
/// JSON-encoded into a string by an older transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PathField {
    Points(Vec<RawPoint>),
    Encoded(String),
}

impl PathField {
    /// Normalizes either representation to a structured point sequence.
    pub fn into_points(self) -> Result<Vec<PlanPoint>, DecodeError> {
        let raw = match self {
            PathField::Points(raw) => raw,
            PathField::Encoded(s) => serde_json::from_str::<Vec<RawPoint>>(&s).map_err(|e| {
                DecodeError::MalformedPath {
                    reason: e.to_string(),
                }
            })?,
        };
        Ok(raw.into_iter().map(|p| PlanPoint::new(p.x, p.y)).collect())
    }
}

/// A persisted annotation row as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRow {
    pub id: AnnotationId,
    pub plan_id: uuid::Uuid,
    pub project_id: uuid::Uuid,
    pub annotation_type: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub stroke_width: Option<f64>,
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(default)]
    pub start_x: Option<f64>,
    #[serde(default)]
    pub start_y: Option<f64>,
    #[serde(default)]
    pub end_x: Option<f64>,
    #[serde(default)]
    pub end_y: Option<f64>,
    #[serde(default)]
    pub path: Option<PathField>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub measurement_value: Option<f64>,
    #[serde(default)]
    pub measurement_unit: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AnnotationRow {
    fn start(&self, kind: AnnotationKind) -> Result<PlanPoint, DecodeError> {
        match (self.start_x, self.start_y) {
            (Some(x), Some(y)) => Ok(PlanPoint::new(x, y)),
            _ => Err(missing(kind, "start")),
        }
    }

    fn end(&self, kind: AnnotationKind) -> Result<PlanPoint, DecodeError> {
        match (self.end_x, self.end_y) {
            (Some(x), Some(y)) => Ok(PlanPoint::new(x, y)),
            _ => Err(missing(kind, "end")),
        }
    }

    fn points(&self, kind: AnnotationKind, required: usize) -> Result<Vec<PlanPoint>, DecodeError> {
        let path = self.path.clone().ok_or_else(|| missing(kind, "path"))?;
        let points = path.into_points()?;
        if points.len() < required {
            return Err(GeometryError::TooFewPoints {
                kind: kind.to_string(),
                required,
                actual: points.len(),
            }
            .into());
        }
        Ok(points)
    }

    /// Derived measurement carried by the row: present only when both the
    /// value and the unit persisted together.
    fn measurement(&self) -> Option<Measurement> {
        match (self.measurement_value, self.measurement_unit.as_deref()) {
            (Some(value), Some(unit)) => Some(Measurement {
                value,
                unit: unit.to_string(),
            }),
            _ => None,
        }
    }
}

fn missing(kind: AnnotationKind, field: &str) -> DecodeError {
    GeometryError::MissingField {
        kind: kind.to_string(),
        field: field.to_string(),
    }
    .into()
}

/// Decodes one persisted row into the internal model.
pub fn decode_row(row: AnnotationRow) -> Result<Annotation, DecodeError> {
    let kind: AnnotationKind =
        row.annotation_type
            .parse()
            .map_err(|_| DecodeError::UnknownKind {
                kind: row.annotation_type.clone(),
            })?;

    let shape = match kind {
        AnnotationKind::Line => Shape::Line {
            start: row.start(kind)?,
            end: row.end(kind)?,
        },
        AnnotationKind::Arrow => Shape::Arrow {
            start: row.start(kind)?,
            end: row.end(kind)?,
        },
        AnnotationKind::Rectangle => Shape::Rectangle {
            start: row.start(kind)?,
            end: row.end(kind)?,
        },
        AnnotationKind::Freehand => Shape::Freehand {
            path: row.points(kind, MIN_POLYLINE_POINTS)?,
        },
        AnnotationKind::Text => Shape::Text {
            anchor: row.start(kind)?,
            text: row.text.clone().ok_or_else(|| missing(kind, "text"))?,
        },
        AnnotationKind::MeasureDistance => Shape::MeasureDistance {
            start: row.start(kind)?,
            end: row.end(kind)?,
            measurement: row.measurement(),
        },
        AnnotationKind::MeasureArea => Shape::MeasureArea {
            path: row.points(kind, MIN_PATH_POINTS)?,
            measurement: row.measurement(),
        },
    };

    Ok(Annotation {
        id: row.id,
        plan_id: row.plan_id,
        project_id: row.project_id,
        color: row.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        stroke_width: row
            .stroke_width
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_STROKE_WIDTH),
        layer: row.layer.unwrap_or_else(|| DEFAULT_LAYER.to_string()),
        shape,
        created_at: row.created_at,
    })
}

/// Decodes a batch of rows, skipping any that fail with a warning.
pub fn decode_rows(rows: Vec<AnnotationRow>) -> Vec<Annotation> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match decode_row(row) {
                Ok(annotation) => Some(annotation),
                Err(err) => {
                    warn!(%id, %err, "skipping undecodable annotation row");
                    None
                }
            }
        })
        .collect()
}

/// Decodes a JSON array of rows straight from a response body.
pub fn decode_json(body: &str) -> Result<Vec<Annotation>, DecodeError> {
    let rows: Vec<AnnotationRow> = serde_json::from_str(body)?;
    Ok(decode_rows(rows))
}

/// Outbound create-annotation payload handed to the persistence
/// collaborator for a finalized gesture.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnotationRequest {
    pub plan_id: uuid::Uuid,
    pub project_id: uuid::Uuid,
    pub annotation_type: &'static str,
    pub color: String,
    pub stroke_width: f64,
    pub layer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<RawPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_unit: Option<String>,
}

impl From<&NewAnnotation> for CreateAnnotationRequest {
    fn from(new: &NewAnnotation) -> Self {
        let mut request = Self {
            plan_id: new.plan_id,
            project_id: new.project_id,
            annotation_type: new.shape.kind().as_str(),
            color: new.color.clone(),
            stroke_width: new.stroke_width,
            layer: new.layer.clone(),
            start_x: None,
            start_y: None,
            end_x: None,
            end_y: None,
            path: None,
            text: None,
            measurement_value: None,
            measurement_unit: None,
        };
        match &new.shape {
            Shape::Line { start, end }
            | Shape::Arrow { start, end }
            | Shape::Rectangle { start, end } => {
                request.set_segment(start, end);
            }
            Shape::MeasureDistance {
                start,
                end,
                measurement,
            } => {
                request.set_segment(start, end);
                request.set_measurement(measurement.as_ref());
            }
            Shape::Freehand { path } => {
                request.path = Some(path.iter().map(RawPoint::from).collect());
            }
            Shape::MeasureArea { path, measurement } => {
                request.path = Some(path.iter().map(RawPoint::from).collect());
                request.set_measurement(measurement.as_ref());
            }
            Shape::Text { anchor, text } => {
                request.start_x = Some(anchor.x);
                request.start_y = Some(anchor.y);
                request.text = Some(text.clone());
            }
        }
        request
    }
}

impl CreateAnnotationRequest {
    fn set_segment(&mut self, start: &PlanPoint, end: &PlanPoint) {
        self.start_x = Some(start.x);
        self.start_y = Some(start.y);
        self.end_x = Some(end.x);
        self.end_y = Some(end.y);
    }

    fn set_measurement(&mut self, measurement: Option<&Measurement>) {
        if let Some(m) = measurement {
            self.measurement_value = Some(m.value);
            self.measurement_unit = Some(m.unit.clone());
        }
    }
}
