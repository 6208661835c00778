//! Scene-graph renderer.
//!
//! A pure mapping from the annotation set, the in-progress gesture, the
//! selection, and the calibration to a flat list of drawable primitives in
//! surface-local pixels. No side effects and no graphics API: the host
//! composites the scene over the plan image with whatever it renders with.
//!
//! Plan-space percentages are re-expanded against the live surface size
//! here, at paint time, which is what keeps annotations correct across
//! resizes and zoom levels.

use std::f64::consts::PI;

use planmark_core::constants::{
    ARROW_HEAD_LENGTH, HANDLE_SIZE, MEASURE_CAP_RADIUS, PREVIEW_OPACITY,
};

use crate::calibrate::{self, Calibration};
use crate::model::{Annotation, AnnotationId, Measurement, PlanPoint, Shape};
use crate::surface::SurfaceRect;

/// Stroke styling shared by the vector primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
    pub dashed: bool,
}

impl Paint {
    fn solid(color: &str, width: f64, opacity: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            opacity,
            dashed: false,
        }
    }

    fn dashed(color: &str, width: f64, opacity: f64) -> Self {
        Self {
            dashed: true,
            ..Self::solid(color, width, opacity)
        }
    }
}

/// One drawable primitive, positioned in surface-local pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    /// A straight stroke.
    Segment {
        from: (f64, f64),
        to: (f64, f64),
        paint: Paint,
    },
    /// An open or closed polyline; closed polylines may be filled at low
    /// opacity in addition to their stroke.
    Polyline {
        points: Vec<(f64, f64)>,
        closed: bool,
        filled: bool,
        paint: Paint,
    },
    /// An axis-aligned rectangle outline.
    Rect {
        origin: (f64, f64),
        size: (f64, f64),
        paint: Paint,
    },
    /// A text glyph run anchored at a surface position.
    Text {
        at: (f64, f64),
        content: String,
        color: String,
        opacity: f64,
    },
    /// A measurement label card centered at a surface position.
    Label {
        at: (f64, f64),
        text: String,
        opacity: f64,
    },
    /// A small round endpoint cap on measurement segments.
    Cap {
        at: (f64, f64),
        radius: f64,
        color: String,
        opacity: f64,
    },
    /// A square selection handle centered at a surface position.
    Handle { at: (f64, f64), size: f64 },
}

/// The renderer's output: drawable primitives in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// The in-progress gesture as handed to the renderer: geometry plus the
/// active tool style. Previews render at reduced opacity and are never
/// hit-testable.
#[derive(Debug, Clone, PartialEq)]
pub struct GesturePreview {
    pub shape: Shape,
    pub color: String,
    pub stroke_width: f64,
}

/// Renders the current annotation set, the in-progress gesture, and the
/// selection into a scene graph.
pub fn render(
    annotations: &[Annotation],
    in_progress: Option<&GesturePreview>,
    selection: Option<AnnotationId>,
    calibration: Option<&Calibration>,
    surface: &SurfaceRect,
) -> Scene {
    let mut scene = Scene::default();
    if surface.is_degenerate() {
        return scene;
    }

    for annotation in annotations {
        push_shape(
            &mut scene,
            &annotation.shape,
            &annotation.color,
            annotation.stroke_width,
            1.0,
            surface,
        );
        if selection == Some(annotation.id) {
            push_handles(&mut scene, &annotation.shape, surface);
        }
    }

    if let Some(preview) = in_progress {
        // The preview of a measurement shows a live value derived from the
        // current calibration; the stored value is only fixed at creation.
        let mut shape = preview.shape.clone();
        calibrate::attach_measurement(&mut shape, calibration, surface);
        push_shape(
            &mut scene,
            &shape,
            &preview.color,
            preview.stroke_width,
            PREVIEW_OPACITY,
            surface,
        );
    }

    scene
}

fn push_shape(
    scene: &mut Scene,
    shape: &Shape,
    color: &str,
    stroke_width: f64,
    opacity: f64,
    surface: &SurfaceRect,
) {
    if !shape.is_drawable() {
        return;
    }
    match shape {
        Shape::Line { start, end } => {
            scene.nodes.push(SceneNode::Segment {
                from: surface.to_surface(start),
                to: surface.to_surface(end),
                paint: Paint::solid(color, stroke_width, opacity),
            });
        }
        Shape::Arrow { start, end } => {
            let from = surface.to_surface(start);
            let to = surface.to_surface(end);
            let paint = Paint::solid(color, stroke_width, opacity);
            scene.nodes.push(SceneNode::Segment {
                from,
                to,
                paint: paint.clone(),
            });
            // Arrowhead angle must come from pixel space: percentage space
            // distorts angles on non-square surfaces.
            let theta = (to.1 - from.1).atan2(to.0 - from.0);
            for wing in [theta - PI / 6.0, theta + PI / 6.0] {
                scene.nodes.push(SceneNode::Segment {
                    from: to,
                    to: (
                        to.0 - ARROW_HEAD_LENGTH * wing.cos(),
                        to.1 - ARROW_HEAD_LENGTH * wing.sin(),
                    ),
                    paint: paint.clone(),
                });
            }
        }
        Shape::Rectangle { start, end } => {
            let (x1, y1) = surface.to_surface(start);
            let (x2, y2) = surface.to_surface(end);
            scene.nodes.push(SceneNode::Rect {
                origin: (x1.min(x2), y1.min(y2)),
                size: ((x2 - x1).abs(), (y2 - y1).abs()),
                paint: Paint::solid(color, stroke_width, opacity),
            });
        }
        Shape::Freehand { path } => {
            scene.nodes.push(SceneNode::Polyline {
                points: path.iter().map(|p| surface.to_surface(p)).collect(),
                closed: false,
                filled: false,
                paint: Paint::solid(color, stroke_width, opacity),
            });
        }
        Shape::Text { anchor, text } => {
            scene.nodes.push(SceneNode::Text {
                at: surface.to_surface(anchor),
                content: text.clone(),
                color: color.to_string(),
                opacity,
            });
        }
        Shape::MeasureDistance {
            start,
            end,
            measurement,
        } => {
            let from = surface.to_surface(start);
            let to = surface.to_surface(end);
            scene.nodes.push(SceneNode::Segment {
                from,
                to,
                paint: Paint::dashed(color, stroke_width, opacity),
            });
            for at in [from, to] {
                scene.nodes.push(SceneNode::Cap {
                    at,
                    radius: MEASURE_CAP_RADIUS,
                    color: color.to_string(),
                    opacity,
                });
            }
            push_label(scene, shape, measurement.as_ref(), false, opacity, surface);
        }
        Shape::MeasureArea { path, measurement } => {
            scene.nodes.push(SceneNode::Polyline {
                points: path.iter().map(|p| surface.to_surface(p)).collect(),
                closed: true,
                filled: true,
                paint: Paint::dashed(color, stroke_width, opacity),
            });
            push_label(scene, shape, measurement.as_ref(), true, opacity, surface);
        }
    }
}

/// Emits the measurement label card, if the shape carries a value. With no
/// calibration at creation time there is no value and the label is simply
/// omitted; the shape still draws.
fn push_label(
    scene: &mut Scene,
    shape: &Shape,
    measurement: Option<&Measurement>,
    area: bool,
    opacity: f64,
    surface: &SurfaceRect,
) {
    let (Some(measurement), Some(anchor)) = (measurement, shape.label_anchor()) else {
        return;
    };
    scene.nodes.push(SceneNode::Label {
        at: surface.to_surface(&anchor),
        text: format_measurement(measurement, area),
        opacity,
    });
}

fn format_measurement(measurement: &Measurement, area: bool) -> String {
    if area {
        format!("{:.2} {}²", measurement.value, measurement.unit)
    } else {
        format!("{:.2} {}", measurement.value, measurement.unit)
    }
}

fn push_handles(scene: &mut Scene, shape: &Shape, surface: &SurfaceRect) {
    let anchors: Vec<PlanPoint> = match shape {
        Shape::Line { start, end }
        | Shape::Arrow { start, end }
        | Shape::MeasureDistance { start, end, .. } => vec![*start, *end],
        Shape::Rectangle { start, end } => {
            let (min_x, min_y, max_x, max_y) = shape.bounding_box();
            vec![
                PlanPoint::new(min_x, min_y),
                PlanPoint::new(max_x, min_y),
                PlanPoint::new(min_x, max_y),
                PlanPoint::new(max_x, max_y),
            ]
        }
        Shape::Freehand { path } | Shape::MeasureArea { path, .. } => path.clone(),
        Shape::Text { anchor, .. } => vec![*anchor],
    };
    for anchor in anchors {
        scene.nodes.push(SceneNode::Handle {
            at: surface.to_surface(&anchor),
            size: HANDLE_SIZE,
        });
    }
}
