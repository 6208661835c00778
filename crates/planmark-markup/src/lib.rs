//! # PlanMark Markup
//!
//! The plan annotation engine: everything needed to draw, measure, and
//! annotate on top of a displayed construction drawing. Geometry is stored
//! in plan-space percentage coordinates so annotations stay correct across
//! surface resizes and zoom levels; the backing plan image, persistence,
//! and UI chrome all belong to the host.
//!
//! ## Architecture
//!
//! ```text
//! MarkupEditor (integration layer)
//!   ├── SurfaceRect (device <-> plan-space mapping)
//!   ├── GestureMachine (pointer lifecycle per tool)
//!   ├── SelectionController (single-selection hit-testing)
//!   ├── Calibration (pixels-per-unit scale, host owned)
//!   └── scene::render (pure annotation-set -> scene graph)
//!
//! wire (persistence boundary)
//!   └── AnnotationRow <-> Annotation / NewAnnotation
//! ```
//!
//! Pointer events flow through the editor into either the gesture machine
//! (drawing tools) or the selection controller (select tool); finalized
//! gestures come back out as `HostRequest::Create` values for the host's
//! persistence collaborator, and the persisted rows flow back in through
//! `wire::decode_rows` and `MarkupEditor::set_annotations`.

pub mod calibrate;
pub mod editor;
pub mod gesture;
pub mod model;
pub mod scene;
pub mod selection;
pub mod surface;
pub mod wire;

pub use calibrate::{polygon_area_px, Calibration};
pub use editor::{HostRequest, MarkupEditor, ToolStyle};
pub use gesture::{GestureMachine, GestureOutcome, GestureState, Tool};
pub use model::{
    Annotation, AnnotationId, AnnotationKind, Measurement, NewAnnotation, PlanPoint, Shape,
};
pub use scene::{GesturePreview, Paint, Scene, SceneNode};
pub use selection::SelectionController;
pub use surface::SurfaceRect;
pub use wire::{decode_json, decode_row, decode_rows, AnnotationRow, CreateAnnotationRequest};
