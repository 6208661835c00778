//! Editor integration layer.
//!
//! `MarkupEditor` wires the gesture machine, selection controller,
//! calibration, and the externally-owned annotation set together, and
//! turns pointer/keyboard events into `HostRequest` values for the host to
//! act on. All transitions complete synchronously and optimistically:
//! persistence runs on the host's side of the boundary, and a failed
//! persistence call never rolls back local state.

use uuid::Uuid;

use planmark_core::constants::HIT_TOLERANCE;

use crate::calibrate::{self, Calibration};
use crate::gesture::{GestureMachine, GestureOutcome, Tool};
use crate::model::{Annotation, AnnotationId, NewAnnotation, PlanPoint};
use crate::scene::{self, GesturePreview, Scene};
use crate::selection::SelectionController;
use crate::surface::SurfaceRect;

/// Style applied to annotations created with the current tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolStyle {
    pub color: String,
    pub stroke_width: f64,
    pub layer: String,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            color: planmark_core::constants::DEFAULT_COLOR.to_string(),
            stroke_width: planmark_core::constants::DEFAULT_STROKE_WIDTH,
            layer: planmark_core::constants::DEFAULT_LAYER.to_string(),
        }
    }
}

/// A request for the host / persistence collaborator to act on. The
/// engine fires these and moves on; results flow back in as inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum HostRequest {
    /// Persist a finalized gesture. On success the backend's row flows
    /// back through `set_annotations` with its assigned id.
    Create(NewAnnotation),
    /// Remove a persisted annotation.
    Delete(AnnotationId),
    /// A calibrate gesture finalized with this reference segment; the host
    /// prompts for the real-world length and unit and feeds the resulting
    /// calibration back through `set_calibration`.
    CalibrationCaptured { start: PlanPoint, end: PlanPoint },
    /// Open the inline text entry affordance at this anchor; the entry
    /// resolves through `submit_text` or `key_escape`.
    PromptText { anchor: PlanPoint },
}

/// The drawing surface's interactive state for one plan.
#[derive(Debug, Clone)]
pub struct MarkupEditor {
    plan_id: Uuid,
    project_id: Uuid,
    tool: Tool,
    style: ToolStyle,
    drawing_enabled: bool,
    gesture: GestureMachine,
    selection: SelectionController,
    annotations: Vec<Annotation>,
    calibration: Option<Calibration>,
}

impl MarkupEditor {
    pub fn new(plan_id: Uuid, project_id: Uuid) -> Self {
        Self {
            plan_id,
            project_id,
            tool: Tool::Select,
            style: ToolStyle::default(),
            drawing_enabled: true,
            gesture: GestureMachine::new(),
            selection: SelectionController::new(),
            annotations: Vec::new(),
            calibration: None,
        }
    }

    /// Replaces the persisted annotation set for the active plan. The
    /// engine never fetches; the host supplies the set and re-supplies it
    /// after create/delete round-trips.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
        self.selection.retain_valid(&self.annotations);
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Sets the host-owned calibration for the current plan. Previously
    /// persisted measurements keep their stored values.
    pub fn set_calibration(&mut self, calibration: Option<Calibration>) {
        self.calibration = calibration;
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Switches the active tool. Ignored while a gesture is in progress so
    /// gestures never change shape midway.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.gesture.is_idle() {
            self.tool = tool;
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.style.color = color.into();
    }

    /// Sets the stroke width; non-positive values are ignored.
    pub fn set_stroke_width(&mut self, width: f64) {
        if width > 0.0 {
            self.style.stroke_width = width;
        }
    }

    pub fn set_layer(&mut self, layer: impl Into<String>) {
        self.style.layer = layer.into();
    }

    pub fn style(&self) -> &ToolStyle {
        &self.style
    }

    /// Master enable switch. When disabled the surface is a read-only
    /// overlay: the in-progress gesture is discarded, the selection is
    /// cleared, and pointer/keyboard input is ignored.
    pub fn set_drawing_enabled(&mut self, enabled: bool) {
        self.drawing_enabled = enabled;
        if !enabled {
            self.gesture.cancel();
            self.selection.clear();
        }
    }

    pub fn is_drawing_enabled(&self) -> bool {
        self.drawing_enabled
    }

    pub fn selected_id(&self) -> Option<AnnotationId> {
        self.selection.selected_id()
    }

    /// Pointer-down at a device position. The surface rectangle is
    /// captured per event because the surface may have resized or scrolled
    /// since the last one.
    pub fn pointer_down(
        &mut self,
        device_x: f64,
        device_y: f64,
        surface: &SurfaceRect,
    ) -> Vec<HostRequest> {
        if !self.drawing_enabled {
            return Vec::new();
        }
        let at = surface.to_plan_space(device_x, device_y);
        if self.tool == Tool::Select {
            self.selection.select_at(&self.annotations, &at, HIT_TOLERANCE);
            return Vec::new();
        }
        match self.gesture.pointer_down(self.tool, at) {
            GestureOutcome::TextPrompt { anchor } => vec![HostRequest::PromptText { anchor }],
            _ => Vec::new(),
        }
    }

    /// Pointer-move at a device position; extends the active gesture.
    pub fn pointer_move(&mut self, device_x: f64, device_y: f64, surface: &SurfaceRect) {
        if !self.drawing_enabled {
            return;
        }
        self.gesture
            .pointer_move(surface.to_plan_space(device_x, device_y));
    }

    /// Pointer-up: finalizes the active gesture. A completed measurement
    /// takes its value from the calibration and surface in effect right
    /// now; re-calibration later does not rewrite it.
    pub fn pointer_up(&mut self, surface: &SurfaceRect) -> Vec<HostRequest> {
        if !self.drawing_enabled {
            return Vec::new();
        }
        match self.gesture.pointer_up() {
            GestureOutcome::Completed(mut shape) => {
                calibrate::attach_measurement(&mut shape, self.calibration.as_ref(), surface);
                vec![HostRequest::Create(NewAnnotation {
                    plan_id: self.plan_id,
                    project_id: self.project_id,
                    color: self.style.color.clone(),
                    stroke_width: self.style.stroke_width,
                    layer: self.style.layer.clone(),
                    shape,
                })]
            }
            GestureOutcome::Calibrated { start, end } => {
                vec![HostRequest::CalibrationCaptured { start, end }]
            }
            _ => Vec::new(),
        }
    }

    /// Resolves a pending inline text entry.
    pub fn submit_text(&mut self, text: &str) -> Vec<HostRequest> {
        if !self.drawing_enabled {
            return Vec::new();
        }
        match self.gesture.submit_text(text) {
            GestureOutcome::Completed(shape) => vec![HostRequest::Create(NewAnnotation {
                plan_id: self.plan_id,
                project_id: self.project_id,
                color: self.style.color.clone(),
                stroke_width: self.style.stroke_width,
                layer: self.style.layer.clone(),
                shape,
            })],
            _ => Vec::new(),
        }
    }

    /// Escape: discards any in-progress gesture and clears the selection.
    /// Purely local; nothing is sent to the host.
    pub fn key_escape(&mut self) {
        if !self.drawing_enabled {
            return;
        }
        self.gesture.cancel();
        self.selection.clear();
    }

    /// Delete/Backspace: issues a delete for the selection and clears it.
    /// Suppressed while a text entry is open so typed backspaces never
    /// delete annotations.
    pub fn key_delete(&mut self) -> Vec<HostRequest> {
        if !self.drawing_enabled || self.gesture.is_text_pending() {
            return Vec::new();
        }
        match self.selection.take() {
            Some(id) => vec![HostRequest::Delete(id)],
            None => Vec::new(),
        }
    }

    /// Renders the current state against the live surface size.
    pub fn scene(&self, surface: &SurfaceRect) -> Scene {
        let preview = self.gesture.preview().map(|shape| GesturePreview {
            shape,
            color: self.style.color.clone(),
            stroke_width: self.style.stroke_width,
        });
        scene::render(
            &self.annotations,
            preview.as_ref(),
            self.selection.selected_id(),
            self.calibration.as_ref(),
            surface,
        )
    }
}
