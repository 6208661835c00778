//! Pointer-gesture state machine for the drawing tools.
//!
//! One gesture is in progress at a time: pointer-down starts it,
//! pointer-moves extend it, pointer-up finalizes or discards it. The
//! lifecycle is an explicit state enum with a payload per state, so
//! illegal combinations (a drag with no points, text entry during a drag)
//! are unrepresentable.
//!
//! The machine is strictly sequential and single-threaded; a pointer-down
//! arriving while a gesture is active is ignored so gestures never
//! interleave.

use tracing::debug;

use planmark_core::constants::{MIN_DRAG_EXTENT, MIN_PATH_POINTS};

use crate::model::{PlanPoint, Shape};

/// Drawing tools, including the `Select` and `Calibrate` pseudo-tools.
///
/// `Select` never enters a drag: pointer-downs route to the selection
/// controller instead. `Calibrate` follows the same two-point drag path as
/// `Line` but reports a reference segment instead of emitting a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Line,
    Arrow,
    Rectangle,
    Freehand,
    Text,
    MeasureDistance,
    MeasureArea,
    Calibrate,
}

impl Tool {
    /// Tools whose gesture accumulates a full path; every other drawing
    /// tool keeps only the fixed start and the latest end point.
    pub fn is_path_tool(self) -> bool {
        matches!(self, Tool::Freehand | Tool::MeasureArea)
    }

    /// Tools that begin a drag on pointer-down.
    pub fn starts_drag(self) -> bool {
        !matches!(self, Tool::Select | Tool::Text)
    }
}

/// The gesture lifecycle state. `points` is non-empty by construction:
/// `Dragging` is only ever entered with the pointer-down position.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging { tool: Tool, points: Vec<PlanPoint> },
    TextPending { anchor: PlanPoint },
}

/// What a state transition produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to report.
    None,
    /// A completed geometry ready to be wrapped in an annotation envelope.
    Completed(Shape),
    /// A calibrate gesture finalized with this reference segment.
    Calibrated { start: PlanPoint, end: PlanPoint },
    /// The text tool wants an inline text entry opened at this anchor.
    TextPrompt { anchor: PlanPoint },
    /// The gesture was discarded: sub-minimum size, too few path points,
    /// or empty text. Expected behavior, not a fault.
    Discarded,
}

/// Tracks the one in-progress gesture and applies the finalize rules.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureMachine {
    state: GestureState,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Whether an inline text entry is currently open. Deletion shortcuts
    /// are suppressed while this holds.
    pub fn is_text_pending(&self) -> bool {
        matches!(self.state, GestureState::TextPending { .. })
    }

    /// Starts a gesture for the given tool. `Select` is not a drawing
    /// gesture and produces no transition; the text tool opens an inline
    /// entry instead of dragging.
    pub fn pointer_down(&mut self, tool: Tool, at: PlanPoint) -> GestureOutcome {
        if !self.is_idle() {
            // Defensive: a second pointer-down mid-gesture is ignored.
            return GestureOutcome::None;
        }
        match tool {
            Tool::Select => GestureOutcome::None,
            Tool::Text => {
                self.state = GestureState::TextPending { anchor: at };
                GestureOutcome::TextPrompt { anchor: at }
            }
            _ => {
                self.state = GestureState::Dragging {
                    tool,
                    points: vec![at],
                };
                GestureOutcome::None
            }
        }
    }

    /// Extends the active drag. Path tools append every sample; two-point
    /// tools replace the end point while the start stays fixed.
    pub fn pointer_move(&mut self, at: PlanPoint) {
        let GestureState::Dragging { tool, points } = &mut self.state else {
            return;
        };
        if tool.is_path_tool() || points.len() < 2 {
            points.push(at);
        } else if let Some(end) = points.last_mut() {
            *end = at;
        }
    }

    /// Ends the active drag, applying the finalize rule: two-point shapes
    /// below the minimum drag extent and paths with too few points are
    /// discarded; everything else completes.
    pub fn pointer_up(&mut self) -> GestureOutcome {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Dragging { tool, points } => finalize(tool, points),
            other => {
                // Pointer-up is meaningless outside a drag; keep the state.
                self.state = other;
                GestureOutcome::None
            }
        }
    }

    /// Submits inline text entry. Emits a text shape iff the trimmed input
    /// is non-empty; otherwise the gesture is discarded.
    pub fn submit_text(&mut self, text: &str) -> GestureOutcome {
        let GestureState::TextPending { anchor } = self.state else {
            return GestureOutcome::None;
        };
        self.state = GestureState::Idle;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("empty text entry, discarding gesture");
            return GestureOutcome::Discarded;
        }
        GestureOutcome::Completed(Shape::Text {
            anchor,
            text: trimmed.to_string(),
        })
    }

    /// Discards any in-progress gesture (Escape from any state).
    pub fn cancel(&mut self) -> GestureOutcome {
        if self.is_idle() {
            return GestureOutcome::None;
        }
        self.state = GestureState::Idle;
        GestureOutcome::Discarded
    }

    /// The in-progress geometry for preview rendering, or `None` when
    /// there is nothing to draw yet. The calibrate reference renders like
    /// an unlabeled measurement segment.
    pub fn preview(&self) -> Option<Shape> {
        let GestureState::Dragging { tool, points } = &self.state else {
            return None;
        };
        if points.len() < 2 {
            return None;
        }
        let start = *points.first()?;
        let end = *points.last()?;
        match tool {
            Tool::Line => Some(Shape::Line { start, end }),
            Tool::Arrow => Some(Shape::Arrow { start, end }),
            Tool::Rectangle => Some(Shape::Rectangle { start, end }),
            Tool::MeasureDistance | Tool::Calibrate => Some(Shape::MeasureDistance {
                start,
                end,
                measurement: None,
            }),
            Tool::Freehand => Some(Shape::Freehand {
                path: points.clone(),
            }),
            Tool::MeasureArea => Some(Shape::MeasureArea {
                path: points.clone(),
                measurement: None,
            }),
            Tool::Select | Tool::Text => None,
        }
    }
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn finalize(tool: Tool, points: Vec<PlanPoint>) -> GestureOutcome {
    if tool.is_path_tool() {
        if points.len() < MIN_PATH_POINTS {
            debug!(
                recorded = points.len(),
                required = MIN_PATH_POINTS,
                "path gesture too short, discarding"
            );
            return GestureOutcome::Discarded;
        }
        return match tool {
            Tool::Freehand => GestureOutcome::Completed(Shape::Freehand { path: points }),
            _ => GestureOutcome::Completed(Shape::MeasureArea {
                path: points,
                measurement: None,
            }),
        };
    }

    let Some(&start) = points.first() else {
        return GestureOutcome::Discarded;
    };
    let end = points.last().copied().unwrap_or(start);
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    if dx < MIN_DRAG_EXTENT && dy < MIN_DRAG_EXTENT {
        debug!(%dx, %dy, "gesture below minimum drag extent, discarding");
        return GestureOutcome::Discarded;
    }

    match tool {
        Tool::Line => GestureOutcome::Completed(Shape::Line { start, end }),
        Tool::Arrow => GestureOutcome::Completed(Shape::Arrow { start, end }),
        Tool::Rectangle => GestureOutcome::Completed(Shape::Rectangle { start, end }),
        Tool::MeasureDistance => GestureOutcome::Completed(Shape::MeasureDistance {
            start,
            end,
            measurement: None,
        }),
        Tool::Calibrate => GestureOutcome::Calibrated { start, end },
        // Select and Text never enter a drag; path tools returned above.
        _ => GestureOutcome::Discarded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> PlanPoint {
        PlanPoint::new(x, y)
    }

    fn drag(machine: &mut GestureMachine, tool: Tool, points: &[(f64, f64)]) -> GestureOutcome {
        let mut it = points.iter();
        let (x, y) = it.next().copied().unwrap();
        machine.pointer_down(tool, p(x, y));
        for &(x, y) in it {
            machine.pointer_move(p(x, y));
        }
        machine.pointer_up()
    }

    #[test]
    fn rectangle_drag_completes_with_start_and_end() {
        let mut machine = GestureMachine::new();
        let outcome = drag(
            &mut machine,
            Tool::Rectangle,
            &[(10.0, 10.0), (25.0, 18.0), (40.0, 30.0)],
        );
        assert_eq!(
            outcome,
            GestureOutcome::Completed(Shape::Rectangle {
                start: p(10.0, 10.0),
                end: p(40.0, 30.0),
            })
        );
        assert!(machine.is_idle());
    }

    #[test]
    fn click_without_drag_is_discarded() {
        let mut machine = GestureMachine::new();
        let outcome = drag(&mut machine, Tool::Line, &[(50.0, 50.0)]);
        assert_eq!(outcome, GestureOutcome::Discarded);
    }

    #[test]
    fn sub_threshold_drag_is_discarded() {
        let mut machine = GestureMachine::new();
        let outcome = drag(&mut machine, Tool::Line, &[(50.0, 50.0), (50.5, 50.5)]);
        assert_eq!(outcome, GestureOutcome::Discarded);
    }

    #[test]
    fn one_large_axis_is_enough() {
        let mut machine = GestureMachine::new();
        let outcome = drag(&mut machine, Tool::Line, &[(50.0, 50.0), (60.0, 50.2)]);
        assert!(matches!(outcome, GestureOutcome::Completed(_)));
    }

    #[test]
    fn two_point_tools_keep_only_the_latest_end() {
        let mut machine = GestureMachine::new();
        machine.pointer_down(Tool::Arrow, p(0.0, 0.0));
        machine.pointer_move(p(10.0, 10.0));
        machine.pointer_move(p(20.0, 20.0));
        machine.pointer_move(p(30.0, 5.0));
        let GestureOutcome::Completed(Shape::Arrow { start, end }) = machine.pointer_up() else {
            panic!("expected completed arrow");
        };
        assert_eq!(start, p(0.0, 0.0));
        assert_eq!(end, p(30.0, 5.0));
    }

    #[test]
    fn path_tools_accumulate_every_sample() {
        let mut machine = GestureMachine::new();
        machine.pointer_down(Tool::Freehand, p(0.0, 0.0));
        machine.pointer_move(p(5.0, 5.0));
        machine.pointer_move(p(10.0, 0.0));
        let GestureOutcome::Completed(Shape::Freehand { path }) = machine.pointer_up() else {
            panic!("expected completed freehand");
        };
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn short_paths_are_discarded() {
        for tool in [Tool::Freehand, Tool::MeasureArea] {
            let mut machine = GestureMachine::new();
            let outcome = drag(&mut machine, tool, &[(0.0, 0.0), (10.0, 10.0)]);
            assert_eq!(outcome, GestureOutcome::Discarded, "{tool:?}");
        }
    }

    #[test]
    fn three_collinear_points_still_persist() {
        let mut machine = GestureMachine::new();
        let outcome = drag(
            &mut machine,
            Tool::MeasureArea,
            &[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)],
        );
        assert!(matches!(outcome, GestureOutcome::Completed(_)));
    }

    #[test]
    fn calibrate_reports_the_reference_segment() {
        let mut machine = GestureMachine::new();
        let outcome = drag(&mut machine, Tool::Calibrate, &[(0.0, 0.0), (50.0, 0.0)]);
        assert_eq!(
            outcome,
            GestureOutcome::Calibrated {
                start: p(0.0, 0.0),
                end: p(50.0, 0.0),
            }
        );
    }

    #[test]
    fn calibrate_reuses_the_minimum_size_discard() {
        let mut machine = GestureMachine::new();
        let outcome = drag(&mut machine, Tool::Calibrate, &[(0.0, 0.0), (0.4, 0.4)]);
        assert_eq!(outcome, GestureOutcome::Discarded);
    }

    #[test]
    fn text_tool_opens_entry_instead_of_dragging() {
        let mut machine = GestureMachine::new();
        let outcome = machine.pointer_down(Tool::Text, p(30.0, 40.0));
        assert_eq!(
            outcome,
            GestureOutcome::TextPrompt {
                anchor: p(30.0, 40.0)
            }
        );
        assert!(machine.is_text_pending());
    }

    #[test]
    fn text_submit_trims_and_discards_empty() {
        let mut machine = GestureMachine::new();
        machine.pointer_down(Tool::Text, p(30.0, 40.0));
        assert_eq!(machine.submit_text("   "), GestureOutcome::Discarded);

        machine.pointer_down(Tool::Text, p(30.0, 40.0));
        let GestureOutcome::Completed(Shape::Text { text, .. }) =
            machine.submit_text("  check footing  ")
        else {
            panic!("expected completed text");
        };
        assert_eq!(text, "check footing");
    }

    #[test]
    fn escape_discards_from_any_state() {
        let mut machine = GestureMachine::new();
        machine.pointer_down(Tool::Freehand, p(0.0, 0.0));
        assert_eq!(machine.cancel(), GestureOutcome::Discarded);
        assert!(machine.is_idle());

        machine.pointer_down(Tool::Text, p(0.0, 0.0));
        assert_eq!(machine.cancel(), GestureOutcome::Discarded);
        assert!(machine.is_idle());

        assert_eq!(machine.cancel(), GestureOutcome::None);
    }

    #[test]
    fn second_pointer_down_is_ignored_mid_gesture() {
        let mut machine = GestureMachine::new();
        machine.pointer_down(Tool::Line, p(0.0, 0.0));
        let outcome = machine.pointer_down(Tool::Rectangle, p(50.0, 50.0));
        assert_eq!(outcome, GestureOutcome::None);
        machine.pointer_move(p(20.0, 20.0));
        assert!(matches!(
            machine.pointer_up(),
            GestureOutcome::Completed(Shape::Line { .. })
        ));
    }

    #[test]
    fn select_never_enters_a_drag() {
        let mut machine = GestureMachine::new();
        assert_eq!(
            machine.pointer_down(Tool::Select, p(10.0, 10.0)),
            GestureOutcome::None
        );
        assert!(machine.is_idle());
    }

    #[test]
    fn preview_tracks_the_drag() {
        let mut machine = GestureMachine::new();
        machine.pointer_down(Tool::Rectangle, p(10.0, 10.0));
        assert!(machine.preview().is_none());
        machine.pointer_move(p(30.0, 25.0));
        assert_eq!(
            machine.preview(),
            Some(Shape::Rectangle {
                start: p(10.0, 10.0),
                end: p(30.0, 25.0),
            })
        );
    }
}
