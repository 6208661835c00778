//! Single-selection controller over the annotation set.
//!
//! Exactly one annotation may be selected at a time. Selection is a
//! UI-level relation tracked here, never a field on the model. Hit-testing
//! runs in reverse z-order (most-recently-added first) so the annotation
//! drawn on top wins, and the first hit replaces any prior selection.

use crate::model::{Annotation, AnnotationId, PlanPoint};

/// Tracks the sole selected annotation, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionController {
    selected: Option<AnnotationId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of the selected annotation, if any.
    pub fn selected_id(&self) -> Option<AnnotationId> {
        self.selected
    }

    /// Clears the selection without deleting anything.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Hit-tests the set at the given point. The topmost hit becomes the
    /// sole selection; clicking empty space clears it.
    pub fn select_at(
        &mut self,
        annotations: &[Annotation],
        point: &PlanPoint,
        tolerance: f64,
    ) -> Option<AnnotationId> {
        self.selected = annotations
            .iter()
            .rev()
            .find(|a| a.hit_test(point, tolerance))
            .map(|a| a.id);
        self.selected
    }

    /// Clears and returns the selection, for routing a delete request.
    pub fn take(&mut self) -> Option<AnnotationId> {
        self.selected.take()
    }

    /// Drops a selection whose annotation no longer exists in the set,
    /// e.g. after it was deleted server-side and the set was re-fetched.
    pub fn retain_valid(&mut self, annotations: &[Annotation]) {
        if let Some(id) = self.selected {
            if !annotations.iter().any(|a| a.id == id) {
                self.selected = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shape;
    use planmark_core::constants::HIT_TOLERANCE;

    fn p(x: f64, y: f64) -> PlanPoint {
        PlanPoint::new(x, y)
    }

    fn annotation(shape: Shape) -> Annotation {
        Annotation {
            id: uuid::Uuid::new_v4(),
            plan_id: uuid::Uuid::new_v4(),
            project_id: uuid::Uuid::new_v4(),
            color: "#ef4444".to_string(),
            stroke_width: 2.0,
            layer: "default".to_string(),
            shape,
            created_at: None,
        }
    }

    #[test]
    fn topmost_hit_wins() {
        let bottom = annotation(Shape::Rectangle {
            start: p(0.0, 0.0),
            end: p(50.0, 50.0),
        });
        let top = annotation(Shape::Rectangle {
            start: p(10.0, 10.0),
            end: p(40.0, 40.0),
        });
        let set = vec![bottom.clone(), top.clone()];

        let mut selection = SelectionController::new();
        // Inside both: the most recently added annotation is selected.
        assert_eq!(
            selection.select_at(&set, &p(20.0, 20.0), HIT_TOLERANCE),
            Some(top.id)
        );
        // Inside only the bottom one.
        assert_eq!(
            selection.select_at(&set, &p(45.0, 45.0), HIT_TOLERANCE),
            Some(bottom.id)
        );
    }

    #[test]
    fn empty_space_clears_selection() {
        let set = vec![annotation(Shape::Line {
            start: p(0.0, 0.0),
            end: p(10.0, 0.0),
        })];
        let mut selection = SelectionController::new();
        selection.select_at(&set, &p(5.0, 0.0), HIT_TOLERANCE);
        assert!(selection.selected_id().is_some());
        selection.select_at(&set, &p(80.0, 80.0), HIT_TOLERANCE);
        assert!(selection.selected_id().is_none());
    }

    #[test]
    fn at_most_one_selection_after_any_sequence() {
        let set: Vec<Annotation> = (0..5)
            .map(|i| {
                annotation(Shape::Rectangle {
                    start: p(i as f64 * 10.0, 0.0),
                    end: p(i as f64 * 10.0 + 8.0, 8.0),
                })
            })
            .collect();
        let mut selection = SelectionController::new();
        for probe in [(4.0, 4.0), (14.0, 4.0), (90.0, 90.0), (24.0, 4.0)] {
            selection.select_at(&set, &p(probe.0, probe.1), HIT_TOLERANCE);
            let count = set
                .iter()
                .filter(|a| Some(a.id) == selection.selected_id())
                .count();
            assert!(count <= 1);
        }
    }

    #[test]
    fn stale_selection_is_dropped_on_refresh() {
        let kept = annotation(Shape::Line {
            start: p(0.0, 0.0),
            end: p(10.0, 0.0),
        });
        let removed = annotation(Shape::Line {
            start: p(0.0, 20.0),
            end: p(10.0, 20.0),
        });
        let mut selection = SelectionController::new();
        let set = vec![kept.clone(), removed.clone()];
        selection.select_at(&set, &p(5.0, 20.0), HIT_TOLERANCE);
        assert_eq!(selection.selected_id(), Some(removed.id));

        selection.retain_valid(&[kept]);
        assert!(selection.selected_id().is_none());
    }
}
