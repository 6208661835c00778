//! Integration tests for the markup editor

use planmark_markup::{
    decode_rows, AnnotationRow, HostRequest, MarkupEditor, SceneNode, Shape, SurfaceRect, Tool,
};
use uuid::Uuid;

fn editor() -> MarkupEditor {
    MarkupEditor::new(Uuid::new_v4(), Uuid::new_v4())
}

fn surface() -> SurfaceRect {
    SurfaceRect::sized(1000.0, 500.0)
}

/// Device position for a plan-space percentage pair on the given surface.
fn device(surface: &SurfaceRect, x_pct: f64, y_pct: f64) -> (f64, f64) {
    (
        surface.left + x_pct / 100.0 * surface.width,
        surface.top + y_pct / 100.0 * surface.height,
    )
}

fn drag(
    editor: &mut MarkupEditor,
    surface: &SurfaceRect,
    tool: Tool,
    from: (f64, f64),
    to: (f64, f64),
) -> Vec<HostRequest> {
    editor.set_tool(tool);
    let (fx, fy) = device(surface, from.0, from.1);
    let (tx, ty) = device(surface, to.0, to.1);
    let mut requests = editor.pointer_down(fx, fy, surface);
    editor.pointer_move((fx + tx) / 2.0, (fy + ty) / 2.0, surface);
    editor.pointer_move(tx, ty, surface);
    requests.extend(editor.pointer_up(surface));
    requests
}

fn row_json(id: Uuid, body: &str) -> AnnotationRow {
    let json = format!(
        r#"{{
            "id": "{id}",
            "planId": "{}",
            "projectId": "{}",
            {body}
        }}"#,
        Uuid::new_v4(),
        Uuid::new_v4(),
    );
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_rectangle_drag_creates_annotation() {
    let mut editor = editor();
    let surface = surface();
    let requests = drag(
        &mut editor,
        &surface,
        Tool::Rectangle,
        (10.0, 10.0),
        (40.0, 30.0),
    );

    assert_eq!(requests.len(), 1);
    let HostRequest::Create(new) = &requests[0] else {
        panic!("expected create request");
    };
    let Shape::Rectangle { start, end } = &new.shape else {
        panic!("expected rectangle shape");
    };
    assert!((start.x - 10.0).abs() < 1e-6 && (start.y - 10.0).abs() < 1e-6);
    assert!((end.x - 40.0).abs() < 1e-6 && (end.y - 30.0).abs() < 1e-6);
}

#[test]
fn test_click_without_drag_creates_nothing() {
    let mut editor = editor();
    let surface = surface();
    editor.set_tool(Tool::Line);
    let (x, y) = device(&surface, 50.0, 50.0);
    let mut requests = editor.pointer_down(x, y, &surface);
    requests.extend(editor.pointer_up(&surface));
    assert!(requests.is_empty());
}

#[test]
fn test_freehand_needs_three_samples() {
    let mut editor = editor();
    let surface = surface();
    editor.set_tool(Tool::Freehand);
    let (x, y) = device(&surface, 10.0, 10.0);
    let mut requests = editor.pointer_down(x, y, &surface);
    let (x2, y2) = device(&surface, 20.0, 20.0);
    editor.pointer_move(x2, y2, &surface);
    requests.extend(editor.pointer_up(&surface));
    assert!(requests.is_empty());

    let requests = drag(
        &mut editor,
        &surface,
        Tool::Freehand,
        (10.0, 10.0),
        (20.0, 20.0),
    );
    assert_eq!(requests.len(), 1);
}

#[test]
fn test_text_flow_prompt_then_submit() {
    let mut editor = editor();
    let surface = surface();
    editor.set_tool(Tool::Text);
    let (x, y) = device(&surface, 30.0, 40.0);
    let requests = editor.pointer_down(x, y, &surface);
    assert!(matches!(requests[0], HostRequest::PromptText { .. }));

    let requests = editor.submit_text("  verify joist hangers  ");
    let HostRequest::Create(new) = &requests[0] else {
        panic!("expected create request");
    };
    let Shape::Text { text, anchor } = &new.shape else {
        panic!("expected text shape");
    };
    assert_eq!(text, "verify joist hangers");
    assert!((anchor.x - 30.0).abs() < 1e-6);
}

#[test]
fn test_empty_text_is_discarded() {
    let mut editor = editor();
    let surface = surface();
    editor.set_tool(Tool::Text);
    let (x, y) = device(&surface, 30.0, 40.0);
    editor.pointer_down(x, y, &surface);
    assert!(editor.submit_text("   ").is_empty());
}

#[test]
fn test_select_and_delete_workflow() {
    let mut editor = editor();
    let surface = surface();

    let line_id = Uuid::new_v4();
    let rect_id = Uuid::new_v4();
    let rows = vec![
        row_json(
            line_id,
            r#""annotationType": "line", "startX": 0.0, "startY": 0.0, "endX": 50.0, "endY": 0.0"#,
        ),
        row_json(
            rect_id,
            r#""annotationType": "rectangle", "startX": 60.0, "startY": 60.0, "endX": 90.0, "endY": 90.0"#,
        ),
    ];
    editor.set_annotations(decode_rows(rows));

    editor.set_tool(Tool::Select);
    let (x, y) = device(&surface, 75.0, 75.0);
    editor.pointer_down(x, y, &surface);
    assert_eq!(editor.selected_id(), Some(rect_id));

    let requests = editor.key_delete();
    assert_eq!(requests, vec![HostRequest::Delete(rect_id)]);
    assert!(editor.selected_id().is_none());

    // Nothing selected: delete is a no-op.
    assert!(editor.key_delete().is_empty());
}

#[test]
fn test_empty_space_click_clears_selection() {
    let mut editor = editor();
    let surface = surface();
    let id = Uuid::new_v4();
    editor.set_annotations(decode_rows(vec![row_json(
        id,
        r#""annotationType": "rectangle", "startX": 10.0, "startY": 10.0, "endX": 30.0, "endY": 30.0"#,
    )]));
    editor.set_tool(Tool::Select);

    let (x, y) = device(&surface, 20.0, 20.0);
    editor.pointer_down(x, y, &surface);
    assert_eq!(editor.selected_id(), Some(id));

    let (x, y) = device(&surface, 80.0, 80.0);
    editor.pointer_down(x, y, &surface);
    assert!(editor.selected_id().is_none());
}

#[test]
fn test_escape_discards_gesture_and_selection() {
    let mut editor = editor();
    let surface = surface();
    let id = Uuid::new_v4();
    editor.set_annotations(decode_rows(vec![row_json(
        id,
        r#""annotationType": "rectangle", "startX": 10.0, "startY": 10.0, "endX": 30.0, "endY": 30.0"#,
    )]));

    editor.set_tool(Tool::Select);
    let (x, y) = device(&surface, 20.0, 20.0);
    editor.pointer_down(x, y, &surface);
    assert!(editor.selected_id().is_some());
    editor.key_escape();
    assert!(editor.selected_id().is_none());

    editor.set_tool(Tool::Freehand);
    let (x, y) = device(&surface, 10.0, 10.0);
    editor.pointer_down(x, y, &surface);
    editor.pointer_move(x + 50.0, y + 50.0, &surface);
    editor.key_escape();
    assert!(editor.pointer_up(&surface).is_empty());
}

#[test]
fn test_delete_suppressed_while_text_entry_open() {
    let mut editor = editor();
    let surface = surface();
    let id = Uuid::new_v4();
    editor.set_annotations(decode_rows(vec![row_json(
        id,
        r#""annotationType": "rectangle", "startX": 10.0, "startY": 10.0, "endX": 30.0, "endY": 30.0"#,
    )]));
    editor.set_tool(Tool::Select);
    let (x, y) = device(&surface, 20.0, 20.0);
    editor.pointer_down(x, y, &surface);

    editor.set_tool(Tool::Text);
    let (x, y) = device(&surface, 50.0, 50.0);
    editor.pointer_down(x, y, &surface);

    // Backspace while typing must not delete the selected annotation.
    assert!(editor.key_delete().is_empty());
}

#[test]
fn test_disabled_surface_is_read_only() {
    let mut editor = editor();
    let surface = surface();
    let id = Uuid::new_v4();
    editor.set_annotations(decode_rows(vec![row_json(
        id,
        r#""annotationType": "line", "startX": 0.0, "startY": 0.0, "endX": 50.0, "endY": 50.0"#,
    )]));

    editor.set_drawing_enabled(false);
    let requests = drag(
        &mut editor,
        &surface,
        Tool::Rectangle,
        (10.0, 10.0),
        (40.0, 30.0),
    );
    assert!(requests.is_empty());
    assert!(editor.key_delete().is_empty());

    // The persisted set still renders as an overlay.
    let scene = editor.scene(&surface);
    assert!(!scene.is_empty());
}

#[test]
fn test_tool_switch_ignored_mid_gesture() {
    let mut editor = editor();
    let surface = surface();
    editor.set_tool(Tool::Line);
    let (x, y) = device(&surface, 10.0, 10.0);
    editor.pointer_down(x, y, &surface);
    editor.set_tool(Tool::Rectangle);
    let (x2, y2) = device(&surface, 40.0, 40.0);
    editor.pointer_move(x2, y2, &surface);
    let requests = editor.pointer_up(&surface);

    let HostRequest::Create(new) = &requests[0] else {
        panic!("expected create request");
    };
    assert!(matches!(new.shape, Shape::Line { .. }));
    // Once idle again the switch takes effect.
    editor.set_tool(Tool::Rectangle);
    assert_eq!(editor.tool(), Tool::Rectangle);
}

#[test]
fn test_created_annotation_carries_current_style() {
    let mut editor = editor();
    let surface = surface();
    editor.set_color("#22c55e");
    editor.set_stroke_width(4.0);
    editor.set_layer("structural");

    let requests = drag(
        &mut editor,
        &surface,
        Tool::Arrow,
        (10.0, 10.0),
        (40.0, 30.0),
    );
    let HostRequest::Create(new) = &requests[0] else {
        panic!("expected create request");
    };
    assert_eq!(new.color, "#22c55e");
    assert_eq!(new.stroke_width, 4.0);
    assert_eq!(new.layer, "structural");
}

#[test]
fn test_scene_includes_preview_and_handles() {
    let mut editor = editor();
    let surface = surface();
    let id = Uuid::new_v4();
    editor.set_annotations(decode_rows(vec![row_json(
        id,
        r#""annotationType": "rectangle", "startX": 10.0, "startY": 10.0, "endX": 30.0, "endY": 30.0"#,
    )]));

    editor.set_tool(Tool::Select);
    let (x, y) = device(&surface, 20.0, 20.0);
    editor.pointer_down(x, y, &surface);
    let scene = editor.scene(&surface);
    let handles = scene
        .nodes
        .iter()
        .filter(|n| matches!(n, SceneNode::Handle { .. }))
        .count();
    assert_eq!(handles, 4);

    editor.key_escape();
    editor.set_tool(Tool::Line);
    let (x, y) = device(&surface, 50.0, 50.0);
    editor.pointer_down(x, y, &surface);
    let (x2, y2) = device(&surface, 70.0, 70.0);
    editor.pointer_move(x2, y2, &surface);
    let scene = editor.scene(&surface);
    // One rect for the persisted annotation, one segment for the preview.
    assert!(scene
        .nodes
        .iter()
        .any(|n| matches!(n, SceneNode::Segment { paint, .. } if paint.opacity < 1.0)));
}
