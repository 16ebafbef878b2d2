//! Level 2: Node Drag Tests
//!
//! Drag batching into history, live group following, and snapping on release.

mod common;

use common::harness::EditorHarness;
use storming_editor::{snap_with_guides, Alignment, EditorConfig, Position, Size};

fn frames(from: Position, to: Position, count: usize) -> Vec<Position> {
    (1..=count)
        .map(|i| {
            let t = i as f32 / count as f32;
            Position::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
        })
        .collect()
}

#[test]
fn test_fifty_frame_drag_is_one_history_entry() {
    let harness = EditorHarness::new();
    let id = harness.place("Domain Event", 0.0, 0.0);
    let before = harness.past_len();

    harness.drag(&id, &frames(Position::new(0.0, 0.0), Position::new(400.0, 200.0), 50));

    assert_eq!(harness.past_len(), before + 1);
    assert_eq!(harness.node(&id).position, Position::new(400.0, 200.0));
}

#[test]
fn test_positions_apply_live_during_drag() {
    let harness = EditorHarness::new();
    let id = harness.place("Actor", 0.0, 0.0);

    harness
        .ctrl
        .apply_node_changes(&[storming_editor::NodeChange::drag(id.as_str(), Position::new(33.0, 44.0))]);

    assert!(harness.ctrl.editor().borrow().is_dragging());
    let view = harness.view(&id).unwrap();
    assert_eq!((view.x, view.y), (33.0, 44.0));
    assert_eq!(harness.past_len(), 1, "nothing recorded mid-drag");
}

#[test]
fn test_undo_drag_restores_start() {
    let harness = EditorHarness::new();
    let id = harness.place("Actor", 20.0, 40.0);

    harness.drag(&id, &frames(Position::new(20.0, 40.0), Position::new(300.0, 300.0), 10));
    harness.ctrl.undo();

    assert_eq!(harness.node(&id).position, Position::new(20.0, 40.0));
    harness.ctrl.redo();
    assert_eq!(harness.node(&id).position, Position::new(300.0, 300.0));
}

#[test]
fn test_multi_node_drag_is_one_entry() {
    let harness = EditorHarness::new();
    let a = harness.place("Actor", 0.0, 0.0);
    let b = harness.place("Action", 200.0, 0.0);
    let before = harness.past_len();

    harness.drag_group_of(&[&a, &b], 50, Position::new(2.0, 1.0));

    assert_eq!(harness.past_len(), before + 1);
    assert_eq!(harness.node(&a).position, Position::new(100.0, 50.0));
    assert_eq!(harness.node(&b).position, Position::new(300.0, 50.0));
}

// ============================================================================
// Groups follow their children
// ============================================================================

#[test]
fn test_group_follows_child_during_drag() {
    let harness = EditorHarness::new();
    let a = harness.place("Actor", 0.0, 0.0);
    let b = harness.place("Action", 200.0, 0.0);
    harness.select(&[&a, &b]);
    let group = harness.ctrl.editor().borrow_mut().create_behavior_group().unwrap();
    assert_eq!(harness.node(&group).size, Some(Size::new(400.0, 212.0)));

    harness
        .ctrl
        .apply_node_changes(&[storming_editor::NodeChange::drag(b.as_str(), Position::new(200.0, 100.0))]);

    let live = harness.node(&group);
    assert_eq!(live.position, Position::new(-40.0, -60.0));
    assert_eq!(live.size, Some(Size::new(400.0, 312.0)));
}

#[test]
fn test_undo_drag_restores_group_bounds() {
    let harness = EditorHarness::new();
    let a = harness.place("Actor", 0.0, 0.0);
    let b = harness.place("Action", 200.0, 0.0);
    harness.select(&[&a, &b]);
    let group = harness.ctrl.editor().borrow_mut().create_behavior_group().unwrap();
    let original = harness.node(&group);

    harness.drag(&b, &frames(Position::new(200.0, 0.0), Position::new(600.0, 400.0), 20));
    assert_ne!(harness.node(&group).size, original.size);

    harness.ctrl.undo();
    let restored = harness.node(&group);
    assert_eq!(restored.position, original.position);
    assert_eq!(restored.size, original.size);
}

// ============================================================================
// Snapping on release
// ============================================================================

#[test]
fn test_release_snaps_to_grid() {
    let harness = EditorHarness::new();
    let id = harness.place("Actor", 0.0, 0.0);

    harness.drag(&id, &[Position::new(47.0, 93.0)]);

    assert_eq!(harness.node(&id).position, Position::new(40.0, 100.0));
    let stopped = harness.tracker.drag_stopped.borrow();
    assert_eq!(stopped.as_slice(), &[(id.clone(), 47.0, 93.0)]);
}

#[test]
fn test_release_snaps_to_neighbour_edge() {
    let harness = EditorHarness::new();
    harness.place("Actor", 7.0, 3.0);
    let moving = harness.place("Actor", 500.0, 500.0);

    // grid gives x = 140, 13 from the neighbour's right edge at 127
    harness.drag(&moving, &[Position::new(131.0, 300.0)]);

    assert_eq!(harness.node(&moving).position, Position::new(127.0, 300.0));
}

#[test]
fn test_snapped_drag_is_still_one_undo_step() {
    let harness = EditorHarness::new();
    let id = harness.place("Actor", 0.0, 0.0);
    let before = harness.past_len();

    harness.drag(&id, &frames(Position::new(0.0, 0.0), Position::new(51.0, 49.0), 5));

    assert_eq!(harness.past_len(), before + 1);
    assert_eq!(harness.node(&id).position, Position::new(60.0, 40.0));
    harness.ctrl.undo();
    assert_eq!(harness.node(&id).position, Position::new(0.0, 0.0));
}

#[test]
fn test_snap_disabled_keeps_raw_position() {
    let config = EditorConfig {
        snap_on_release: false,
        ..EditorConfig::default()
    };
    let harness = EditorHarness::with_config(config);
    let id = harness.place("Actor", 0.0, 0.0);

    harness.drag(&id, &[Position::new(47.0, 93.0)]);

    assert_eq!(harness.node(&id).position, Position::new(47.0, 93.0));
}

#[test]
fn test_snap_tie_keeps_first_neighbour() {
    let harness = EditorHarness::new();
    let first = harness.place("Actor", 7.0, 0.0);
    harness.place("Actor", 153.0, 400.0);
    let moving = harness.place("Actor", 900.0, 900.0);

    let editor = harness.ctrl.editor();
    let editor = editor.borrow();
    let node = editor.node(&moving).unwrap();
    let outcome = snap_with_guides(node, Position::new(140.0, 200.0), editor.nodes(), editor.config());

    let horizontal = outcome.horizontal.expect("x snaps");
    assert_eq!(horizontal.target, first);
    assert_eq!(horizontal.alignment, Alignment::StartEnd);
    assert_eq!(outcome.position, Position::new(127.0, 200.0));
    assert!(outcome.vertical.is_none());
}
