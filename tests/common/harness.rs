//! Test harness for the diagram controller.
//!
//! Wires a [`DiagramController`] to an in-memory store with every callback
//! tracked, and offers helpers that simulate what the canvas widget reports
//! for clicks, drags and connections.

#![allow(dead_code)]

use super::CallbackTracker;
use slint::{Model, SharedString};
use storming_editor::{
    DiagramController, DiagramEditor, DiagramState, EditorConfig, MemoryStore, Node,
    NodeChange, NodeView, Position,
};

/// Seed for the placement jitter, so unplaced inserts are reproducible.
pub const SEED: u64 = 42;

pub struct EditorHarness {
    pub ctrl: DiagramController,
    pub store: MemoryStore,
    pub tracker: CallbackTracker,
    connect: Box<dyn Fn(SharedString, SharedString) -> bool>,
    drag_stop: Box<dyn Fn(SharedString, f32, f32)>,
    label_edit: Box<dyn Fn(SharedString, SharedString) -> bool>,
}

impl EditorHarness {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::with_store(config, MemoryStore::new())
    }

    /// Harness over an existing store (e.g. one a previous session saved to).
    pub fn with_store(config: EditorConfig, store: MemoryStore) -> Self {
        let editor = DiagramEditor::with_seed(config, SEED);
        let ctrl = DiagramController::with_editor(editor, store.clone());
        let tracker = CallbackTracker::new();

        ctrl.subscribe_history({
            let tracker = tracker.clone();
            move |summary| tracker.history.borrow_mut().push(summary)
        });

        let connect = {
            let inner = ctrl.connect_callback();
            let tracker = tracker.clone();
            Box::new(move |source: SharedString, target: SharedString| {
                let accepted = inner(source.clone(), target.clone());
                tracker
                    .connect
                    .borrow_mut()
                    .push((source.to_string(), target.to_string(), accepted));
                accepted
            })
        };

        let drag_stop = {
            let inner = ctrl.node_drag_stop_callback();
            let tracker = tracker.clone();
            Box::new(move |id: SharedString, x: f32, y: f32| {
                tracker.drag_stopped.borrow_mut().push((id.to_string(), x, y));
                inner(id, x, y);
            })
        };

        let label_edit = {
            let inner = ctrl.label_edit_callback();
            let tracker = tracker.clone();
            Box::new(move |id: SharedString, text: SharedString| {
                tracker
                    .label_edited
                    .borrow_mut()
                    .push((id.to_string(), text.to_string()));
                inner(id, text)
            })
        };

        Self {
            ctrl,
            store,
            tracker,
            connect,
            drag_stop,
            label_edit,
        }
    }

    // === Building a board ===

    /// Add a palette shape at an explicit canvas position with nothing
    /// selected, so the position is used as given.
    pub fn place(&self, shape: &str, x: f32, y: f32) -> String {
        self.ctrl.clear_selection();
        self.add(shape, Some(Position::new(x, y)))
    }

    /// Add a palette shape the way a sidebar click does.
    pub fn add(&self, shape: &str, position: Option<Position>) -> String {
        let spec = storming_editor::find_shape(shape).expect("shape exists in the palette");
        self.ctrl
            .activate_shape(spec, position)
            .expect("adding a shape succeeds")
    }

    pub fn connect(&self, source: &str, target: &str) -> bool {
        (self.connect)(source.into(), target.into())
    }

    pub fn edit_label(&self, id: &str, text: &str) -> bool {
        (self.label_edit)(id.into(), text.into())
    }

    pub fn select(&self, ids: &[&str]) {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        self.ctrl.select_nodes(&ids);
    }

    // === Gestures ===

    /// Drag `id` through `path`, release it, then fire the drag-stop
    /// handler at the last point.
    pub fn drag(&self, id: &str, path: &[Position]) {
        for &point in path {
            self.ctrl.apply_node_changes(&[NodeChange::drag(id, point)]);
        }
        self.ctrl.apply_node_changes(&[NodeChange::drag_end(id, None)]);
        if let Some(last) = path.last() {
            (self.drag_stop)(id.into(), last.x, last.y);
        }
    }

    /// Drag every id in `ids` by the same offset per frame, without snapping.
    pub fn drag_group_of(&self, ids: &[&str], frames: usize, step: Position) {
        let starts: Vec<Position> = ids.iter().map(|id| self.node(id).position).collect();
        for frame in 1..=frames {
            let changes: Vec<NodeChange> = ids
                .iter()
                .zip(&starts)
                .map(|(id, start)| {
                    let k = frame as f32;
                    NodeChange::drag(*id, Position::new(start.x + step.x * k, start.y + step.y * k))
                })
                .collect();
            self.ctrl.apply_node_changes(&changes);
        }
        let release: Vec<NodeChange> = ids.iter().map(|id| NodeChange::drag_end(*id, None)).collect();
        self.ctrl.apply_node_changes(&release);
    }

    // === Inspection ===

    pub fn state(&self) -> DiagramState {
        self.ctrl.snapshot()
    }

    pub fn node(&self, id: &str) -> Node {
        self.ctrl
            .editor()
            .borrow()
            .node(id)
            .cloned()
            .unwrap_or_else(|| panic!("node {id} should exist"))
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.ctrl.editor().borrow().node(id).is_some()
    }

    pub fn selected(&self) -> Vec<String> {
        self.ctrl.editor().borrow().selection().ids()
    }

    pub fn past_len(&self) -> usize {
        self.ctrl.history_summary().past_len
    }

    pub fn future_len(&self) -> usize {
        self.ctrl.history_summary().future_len
    }

    /// The rendered node row for `id`.
    pub fn view(&self, id: &str) -> Option<NodeView> {
        self.ctrl.nodes_model().iter().find(|v| v.id == id)
    }
}

impl Default for EditorHarness {
    fn default() -> Self {
        Self::new()
    }
}
