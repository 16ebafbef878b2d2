//! High-level controller for an Event Storming canvas.
//!
//! The [`DiagramController`] wires a [`DiagramEditor`] to the rendering side:
//! it mirrors the canonical diagram into Slint models after every operation,
//! converts screen coordinates to canvas coordinates, dispatches keyboard
//! shortcuts, persists through a [`DiagramStore`] and publishes a
//! [`HistorySummary`] to whoever draws the history panel.
//!
//! # Example
//!
//! ```ignore
//! use storming_editor::{DiagramController, EditorConfig, FileStore};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = DiagramController::new(EditorConfig::default(), FileStore::new("./boards"));
//!     ctrl.load();
//!
//!     window.set_nodes(ctrl.nodes_model());
//!     window.set_edges(ctrl.edges_model());
//!
//!     window.on_connect(ctrl.connect_callback());
//!     window.on_node_drag_stop(ctrl.node_drag_stop_callback());
//!     window.on_label_edited(ctrl.label_edit_callback());
//!
//!     ctrl.subscribe_history({
//!         let w = window.as_weak();
//!         move |summary| {
//!             if let Some(w) = w.upgrade() {
//!                 w.set_can_undo(summary.can_undo());
//!                 w.set_can_redo(summary.can_redo());
//!             }
//!         }
//!     });
//!
//!     window.run().unwrap();
//! }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use slint::{Color, ModelRc, SharedString, VecModel};

use crate::changes::{Connection, EdgeChange, NodeChange, PositionUpdate};
use crate::config::EditorConfig;
use crate::editor::DiagramEditor;
use crate::error::EditorError;
use crate::grid::background_grid_commands;
use crate::hit_test::{node_at, nodes_in_selection_box, selection_rect};
use crate::history::HistorySummary;
use crate::palette::{find_shape, parse_hex_color, ShapeSpec};
use crate::persistence::{DiagramStore, KeyValueStore};
use crate::selection::SelectionManager;
use crate::shortcuts::{KeyChord, Shortcut};
use crate::state::{DiagramState, Edge, Node, NodeConfig, Position, Size};

/// A node as the canvas draws it, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: SharedString,
    pub label: SharedString,
    pub icon: SharedString,
    pub kind: SharedString,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    pub text_color: Color,
    pub selected: bool,
    pub is_group: bool,
    pub z: i32,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        let size = node.footprint();
        Self {
            id: node.id.as_str().into(),
            label: node.data.label.as_str().into(),
            icon: node.data.icon.as_str().into(),
            kind: node.kind().map(|k| k.as_str()).unwrap_or_default().into(),
            x: node.position.x,
            y: node.position.y,
            width: size.width,
            height: size.height,
            color: hex_to_color(&node.data.color),
            text_color: hex_to_color(&node.data.text_color),
            selected: node.selected,
            is_group: node.is_group(),
            z: node.z_index(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    pub id: SharedString,
    pub source: SharedString,
    pub target: SharedString,
    pub selected: bool,
}

impl From<&Edge> for EdgeView {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.as_str().into(),
            source: edge.source.as_str().into(),
            target: edge.target.as_str().into(),
            selected: edge.selected,
        }
    }
}

fn hex_to_color(hex: &str) -> Color {
    parse_hex_color(hex)
        .map(|(r, g, b)| Color::from_rgb_u8(r, g, b))
        .unwrap_or_default()
}

type HistoryListener = Box<dyn Fn(HistorySummary)>;

/// Controller that owns the editor and keeps the Slint models in step with it.
///
/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct DiagramController {
    editor: Rc<RefCell<DiagramEditor>>,
    store: Rc<DiagramStore>,
    nodes: Rc<VecModel<NodeView>>,
    edges: Rc<VecModel<EdgeView>>,
    selected_ids: Rc<VecModel<SharedString>>,
    zoom: Rc<RefCell<f32>>,
    pan: Rc<RefCell<Position>>,
    viewport_size: Rc<RefCell<Size>>,
    history_listeners: Rc<RefCell<Vec<HistoryListener>>>,
}

impl DiagramController {
    /// Create a controller that persists into `store` under
    /// `config.storage_key`.
    pub fn new(config: EditorConfig, store: impl KeyValueStore + 'static) -> Self {
        Self::with_editor(DiagramEditor::new(config), store)
    }

    /// Like [`DiagramController::new`] but with a prepared editor, e.g. one
    /// with a seeded RNG or a custom validator. The storage key comes from the
    /// editor's config.
    pub fn with_editor(editor: DiagramEditor, store: impl KeyValueStore + 'static) -> Self {
        let store = DiagramStore::with_key(store, editor.config().storage_key.clone());
        let ctrl = Self {
            editor: Rc::new(RefCell::new(editor)),
            store: Rc::new(store),
            nodes: Rc::new(VecModel::from(Vec::new())),
            edges: Rc::new(VecModel::from(Vec::new())),
            selected_ids: Rc::new(VecModel::default()),
            zoom: Rc::new(RefCell::new(1.0)),
            pan: Rc::new(RefCell::new(Position::default())),
            viewport_size: Rc::new(RefCell::new(Size::default())),
            history_listeners: Rc::new(RefCell::new(Vec::new())),
        };
        ctrl.refresh_models();
        ctrl
    }

    /// Get access to the editor.
    pub fn editor(&self) -> Rc<RefCell<DiagramEditor>> {
        self.editor.clone()
    }

    pub fn snapshot(&self) -> DiagramState {
        self.editor.borrow().snapshot()
    }

    pub fn history_summary(&self) -> HistorySummary {
        self.editor.borrow().history_summary()
    }

    pub fn nodes_model(&self) -> ModelRc<NodeView> {
        ModelRc::from(self.nodes.clone())
    }

    pub fn edges_model(&self) -> ModelRc<EdgeView> {
        ModelRc::from(self.edges.clone())
    }

    pub fn selection_model(&self) -> ModelRc<SharedString> {
        ModelRc::from(self.selected_ids.clone())
    }

    /// Call `listener` with the new summary after every operation.
    pub fn subscribe_history(&self, listener: impl Fn(HistorySummary) + 'static) {
        self.history_listeners.borrow_mut().push(Box::new(listener));
    }

    /// Run `op` against the editor, then refresh the models and notify
    /// history listeners.
    fn update<R>(&self, op: impl FnOnce(&mut DiagramEditor) -> R) -> R {
        let result = op(&mut *self.editor.borrow_mut());
        self.refresh_models();
        self.notify_history();
        result
    }

    fn refresh_models(&self) {
        let editor = self.editor.borrow();
        let state = editor.state();
        self.nodes
            .set_vec(state.render_order().map(NodeView::from).collect::<Vec<_>>());
        self.edges
            .set_vec(state.edges.iter().map(EdgeView::from).collect::<Vec<_>>());
        editor.selection().sync_to_model(&self.selected_ids);
    }

    fn notify_history(&self) {
        let summary = self.history_summary();
        for listener in self.history_listeners.borrow().iter() {
            listener(summary);
        }
    }

    // === Persistence ===

    pub fn save(&self) -> bool {
        self.store.save_diagram(self.editor.borrow().state())
    }

    /// Replace the diagram with the stored one (or an empty one).
    pub fn load(&self) {
        let state = self.store.load_diagram();
        self.update(|ed| ed.load_state(state));
    }

    // === Viewport ===

    pub fn zoom(&self) -> f32 {
        *self.zoom.borrow()
    }

    pub fn pan(&self) -> Position {
        *self.pan.borrow()
    }

    /// Set viewport state: zoom, pan_x, pan_y.
    pub fn set_viewport(&self, zoom: f32, pan_x: f32, pan_y: f32) {
        *self.zoom.borrow_mut() = zoom;
        *self.pan.borrow_mut() = Position::new(pan_x, pan_y);
        self.update_viewport_center();
    }

    /// Set the on-screen size of the canvas widget.
    pub fn set_viewport_size(&self, width: f32, height: f32) {
        *self.viewport_size.borrow_mut() = Size::new(width, height);
        self.update_viewport_center();
    }

    fn update_viewport_center(&self) {
        let size = *self.viewport_size.borrow();
        let center = self.screen_to_world(Position::new(size.width / 2.0, size.height / 2.0));
        self.editor.borrow_mut().set_viewport_center(center);
    }

    pub fn screen_to_world(&self, point: Position) -> Position {
        let zoom = *self.zoom.borrow();
        let pan = *self.pan.borrow();
        let z = if zoom > 0.0 { zoom } else { 1.0 };
        Position::new((point.x - pan.x) / z, (point.y - pan.y) / z)
    }

    /// Background grid for the current viewport.
    pub fn grid_commands(&self) -> SharedString {
        let size = *self.viewport_size.borrow();
        let spacing = self.editor.borrow().config().grid_size;
        background_grid_commands(size.width, size.height, self.zoom(), self.pan(), spacing).into()
    }

    // === Palette ===

    /// Handle a click on a sidebar entry.
    ///
    /// The group entry groups the current selection; every other entry adds a
    /// node. Returns the id of whatever was created.
    pub fn activate_shape(&self, shape: &ShapeSpec, position: Option<Position>) -> Result<String, EditorError> {
        if shape.is_group {
            return self.update(|ed| ed.create_behavior_group());
        }
        let config = NodeConfig::from_shape(shape);
        Ok(self.update(|ed| ed.add_node(&config, position)))
    }

    /// Drop a palette shape, by name, at a screen position.
    pub fn drop_shape(&self, name: &str, screen: Position) -> Option<String> {
        let Some(shape) = find_shape(name) else {
            log::warn!("Unknown shape '{name}' dropped on canvas");
            return None;
        };
        self.activate_shape(shape, Some(self.screen_to_world(screen))).ok()
    }

    // === Selection ===

    /// Click on the canvas at a screen position.
    pub fn click(&self, screen: Position, shift_held: bool) {
        let point = self.screen_to_world(screen);
        let hit = node_at(point, self.editor.borrow().nodes());

        let mut selection: SelectionManager = self.editor.borrow().selection().clone();
        match hit {
            Some(id) => selection.handle_interaction(&id, shift_held),
            None if !shift_held => selection.clear(),
            None => return,
        }
        let ids = selection.ids();
        self.update(|ed| ed.select_nodes(&ids));
    }

    /// Marquee selection between two screen corners. With `additive` the box
    /// extends the current selection instead of replacing it.
    pub fn select_in_box(&self, from: Position, to: Position, additive: bool) -> Vec<String> {
        let rect = selection_rect(self.screen_to_world(from), self.screen_to_world(to));
        let mut ids = nodes_in_selection_box(rect, self.editor.borrow().nodes());
        if additive {
            let editor = self.editor.borrow();
            let kept: Vec<String> = editor
                .selection()
                .iter()
                .filter(|id| !ids.iter().any(|i| i == id))
                .map(str::to_string)
                .collect();
            ids = kept.into_iter().chain(ids).collect();
        }
        self.update(|ed| ed.select_nodes(&ids));
        ids
    }

    pub fn select_nodes(&self, ids: &[String]) {
        self.update(|ed| ed.select_nodes(ids))
    }

    pub fn clear_selection(&self) {
        self.update(DiagramEditor::clear_selection)
    }

    // === Operations ===

    pub fn undo(&self) -> bool {
        self.update(DiagramEditor::undo)
    }

    pub fn redo(&self) -> bool {
        self.update(DiagramEditor::redo)
    }

    pub fn clear_canvas(&self) {
        self.update(DiagramEditor::clear_canvas)
    }

    pub fn apply_node_changes(&self, changes: &[NodeChange]) {
        self.update(|ed| ed.on_nodes_change(changes))
    }

    pub fn apply_edge_changes(&self, changes: &[EdgeChange]) {
        self.update(|ed| ed.on_edges_change(changes))
    }

    pub fn move_nodes(&self, updates: &[PositionUpdate]) -> usize {
        self.update(|ed| ed.update_node_positions(updates))
    }

    /// Dispatch a key press.
    ///
    /// Returns the shortcut it triggered, `Ok(None)` for an unbound chord, or
    /// the editor's reason when the shortcut was rejected (deleting with
    /// nothing selected, grouping a single node).
    pub fn handle_shortcut(&self, chord: &KeyChord) -> Result<Option<Shortcut>, EditorError> {
        let Some(shortcut) = Shortcut::from_chord(chord) else {
            return Ok(None);
        };
        match shortcut {
            Shortcut::Save => {
                self.save();
            }
            Shortcut::DeleteSelection => {
                self.update(DiagramEditor::delete_selected_nodes)?;
            }
            Shortcut::Undo => {
                self.undo();
            }
            Shortcut::Redo => {
                self.redo();
            }
            Shortcut::AutoAlign => {
                self.update(DiagramEditor::auto_align);
            }
            Shortcut::CreateGroup => {
                self.update(DiagramEditor::create_behavior_group)?;
            }
            Shortcut::Duplicate => {
                self.update(DiagramEditor::duplicate_selected_nodes)?;
            }
        }
        Ok(Some(shortcut))
    }

    // === Callback factories ===

    /// Returns a callback for the canvas node change stream.
    pub fn nodes_change_callback(&self) -> impl Fn(&[NodeChange]) {
        let ctrl = self.clone();
        move |changes: &[NodeChange]| ctrl.apply_node_changes(changes)
    }

    /// Returns a callback for `connect(source, target) -> bool`.
    pub fn connect_callback(&self) -> impl Fn(SharedString, SharedString) -> bool {
        let ctrl = self.clone();
        move |source, target| {
            let connection = Connection::new(source.as_str(), target.as_str());
            ctrl.update(|ed| ed.on_connect(&connection)).is_ok()
        }
    }

    /// Returns a callback for `node-drag-stop(id, x, y)` in canvas coordinates.
    pub fn node_drag_stop_callback(&self) -> impl Fn(SharedString, f32, f32) {
        let ctrl = self.clone();
        move |id, x, y| {
            if let Err(err) = ctrl.update(|ed| ed.on_node_drag_stop(id.as_str(), Position::new(x, y))) {
                log::warn!("Drag stop ignored: {err}");
            }
        }
    }

    /// Returns a callback for `label-edited(id, text) -> bool`; false when
    /// the node no longer exists.
    pub fn label_edit_callback(&self) -> impl Fn(SharedString, SharedString) -> bool {
        let ctrl = self.clone();
        move |id, text| {
            ctrl.update(|ed| ed.update_node_label(id.as_str(), text.as_str()))
                .is_ok()
        }
    }
}
