//! The diagram state engine.
//!
//! [`DiagramEditor`] owns the canonical [`DiagramState`] and its undo/redo
//! [`History`]. Every mutation goes through one of its methods, which applies
//! the change synchronously and then decides whether it becomes a history
//! checkpoint:
//!
//! - add, duplicate, delete, relabel, group creation and programmatic
//!   position updates always commit;
//! - a drag commits once, when it is released;
//! - anything else that changes the node count, edge count or id counter
//!   relative to the last checkpoint commits through a passive check (this is
//!   how new edges become undo steps);
//! - undo and redo never record themselves.
//!
//! Group bounds are re-derived before every commit and once after every
//! replay, so checkpoints never hold stale group geometry.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::changes::{Connection, EdgeChange, NodeChange, PositionUpdate};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::graph::{default_validator, ConnectionValidator, GraphLogic};
use crate::groups::{build_group, sync_groups};
use crate::history::{History, HistorySummary};
use crate::layout::{auto_align, AlignConfig};
use crate::selection::SelectionManager;
use crate::snapping::snap_position;
use crate::state::{node_id, DiagramState, Node, NodeConfig, Position};
use crate::tracking::{DragPhase, DragTracker};

pub struct DiagramEditor {
    config: EditorConfig,
    state: DiagramState,
    history: History<DiagramState>,
    selection: SelectionManager,
    drag: DragTracker,
    /// Set while a snapshot is being restored; commits are ignored.
    replaying: bool,
    /// The last checkpoint was a drag release that the drag-stop snap may
    /// still fold into.
    release_checkpoint_open: bool,
    rng: StdRng,
    validator: Box<dyn ConnectionValidator>,
    viewport_center: Position,
}

impl Default for DiagramEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl DiagramEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Editor with a deterministic placement jitter.
    pub fn with_seed(config: EditorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EditorConfig, rng: StdRng) -> Self {
        let state = DiagramState::default();
        let history = History::new(state.clone()).with_limit(config.history_limit);
        Self {
            config,
            state,
            history,
            selection: SelectionManager::new(),
            drag: DragTracker::new(),
            replaying: false,
            release_checkpoint_open: false,
            rng,
            validator: Box::new(default_validator()),
            viewport_center: Position::default(),
        }
    }

    /// Replace the rules applied to new connections.
    pub fn set_validator(&mut self, validator: impl ConnectionValidator + 'static) {
        self.validator = Box::new(validator);
    }

    // === Read access ===

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &DiagramState {
        &self.state
    }

    pub fn snapshot(&self) -> DiagramState {
        self.state.clone()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.state.nodes
    }

    pub fn edges(&self) -> &[crate::state::Edge] {
        &self.state.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.state.node(id)
    }

    pub fn history(&self) -> &History<DiagramState> {
        &self.history
    }

    pub fn history_summary(&self) -> HistorySummary {
        self.history.summary()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Selected nodes, oldest selection first.
    pub fn selected_nodes(&self) -> Vec<&Node> {
        self.selection
            .iter()
            .filter_map(|id| self.state.node(id))
            .collect()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn viewport_center(&self) -> Position {
        self.viewport_center
    }

    /// Where unplaced inserts land (before jitter).
    pub fn set_viewport_center(&mut self, center: Position) {
        self.viewport_center = center;
    }

    // === Node operations ===

    /// Add a node and select it. Returns the new id.
    ///
    /// Placement: flush right of the most recently selected node if there is
    /// one, else `position`, else the viewport centre plus a random jitter.
    pub fn add_node(&mut self, config: &NodeConfig, position: Option<Position>) -> String {
        let anchor = self
            .selection
            .last()
            .and_then(|id| self.state.node(id))
            .map(|n| Position::new(n.position.x + n.footprint().width, n.position.y));

        let placed = match (anchor, position) {
            (Some(anchor), _) => anchor,
            (None, Some(position)) => position,
            (None, None) => self.jittered_center(),
        };

        let id = node_id(self.state.node_id_counter);
        let mut node = Node::standard(id.clone(), config, placed);
        node.selected = true;

        self.deselect_all_nodes();
        self.state.nodes.push(node);
        self.selection.replace_selection([id.clone()]);
        self.state.node_id_counter = self.state.node_id_counter.saturating_add(1);

        log::debug!("Added {id} ({}) at ({}, {})", config.name, placed.x, placed.y);
        self.commit();
        id
    }

    fn jittered_center(&mut self) -> Position {
        let spread = self.config.insert_jitter;
        let mut jitter = || {
            if spread > 0.0 {
                self.rng.gen_range(-spread..=spread)
            } else {
                0.0
            }
        };
        let dx = jitter();
        let dy = jitter();
        self.viewport_center.offset_by(Position::new(dx, dy))
    }

    /// Clone `ids` (groups are skipped) with the configured offset, select the
    /// clones and deselect everything else. Clones are minted in document
    /// order. Returns the new ids.
    pub fn duplicate_nodes(&mut self, ids: &[String]) -> Result<Vec<String>, EditorError> {
        let originals: Vec<Node> = self
            .state
            .nodes
            .iter()
            .filter(|n| !n.is_group() && ids.contains(&n.id))
            .cloned()
            .collect();
        if originals.is_empty() {
            log::warn!("Duplicate rejected: nothing to duplicate");
            return Err(EditorError::EmptySelection);
        }

        let base = self.state.node_id_counter;
        let clones: Vec<Node> = originals
            .into_iter()
            .enumerate()
            .map(|(i, mut node)| {
                node.id = node_id(base.saturating_add(i as u64));
                node.position = node.position.offset_by(self.config.duplicate_offset);
                node.selected = true;
                node
            })
            .collect();
        let new_ids: Vec<String> = clones.iter().map(|n| n.id.clone()).collect();

        self.deselect_all_nodes();
        self.state.node_id_counter = base.saturating_add(clones.len() as u64);
        self.state.nodes.extend(clones);
        self.selection.replace_selection(new_ids.iter().cloned());

        log::debug!("Duplicated {} nodes", new_ids.len());
        self.commit();
        Ok(new_ids)
    }

    pub fn duplicate_selected_nodes(&mut self) -> Result<Vec<String>, EditorError> {
        let ids = self.selection.ids();
        self.duplicate_nodes(&ids)
    }

    /// Remove `ids` and every edge touching them. Returns how many nodes were
    /// removed.
    pub fn delete_nodes(&mut self, ids: &[String]) -> Result<usize, EditorError> {
        if ids.is_empty() {
            log::warn!("Delete rejected: no nodes selected");
            return Err(EditorError::EmptySelection);
        }
        let doomed: HashSet<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| self.state.contains_node(id))
            .collect();
        if doomed.is_empty() {
            log::warn!("Delete rejected: {} not found", ids[0]);
            return Err(EditorError::NodeNotFound(ids[0].clone()));
        }

        let removed = doomed.len();
        let edges_dropped = GraphLogic::remove_nodes(&mut self.state, &doomed);
        self.selection.clear();

        log::debug!("Deleted {removed} nodes and {edges_dropped} edges");
        self.commit();
        Ok(removed)
    }

    pub fn delete_selected_nodes(&mut self) -> Result<usize, EditorError> {
        let ids = self.selection.ids();
        self.delete_nodes(&ids)
    }

    /// Set a node's label. Blank text restores the default label.
    pub fn update_node_label(&mut self, id: &str, text: &str) -> Result<(), EditorError> {
        let Some(node) = self.state.node_mut(id) else {
            log::warn!("Label edit rejected: node {id} not found");
            return Err(EditorError::NodeNotFound(id.to_string()));
        };

        let label = if text.trim().is_empty() {
            node.data.default_label.clone()
        } else {
            text.to_string()
        };
        node.data.is_edited = label != node.data.default_label;
        node.data.label = label;

        self.commit();
        Ok(())
    }

    /// Move nodes to absolute positions. Unknown ids are skipped. Returns how
    /// many nodes moved; commits when any did.
    pub fn update_node_positions(&mut self, updates: &[PositionUpdate]) -> usize {
        let applied = self.apply_positions(updates);
        if applied > 0 {
            self.commit();
        }
        applied
    }

    fn apply_positions(&mut self, updates: &[PositionUpdate]) -> usize {
        let mut applied = 0;
        for update in updates {
            match self.state.node_mut(&update.id) {
                Some(node) => {
                    node.position = update.position;
                    applied += 1;
                }
                None => log::trace!("Position update for unknown node {}", update.id),
            }
        }
        applied
    }

    // === Rendering collaborator callbacks ===

    /// Apply a batch of node change records from the canvas.
    pub fn on_nodes_change(&mut self, changes: &[NodeChange]) {
        let phase = self.drag.observe(changes);

        let mut removed: HashSet<String> = HashSet::new();
        for change in changes {
            match change {
                NodeChange::Select { id, selected } => {
                    if let Some(node) = self.state.node_mut(id) {
                        node.selected = *selected;
                        self.selection.set(id, *selected);
                    }
                }
                NodeChange::Position {
                    id,
                    position: Some(position),
                    ..
                } => {
                    if let Some(node) = self.state.node_mut(id) {
                        node.position = *position;
                    }
                }
                NodeChange::Position { position: None, .. } => {}
                NodeChange::Dimensions { id, size } => {
                    log::trace!("Measured {id}: {size:?}");
                }
                NodeChange::Remove { id } => {
                    removed.insert(id.clone());
                }
            }
        }

        if !removed.is_empty() {
            let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();
            GraphLogic::remove_nodes(&mut self.state, &doomed);
            self.selection.retain(|id| !doomed.contains(id));
        }

        sync_groups(&mut self.state.nodes, &self.config.group_padding);

        match phase {
            DragPhase::Ended => {
                log::debug!("Drag released after {} frames", self.drag.frames());
                self.commit();
                self.release_checkpoint_open = true;
            }
            DragPhase::Started | DragPhase::Moving => {}
            DragPhase::Idle => {
                self.commit_structural_change();
            }
        }
    }

    /// Apply a batch of edge change records from the canvas.
    pub fn on_edges_change(&mut self, changes: &[EdgeChange]) {
        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if let Some(edge) = self.state.edges.iter_mut().find(|e| &e.id == id) {
                        edge.selected = *selected;
                    }
                }
                EdgeChange::Remove { id } => self.state.edges.retain(|e| &e.id != id),
            }
        }
        self.commit_structural_change();
    }

    /// Create an edge for a user-drawn connection. Returns the edge id.
    pub fn on_connect(&mut self, connection: &Connection) -> Result<String, EditorError> {
        if let Err(err) = self
            .validator
            .validate(connection, &self.state)
            .into_result()
        {
            log::warn!(
                "Connection {} -> {} rejected: {err}",
                connection.source,
                connection.target
            );
            return Err(err.into());
        }

        let edge = GraphLogic::edge_from(connection);
        let id = edge.id.clone();
        self.state.edges.push(edge);
        self.commit_structural_change();
        Ok(id)
    }

    /// Drag-stop handler: snap the released node and record the result.
    ///
    /// When `id` was moved by the drag that was just released, the snap folds
    /// into that release checkpoint, so a snapped drag is still one undo step.
    /// Returns the final position.
    pub fn on_node_drag_stop(&mut self, id: &str, position: Position) -> Result<Position, EditorError> {
        let Some(node) = self.state.node(id) else {
            return Err(EditorError::NodeNotFound(id.to_string()));
        };
        if !self.config.snap_on_release || node.is_group() {
            return Ok(node.position);
        }

        let snapped = snap_position(node, position, &self.state.nodes, &self.config);
        let update = [PositionUpdate::new(id, snapped)];

        let from_release = self.drag.dragged_nodes().any(|dragged| dragged == id);
        if self.release_checkpoint_open && from_release && !self.replaying {
            self.apply_positions(&update);
            sync_groups(&mut self.state.nodes, &self.config.group_padding);
            self.history.amend(self.state.clone());
            self.release_checkpoint_open = false;
            log::debug!("Snapped {id} to ({}, {})", snapped.x, snapped.y);
        } else {
            self.update_node_positions(&update);
        }
        Ok(snapped)
    }

    // === History ===

    pub fn undo(&mut self) -> bool {
        self.replay(History::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.replay(History::redo)
    }

    fn replay(&mut self, step: fn(&mut History<DiagramState>) -> bool) -> bool {
        self.replaying = true;
        let moved = step(&mut self.history);
        if moved {
            self.state = self.history.present().clone();
            self.drag.cancel();
            sync_groups(&mut self.state.nodes, &self.config.group_padding);
            self.resync_selection();
            log::debug!(
                "Restored checkpoint ({} undo, {} redo left)",
                self.history.summary().past_len,
                self.history.summary().future_len
            );
        }
        self.replaying = false;
        self.release_checkpoint_open = false;
        moved
    }

    /// Empty the canvas. There is no way back to the cleared diagram.
    pub fn clear_canvas(&mut self) {
        self.state = DiagramState::default();
        self.history.reset(self.state.clone());
        self.selection.clear();
        self.drag.cancel();
        self.release_checkpoint_open = false;
        log::info!("Canvas cleared");
    }

    /// Replace the diagram with a loaded one and start a fresh history.
    pub fn load_state(&mut self, mut state: DiagramState) {
        state.normalize_counter();
        state.prune_dangling_edges();
        sync_groups(&mut state.nodes, &self.config.group_padding);
        self.state = state;
        self.history.reset(self.state.clone());
        self.drag.cancel();
        self.release_checkpoint_open = false;
        self.selection.clear();
        self.resync_selection();
    }

    // === Groups and layout ===

    /// Group the selected nodes. Returns the group id.
    pub fn create_behavior_group(&mut self) -> Result<String, EditorError> {
        let members: Vec<&Node> = self
            .selected_nodes()
            .into_iter()
            .filter(|n| !n.is_group())
            .collect();
        if members.len() < 2 {
            log::warn!("Need at least 2 nodes to create a behavior group");
            return Err(EditorError::NotEnoughNodesForGroup {
                selected: members.len(),
            });
        }

        let counter = self.state.node_id_counter;
        let group = build_group(counter, &members, &self.config.group_padding).ok_or(
            EditorError::NotEnoughNodesForGroup {
                selected: members.len(),
            },
        )?;
        let id = group.id.clone();

        self.state.nodes.push(group);
        self.state.node_id_counter = self.state.node_id_counter.saturating_add(1);
        self.selection.set(&id, true);

        log::debug!("Created {id}");
        self.commit();
        Ok(id)
    }

    /// Align rows and columns of roughly lined-up nodes. Returns how many
    /// nodes moved.
    pub fn auto_align(&mut self) -> usize {
        let align = AlignConfig {
            grid: self.config.align_grid,
            gap: self.config.align_gap,
        };
        let updates = auto_align(&self.state.nodes, &align);
        if updates.is_empty() {
            return 0;
        }
        self.update_node_positions(&updates)
    }

    // === Selection helpers ===

    /// Select exactly `ids`, as if the canvas had reported select changes.
    /// Nodes that stay selected keep their place in the selection order.
    pub fn select_nodes(&mut self, ids: &[String]) {
        let mut changes: Vec<NodeChange> = self
            .selection
            .iter()
            .filter(|id| !ids.iter().any(|keep| keep == id))
            .map(|id| NodeChange::select(id, false))
            .collect();
        changes.extend(
            ids.iter()
                .filter(|id| self.state.contains_node(id) && !self.selection.contains(id))
                .map(|id| NodeChange::select(id.clone(), true)),
        );
        self.on_nodes_change(&changes);
    }

    pub fn clear_selection(&mut self) {
        self.select_nodes(&[]);
    }

    fn deselect_all_nodes(&mut self) {
        for node in &mut self.state.nodes {
            node.selected = false;
        }
        self.selection.clear();
    }

    /// Rebuild the selection from the `selected` flags after the nodes were
    /// replaced wholesale.
    fn resync_selection(&mut self) {
        let state = &self.state;
        self.selection
            .retain(|id| state.node(id).is_some_and(|n| n.selected));
        for node in self.state.nodes.iter().filter(|n| n.selected) {
            if !self.selection.contains(&node.id) {
                self.selection.set(&node.id, true);
            }
        }
    }

    // === Commit policy ===

    /// Record the current state as a checkpoint.
    fn commit(&mut self) {
        if self.replaying {
            return;
        }
        sync_groups(&mut self.state.nodes, &self.config.group_padding);
        self.history.push(self.state.clone());
        self.release_checkpoint_open = false;
        log::debug!("Checkpoint {}", self.history.summary().past_len);
    }

    /// Commit when node count, edge count or id counter differ from the last
    /// checkpoint.
    fn commit_structural_change(&mut self) -> bool {
        if self.replaying || self.drag.is_dragging() {
            return false;
        }
        let present = self.history.present();
        let changed = present.nodes.len() != self.state.nodes.len()
            || present.edges.len() != self.state.edges.len()
            || present.node_id_counter != self.state.node_id_counter;
        if changed {
            log::trace!("Structural change detected");
            self.commit();
        }
        changed
    }
}
