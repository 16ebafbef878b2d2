//! Drag lifecycle detection.
//!
//! [`DragTracker`] watches the position changes in each batch passed to
//! [`crate::DiagramEditor::on_nodes_change`]. A frame with `dragging == true`
//! opens a drag; a frame with `dragging == false` closes it. While a drag is
//! open the editor applies positions live but records nothing, so a drag of
//! any length becomes a single history entry.

use std::collections::BTreeSet;

use crate::changes::NodeChange;

/// What a batch of changes did to the drag lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No drag involvement.
    Idle,
    /// The batch opened a drag.
    Started,
    /// The batch continued an open drag.
    Moving,
    /// The batch released an open drag.
    Ended,
}

#[derive(Debug, Default, Clone)]
pub struct DragTracker {
    in_progress: bool,
    dragged: BTreeSet<String>,
    frames: usize,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.in_progress
    }

    /// Ids of the nodes moved by the current (or last released) drag.
    pub fn dragged_nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.dragged.iter().map(String::as_str)
    }

    /// Number of drag frames seen since the drag opened.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Classify a batch and update the drag state.
    ///
    /// A release without an open drag is `Idle`: there is nothing to close.
    pub fn observe(&mut self, changes: &[NodeChange]) -> DragPhase {
        let mut started = false;
        let mut moved = false;
        let mut released = false;

        for change in changes {
            if let NodeChange::Position { id, dragging, .. } = change {
                match dragging {
                    Some(true) => {
                        if !self.in_progress && !started {
                            self.dragged.clear();
                            self.frames = 0;
                            started = true;
                        }
                        self.dragged.insert(id.clone());
                        self.frames += 1;
                        moved = true;
                    }
                    Some(false) => released = true,
                    None => {}
                }
            }
        }

        if started {
            self.in_progress = true;
        }

        if released && self.in_progress {
            self.in_progress = false;
            log::trace!("drag released after {} frames", self.frames);
            return DragPhase::Ended;
        }

        if started {
            DragPhase::Started
        } else if moved {
            DragPhase::Moving
        } else {
            DragPhase::Idle
        }
    }

    /// Abandon any open drag (undo, load or clear mid-drag).
    pub fn cancel(&mut self) {
        self.in_progress = false;
        self.dragged.clear();
        self.frames = 0;
    }
}
