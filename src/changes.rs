//! Change records emitted by the rendering collaborator.
//!
//! The canvas widget reports what the user did as batches of these; the
//! editor decides what each batch means for the history log.

use crate::state::{Position, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    Select {
        id: String,
        selected: bool,
    },
    /// `dragging` is `Some(true)` for every frame of a pointer drag and
    /// `Some(false)` on the frame the pointer is released.
    Position {
        id: String,
        position: Option<Position>,
        dragging: Option<bool>,
    },
    /// Measured size reported by the renderer.
    Dimensions {
        id: String,
        size: Option<Size>,
    },
    Remove {
        id: String,
    },
}

impl NodeChange {
    pub fn id(&self) -> &str {
        match self {
            NodeChange::Select { id, .. }
            | NodeChange::Position { id, .. }
            | NodeChange::Dimensions { id, .. }
            | NodeChange::Remove { id } => id,
        }
    }

    pub fn select(id: impl Into<String>, selected: bool) -> Self {
        NodeChange::Select {
            id: id.into(),
            selected,
        }
    }

    /// A drag frame (`dragging == true`) moving `id` to `position`.
    pub fn drag(id: impl Into<String>, position: Position) -> Self {
        NodeChange::Position {
            id: id.into(),
            position: Some(position),
            dragging: Some(true),
        }
    }

    /// The release frame of a drag.
    pub fn drag_end(id: impl Into<String>, position: Option<Position>) -> Self {
        NodeChange::Position {
            id: id.into(),
            position,
            dragging: Some(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Select { id: String, selected: bool },
    Remove { id: String },
}

/// A user-drawn connection between two nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handles(
        mut self,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Self {
        self.source_handle = source_handle;
        self.target_handle = target_handle;
        self
    }
}

/// Absolute position assignment for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub id: String,
    pub position: Position,
}

impl PositionUpdate {
    pub fn new(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}
