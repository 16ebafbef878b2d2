//! # Storming Editor
//!
//! The state engine behind an Event Storming board: sticky-note shapes on an
//! infinite canvas, connected by edges, optionally gathered into behavior
//! groups, with undo/redo and persistence.
//!
//! The crate is headless. Rendering is left to a graph canvas widget that
//! reports what the user did as batches of change records and draws whatever
//! the engine hands back.
//!
//! ## Features
//!
//! - **One undo step per gesture** - a drag of any length, a label edit, a
//!   new edge or a grouping each become exactly one history entry
//! - **Derived groups** - a group's bounds always follow its children
//! - **Snapping** - grid quantization plus magnetic alignment to neighbours
//! - **Typed shapes** - every shape kind carries its own footprint
//! - **Pluggable storage** - anything implementing [`KeyValueStore`]
//!
//! ## Core Types
//!
//! - [`DiagramEditor`] - mutation operations and the commit policy
//! - [`DiagramState`] - nodes, edges and the id counter; the unit of undo and persistence
//! - [`History`] - past/present/future snapshot store
//! - [`DiagramController`] - wires the editor to Slint models, shortcuts and storage
//!
//! ## Rust Helpers
//!
//! - [`sync_groups`] - recompute group bounds from their children
//! - [`snap_position`] - final position for a released node
//! - [`auto_align`] - tidy roughly aligned rows and columns
//! - [`nodes_in_selection_box`] / [`node_at`] - marquee and point hit-testing
//! - [`background_grid_commands`] - SVG path for the canvas grid
//!
//! ```
//! use storming_editor::{DiagramEditor, NodeConfig, Position};
//!
//! let mut editor = DiagramEditor::default();
//! let first = editor.add_node(&NodeConfig::new("Domain Event"), Some(Position::new(0.0, 0.0)));
//! let second = editor.add_node(&NodeConfig::new("Domain Event"), None);
//!
//! // placed flush against the right edge of the selected node
//! assert_eq!(editor.node(&second).unwrap().position, Position::new(120.0, 0.0));
//!
//! editor.undo();
//! assert!(editor.node(&second).is_none());
//! assert!(editor.node(&first).is_some());
//! ```

pub mod changes;
pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod graph;
pub mod grid;
pub mod groups;
pub mod history;
pub mod layout;
pub mod palette;
pub mod persistence;
pub mod selection;
pub mod shortcuts;
pub mod snapping;
pub mod state;
pub mod tracking;

// Re-export the working set
pub use changes::{Connection, EdgeChange, NodeChange, PositionUpdate};
pub use config::{EditorConfig, GroupPadding, DEFAULT_STORAGE_KEY};
pub use controller::{DiagramController, EdgeView, NodeView};
pub use editor::DiagramEditor;
pub use error::{ConfigError, EditorError, PersistenceError};
pub use graph::{
    default_validator, BasicConnectionValidator, CompositeValidator, ConnectionValidator,
    GraphLogic, NoDuplicatesValidator, ValidationError, ValidationResult,
};
pub use grid::{background_grid_commands, snap_position_to_grid, snap_to_grid};
pub use groups::{build_group, group_bounds, sync_groups};
pub use history::{History, HistorySummary};
pub use hit_test::{node_at, nodes_in_selection_box, selection_rect, NodeGeometry};
pub use layout::{auto_align, AlignConfig};
pub use palette::{all_shapes, contrast_color, find_shape, ShapeSpec};
pub use persistence::{DiagramStore, FileStore, KeyValueStore, MemoryStore};
pub use selection::SelectionManager;
pub use shortcuts::{KeyChord, Shortcut};
pub use snapping::{snap_position, snap_with_guides, Alignment, AxisSnap, SnapOutcome};
pub use state::{
    DiagramState, Edge, Node, NodeConfig, NodeData, NodeType, Position, Rect, ShapeKind, Size,
};
pub use tracking::{DragPhase, DragTracker};
