//! The diagram data model.
//!
//! [`DiagramState`] (nodes, edges, id counter) is the unit of undo/redo
//! snapshotting and of persistence. Its serialized shape is the one the canvas
//! has always written to storage, so camelCase field names are kept on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width of every standard shape except the wide ones.
pub const STANDARD_NODE_WIDTH: f32 = 120.0;
/// Width of [`ShapeKind::ConsistentBusinessRule`].
pub const WIDE_NODE_WIDTH: f32 = 240.0;
/// Height shared by all standard shapes.
pub const NODE_HEIGHT: f32 = 120.0;

/// First value of the node id counter in a fresh diagram.
pub const FIRST_NODE_ID: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, delta: Position) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in canvas (world) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_parts(position: Position, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// True when the rectangles overlap (touching edges count).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// The shapes offered by the palette. Serialized as the kebab-case `nodeType`
/// string; anything unrecognised round-trips through [`ShapeKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShapeKind {
    Actor,
    Action,
    ReadModel,
    ConsistentBusinessRule,
    DomainEvent,
    ExternalSystem,
    Hotspot,
    Opportunity,
    Ui,
    EventuallyConsistentBusinessRule,
    PivotalEvent,
    Arrow,
    Custom(String),
}

impl ShapeKind {
    pub fn as_str(&self) -> &str {
        match self {
            ShapeKind::Actor => "actor",
            ShapeKind::Action => "action",
            ShapeKind::ReadModel => "read-model",
            ShapeKind::ConsistentBusinessRule => "consistent-business-rule",
            ShapeKind::DomainEvent => "domain-event",
            ShapeKind::ExternalSystem => "external-system",
            ShapeKind::Hotspot => "hotspot",
            ShapeKind::Opportunity => "opportunity",
            ShapeKind::Ui => "ui",
            ShapeKind::EventuallyConsistentBusinessRule => "eventually-consistent-business-rule",
            ShapeKind::PivotalEvent => "pivotal-event",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Custom(other) => other,
        }
    }

    /// Derive the kind from a display name ("Read Model" -> `ReadModel`).
    pub fn from_name(name: &str) -> Self {
        Self::from(name.to_lowercase().replace(' ', "-"))
    }

    /// Fixed on-canvas footprint of this kind.
    pub fn footprint(&self) -> Size {
        match self {
            ShapeKind::ConsistentBusinessRule => Size::new(WIDE_NODE_WIDTH, NODE_HEIGHT),
            _ => Size::new(STANDARD_NODE_WIDTH, NODE_HEIGHT),
        }
    }

    pub fn is_wide(&self) -> bool {
        self.footprint().width > STANDARD_NODE_WIDTH
    }
}

impl From<String> for ShapeKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "actor" => ShapeKind::Actor,
            "action" => ShapeKind::Action,
            "read-model" => ShapeKind::ReadModel,
            "consistent-business-rule" => ShapeKind::ConsistentBusinessRule,
            "domain-event" => ShapeKind::DomainEvent,
            "external-system" => ShapeKind::ExternalSystem,
            "hotspot" => ShapeKind::Hotspot,
            "opportunity" => ShapeKind::Opportunity,
            "ui" => ShapeKind::Ui,
            "eventually-consistent-business-rule" => ShapeKind::EventuallyConsistentBusinessRule,
            "pivotal-event" => ShapeKind::PivotalEvent,
            "arrow" => ShapeKind::Arrow,
            _ => ShapeKind::Custom(value),
        }
    }
}

impl From<ShapeKind> for String {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Custom(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renderer-level node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    #[serde(rename = "eventStormingNode")]
    Standard,
    #[serde(rename = "groupNode")]
    Group,
}

/// What the palette hands to [`crate::DiagramEditor::add_node`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub text_color: String,
    /// Explicit kind; derived from `name` when absent.
    pub node_type: Option<ShapeKind>,
}

impl NodeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: String::new(),
            color: String::new(),
            text_color: String::new(),
            node_type: None,
        }
    }

    pub fn with_kind(mut self, kind: ShapeKind) -> Self {
        self.node_type = Some(kind);
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.node_type
            .clone()
            .unwrap_or_else(|| ShapeKind::from_name(&self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(default)]
    pub default_label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub text_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<ShapeKind>,
    #[serde(default)]
    pub is_edited: bool,
    /// Member ids, in the order they were grouped. Groups only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_node_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    pub position: Position,
    pub data: NodeData,
    #[serde(default)]
    pub selected: bool,
    /// Derived bounds size. Only groups carry one; standard shapes take the
    /// footprint of their kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl Node {
    pub fn standard(id: impl Into<String>, config: &NodeConfig, position: Position) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::Standard,
            position,
            data: NodeData {
                label: config.name.clone(),
                default_label: config.name.clone(),
                icon: config.icon.clone(),
                color: config.color.clone(),
                text_color: config.text_color.clone(),
                node_type: Some(config.kind()),
                is_edited: false,
                child_node_ids: None,
            },
            selected: false,
            size: None,
        }
    }

    pub fn is_group(&self) -> bool {
        self.node_type == NodeType::Group
    }

    pub fn kind(&self) -> Option<&ShapeKind> {
        self.data.node_type.as_ref()
    }

    /// On-canvas size used by every piece of layout math.
    pub fn footprint(&self) -> Size {
        match self.node_type {
            NodeType::Group => self.size.unwrap_or_default(),
            NodeType::Standard => self
                .kind()
                .map(ShapeKind::footprint)
                .unwrap_or(Size::new(STANDARD_NODE_WIDTH, NODE_HEIGHT)),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.footprint())
    }

    /// Stacking order: groups always sit behind ordinary shapes.
    pub fn z_index(&self) -> i32 {
        if self.is_group() {
            -1
        } else {
            0
        }
    }

    pub fn child_ids(&self) -> &[String] {
        self.data.child_node_ids.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramState {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default = "first_node_id")]
    pub node_id_counter: u64,
}

fn first_node_id() -> u64 {
    FIRST_NODE_ID
}

impl Default for DiagramState {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            node_id_counter: FIRST_NODE_ID,
        }
    }
}

impl DiagramState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Nodes in stacking order: groups first, then everything else, each in
    /// document order.
    pub fn render_order(&self) -> impl Iterator<Item = &Node> + '_ {
        let groups = self.nodes.iter().filter(|n| n.is_group());
        let shapes = self.nodes.iter().filter(|n| !n.is_group());
        groups.chain(shapes)
    }

    /// Raise the counter above every numeric id suffix so freshly minted ids
    /// can never collide with loaded ones.
    ///
    /// Suffixes that do not fit a `u64`, or that leave no room above them,
    /// are logged and skipped; the stored counter stands for those ids.
    pub fn normalize_counter(&mut self) {
        let mut floor = FIRST_NODE_ID;
        for node in &self.nodes {
            if !node.id.ends_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            match id_suffix(&node.id).and_then(|n| n.checked_add(1)) {
                Some(next) => floor = floor.max(next),
                None => log::warn!(
                    "Node id '{}' is outside the counter range, keeping counter {}",
                    node.id,
                    self.node_id_counter
                ),
            }
        }
        self.node_id_counter = self.node_id_counter.max(floor);
    }

    /// Drop edges whose source or target no longer resolves. Returns how many
    /// were removed.
    pub fn prune_dangling_edges(&mut self) -> usize {
        let before = self.edges.len();
        let nodes = &self.nodes;
        self.edges.retain(|edge| {
            nodes.iter().any(|n| n.id == edge.source) && nodes.iter().any(|n| n.id == edge.target)
        });
        before - self.edges.len()
    }
}

pub fn node_id(counter: u64) -> String {
    format!("node_{counter}")
}

pub fn group_id(counter: u64) -> String {
    format!("group_{counter}")
}

/// Numeric suffix of an id (`"node_12"` -> `12`).
pub fn id_suffix(id: &str) -> Option<u64> {
    let digits_start = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    id[digits_start..].parse().ok()
}
