use std::collections::HashSet;

use crate::changes::Connection;
use crate::state::{DiagramState, Edge};

/// Helper functions for edge topology
pub struct GraphLogic;

impl GraphLogic {
    /// Remove the given nodes, every edge touching them, and their ids from
    /// group memberships. Returns the number of edges dropped.
    pub fn remove_nodes(state: &mut DiagramState, ids: &HashSet<&str>) -> usize {
        state.nodes.retain(|node| !ids.contains(node.id.as_str()));

        for node in state.nodes.iter_mut() {
            if let Some(children) = node.data.child_node_ids.as_mut() {
                children.retain(|child| !ids.contains(child.as_str()));
            }
        }

        let before = state.edges.len();
        state
            .edges
            .retain(|edge| !ids.contains(edge.source.as_str()) && !ids.contains(edge.target.as_str()));
        before - state.edges.len()
    }

    /// Check if an edge with the same endpoints and handles already exists
    ///
    /// Direction matters: `a -> b` does not duplicate `b -> a`.
    pub fn duplicate_edge_exists<'a, I>(connection: &Connection, edges: I) -> bool
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        edges.into_iter().any(|edge| {
            edge.source == connection.source
                && edge.target == connection.target
                && edge.source_handle == connection.source_handle
                && edge.target_handle == connection.target_handle
        })
    }

    /// Deterministic edge id for a connection
    pub fn edge_id_for(connection: &Connection) -> String {
        format!(
            "edge-{}{}-{}{}",
            connection.source,
            connection.source_handle.as_deref().unwrap_or(""),
            connection.target,
            connection.target_handle.as_deref().unwrap_or(""),
        )
    }

    pub fn edge_from(connection: &Connection) -> Edge {
        Edge {
            id: Self::edge_id_for(connection),
            source: connection.source.clone(),
            target: connection.target.clone(),
            source_handle: connection.source_handle.clone(),
            target_handle: connection.target_handle.clone(),
            selected: false,
        }
    }
}

// ============================================================================
// Connection Validation Framework
// ============================================================================

/// Result of connection validation with optional rejection reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns first error if any
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(err) => Err(err),
        }
    }
}

/// Reasons why a connection was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Node {0} not found")]
    NodeNotFound(String),
    #[error("Cannot connect a node to itself")]
    SelfLoop,
    #[error("Edge already exists")]
    DuplicateEdge,
    #[error("Groups cannot be connected")]
    GroupEndpoint,
    #[error("{0}")]
    Custom(String),
}

/// Custom connection validation logic.
///
/// Implement this to add rules for which nodes may be connected, and compose
/// implementations with [`CompositeValidator`].
pub trait ConnectionValidator {
    fn validate(&self, connection: &Connection, state: &DiagramState) -> ValidationResult;
}

/// Default validator: both endpoints exist, are distinct, and are not groups
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicConnectionValidator;

impl ConnectionValidator for BasicConnectionValidator {
    fn validate(&self, connection: &Connection, state: &DiagramState) -> ValidationResult {
        if connection.source == connection.target {
            return ValidationResult::Invalid(ValidationError::SelfLoop);
        }

        for id in [&connection.source, &connection.target] {
            match state.node(id) {
                None => return ValidationResult::Invalid(ValidationError::NodeNotFound(id.clone())),
                Some(node) if node.is_group() => {
                    return ValidationResult::Invalid(ValidationError::GroupEndpoint)
                }
                Some(_) => {}
            }
        }

        ValidationResult::Valid
    }
}

/// Validator that prevents duplicate edges
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesValidator;

impl ConnectionValidator for NoDuplicatesValidator {
    fn validate(&self, connection: &Connection, state: &DiagramState) -> ValidationResult {
        if GraphLogic::duplicate_edge_exists(connection, &state.edges) {
            ValidationResult::Invalid(ValidationError::DuplicateEdge)
        } else {
            ValidationResult::Valid
        }
    }
}

/// Composite validator that combines multiple validators
///
/// All validators must return Valid for the connection to be valid. Returns
/// the first error encountered.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validators are checked in the order they were added.
    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(&self, connection: &Connection, state: &DiagramState) -> ValidationResult {
        for v in &self.validators {
            let result = v.validate(connection, state);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }
}

/// The rules the editor applies unless told otherwise.
pub fn default_validator() -> CompositeValidator {
    CompositeValidator::new()
        .add(BasicConnectionValidator)
        .add(NoDuplicatesValidator)
}

// ============================================================================
// Tests
// ============================================================================
