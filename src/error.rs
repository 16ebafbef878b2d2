//! Error types for editor operations, persistence and configuration.

use crate::graph::ValidationError;

/// Reason a mutation was rejected. A rejected operation leaves both the
/// canonical state and the history untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("Node {0} not found")]
    NodeNotFound(String),

    #[error("No nodes selected")]
    EmptySelection,

    #[error("Need at least 2 nodes to create a behavior group ({selected} selected)")]
    NotEnoughNodesForGroup { selected: usize },

    #[error("Cannot connect: {0}")]
    InvalidConnection(#[from] ValidationError),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse stored value for key '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Storage quota exceeded writing '{key}' ({size} bytes, quota {quota})")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] toml::de::Error),
}
