//! Common error types for tree construction and loading.

use crate::{EdgeId, NodeId};
use thiserror::Error;

/// Errors that can occur while building or loading a specification tree.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Node not found.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Edge not found.
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// A sibling with the same class and instance id already exists.
    #[error("Duplicate identity {class}:{instance} under {scope}")]
    DuplicateId {
        class: String,
        instance: String,
        scope: String,
    },

    /// A node path did not resolve.
    #[error("Path does not resolve: {0}")]
    PathNotFound(String),

    /// The node cannot carry edges.
    #[error("Node {0} cannot carry edges")]
    EdgesDisabled(NodeId),

    /// A tree document could not be parsed.
    #[error("Malformed tree document: {0}")]
    MalformedDocument(String),
}

impl GraphError {
    pub fn duplicate_id(
        class: impl Into<String>,
        instance: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::DuplicateId {
            class: class.into(),
            instance: instance.into(),
            scope: scope.into(),
        }
    }

    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound(path.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }
}

/// Result type for tree operations.
pub type GraphResult<T> = Result<T, GraphError>;
