//! Identity types for specification tree elements.
//!
//! These are storage handles assigned by the tree that owns the element.
//! They are distinct from the instance id string an element carries, which
//! is user data and only unique among siblings.

use std::fmt;

/// Storage handle for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new NodeId from a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Storage handle for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl EdgeId {
    /// Create a new EdgeId from a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Either a node or an edge. Anything that can carry a property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Node(NodeId),
    Edge(EdgeId),
}

impl ElementId {
    /// Returns true if this is a node ID.
    pub fn is_node(&self) -> bool {
        matches!(self, ElementId::Node(_))
    }

    /// Returns true if this is an edge ID.
    pub fn is_edge(&self) -> bool {
        matches!(self, ElementId::Edge(_))
    }

    /// Get as a NodeId if this is a node reference.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            ElementId::Node(id) => Some(*id),
            ElementId::Edge(_) => None,
        }
    }

    /// Get as an EdgeId if this is an edge reference.
    pub fn as_edge(&self) -> Option<EdgeId> {
        match self {
            ElementId::Node(_) => None,
            ElementId::Edge(id) => Some(*id),
        }
    }
}

impl From<NodeId> for ElementId {
    fn from(id: NodeId) -> Self {
        ElementId::Node(id)
    }
}

impl From<EdgeId> for ElementId {
    fn from(id: EdgeId) -> Self {
        ElementId::Edge(id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Node(id) => write!(f, "{}", id),
            ElementId::Edge(id) => write!(f, "{}", id),
        }
    }
}
