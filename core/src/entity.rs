//! Entity structures of a specification tree.
//!
//! Nodes form a forest through their parent links; edges are labeled
//! cross-links from a start node to an end node.

use crate::{EdgeId, NodeId, Properties, Value};

/// A node in a specification tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Storage handle.
    pub id: NodeId,
    /// Class identifier, e.g. `"category"`.
    pub class: String,
    /// Instance identifier, unique among siblings of the same class.
    pub instance: String,
    /// Parent node, `None` for roots.
    pub parent: Option<NodeId>,
    /// Children in insertion order.
    pub children: Vec<NodeId>,
    /// Outgoing edges in insertion order.
    pub out_edges: Vec<EdgeId>,
    /// Property list. `None` means the node carries no list at all.
    pub properties: Option<Properties>,
    /// Whether this node can carry outgoing edges.
    pub edges_enabled: bool,
}

impl Node {
    /// Create a node with an empty property list.
    pub fn new(id: NodeId, class: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            id,
            class: class.into(),
            instance: instance.into(),
            parent: None,
            children: Vec::new(),
            out_edges: Vec::new(),
            properties: Some(Properties::new()),
            edges_enabled: true,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Get a property value by name.
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(name))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }

    /// Set a property, creating the property list if it is absent.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties
            .get_or_insert_with(Properties::new)
            .insert(name.into(), value.into());
    }

    /// Property names, empty if there is no list.
    pub fn property_keys(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .flat_map(|p| p.keys().map(String::as_str))
    }
}

/// A labeled edge between two nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Storage handle.
    pub id: EdgeId,
    /// Class identifier, e.g. `"appliesTo"`.
    pub class: String,
    /// Instance identifier.
    pub instance: String,
    pub start: NodeId,
    pub end: NodeId,
    /// Optional property list, absent unless set.
    pub properties: Option<Properties>,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        class: impl Into<String>,
        instance: impl Into<String>,
        start: NodeId,
        end: NodeId,
    ) -> Self {
        Self {
            id,
            class: class.into(),
            instance: instance.into(),
            start,
            end,
            properties: None,
        }
    }

    /// Get a property value by name.
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(name))
    }

    /// Set a property, creating the property list if it is absent.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties
            .get_or_insert_with(Properties::new)
            .insert(name.into(), value.into());
    }

    pub fn is_self_loop(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new(NodeId::new(1), "category", "animal");

        assert_eq!(node.class, "category");
        assert_eq!(node.instance, "animal");
        assert!(node.is_root());
        assert!(node.properties.as_ref().is_some_and(|p| p.is_empty()));
        assert!(node.edges_enabled);
    }

    #[test]
    fn test_node_property_operations() {
        let mut node = Node::new(NodeId::new(1), "category", "animal");
        node.properties = None;

        assert!(!node.has_property("x"));
        assert_eq!(node.property_keys().count(), 0);

        node.set_property("x", 5i64);
        assert_eq!(node.get_property("x"), Some(&Value::Int(5)));
        assert_eq!(node.property_keys().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_edge_property_list_absent_by_default() {
        let mut edge = Edge::new(EdgeId::new(1), "appliesTo", "a1", NodeId::new(1), NodeId::new(2));

        assert!(edge.properties.is_none());
        edge.set_property("weight", 0.5);
        assert_eq!(edge.get_property("weight"), Some(&Value::Float(0.5)));
        assert!(!edge.is_self_loop());
    }
}
