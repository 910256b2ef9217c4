//! In-memory specification tree.

use crate::index::{ClassIndex, IdentityIndex, IdentityKey};
use crate::target::TargetTree;
use archetype_core::{Edge, EdgeId, GraphError, GraphResult, Node, NodeId, Value};
use std::collections::{BTreeSet, HashMap};

/// ID allocator for nodes and edges.
#[derive(Debug, Clone)]
struct IdAllocator {
    next_node_id: u64,
    next_edge_id: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self {
            next_node_id: 1,
            next_edge_id: 1,
        }
    }

    fn alloc_node_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn alloc_edge_id(&mut self) -> EdgeId {
        let id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;
        id
    }
}

/// An in-memory specification tree.
///
/// Several parentless nodes may exist; a tree with more than one root is
/// representable so that a checker can report it.
#[derive(Debug, Clone)]
pub struct SpecTree {
    /// Node storage
    nodes: HashMap<NodeId, Node>,
    /// Edge storage
    edges: HashMap<EdgeId, Edge>,
    /// Node insertion order
    order: Vec<NodeId>,
    /// Parentless nodes in insertion order
    roots: Vec<NodeId>,
    /// ID allocator
    id_alloc: IdAllocator,
    /// Class index
    class_index: ClassIndex,
    /// Sibling identity index
    identity_index: IdentityIndex,
    /// Declared edge classes; `None` means every class is known
    edge_classes: Option<BTreeSet<String>>,
}

impl Default for SpecTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            order: Vec::new(),
            roots: Vec::new(),
            id_alloc: IdAllocator::new(),
            class_index: ClassIndex::new(),
            identity_index: IdentityIndex::new(),
            edge_classes: None,
        }
    }

    // ==================== Node Operations ====================

    /// Add a parentless node.
    pub fn add_root(
        &mut self,
        class: impl Into<String>,
        instance: impl Into<String>,
    ) -> GraphResult<NodeId> {
        self.insert_node(None, class.into(), instance.into())
    }

    /// Add a child of `parent`.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        class: impl Into<String>,
        instance: impl Into<String>,
    ) -> GraphResult<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return Err(GraphError::NodeNotFound(parent));
        }
        self.insert_node(Some(parent), class.into(), instance.into())
    }

    fn insert_node(
        &mut self,
        parent: Option<NodeId>,
        class: String,
        instance: String,
    ) -> GraphResult<NodeId> {
        // Anonymous nodes (empty instance id) are exempt from sibling identity
        if !instance.is_empty() {
            let key = IdentityKey::new(parent, &class, &instance);
            if self.identity_index.contains(&key) {
                let scope = match parent {
                    Some(p) => self.path_of(p),
                    None => "<root>".to_string(),
                };
                return Err(GraphError::duplicate_id(class, instance, scope));
            }
        }

        let id = self.id_alloc.alloc_node_id();
        let mut node = Node::new(id, class, instance);
        node.parent = parent;

        self.class_index.insert(&node.class, id);
        if !node.instance.is_empty() {
            self.identity_index
                .insert(IdentityKey::new(parent, &node.class, &node.instance), id);
        }
        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    parent_node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }

        self.nodes.insert(id, node);
        self.order.push(id);
        Ok(id)
    }

    /// Get a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Set a property on a node, creating its property list if needed.
    pub fn set_property(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> GraphResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        node.set_property(name, value);
        Ok(())
    }

    /// Drop a node's property list entirely.
    pub fn clear_property_list(&mut self, id: NodeId) -> GraphResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        node.properties = None;
        Ok(())
    }

    /// Mark a node as unable to carry edges.
    pub fn disable_edges(&mut self, id: NodeId) -> GraphResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        node.edges_enabled = false;
        Ok(())
    }

    // ==================== Edge Operations ====================

    /// Add an edge from `start` to `end`.
    pub fn add_edge(
        &mut self,
        class: impl Into<String>,
        instance: impl Into<String>,
        start: NodeId,
        end: NodeId,
    ) -> GraphResult<EdgeId> {
        if !self.nodes.contains_key(&end) {
            return Err(GraphError::NodeNotFound(end));
        }
        let start_node = self
            .nodes
            .get(&start)
            .ok_or(GraphError::NodeNotFound(start))?;
        if !start_node.edges_enabled {
            return Err(GraphError::EdgesDisabled(start));
        }

        let id = self.id_alloc.alloc_edge_id();
        let edge = Edge::new(id, class, instance, start, end);
        if let Some(node) = self.nodes.get_mut(&start) {
            node.out_edges.push(id);
        }
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Get an edge by ID.
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Set a property on an edge, creating its property list if needed.
    pub fn set_edge_property(
        &mut self,
        id: EdgeId,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> GraphResult<()> {
        let edge = self.edges.get_mut(&id).ok_or(GraphError::EdgeNotFound(id))?;
        edge.set_property(name, value);
        Ok(())
    }

    /// Declare an edge class. Once any class is declared, undeclared classes
    /// become unknown.
    pub fn declare_edge_class(&mut self, class: impl Into<String>) {
        self.edge_classes
            .get_or_insert_with(BTreeSet::new)
            .insert(class.into());
    }

    /// Declared edge classes, `None` if the tree accepts every class.
    pub fn edge_classes(&self) -> Option<impl Iterator<Item = &str>> {
        self.edge_classes
            .as_ref()
            .map(|set| set.iter().map(String::as_str))
    }

    // ==================== Query Operations ====================

    /// Nodes of a class, in insertion order.
    pub fn nodes_of_class(&self, class: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.class_index.get(class)
    }

    /// Resolve a slash-separated path of `class:instance` (or bare instance)
    /// segments starting at the roots.
    pub fn find_path(&self, path: &str) -> Option<NodeId> {
        let mut scope: Option<NodeId> = None;
        let mut current = None;
        for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            let found = match segment.split_once(':') {
                Some((class, instance)) => self
                    .identity_index
                    .get(&IdentityKey::new(scope, class.trim(), instance.trim())),
                None => self.identity_index.find_instance(scope, segment),
            }?;
            scope = Some(found);
            current = Some(found);
        }
        current
    }

    /// The `class:instance` path of a node from its root.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(&c)) {
            segments.push(format!("{}:{}", node.class, node.instance));
            current = node.parent;
        }
        segments.reverse();
        segments.join("/")
    }

    // ==================== Statistics ====================

    /// Get the number of edges in the tree.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get all edge IDs in creation order.
    pub fn all_edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.edges.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl TargetTree for SpecTree {
    fn roots(&self) -> Vec<NodeId> {
        self.roots.clone()
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn out_edges(&self, id: NodeId) -> &[EdgeId] {
        self.nodes
            .get(&id)
            .map(|n| n.out_edges.as_slice())
            .unwrap_or(&[])
    }

    fn is_known_edge_class(&self, class: &str) -> bool {
        match &self.edge_classes {
            Some(declared) => declared.contains(class),
            None => true,
        }
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_nodes_builds_structure() {
        // GIVEN an ecology root with two categories
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        let animal = tree.add_node(root, "category", "animal").unwrap();
        let plant = tree.add_node(root, "category", "plant").unwrap();

        // THEN structure is wired both ways
        assert_eq!(tree.roots(), vec![root]);
        assert_eq!(tree.children(root), &[animal, plant]);
        assert_eq!(tree.parent(animal), Some(root));
        assert_eq!(tree.nodes(), vec![root, animal, plant]);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_duplicate_sibling_identity_rejected() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        tree.add_node(root, "category", "animal").unwrap();

        let err = tree.add_node(root, "category", "animal").unwrap_err();
        assert!(matches!(err, GraphError::DuplicateId { .. }));
    }

    #[test]
    fn test_same_identity_under_different_parents_allowed() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        let a = tree.add_node(root, "category", "animal").unwrap();
        let b = tree.add_node(root, "category", "plant").unwrap();

        assert!(tree.add_node(a, "process", "grow").is_ok());
        assert!(tree.add_node(b, "process", "grow").is_ok());
    }

    #[test]
    fn test_anonymous_siblings_allowed() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();

        assert!(tree.add_node(root, "note", "").is_ok());
        assert!(tree.add_node(root, "note", "").is_ok());
    }

    #[test]
    fn test_multiple_roots_representable() {
        let mut tree = SpecTree::new();
        let a = tree.add_root("ecology", "a").unwrap();
        let b = tree.add_root("ecology", "b").unwrap();

        assert_eq!(tree.roots(), vec![a, b]);
        assert_eq!(tree.root(), Some(a));
    }

    #[test]
    fn test_add_edge_wires_out_edges() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        let animal = tree.add_node(root, "category", "animal").unwrap();
        let grow = tree.add_node(root, "process", "grow").unwrap();

        let edge = tree.add_edge("appliesTo", "a1", grow, animal).unwrap();

        assert_eq!(tree.out_edges(grow), &[edge]);
        let stored = tree.get_edge(edge).unwrap();
        assert_eq!(stored.start, grow);
        assert_eq!(stored.end, animal);
        assert_eq!(tree.edge_count(), 1);
    }

    #[test]
    fn test_add_edge_to_missing_node_fails() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();

        let err = tree
            .add_edge("appliesTo", "a1", root, NodeId::new(99))
            .unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(_)));
    }

    #[test]
    fn test_edges_disabled_node_rejects_edges() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        let leaf = tree.add_node(root, "label", "l").unwrap();
        tree.disable_edges(leaf).unwrap();

        assert!(!tree.supports_edges(leaf));
        assert!(matches!(
            tree.add_edge("refersTo", "r", leaf, root),
            Err(GraphError::EdgesDisabled(_))
        ));
    }

    #[test]
    fn test_edge_class_declaration() {
        let mut tree = SpecTree::new();
        assert!(tree.is_known_edge_class("anything"));

        tree.declare_edge_class("appliesTo");
        assert!(tree.is_known_edge_class("appliesTo"));
        assert!(!tree.is_known_edge_class("anything"));
    }

    #[test]
    fn test_find_path_and_path_of() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        let animal = tree.add_node(root, "category", "animal").unwrap();
        let wolf = tree.add_node(animal, "species", "wolf").unwrap();

        assert_eq!(tree.find_path("ecology:eco/category:animal"), Some(animal));
        assert_eq!(tree.find_path("eco/animal/wolf"), Some(wolf));
        assert_eq!(tree.find_path("eco/plant"), None);
        assert_eq!(
            tree.path_of(wolf),
            "ecology:eco/category:animal/species:wolf"
        );
    }

    #[test]
    fn test_property_list_operations() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();

        tree.set_property(root, "x", 1i64).unwrap();
        assert_eq!(
            tree.get_node(root).unwrap().get_property("x"),
            Some(&Value::Int(1))
        );

        tree.clear_property_list(root).unwrap();
        assert!(tree.get_node(root).unwrap().properties.is_none());
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        let a = tree.add_node(root, "category", "a").unwrap();
        let a1 = tree.add_node(a, "species", "a1").unwrap();
        let b = tree.add_node(root, "category", "b").unwrap();

        assert_eq!(tree.descendants(root), vec![root, a, a1, b]);
        assert_eq!(tree.descendants(a), vec![a, a1]);
    }
}
