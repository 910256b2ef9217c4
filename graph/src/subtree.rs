//! A tree view rooted at one node of another tree.

use crate::target::TargetTree;
use archetype_core::{Edge, EdgeId, Node, NodeId};
use std::collections::HashSet;

/// Read-only view of the subtree under `root`.
///
/// The view's root has no parent, so it can be checked as a standalone
/// tree. Edges leaving the subtree are still visible from their start node.
pub struct Subtree<'t> {
    tree: &'t dyn TargetTree,
    root: NodeId,
    members: Vec<NodeId>,
    member_set: HashSet<NodeId>,
}

impl<'t> Subtree<'t> {
    pub fn new(tree: &'t dyn TargetTree, root: NodeId) -> Self {
        let members = tree.descendants(root);
        let member_set = members.iter().copied().collect();
        Self {
            tree,
            root,
            members,
            member_set,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.member_set.contains(&id)
    }
}

impl TargetTree for Subtree<'_> {
    fn roots(&self) -> Vec<NodeId> {
        vec![self.root]
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.members.clone()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        if self.contains(id) {
            self.tree.node(id)
        } else {
            None
        }
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.tree.edge(id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        if id == self.root {
            None
        } else {
            self.tree.parent(id)
        }
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        if self.contains(id) {
            self.tree.children(id)
        } else {
            &[]
        }
    }

    fn out_edges(&self, id: NodeId) -> &[EdgeId] {
        if self.contains(id) {
            self.tree.out_edges(id)
        } else {
            &[]
        }
    }

    fn supports_edges(&self, id: NodeId) -> bool {
        self.contains(id) && self.tree.supports_edges(id)
    }

    fn is_known_edge_class(&self, class: &str) -> bool {
        self.tree.is_known_edge_class(class)
    }

    fn node_count(&self) -> usize {
        self.members.len()
    }

    // Edge ends may lie outside the view; resolve them against the full tree.
    fn matches_ref(&self, id: NodeId, pattern: &str) -> bool {
        self.tree.matches_ref(id, pattern)
    }
}
