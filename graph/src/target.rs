//! The read-only capability set a checker consumes.

use archetype_core::{Edge, EdgeId, Node, NodeId};

use crate::reference;

/// A tree of typed nodes with labeled cross-links, viewed read-only.
///
/// Node order returned by [`TargetTree::nodes`] and [`TargetTree::roots`]
/// must be stable so that repeated checks report identically.
pub trait TargetTree {
    /// Nodes without a parent.
    fn roots(&self) -> Vec<NodeId>;

    /// Every node, in a stable order.
    fn nodes(&self) -> Vec<NodeId>;

    fn node(&self, id: NodeId) -> Option<&Node>;

    fn edge(&self, id: EdgeId) -> Option<&Edge>;

    fn parent(&self, id: NodeId) -> Option<NodeId>;

    fn children(&self, id: NodeId) -> &[NodeId];

    fn out_edges(&self, id: NodeId) -> &[EdgeId];

    /// Whether a node can carry outgoing edges at all.
    fn supports_edges(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.edges_enabled)
    }

    /// Whether an edge class is resolvable.
    fn is_known_edge_class(&self, class: &str) -> bool;

    /// The first root, if any.
    fn root(&self) -> Option<NodeId> {
        self.roots().first().copied()
    }

    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Match a node against a reference pattern.
    fn matches_ref(&self, id: NodeId, pattern: &str) -> bool {
        self.node(id)
            .is_some_and(|node| reference::matches_ref(node, pattern))
    }

    /// Descendants of a node, depth-first pre-order, the node itself first.
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }
}
