//! Reference matching of target nodes against node requirements.

use archetype_core::{Node, NodeId};
use archetype_graph::{is_blank, TargetTree};
use archetype_model::NodeRequirement;
use std::collections::BTreeSet;

/// Exact class equality.
pub fn matches_class(node: &Node, required_class: &str) -> bool {
    node.class == required_class
}

/// True when no id is required, else exact equality.
pub fn matches_id(node: &Node, required_id: Option<&str>) -> bool {
    required_id.map_or(true, |id| node.instance == id)
}

/// Whether a node's parent satisfies the patterns.
///
/// A parentless node matches only an empty or all-blank list. A node with a
/// parent never matches such a list.
pub fn matches_parent(tree: &dyn TargetTree, id: NodeId, patterns: &[String]) -> bool {
    match tree.parent(id) {
        None => patterns.iter().all(|p| is_blank(p)),
        Some(parent) => is_parent_pattern(tree, parent, patterns),
    }
}

/// Whether `candidate` matches at least one non-blank pattern.
pub fn is_parent_pattern(tree: &dyn TargetTree, candidate: NodeId, patterns: &[String]) -> bool {
    patterns
        .iter()
        .filter(|p| !is_blank(p))
        .any(|p| tree.matches_ref(candidate, p))
}

/// Class, id and parent all match.
pub fn matches_requirement(
    tree: &dyn TargetTree,
    node: &Node,
    requirement: &NodeRequirement,
    parents: &[String],
) -> bool {
    matches_class(node, &requirement.required_class)
        && matches_id(node, requirement.required_id.as_deref())
        && matches_parent(tree, node.id, parents)
}

/// Class and id match, and the parent is one of `scope`.
pub fn matches_under(
    tree: &dyn TargetTree,
    node: &Node,
    requirement: &NodeRequirement,
    scope: &BTreeSet<NodeId>,
) -> bool {
    matches_class(node, &requirement.required_class)
        && matches_id(node, requirement.required_id.as_deref())
        && tree.parent(node.id).is_some_and(|p| scope.contains(&p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use archetype_graph::SpecTree;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_root_matches_only_blank_patterns() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();

        assert!(matches_parent(&tree, root, &[]));
        assert!(matches_parent(&tree, root, &patterns(&["", "  "])));
        assert!(!matches_parent(&tree, root, &patterns(&["", "ecology"])));
        assert!(!matches_parent(&tree, root, &patterns(&["*"])));
    }

    #[test]
    fn test_child_never_matches_blank_patterns() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        let child = tree.add_node(root, "category", "animal").unwrap();

        assert!(!matches_parent(&tree, child, &[]));
        assert!(!matches_parent(&tree, child, &patterns(&[""])));
        assert!(matches_parent(&tree, child, &patterns(&["", "ecology"])));
        assert!(matches_parent(&tree, child, &patterns(&["process", "ecology:eco"])));
        assert!(!matches_parent(&tree, child, &patterns(&["ecology:other"])));
    }

    #[test]
    fn test_requirement_match() {
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        let animal = tree.add_node(root, "category", "animal").unwrap();
        let node = tree.get_node(animal).unwrap();

        let any_category = NodeRequirement::new("category");
        let plant = NodeRequirement::new("category").with_id("plant");
        let parents = patterns(&["ecology"]);

        assert!(matches_requirement(&tree, node, &any_category, &parents));
        assert!(!matches_requirement(&tree, node, &plant, &parents));
        assert!(!matches_requirement(&tree, node, &any_category, &[]));
    }

    #[test]
    fn test_match_under_scope() {
        // GIVEN two categories, each with one child
        let mut tree = SpecTree::new();
        let root = tree.add_root("ecology", "eco").unwrap();
        let animal = tree.add_node(root, "category", "animal").unwrap();
        let plant = tree.add_node(root, "category", "plant").unwrap();
        let wolf = tree.add_node(animal, "species", "wolf").unwrap();
        let oak = tree.add_node(plant, "species", "oak").unwrap();
        let species = NodeRequirement::new("species");

        // WHEN only the animal category is in scope
        let scope = BTreeSet::from([animal]);

        // THEN only its child matches
        assert!(matches_under(&tree, tree.get_node(wolf).unwrap(), &species, &scope));
        assert!(!matches_under(&tree, tree.get_node(oak).unwrap(), &species, &scope));
        assert!(!matches_under(&tree, tree.get_node(root).unwrap(), &species, &scope));
    }
}
