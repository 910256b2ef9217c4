//! Indexes for efficient tree lookups.

use archetype_core::NodeId;
use std::collections::HashMap;

/// Class index: class -> nodes of that class, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct ClassIndex {
    index: HashMap<String, Vec<NodeId>>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: &str, node_id: NodeId) {
        self.index.entry(class.to_string()).or_default().push(node_id);
    }

    pub fn get(&self, class: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.index
            .get(class)
            .into_iter()
            .flat_map(|nodes| nodes.iter().copied())
    }
}

/// Key for the identity index: the governing scope (parent, or `None` for
/// roots) plus class and instance id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub scope: Option<NodeId>,
    pub class: String,
    pub instance: String,
}

impl IdentityKey {
    pub fn new(scope: Option<NodeId>, class: &str, instance: &str) -> Self {
        Self {
            scope,
            class: class.to_string(),
            instance: instance.to_string(),
        }
    }
}

/// Identity index: (scope, class, instance) -> node.
///
/// Sibling identities are unique, so each key maps to exactly one node.
#[derive(Debug, Default, Clone)]
pub struct IdentityIndex {
    index: HashMap<IdentityKey, NodeId>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key. Returns false if it was already taken.
    pub fn insert(&mut self, key: IdentityKey, node_id: NodeId) -> bool {
        match self.index.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(node_id);
                true
            }
        }
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &IdentityKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Find a child of `scope` by instance id alone, any class.
    pub fn find_instance(&self, scope: Option<NodeId>, instance: &str) -> Option<NodeId> {
        self.index
            .iter()
            .filter(|(key, _)| key.scope == scope && key.instance == instance)
            .map(|(_, id)| *id)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_index_preserves_insertion_order() {
        let mut index = ClassIndex::new();
        index.insert("category", NodeId::new(3));
        index.insert("process", NodeId::new(1));
        index.insert("category", NodeId::new(2));

        assert_eq!(
            index.get("category").collect::<Vec<_>>(),
            vec![NodeId::new(3), NodeId::new(2)]
        );
        assert_eq!(index.get("missing").count(), 0);
    }

    #[test]
    fn test_identity_index_rejects_duplicates() {
        let mut index = IdentityIndex::new();
        let key = IdentityKey::new(Some(NodeId::new(1)), "category", "animal");

        assert!(index.insert(key.clone(), NodeId::new(2)));
        assert!(!index.insert(key.clone(), NodeId::new(3)));
        assert_eq!(index.get(&key), Some(NodeId::new(2)));
    }

    #[test]
    fn test_identity_is_scoped_by_parent() {
        let mut index = IdentityIndex::new();

        assert!(index.insert(
            IdentityKey::new(Some(NodeId::new(1)), "category", "animal"),
            NodeId::new(2)
        ));
        assert!(index.insert(
            IdentityKey::new(Some(NodeId::new(5)), "category", "animal"),
            NodeId::new(6)
        ));
        assert_eq!(
            index.find_instance(Some(NodeId::new(5)), "animal"),
            Some(NodeId::new(6))
        );
    }
}
