//! Node reference patterns.
//!
//! A reference names a node by class, by class and instance id, or by
//! wildcard:
//!
//! | pattern      | matches                              |
//! |--------------|--------------------------------------|
//! | `*`          | any node                             |
//! | `category`   | nodes of class `category`            |
//! | `category:*` | same as `category`                   |
//! | `category:a` | the `category` node with instance `a`|
//! | `*:a`        | any node with instance `a`           |
//!
//! Blank patterns parse to nothing and match nothing.

use archetype_core::Node;
use std::fmt;

const WILDCARD: &str = "*";

/// A parsed node reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Any,
    Class(String),
    ClassInstance { class: String, instance: String },
    Instance(String),
}

impl NodeRef {
    /// Parse a pattern. Returns `None` for blank input.
    pub fn parse(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return None;
        }
        if pattern == WILDCARD {
            return Some(NodeRef::Any);
        }
        let parsed = match pattern.split_once(':') {
            Some((class, instance)) => {
                let class = class.trim();
                let instance = instance.trim();
                match (class, instance) {
                    (WILDCARD, WILDCARD) | (WILDCARD, "") => NodeRef::Any,
                    (WILDCARD, _) => NodeRef::Instance(instance.to_string()),
                    (_, WILDCARD) | (_, "") => NodeRef::Class(class.to_string()),
                    _ => NodeRef::ClassInstance {
                        class: class.to_string(),
                        instance: instance.to_string(),
                    },
                }
            }
            None => NodeRef::Class(pattern.to_string()),
        };
        Some(parsed)
    }

    /// Whether the node satisfies this reference.
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            NodeRef::Any => true,
            NodeRef::Class(class) => node.class == *class,
            NodeRef::ClassInstance { class, instance } => {
                node.class == *class && node.instance == *instance
            }
            NodeRef::Instance(instance) => node.instance == *instance,
        }
    }

    /// The class this reference is restricted to, if any.
    pub fn class(&self) -> Option<&str> {
        match self {
            NodeRef::Class(class) | NodeRef::ClassInstance { class, .. } => Some(class),
            NodeRef::Any | NodeRef::Instance(_) => None,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Any => write!(f, "*"),
            NodeRef::Class(class) => write!(f, "{}", class),
            NodeRef::ClassInstance { class, instance } => write!(f, "{}:{}", class, instance),
            NodeRef::Instance(instance) => write!(f, "*:{}", instance),
        }
    }
}

/// Whether a pattern is blank (the "no parent" marker).
pub fn is_blank(pattern: &str) -> bool {
    pattern.trim().is_empty()
}

/// Match a node against a textual pattern. Blank patterns never match.
pub fn matches_ref(node: &Node, pattern: &str) -> bool {
    NodeRef::parse(pattern).is_some_and(|r| r.matches(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use archetype_core::NodeId;

    fn node(class: &str, instance: &str) -> Node {
        Node::new(NodeId::new(1), class, instance)
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(NodeRef::parse("*"), Some(NodeRef::Any));
        assert_eq!(NodeRef::parse("*:*"), Some(NodeRef::Any));
        assert_eq!(
            NodeRef::parse("category"),
            Some(NodeRef::Class("category".into()))
        );
        assert_eq!(
            NodeRef::parse("category:*"),
            Some(NodeRef::Class("category".into()))
        );
        assert_eq!(
            NodeRef::parse(" category : animal "),
            Some(NodeRef::ClassInstance {
                class: "category".into(),
                instance: "animal".into()
            })
        );
        assert_eq!(
            NodeRef::parse("*:animal"),
            Some(NodeRef::Instance("animal".into()))
        );
        assert_eq!(NodeRef::parse("   "), None);
    }

    #[test]
    fn test_matches() {
        let animal = node("category", "animal");

        assert!(matches_ref(&animal, "*"));
        assert!(matches_ref(&animal, "category"));
        assert!(matches_ref(&animal, "category:animal"));
        assert!(matches_ref(&animal, "*:animal"));
        assert!(!matches_ref(&animal, "category:plant"));
        assert!(!matches_ref(&animal, "process"));
        assert!(!matches_ref(&animal, ""));
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["*", "category", "category:animal", "*:animal"] {
            let parsed = NodeRef::parse(text).unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }
}
