//! Archetype Graph Storage
//!
//! This crate provides the specification tree a checker runs against:
//! - The `TargetTree` capability trait (the read-only view checkers consume)
//! - `SpecTree`, the in-memory implementation, with class and identity indexes
//! - Node reference patterns (`*`, `class`, `class:id`, `*:id`)
//! - `Subtree`, a view rooted at one node
//! - JSON tree documents

mod document;
mod index;
mod reference;
mod subtree;
mod target;
mod tree;

pub use document::{value_from_json, value_to_json, EdgeDocument, NodeDocument, TreeDocument};
pub use reference::{is_blank, matches_ref, NodeRef};
pub use subtree::Subtree;
pub use target::TargetTree;
pub use tree::SpecTree;
