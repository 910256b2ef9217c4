//! Archetype Core Types
//!
//! This crate provides the foundational types used throughout the archetype system:
//! - Identity types (NodeId, EdgeId, ElementId)
//! - Property values and the recognized type-name set
//! - Entity structures (Node, Edge)
//! - Multiplicity ranges
//! - Common error types

mod entity;
mod error;
mod id;
mod multiplicity;
mod types;
mod value;

pub use entity::*;
pub use error::*;
pub use id::*;
pub use multiplicity::*;
pub use types::*;
pub use value::*;
