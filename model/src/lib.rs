//! Archetype model.
//!
//! An [`Archetype`] is an immutable tree of requirements describing the
//! valid shapes of a specification tree. Archetypes are built in code with
//! [`ArchetypeBuilder`] or read from their own tree form with
//! [`Archetype::from_tree`].

mod archetype;
mod builder;
pub mod convert;
mod error;
mod requirement;

pub use archetype::{Archetype, ScopedNode};
pub use builder::ArchetypeBuilder;
pub use error::{ModelError, ModelResult};
pub use requirement::{
    ConstraintRequirement, EdgeRequirement, NodeRequirement, PropertyRequirement, Requirement,
    RequirementId, RequirementKind,
};
