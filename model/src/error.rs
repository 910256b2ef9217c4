//! Errors raised while building or reading an archetype.

use archetype_core::{GraphError, MultiplicityError};
use thiserror::Error;

/// A malformed archetype. These are programmer errors, never diagnostics.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Archetype tree must have exactly one root, found {0}")]
    RootCount(usize),

    #[error("Archetype root must be of class 'archetype', found '{0}'")]
    WrongRootClass(String),

    #[error("Unknown requirement class '{0}'")]
    UnknownRequirement(String),

    #[error("A '{child}' requirement cannot be nested in '{parent}'")]
    IllegalNesting { parent: String, child: String },

    #[error("Requirement '{requirement}' is missing field '{field}'")]
    MissingField { requirement: String, field: String },

    #[error("Field '{field}' of '{requirement}' must be of type {expected}")]
    WrongFieldType {
        requirement: String,
        field: String,
        expected: String,
    },

    #[error("Bad multiplicity on '{requirement}': {source}")]
    Multiplicity {
        requirement: String,
        #[source]
        source: MultiplicityError,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ModelError {
    pub fn illegal_nesting(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::IllegalNesting {
            parent: parent.into(),
            child: child.into(),
        }
    }

    pub fn missing_field(requirement: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            requirement: requirement.into(),
            field: field.into(),
        }
    }

    pub fn wrong_field_type(
        requirement: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::WrongFieldType {
            requirement: requirement.into(),
            field: field.into(),
            expected: expected.into(),
        }
    }

    pub fn multiplicity(requirement: impl Into<String>, source: MultiplicityError) -> Self {
        Self::Multiplicity {
            requirement: requirement.into(),
            source,
        }
    }
}

/// Result type for archetype model operations.
pub type ModelResult<T> = Result<T, ModelError>;
