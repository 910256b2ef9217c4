//! The archetype for archetypes.
//!
//! Archetypes in tree form are specification trees themselves, so they can be
//! checked like any other tree. The meta-archetype is exclusive: every node
//! of a candidate must be one of the five requirement classes, placed where
//! that class may appear.

use archetype_core::{Multiplicity, TYPE_BOOLEAN, TYPE_LIST, TYPE_STRING};
use archetype_model::convert::{
    ARCHETYPE_CLASS, CONSTRAINT_CLASS, EDGE_CLASS, EXCLUSIVE_FIELD, MULTIPLICITY_FIELD,
    NAME_FIELD, NODE_CLASS, PARENTS_FIELD, PROPERTY_CLASS, QUERY_FIELD, REQUIRED_CLASS_FIELD,
    REQUIRED_ID_FIELD, TO_NODE_FIELD, TYPE_FIELD,
};
use archetype_model::{
    Archetype, ArchetypeBuilder, ConstraintRequirement, ModelResult, NodeRequirement,
    PropertyRequirement,
};
use std::sync::Arc;

use crate::config::CheckerConfig;
use crate::engine::ArchetypeEngine;
use crate::error::{CheckError, CheckResult};
use crate::registry::QueryRegistry;

pub const META_ARCHETYPE_NAME: &str = "archetype";

fn multiplicity_property() -> PropertyRequirement {
    PropertyRequirement::new(MULTIPLICITY_FIELD, TYPE_STRING)
        .optional()
        .with_constraint(ConstraintRequirement::new("archetype.multiplicity"))
}

fn requirement(class: &str, parents: &[&str]) -> NodeRequirement {
    parents
        .iter()
        .fold(NodeRequirement::new(class), |req, parent| {
            req.with_parent(*parent)
        })
}

/// Build the meta-archetype.
pub fn meta_archetype() -> ModelResult<Archetype> {
    ArchetypeBuilder::new(META_ARCHETYPE_NAME)
        .exclusive()
        .node(
            NodeRequirement::new(ARCHETYPE_CLASS)
                .with_multiplicity(Multiplicity::ONE)
                .with_property(PropertyRequirement::new(EXCLUSIVE_FIELD, TYPE_BOOLEAN).optional())
                .with_property(PropertyRequirement::new(NAME_FIELD, TYPE_STRING).optional()),
        )
        .node(
            requirement(NODE_CLASS, &[ARCHETYPE_CLASS, NODE_CLASS])
                .with_property(PropertyRequirement::new(REQUIRED_CLASS_FIELD, TYPE_STRING))
                .with_property(PropertyRequirement::new(REQUIRED_ID_FIELD, TYPE_STRING).optional())
                .with_property(
                    PropertyRequirement::new(PARENTS_FIELD, TYPE_LIST)
                        .optional()
                        .with_constraint(ConstraintRequirement::new("archetype.parents")),
                )
                .with_property(multiplicity_property()),
        )
        .node(
            requirement(EDGE_CLASS, &[NODE_CLASS])
                .with_property(PropertyRequirement::new(TO_NODE_FIELD, TYPE_STRING))
                .with_property(
                    PropertyRequirement::new(REQUIRED_CLASS_FIELD, TYPE_STRING).optional(),
                )
                .with_property(PropertyRequirement::new(REQUIRED_ID_FIELD, TYPE_STRING).optional())
                .with_property(multiplicity_property()),
        )
        .node(
            requirement(PROPERTY_CLASS, &[NODE_CLASS, EDGE_CLASS])
                .with_property(PropertyRequirement::new(NAME_FIELD, TYPE_STRING))
                .with_property(PropertyRequirement::new(TYPE_FIELD, TYPE_STRING))
                .with_property(multiplicity_property()),
        )
        .node(
            requirement(
                CONSTRAINT_CLASS,
                &[ARCHETYPE_CLASS, NODE_CLASS, EDGE_CLASS, PROPERTY_CLASS],
            )
            .with_property(PropertyRequirement::new(QUERY_FIELD, TYPE_STRING)),
        )
        .build()
}

/// An engine for the meta-archetype with the built-in queries.
///
/// Every query of the meta-archetype must resolve; anything else is fatal.
pub fn meta_engine(config: Arc<CheckerConfig>) -> CheckResult<ArchetypeEngine> {
    let engine = ArchetypeEngine::new(
        meta_archetype()?,
        Arc::new(QueryRegistry::with_builtins()),
        config,
    );
    if let Some((constraint, error)) = engine.unresolved().first() {
        return Err(CheckError::UnresolvedMetaQuery {
            query: constraint.query.clone(),
            source: (*error).clone(),
        });
    }
    Ok(engine)
}
