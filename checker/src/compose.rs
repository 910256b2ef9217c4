//! Sub-archetype composition.
//!
//! The `archetype.compose` query checks the subtree rooted at a node against
//! another archetype from an [`ArchetypeLibrary`]. Its diagnostics are merged
//! into the outer check, and the nodes it finds compliant count as compliant
//! for the outer archetype's exclusivity.

use archetype_core::TYPE_STRING;
use archetype_graph::Subtree;
use archetype_model::Archetype;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::engine::ArchetypeEngine;
use crate::error::{CheckResult, QueryError, QueryResult};
use crate::registry::{
    ParamSpec, Query, QueryContext, QueryFactory, QueryItem, QueryOutcome, QueryParams,
};

pub const COMPOSE_QUERY: &str = "archetype.compose";

/// Named archetypes available for composition.
#[derive(Debug, Clone, Default)]
pub struct ArchetypeLibrary {
    archetypes: BTreeMap<String, Arc<Archetype>>,
}

impl ArchetypeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an archetype under its own name, replacing any previous one.
    pub fn insert(&mut self, archetype: impl Into<Arc<Archetype>>) {
        let archetype = archetype.into();
        self.archetypes.insert(archetype.name.clone(), archetype);
    }

    pub fn with(mut self, archetype: impl Into<Arc<Archetype>>) -> Self {
        self.insert(archetype);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Archetype>> {
        self.archetypes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archetypes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archetypes.keys().map(String::as_str)
    }
}

/// Factory for `archetype.compose`.
pub struct ComposeFactory {
    library: Arc<ArchetypeLibrary>,
}

impl ComposeFactory {
    pub fn new(library: impl Into<Arc<ArchetypeLibrary>>) -> Self {
        Self {
            library: library.into(),
        }
    }
}

impl QueryFactory for ComposeFactory {
    fn name(&self) -> &str {
        COMPOSE_QUERY
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::required("archetype", TYPE_STRING)];
        PARAMS
    }

    fn build(&self, params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        let name = params.require_str("archetype")?;
        let archetype = self.library.get(name).cloned().ok_or_else(|| {
            QueryError::build(COMPOSE_QUERY, format!("unknown archetype '{}'", name))
        })?;
        Ok(Box::new(Compose {
            archetype,
            engine: OnceLock::new(),
        }))
    }
}

struct Compose {
    archetype: Arc<Archetype>,
    /// Built on first use with the registry and config of the running check.
    engine: OnceLock<ArchetypeEngine>,
}

impl Query for Compose {
    fn evaluate(&self, item: &QueryItem<'_>, ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let QueryItem::Node(id) = item else {
            return Ok(QueryOutcome::unsatisfied(format!(
                "{} applies to nodes only",
                COMPOSE_QUERY
            )));
        };
        let engine = self.engine.get_or_init(|| {
            ArchetypeEngine::new(
                self.archetype.clone(),
                ctx.registry.clone(),
                ctx.config.clone(),
            )
        });

        let view = Subtree::new(ctx.tree, *id);
        let evaluation = engine.run(&view, ctx.options, ctx.depth + 1)?;
        Ok(QueryOutcome::Nested {
            diagnostics: evaluation.diagnostics,
            compliant: evaluation.compliant,
        })
    }
}
