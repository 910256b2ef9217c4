//! Stateful checker.
//!
//! [`Checker`] wraps an [`ArchetypeEngine`] and keeps the diagnostics of the
//! last check. Every call takes `&mut self`, so one checker never runs two
//! checks at once; use one checker per concurrent validation.

use archetype_graph::TargetTree;
use archetype_model::Archetype;
use std::sync::Arc;

use crate::config::{CheckOptions, CheckerConfig};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::engine::ArchetypeEngine;
use crate::error::CheckResult;
use crate::meta::meta_engine;
use crate::registry::QueryRegistry;

#[derive(Debug)]
pub struct Checker {
    engine: ArchetypeEngine,
    /// Built on the first archetype self-check.
    meta: Option<ArchetypeEngine>,
    diagnostics: Diagnostics,
}

impl Checker {
    /// A checker with the built-in queries and default configuration.
    pub fn new(archetype: impl Into<Arc<Archetype>>) -> Self {
        Self::from_engine(ArchetypeEngine::with_defaults(archetype))
    }

    pub fn with_registry(
        archetype: impl Into<Arc<Archetype>>,
        registry: QueryRegistry,
        config: CheckerConfig,
    ) -> Self {
        Self::from_engine(ArchetypeEngine::new(
            archetype,
            Arc::new(registry),
            Arc::new(config),
        ))
    }

    pub fn from_engine(engine: ArchetypeEngine) -> Self {
        Self {
            engine,
            meta: None,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn engine(&self) -> &ArchetypeEngine {
        &self.engine
    }

    /// Check a tree. Previous diagnostics are discarded first.
    pub fn check(&mut self, tree: &dyn TargetTree) -> CheckResult<&Diagnostics> {
        self.check_with(tree, &CheckOptions::new())
    }

    pub fn check_with(
        &mut self,
        tree: &dyn TargetTree,
        options: &CheckOptions,
    ) -> CheckResult<&Diagnostics> {
        self.diagnostics.clear();
        self.diagnostics = self.engine.evaluate(tree, options)?;
        Ok(&self.diagnostics)
    }

    /// Diagnostics of the last check.
    pub fn error_list(&self) -> &[Diagnostic] {
        self.diagnostics.all()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Whether the last check found nothing.
    pub fn is_compliant(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Check an archetype in tree form against the meta-archetype.
    ///
    /// The diagnostics replace those of the last check.
    pub fn check_archetype(&mut self, candidate: &dyn TargetTree) -> CheckResult<&Diagnostics> {
        self.diagnostics.clear();
        let meta = match self.meta.take() {
            Some(meta) => meta,
            None => meta_engine(self.engine.config.clone())?,
        };
        let result = meta.evaluate(candidate, &CheckOptions::new());
        self.meta = Some(meta);
        self.diagnostics = result?;
        Ok(&self.diagnostics)
    }

    /// Whether `candidate` is a well-formed archetype tree.
    pub fn is_archetype(&mut self, candidate: &dyn TargetTree) -> CheckResult<bool> {
        Ok(self.check_archetype(candidate)?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticKind;
    use archetype_core::Multiplicity;
    use archetype_graph::SpecTree;
    use archetype_model::{ArchetypeBuilder, NodeRequirement};

    fn ecology() -> Archetype {
        ArchetypeBuilder::new("ecology")
            .node(NodeRequirement::new("ecology").with_multiplicity(Multiplicity::ONE))
            .node(
                NodeRequirement::new("engine")
                    .with_parent("ecology")
                    .with_multiplicity(Multiplicity::ONE),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_check_replaces_previous_diagnostics() {
        // GIVEN
        let mut checker = Checker::new(ecology());
        let mut bad = SpecTree::new();
        bad.add_root("ecology", "eco").unwrap();
        let mut good = SpecTree::new();
        let root = good.add_root("ecology", "eco").unwrap();
        good.add_node(root, "engine", "main").unwrap();

        // WHEN
        let first = checker.check(&bad).unwrap().codes();

        // THEN
        assert_eq!(first, vec!["NODE_RANGE_INCORRECT1"]);
        assert!(!checker.is_compliant());

        // WHEN
        checker.check(&good).unwrap();

        // THEN
        assert!(checker.is_compliant());
        assert!(checker.error_list().is_empty());
    }

    #[test]
    fn test_is_archetype() {
        // GIVEN
        let mut checker = Checker::new(ecology());
        let valid = ecology().to_tree().unwrap();
        let mut invalid = SpecTree::new();
        invalid.add_root("archetype", "broken").unwrap();
        invalid.add_root("archetype", "other").unwrap();

        // THEN
        assert!(checker.is_archetype(&valid).unwrap());
        assert!(!checker.is_archetype(&invalid).unwrap());
        assert!(checker
            .error_list()
            .iter()
            .any(|d| d.kind == DiagnosticKind::TreeMultipleRoots));
    }
}
