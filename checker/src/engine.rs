//! The archetype engine.
//!
//! One evaluation is a single pass over every node requirement of the
//! archetype, nested ones included. For each requirement the engine scans the
//! target tree in its stable node order, checks every matching node, tallies
//! occurrences per parent, and finally, for exclusive archetypes, reports the
//! nodes no requirement matched.

use archetype_core::NodeId;
use archetype_graph::TargetTree;
use archetype_model::{
    Archetype, ConstraintRequirement, NodeRequirement, Requirement, RequirementId, ScopedNode,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::config::{CheckOptions, CheckerConfig};
use crate::diagnostic::{
    Detail, Diagnostic, DiagnosticKind, Diagnostics, RequirementRef, Subject,
};
use crate::error::{CheckError, CheckResult, QueryError, QueryResult};
use crate::matcher;
use crate::registry::{Query, QueryItem, QueryRegistry};

/// Result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub diagnostics: Diagnostics,
    /// Nodes matched by some requirement, composition included.
    pub compliant: BTreeSet<NodeId>,
}

/// Checks target trees against one archetype.
///
/// Queries are resolved once, here. A constraint whose query fails to
/// resolve is reported as `QUERY_PROPERTY_CLASS_UNKNOWN` on every check.
pub struct ArchetypeEngine {
    pub(crate) archetype: Arc<Archetype>,
    pub(crate) registry: Arc<QueryRegistry>,
    pub(crate) config: Arc<CheckerConfig>,
    queries: HashMap<RequirementId, QueryResult<Box<dyn Query>>>,
}

impl fmt::Debug for ArchetypeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchetypeEngine")
            .field("archetype", &self.archetype.name)
            .field("queries", &self.queries.len())
            .finish()
    }
}

impl ArchetypeEngine {
    pub fn new(
        archetype: impl Into<Arc<Archetype>>,
        registry: Arc<QueryRegistry>,
        config: Arc<CheckerConfig>,
    ) -> Self {
        let archetype = archetype.into();
        let queries = archetype
            .constraint_requirements()
            .into_iter()
            .map(|constraint| {
                let resolved = registry.resolve(constraint);
                if let Err(e) = &resolved {
                    tracing::warn!(
                        archetype = %archetype.name,
                        requirement = %constraint.id,
                        query = %constraint.query,
                        error = %e,
                        "query unresolved"
                    );
                }
                (constraint.id, resolved)
            })
            .collect();
        Self {
            archetype,
            registry,
            config,
            queries,
        }
    }

    /// Built-in queries and default configuration.
    pub fn with_defaults(archetype: impl Into<Arc<Archetype>>) -> Self {
        Self::new(
            archetype,
            Arc::new(QueryRegistry::with_builtins()),
            Arc::new(CheckerConfig::default()),
        )
    }

    pub fn archetype(&self) -> &Archetype {
        &self.archetype
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Constraints whose query did not resolve, by requirement id.
    pub fn unresolved(&self) -> Vec<(&ConstraintRequirement, &QueryError)> {
        let mut out: Vec<_> = self
            .archetype
            .constraint_requirements()
            .into_iter()
            .filter_map(|c| match self.queries.get(&c.id) {
                Some(Err(e)) => Some((c, e)),
                _ => None,
            })
            .collect();
        out.sort_by_key(|(c, _)| c.id);
        out
    }

    pub(crate) fn query(&self, id: RequirementId) -> Option<&QueryResult<Box<dyn Query>>> {
        self.queries.get(&id)
    }

    /// Check a tree and return every violation found.
    pub fn evaluate(
        &self,
        tree: &dyn TargetTree,
        options: &CheckOptions,
    ) -> CheckResult<Diagnostics> {
        Ok(self.run(tree, options, 0)?.diagnostics)
    }

    /// Check a tree at a composition depth, also returning compliant nodes.
    pub fn run(
        &self,
        tree: &dyn TargetTree,
        options: &CheckOptions,
        depth: usize,
    ) -> CheckResult<Evaluation> {
        let limit = self.config.max_composition_depth;
        if depth > limit {
            return Err(CheckError::CompositionDepthExceeded { limit });
        }

        let span = tracing::info_span!(
            "archetype_check",
            archetype = %self.archetype.name,
            nodes = tree.node_count(),
            depth
        );
        let _guard = span.enter();

        let mut pass = CheckPass::new(self, tree, options, depth);
        pass.check_roots()?;
        pass.apply_constraints(&self.archetype.constraints, QueryItem::Tree, &Subject::Tree)?;
        for scoped in self.archetype.node_requirements() {
            pass.check_node_requirement(scoped)?;
        }
        if self.archetype.exclusive {
            pass.check_exclusive()?;
        }

        tracing::debug!(
            diagnostics = pass.diagnostics.len(),
            compliant = pass.compliant.len(),
            "check finished"
        );
        Ok(pass.finish())
    }
}

// ==================== Check pass ====================

/// Mutable state of one evaluation.
pub(crate) struct CheckPass<'a> {
    pub(crate) engine: &'a ArchetypeEngine,
    pub(crate) tree: &'a dyn TargetTree,
    pub(crate) options: &'a CheckOptions,
    pub(crate) depth: usize,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) compliant: BTreeSet<NodeId>,
    /// Nodes matched per node requirement, filled in requirement order.
    matched: HashMap<RequirementId, BTreeSet<NodeId>>,
}

impl<'a> CheckPass<'a> {
    fn new(
        engine: &'a ArchetypeEngine,
        tree: &'a dyn TargetTree,
        options: &'a CheckOptions,
        depth: usize,
    ) -> Self {
        Self {
            engine,
            tree,
            options,
            depth,
            diagnostics: Diagnostics::new(),
            compliant: BTreeSet::new(),
            matched: HashMap::new(),
        }
    }

    fn finish(self) -> Evaluation {
        Evaluation {
            diagnostics: self.diagnostics,
            compliant: self.compliant,
        }
    }

    pub(crate) fn emit(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(
            code = diagnostic.code(),
            subject = %diagnostic.subject,
            "diagnostic"
        );
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn requirement(&self, requirement: Requirement<'_>) -> RequirementRef {
        RequirementRef::new(self.engine.archetype.name.clone(), requirement)
    }

    pub(crate) fn node_subject(&self, id: NodeId) -> Subject {
        self.tree.node(id).map_or(Subject::Tree, Subject::node)
    }

    fn check_roots(&mut self) -> CheckResult<()> {
        let roots = self.tree.roots();
        let count = self.tree.node_count();
        if roots.is_empty() && count > 0 {
            return Err(CheckError::NotATree(count));
        }
        if roots.len() > 1 {
            self.emit(
                Diagnostic::new(DiagnosticKind::TreeMultipleRoots, Subject::Tree).with_detail(
                    Detail::RootCount {
                        count: roots.len(),
                    },
                ),
            );
        }
        Ok(())
    }

    fn check_node_requirement(&mut self, scoped: ScopedNode<'_>) -> CheckResult<()> {
        let tree = self.tree;
        let req = scoped.requirement;
        let scope = self.scope_of(scoped);

        let mut matched = Vec::new();
        let mut counts: BTreeMap<Option<NodeId>, usize> = BTreeMap::new();
        for id in tree.nodes() {
            self.options.check_cancelled()?;
            let Some(node) = tree.node(id) else {
                continue;
            };
            let hit = match &scope {
                Some(parents) => matcher::matches_under(tree, node, req, parents),
                None => matcher::matches_requirement(tree, node, req, &req.parents),
            };
            if hit {
                matched.push(id);
                *counts.entry(tree.parent(id)).or_default() += 1;
            }
        }
        tracing::debug!(
            requirement = %req.id,
            class = %req.required_class,
            scoped = scope.is_some(),
            matched = matched.len(),
            "node requirement scanned"
        );

        for &id in &matched {
            self.options.check_cancelled()?;
            self.compliant.insert(id);
            self.check_node(id, req)?;
            self.check_child_counts(id, req);
        }
        self.check_parent_counts(scoped, scope.as_ref(), &counts)?;
        self.matched.insert(req.id, matched.into_iter().collect());
        Ok(())
    }

    /// Nodes a nested requirement without parent patterns may sit under: the
    /// nodes its enclosing requirement matched. `None` when the requirement's
    /// own patterns apply.
    fn scope_of(&self, scoped: ScopedNode<'_>) -> Option<BTreeSet<NodeId>> {
        match scoped.enclosing {
            Some(outer) if scoped.requirement.has_blank_parents() => {
                Some(self.matched.get(&outer.id).cloned().unwrap_or_default())
            }
            _ => None,
        }
    }

    /// Occurrences of a requirement per parent instance.
    ///
    /// Parents already counted by the enclosing requirement's child check
    /// are skipped.
    fn check_parent_counts(
        &mut self,
        scoped: ScopedNode<'_>,
        scope: Option<&BTreeSet<NodeId>>,
        counts: &BTreeMap<Option<NodeId>, usize>,
    ) -> CheckResult<()> {
        let tree = self.tree;
        let req = scoped.requirement;

        let mut candidates: BTreeSet<Option<NodeId>> = counts.keys().copied().collect();
        match scope {
            Some(parents) => candidates.extend(parents.iter().copied().map(Some)),
            None if req.has_blank_parents() => {
                candidates.insert(None);
            }
            None => {
                for id in tree.nodes() {
                    self.options.check_cancelled()?;
                    if matcher::is_parent_pattern(tree, id, &req.parents) {
                        candidates.insert(Some(id));
                    }
                }
            }
        }

        let governed = scoped
            .enclosing
            .and_then(|outer| self.matched.get(&outer.id));
        let violations: Vec<(Option<NodeId>, usize)> = candidates
            .into_iter()
            .filter(|parent| match (parent, governed) {
                (Some(p), Some(governed)) => !governed.contains(p),
                _ => true,
            })
            .map(|parent| (parent, counts.get(&parent).copied().unwrap_or(0)))
            .filter(|(_, count)| !req.multiplicity.in_range(*count))
            .collect();

        for (parent, count) in violations {
            let subject = parent.map_or(Subject::Tree, |p| self.node_subject(p));
            let requirement = self.requirement(Requirement::Node(req));
            self.emit(
                Diagnostic::new(DiagnosticKind::NodeRangeIncorrect1, subject)
                    .with_requirement(requirement)
                    .with_detail(range_detail(req, count)),
            );
        }
        Ok(())
    }

    fn check_exclusive(&mut self) -> CheckResult<()> {
        let tree = self.tree;
        let mut missing = Vec::new();
        for id in tree.nodes() {
            self.options.check_cancelled()?;
            if !self.compliant.contains(&id) {
                missing.push(self.node_subject(id));
            }
        }
        if !missing.is_empty() {
            tracing::debug!(missing = missing.len(), "nodes without specification");
            self.emit(
                Diagnostic::new(DiagnosticKind::NodeMissingSpecification, Subject::Tree)
                    .with_detail(Detail::NonCompliant { nodes: missing }),
            );
        }
        Ok(())
    }
}

pub(crate) fn range_detail(req: &NodeRequirement, count: usize) -> Detail {
    Detail::Range {
        class: req.required_class.clone(),
        count,
        expected: req.multiplicity,
    }
}
