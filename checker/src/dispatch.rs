//! Constraint dispatch.

use archetype_model::{ConstraintRequirement, Requirement};

use crate::diagnostic::{Detail, Diagnostic, DiagnosticKind, Subject};
use crate::engine::CheckPass;
use crate::error::CheckResult;
use crate::registry::{QueryContext, QueryItem, QueryOutcome};

impl CheckPass<'_> {
    /// Apply constraints to one item.
    ///
    /// Unresolved queries and unsatisfied queries become diagnostics; nested
    /// outcomes are merged. Only fatal errors of a nested check propagate.
    pub(crate) fn apply_constraints(
        &mut self,
        constraints: &[ConstraintRequirement],
        item: QueryItem<'_>,
        subject: &Subject,
    ) -> CheckResult<()> {
        let engine = self.engine;
        for constraint in constraints {
            let requirement = self.requirement(Requirement::Constraint(constraint));
            let query = match engine.query(constraint.id) {
                Some(Ok(query)) => query,
                Some(Err(e)) => {
                    self.emit(
                        Diagnostic::new(DiagnosticKind::QueryPropertyClassUnknown, subject.clone())
                            .with_requirement(requirement)
                            .with_detail(Detail::Query {
                                query: constraint.query.clone(),
                                message: e.to_string(),
                            }),
                    );
                    continue;
                }
                None => continue,
            };

            let ctx = QueryContext {
                tree: self.tree,
                registry: &engine.registry,
                config: &engine.config,
                options: self.options,
                depth: self.depth,
            };
            match query.evaluate(&item, &ctx)? {
                QueryOutcome::Satisfied => {}
                QueryOutcome::Unsatisfied(message) => {
                    self.emit(
                        Diagnostic::new(item.unsatisfied_kind(), subject.clone())
                            .with_requirement(requirement)
                            .with_detail(Detail::Query {
                                query: constraint.query.clone(),
                                message,
                            }),
                    );
                }
                QueryOutcome::Nested {
                    diagnostics,
                    compliant,
                } => {
                    tracing::debug!(
                        query = %constraint.query,
                        nested = diagnostics.len(),
                        compliant = compliant.len(),
                        "nested check merged"
                    );
                    self.diagnostics.merge(diagnostics);
                    self.compliant.extend(compliant);
                }
            }
        }
        Ok(())
    }
}
