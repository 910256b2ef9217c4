//! Edge checks.

use archetype_core::{EdgeId, ElementId, Node, NodeId};
use archetype_model::{EdgeRequirement, Requirement};
use std::collections::BTreeSet;

use crate::diagnostic::{Detail, Diagnostic, DiagnosticKind, Subject};
use crate::engine::CheckPass;
use crate::error::CheckResult;
use crate::matcher;
use crate::registry::QueryItem;

impl CheckPass<'_> {
    /// Check the outgoing edges of one node against each edge requirement.
    ///
    /// An edge is a candidate when its end matches the requirement's target
    /// pattern. Candidates with the required class and id count toward the
    /// multiplicity; every candidate has its constraints and properties
    /// checked. A node that cannot carry edges has no candidates. An edge of
    /// an unknown class is reported once, against the first requirement.
    pub(crate) fn check_edges(
        &mut self,
        id: NodeId,
        owner: &Node,
        requirements: &[EdgeRequirement],
    ) -> CheckResult<()> {
        let tree = self.tree;
        let check_class = self.engine.config.edge_class_check;
        let node_subject = Subject::node(owner);
        let mut unknown = BTreeSet::new();

        for req in requirements {
            let requirement = self.requirement(Requirement::Edge(req));
            let mut tally = 0usize;

            let out_edges: &[EdgeId] = if tree.supports_edges(id) {
                tree.out_edges(id)
            } else {
                &[]
            };
            for &edge_id in out_edges {
                self.options.check_cancelled()?;
                let Some(edge) = tree.edge(edge_id) else {
                    continue;
                };
                let edge_subject = Subject::edge(edge);

                if check_class
                    && !tree.is_known_edge_class(&edge.class)
                    && unknown.insert(edge_id)
                {
                    self.emit(
                        Diagnostic::new(DiagnosticKind::EdgeClassUnknown, edge_subject.clone())
                            .with_requirement(requirement.clone())
                            .with_detail(Detail::EdgeClass {
                                expected: req.required_class.clone(),
                                found: edge.class.clone(),
                            }),
                    );
                }

                let from_owner = tree
                    .node(edge.start)
                    .is_some_and(|start| matcher::matches_class(start, &owner.class));
                if !from_owner || !tree.matches_ref(edge.end, &req.to_node) {
                    continue;
                }

                let mut valid = true;
                if let Some(class) = &req.required_class {
                    if edge.class != *class {
                        valid = false;
                        self.emit(
                            Diagnostic::new(
                                DiagnosticKind::EdgeClassIncorrect,
                                edge_subject.clone(),
                            )
                            .with_requirement(requirement.clone())
                            .with_detail(Detail::EdgeClass {
                                expected: Some(class.clone()),
                                found: edge.class.clone(),
                            }),
                        );
                    }
                }
                if let Some(required_id) = &req.required_id {
                    if edge.instance != *required_id {
                        valid = false;
                        self.emit(
                            Diagnostic::new(DiagnosticKind::EdgeIdIncorrect, edge_subject.clone())
                                .with_requirement(requirement.clone())
                                .with_detail(Detail::EdgeId {
                                    expected: required_id.clone(),
                                    found: edge.instance.clone(),
                                }),
                        );
                    }
                }
                if valid {
                    tally += 1;
                }

                self.apply_constraints(&req.constraints, QueryItem::Edge(edge_id), &edge_subject)?;
                self.check_properties(
                    &req.properties,
                    ElementId::Edge(edge_id),
                    edge.properties.as_ref(),
                    &edge_subject,
                )?;
            }

            tracing::debug!(requirement = %req.id, node = %id, tally, "edge requirement scanned");
            if !req.multiplicity.in_range(tally) {
                self.emit(
                    Diagnostic::new(DiagnosticKind::EdgeRangeIncorrect, node_subject.clone())
                        .with_requirement(requirement)
                        .with_detail(Detail::Range {
                            class: req
                                .required_class
                                .clone()
                                .unwrap_or_else(|| req.to_node.clone()),
                            count: tally,
                            expected: req.multiplicity,
                        }),
                );
            }
        }
        Ok(())
    }
}
