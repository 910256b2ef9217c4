//! Checks of one matched node.

use archetype_core::{ElementId, NodeId};
use archetype_model::{NodeRequirement, Requirement};

use crate::diagnostic::{Diagnostic, DiagnosticKind, Subject};
use crate::engine::{range_detail, CheckPass};
use crate::error::CheckResult;
use crate::matcher;
use crate::registry::QueryItem;

impl CheckPass<'_> {
    /// Constraints first, so composed diagnostics precede structural ones,
    /// then edges, then properties.
    pub(crate) fn check_node(&mut self, id: NodeId, req: &NodeRequirement) -> CheckResult<()> {
        let tree = self.tree;
        let Some(node) = tree.node(id) else {
            return Ok(());
        };
        let subject = Subject::node(node);

        self.apply_constraints(&req.constraints, QueryItem::Node(id), &subject)?;
        self.check_edges(id, node, &req.edges)?;
        self.check_properties(
            &req.properties,
            ElementId::Node(id),
            node.properties.as_ref(),
            &subject,
        )
    }

    /// Children of a matched node against each nested requirement placed
    /// under it. A nested requirement without parent patterns sits under
    /// every node `req` matched.
    pub(crate) fn check_child_counts(&mut self, id: NodeId, req: &NodeRequirement) {
        let tree = self.tree;
        for nested in &req.nodes {
            let applies = nested.has_blank_parents()
                || matcher::is_parent_pattern(tree, id, &nested.parents);
            if !applies {
                continue;
            }
            let count = tree
                .children(id)
                .iter()
                .filter_map(|child| tree.node(*child))
                .filter(|child| {
                    matcher::matches_class(child, &nested.required_class)
                        && matcher::matches_id(child, nested.required_id.as_deref())
                })
                .count();
            if !nested.multiplicity.in_range(count) {
                let requirement = self.requirement(Requirement::Node(nested));
                let subject = self.node_subject(id);
                self.emit(
                    Diagnostic::new(DiagnosticKind::NodeRangeIncorrect2, subject)
                        .with_requirement(requirement)
                        .with_detail(range_detail(nested, count)),
                );
            }
        }
    }
}
