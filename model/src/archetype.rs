//! The archetype: an immutable tree of requirements.

use crate::requirement::{
    ConstraintRequirement, EdgeRequirement, NodeRequirement, PropertyRequirement, Requirement,
    RequirementId,
};

/// A node requirement together with the requirement it is nested in.
#[derive(Debug, Clone, Copy)]
pub struct ScopedNode<'a> {
    pub requirement: &'a NodeRequirement,
    /// `None` for requirements directly under the archetype root.
    pub enclosing: Option<&'a NodeRequirement>,
}

/// Structural rules a specification tree is checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct Archetype {
    pub name: String,
    /// Every target node must be matched by some node requirement.
    pub exclusive: bool,
    /// Top-level node requirements.
    pub nodes: Vec<NodeRequirement>,
    /// Constraints applied to the target tree as a whole.
    pub constraints: Vec<ConstraintRequirement>,
    requirement_count: u32,
}

impl Archetype {
    /// Assemble an archetype and number its requirements depth-first.
    pub(crate) fn assemble(
        name: String,
        exclusive: bool,
        nodes: Vec<NodeRequirement>,
        constraints: Vec<ConstraintRequirement>,
    ) -> Self {
        let mut archetype = Self {
            name,
            exclusive,
            nodes,
            constraints,
            requirement_count: 0,
        };
        let mut next = 0u32;
        for node in &mut archetype.nodes {
            number_node(node, &mut next);
        }
        for constraint in &mut archetype.constraints {
            number_constraint(constraint, &mut next);
        }
        archetype.requirement_count = next;
        archetype
    }

    /// Total number of requirements of all kinds.
    pub fn requirement_count(&self) -> u32 {
        self.requirement_count
    }

    /// Every node requirement, nested ones included, depth-first.
    pub fn node_requirements(&self) -> Vec<ScopedNode<'_>> {
        let mut out = Vec::new();
        for node in &self.nodes {
            collect_nodes(node, None, &mut out);
        }
        out
    }

    /// Every constraint requirement anywhere in the archetype.
    pub fn constraint_requirements(&self) -> Vec<&ConstraintRequirement> {
        let mut out = Vec::new();
        self.visit(&mut |req| {
            if let Requirement::Constraint(c) = req {
                out.push(c);
            }
        });
        out
    }

    /// Look a requirement up by id.
    pub fn find(&self, id: RequirementId) -> Option<Requirement<'_>> {
        let mut found = None;
        self.visit(&mut |req| {
            if found.is_none() && req.id() == id {
                found = Some(req);
            }
        });
        found
    }

    /// Visit every requirement depth-first.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(Requirement<'a>)) {
        for node in &self.nodes {
            visit_node(node, f);
        }
        for constraint in &self.constraints {
            f(Requirement::Constraint(constraint));
        }
    }
}

fn number_node(node: &mut NodeRequirement, next: &mut u32) {
    node.id = take(next);
    for constraint in &mut node.constraints {
        number_constraint(constraint, next);
    }
    for edge in &mut node.edges {
        number_edge(edge, next);
    }
    for property in &mut node.properties {
        number_property(property, next);
    }
    for child in &mut node.nodes {
        number_node(child, next);
    }
}

fn number_edge(edge: &mut EdgeRequirement, next: &mut u32) {
    edge.id = take(next);
    for constraint in &mut edge.constraints {
        number_constraint(constraint, next);
    }
    for property in &mut edge.properties {
        number_property(property, next);
    }
}

fn number_property(property: &mut PropertyRequirement, next: &mut u32) {
    property.id = take(next);
    for constraint in &mut property.constraints {
        number_constraint(constraint, next);
    }
}

fn number_constraint(constraint: &mut ConstraintRequirement, next: &mut u32) {
    constraint.id = take(next);
}

fn take(next: &mut u32) -> RequirementId {
    let id = RequirementId::new(*next);
    *next += 1;
    id
}

fn collect_nodes<'a>(
    node: &'a NodeRequirement,
    enclosing: Option<&'a NodeRequirement>,
    out: &mut Vec<ScopedNode<'a>>,
) {
    out.push(ScopedNode {
        requirement: node,
        enclosing,
    });
    for child in &node.nodes {
        collect_nodes(child, Some(node), out);
    }
}

fn visit_node<'a>(node: &'a NodeRequirement, f: &mut dyn FnMut(Requirement<'a>)) {
    f(Requirement::Node(node));
    for constraint in &node.constraints {
        f(Requirement::Constraint(constraint));
    }
    for edge in &node.edges {
        f(Requirement::Edge(edge));
        for constraint in &edge.constraints {
            f(Requirement::Constraint(constraint));
        }
        for property in &edge.properties {
            visit_property(property, f);
        }
    }
    for property in &node.properties {
        visit_property(property, f);
    }
    for child in &node.nodes {
        visit_node(child, f);
    }
}

fn visit_property<'a>(property: &'a PropertyRequirement, f: &mut dyn FnMut(Requirement<'a>)) {
    f(Requirement::Property(property));
    for constraint in &property.constraints {
        f(Requirement::Constraint(constraint));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::RequirementKind;

    fn sample() -> Archetype {
        Archetype::assemble(
            "sample".into(),
            false,
            vec![NodeRequirement::new("ecology")
                .with_constraint(ConstraintRequirement::new("node.leaf"))
                .with_property(
                    PropertyRequirement::new("x", "Integer")
                        .with_constraint(ConstraintRequirement::new("value.range")),
                )
                .with_node(
                    NodeRequirement::new("category")
                        .with_edge(EdgeRequirement::new("category").with_class("relatesTo")),
                )],
            vec![ConstraintRequirement::new("tree.check")],
        )
    }

    #[test]
    fn test_numbering_is_depth_first_and_dense() {
        let archetype = sample();

        // ecology, node.leaf, x, value.range, category, relatesTo, tree.check
        assert_eq!(archetype.requirement_count(), 7);
        assert_eq!(archetype.nodes[0].id, RequirementId::new(0));
        assert_eq!(archetype.nodes[0].constraints[0].id, RequirementId::new(1));
        assert_eq!(archetype.nodes[0].properties[0].id, RequirementId::new(2));
        assert_eq!(archetype.nodes[0].nodes[0].id, RequirementId::new(4));
        assert_eq!(archetype.constraints[0].id, RequirementId::new(6));
    }

    #[test]
    fn test_visit_order_matches_numbering() {
        let archetype = sample();
        let mut ids = Vec::new();
        archetype.visit(&mut |req| ids.push(req.id().raw()));

        assert_eq!(ids, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_node_requirements_carry_enclosing() {
        let archetype = sample();
        let scoped = archetype.node_requirements();

        assert_eq!(scoped.len(), 2);
        assert!(scoped[0].enclosing.is_none());
        assert_eq!(
            scoped[1].enclosing.map(|r| r.required_class.as_str()),
            Some("ecology")
        );
    }

    #[test]
    fn test_find_and_constraints() {
        let archetype = sample();

        let found = archetype.find(RequirementId::new(5)).unwrap();
        assert_eq!(found.kind(), RequirementKind::Edge);
        assert!(archetype.find(RequirementId::new(99)).is_none());
        assert_eq!(
            archetype
                .constraint_requirements()
                .iter()
                .map(|c| c.query.as_str())
                .collect::<Vec<_>>(),
            vec!["node.leaf", "value.range", "tree.check"]
        );
    }
}
