//! ArchetypeBuilder for constructing an immutable Archetype.

use crate::archetype::Archetype;
use crate::error::{ModelError, ModelResult};
use crate::requirement::{
    ConstraintRequirement, EdgeRequirement, NodeRequirement, PropertyRequirement,
};

/// Builder for constructing an immutable [`Archetype`].
///
/// ```ignore
/// let archetype = ArchetypeBuilder::new("ecology")
///     .exclusive()
///     .node(NodeRequirement::new("ecology"))
///     .node(NodeRequirement::new("category").with_parent("ecology"))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ArchetypeBuilder {
    name: String,
    exclusive: bool,
    nodes: Vec<NodeRequirement>,
    constraints: Vec<ConstraintRequirement>,
}

impl ArchetypeBuilder {
    /// Create a new builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Require every target node to be matched by some node requirement.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn set_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Add a top-level node requirement.
    pub fn node(mut self, node: NodeRequirement) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a constraint applied to the whole target tree.
    pub fn constraint(mut self, constraint: ConstraintRequirement) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Validate mandatory fields and number the requirements.
    pub fn build(self) -> ModelResult<Archetype> {
        for node in &self.nodes {
            validate_node(node)?;
        }
        for constraint in &self.constraints {
            validate_constraint(constraint)?;
        }
        Ok(Archetype::assemble(
            self.name,
            self.exclusive,
            self.nodes,
            self.constraints,
        ))
    }
}

// ==================== Validation ====================

fn require(value: &str, requirement: &str, field: &str) -> ModelResult<()> {
    if value.trim().is_empty() {
        return Err(ModelError::missing_field(requirement, field));
    }
    Ok(())
}

fn validate_node(node: &NodeRequirement) -> ModelResult<()> {
    require(&node.required_class, "node", "requiredClass")?;
    for constraint in &node.constraints {
        validate_constraint(constraint)?;
    }
    for edge in &node.edges {
        validate_edge(edge)?;
    }
    for property in &node.properties {
        validate_property(property)?;
    }
    for child in &node.nodes {
        validate_node(child)?;
    }
    Ok(())
}

fn validate_edge(edge: &EdgeRequirement) -> ModelResult<()> {
    require(&edge.to_node, "edge", "toNode")?;
    for constraint in &edge.constraints {
        validate_constraint(constraint)?;
    }
    for property in &edge.properties {
        validate_property(property)?;
    }
    Ok(())
}

fn validate_property(property: &PropertyRequirement) -> ModelResult<()> {
    require(&property.name, "property", "name")?;
    require(&property.declared_type, "property", "type")?;
    for constraint in &property.constraints {
        validate_constraint(constraint)?;
    }
    Ok(())
}

fn validate_constraint(constraint: &ConstraintRequirement) -> ModelResult<()> {
    require(&constraint.query, "constraint", "query")
}
