//! Requirement types.
//!
//! An archetype is a tree of requirements of four kinds. Each kind has its
//! own struct; nesting is expressed through typed child vectors, so a
//! property requirement can never hold an edge requirement and so on.

use archetype_core::{Multiplicity, Properties, Value};
use std::fmt;

/// Position of a requirement in its archetype, assigned depth-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RequirementId(pub u32);

impl RequirementId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// The four requirement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequirementKind {
    Node,
    Edge,
    Property,
    Constraint,
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequirementKind::Node => "node",
            RequirementKind::Edge => "edge",
            RequirementKind::Property => "property",
            RequirementKind::Constraint => "constraint",
        };
        write!(f, "{}", name)
    }
}

/// Borrowed view over any requirement.
#[derive(Debug, Clone, Copy)]
pub enum Requirement<'a> {
    Node(&'a NodeRequirement),
    Edge(&'a EdgeRequirement),
    Property(&'a PropertyRequirement),
    Constraint(&'a ConstraintRequirement),
}

impl Requirement<'_> {
    pub fn id(&self) -> RequirementId {
        match self {
            Requirement::Node(r) => r.id,
            Requirement::Edge(r) => r.id,
            Requirement::Property(r) => r.id,
            Requirement::Constraint(r) => r.id,
        }
    }

    pub fn kind(&self) -> RequirementKind {
        match self {
            Requirement::Node(_) => RequirementKind::Node,
            Requirement::Edge(_) => RequirementKind::Edge,
            Requirement::Property(_) => RequirementKind::Property,
            Requirement::Constraint(_) => RequirementKind::Constraint,
        }
    }

    /// Short human label, e.g. `edge appliesTo -> category:animal`.
    pub fn label(&self) -> String {
        match self {
            Requirement::Node(r) => match &r.required_id {
                Some(id) => format!("node {}:{}", r.required_class, id),
                None => format!("node {}", r.required_class),
            },
            Requirement::Edge(r) => match &r.required_class {
                Some(class) => format!("edge {} -> {}", class, r.to_node),
                None => format!("edge -> {}", r.to_node),
            },
            Requirement::Property(r) => format!("property {}: {}", r.name, r.declared_type),
            Requirement::Constraint(r) => format!("constraint {}", r.query),
        }
    }
}

// ==================== Node ====================

/// Requires nodes of a class under given parents.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRequirement {
    pub id: RequirementId,
    pub required_class: String,
    /// `None` means any instance id.
    pub required_id: Option<String>,
    /// Parent reference patterns. Empty or all-blank means "is a root".
    pub parents: Vec<String>,
    /// Occurrences per parent. Defaults to `0..*`.
    pub multiplicity: Multiplicity,
    pub nodes: Vec<NodeRequirement>,
    pub edges: Vec<EdgeRequirement>,
    pub properties: Vec<PropertyRequirement>,
    pub constraints: Vec<ConstraintRequirement>,
}

impl NodeRequirement {
    pub fn new(required_class: impl Into<String>) -> Self {
        Self {
            id: RequirementId::default(),
            required_class: required_class.into(),
            required_id: None,
            parents: Vec::new(),
            multiplicity: Multiplicity::ANY,
            nodes: Vec::new(),
            edges: Vec::new(),
            properties: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.required_id = Some(id.into());
        self
    }

    pub fn with_parent(mut self, pattern: impl Into<String>) -> Self {
        self.parents.push(pattern.into());
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_node(mut self, node: NodeRequirement) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: EdgeRequirement) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn with_property(mut self, property: PropertyRequirement) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_constraint(mut self, constraint: ConstraintRequirement) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Whether the parent patterns denote "no parent".
    pub fn has_blank_parents(&self) -> bool {
        self.parents.iter().all(|p| p.trim().is_empty())
    }
}

// ==================== Edge ====================

/// Requires outgoing edges from a node.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRequirement {
    pub id: RequirementId,
    /// Reference pattern the edge's end node must match.
    pub to_node: String,
    pub required_class: Option<String>,
    pub required_id: Option<String>,
    /// Matching edges per node. Defaults to `1..1`.
    pub multiplicity: Multiplicity,
    pub properties: Vec<PropertyRequirement>,
    pub constraints: Vec<ConstraintRequirement>,
}

impl EdgeRequirement {
    pub fn new(to_node: impl Into<String>) -> Self {
        Self {
            id: RequirementId::default(),
            to_node: to_node.into(),
            required_class: None,
            required_id: None,
            multiplicity: Multiplicity::ONE,
            properties: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.required_class = Some(class.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.required_id = Some(id.into());
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_property(mut self, property: PropertyRequirement) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_constraint(mut self, constraint: ConstraintRequirement) -> Self {
        self.constraints.push(constraint);
        self
    }
}

// ==================== Property ====================

/// Requires a typed property on a node or edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRequirement {
    pub id: RequirementId,
    pub name: String,
    /// Type name the value must resolve to.
    pub declared_type: String,
    /// Defaults to `1..1`; a zero lower bound makes the property optional.
    pub multiplicity: Multiplicity,
    pub constraints: Vec<ConstraintRequirement>,
}

impl PropertyRequirement {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            id: RequirementId::default(),
            name: name.into(),
            declared_type: declared_type.into(),
            multiplicity: Multiplicity::ONE,
            constraints: Vec::new(),
        }
    }

    /// Shorthand for a `0..1` multiplicity.
    pub fn optional(mut self) -> Self {
        self.multiplicity = Multiplicity::OPTIONAL;
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_constraint(mut self, constraint: ConstraintRequirement) -> Self {
        self.constraints.push(constraint);
        self
    }
}

// ==================== Constraint ====================

/// Applies a named query with parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRequirement {
    pub id: RequirementId,
    /// Registered query name.
    pub query: String,
    pub params: Properties,
}

impl ConstraintRequirement {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            id: RequirementId::default(),
            query: query.into(),
            params: Properties::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}
