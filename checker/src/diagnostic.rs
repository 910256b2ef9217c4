//! Diagnostic types.
//!
//! A check never stops at the first violation. Every violation becomes a
//! [`Diagnostic`] appended to a [`Diagnostics`] list; the list is the result.

use archetype_core::{Edge, EdgeId, ElementId, Multiplicity, Node, NodeId};
use archetype_model::{Requirement, RequirementId};
use std::fmt;

use crate::messages::{EnglishMessages, MessageFormatter};

/// Coarse grouping of diagnostic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Archetype,
    Graph,
    Node,
    Edge,
    Property,
    Item,
}

/// Every kind of compliance violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The target has more than one root.
    TreeMultipleRoots,
    /// Exclusive archetype, but some nodes match no requirement.
    NodeMissingSpecification,
    /// Occurrences of a class under one parent out of range.
    NodeRangeIncorrect1,
    /// Children of a class under one matched node out of range.
    NodeRangeIncorrect2,
    NodeQueryUnsatisfied,
    EdgeQueryUnsatisfied,
    PropertyQueryUnsatisfied,
    ItemQueryUnsatisfied,
    EdgeClassUnknown,
    EdgeClassIncorrect,
    EdgeIdIncorrect,
    EdgeRangeIncorrect,
    PropertyMissing,
    /// The value's type name is not recognized.
    PropertyUnknown,
    PropertyTypeIncorrect,
    ElementMissingPropertyList,
    /// A constraint's query could not be resolved or built.
    QueryPropertyClassUnknown,
}

impl DiagnosticKind {
    /// All kinds, in declaration order.
    pub const ALL: [DiagnosticKind; 17] = [
        DiagnosticKind::TreeMultipleRoots,
        DiagnosticKind::NodeMissingSpecification,
        DiagnosticKind::NodeRangeIncorrect1,
        DiagnosticKind::NodeRangeIncorrect2,
        DiagnosticKind::NodeQueryUnsatisfied,
        DiagnosticKind::EdgeQueryUnsatisfied,
        DiagnosticKind::PropertyQueryUnsatisfied,
        DiagnosticKind::ItemQueryUnsatisfied,
        DiagnosticKind::EdgeClassUnknown,
        DiagnosticKind::EdgeClassIncorrect,
        DiagnosticKind::EdgeIdIncorrect,
        DiagnosticKind::EdgeRangeIncorrect,
        DiagnosticKind::PropertyMissing,
        DiagnosticKind::PropertyUnknown,
        DiagnosticKind::PropertyTypeIncorrect,
        DiagnosticKind::ElementMissingPropertyList,
        DiagnosticKind::QueryPropertyClassUnknown,
    ];

    /// Stable upper-snake code.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::TreeMultipleRoots => "TREE_MULTIPLE_ROOTS",
            DiagnosticKind::NodeMissingSpecification => "NODE_MISSING_SPECIFICATION",
            DiagnosticKind::NodeRangeIncorrect1 => "NODE_RANGE_INCORRECT1",
            DiagnosticKind::NodeRangeIncorrect2 => "NODE_RANGE_INCORRECT2",
            DiagnosticKind::NodeQueryUnsatisfied => "NODE_QUERY_UNSATISFIED",
            DiagnosticKind::EdgeQueryUnsatisfied => "EDGE_QUERY_UNSATISFIED",
            DiagnosticKind::PropertyQueryUnsatisfied => "PROPERTY_QUERY_UNSATISFIED",
            DiagnosticKind::ItemQueryUnsatisfied => "ITEM_QUERY_UNSATISFIED",
            DiagnosticKind::EdgeClassUnknown => "EDGE_CLASS_UNKNOWN",
            DiagnosticKind::EdgeClassIncorrect => "EDGE_CLASS_INCORRECT",
            DiagnosticKind::EdgeIdIncorrect => "EDGE_ID_INCORRECT",
            DiagnosticKind::EdgeRangeIncorrect => "EDGE_RANGE_INCORRECT",
            DiagnosticKind::PropertyMissing => "PROPERTY_MISSING",
            DiagnosticKind::PropertyUnknown => "PROPERTY_UNKNOWN",
            DiagnosticKind::PropertyTypeIncorrect => "PROPERTY_TYPE_INCORRECT",
            DiagnosticKind::ElementMissingPropertyList => "ELEMENT_MISSING_PROPERTY_LIST",
            DiagnosticKind::QueryPropertyClassUnknown => "QUERY_PROPERTY_CLASS_UNKNOWN",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            DiagnosticKind::NodeMissingSpecification
            | DiagnosticKind::QueryPropertyClassUnknown => Category::Archetype,
            DiagnosticKind::TreeMultipleRoots => Category::Graph,
            DiagnosticKind::NodeRangeIncorrect1
            | DiagnosticKind::NodeRangeIncorrect2
            | DiagnosticKind::NodeQueryUnsatisfied => Category::Node,
            DiagnosticKind::EdgeQueryUnsatisfied
            | DiagnosticKind::EdgeClassUnknown
            | DiagnosticKind::EdgeClassIncorrect
            | DiagnosticKind::EdgeIdIncorrect
            | DiagnosticKind::EdgeRangeIncorrect => Category::Edge,
            DiagnosticKind::PropertyQueryUnsatisfied
            | DiagnosticKind::PropertyMissing
            | DiagnosticKind::PropertyUnknown
            | DiagnosticKind::PropertyTypeIncorrect
            | DiagnosticKind::ElementMissingPropertyList => Category::Property,
            DiagnosticKind::ItemQueryUnsatisfied => Category::Item,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ==================== Subject ====================

/// Snapshot of the offending element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// The target tree as a whole.
    Tree,
    Node {
        id: NodeId,
        class: String,
        instance: String,
    },
    Edge {
        id: EdgeId,
        class: String,
        instance: String,
        start: NodeId,
        end: NodeId,
    },
    /// A property of a node or edge.
    Property {
        owner: ElementId,
        owner_class: String,
        owner_instance: String,
        name: String,
    },
}

impl Subject {
    pub fn node(node: &Node) -> Self {
        Subject::Node {
            id: node.id,
            class: node.class.clone(),
            instance: node.instance.clone(),
        }
    }

    pub fn edge(edge: &Edge) -> Self {
        Subject::Edge {
            id: edge.id,
            class: edge.class.clone(),
            instance: edge.instance.clone(),
            start: edge.start,
            end: edge.end,
        }
    }

    /// A property named `name` on the element `owner` describes. The tree
    /// itself has no properties.
    pub fn property(owner: &Subject, name: impl Into<String>) -> Self {
        let (owner, owner_class, owner_instance) = match owner {
            Subject::Node {
                id,
                class,
                instance,
            } => (ElementId::Node(*id), class.clone(), instance.clone()),
            Subject::Edge {
                id,
                class,
                instance,
                ..
            } => (ElementId::Edge(*id), class.clone(), instance.clone()),
            Subject::Property {
                owner,
                owner_class,
                owner_instance,
                ..
            } => (*owner, owner_class.clone(), owner_instance.clone()),
            Subject::Tree => return Subject::Tree,
        };
        Subject::Property {
            owner,
            owner_class,
            owner_instance,
            name: name.into(),
        }
    }

    /// The node this subject is, if any.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Subject::Node { id, .. } => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Tree => write!(f, "tree"),
            Subject::Node {
                class, instance, ..
            } => write!(f, "{}:{}", class, instance),
            Subject::Edge {
                class, instance, ..
            } => write!(f, "edge {}:{}", class, instance),
            Subject::Property {
                owner_class,
                owner_instance,
                name,
                ..
            } => write!(f, "{}:{}.{}", owner_class, owner_instance, name),
        }
    }
}

// ==================== Requirement reference ====================

/// The requirement a diagnostic was raised against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementRef {
    /// Name of the archetype that owns the requirement.
    pub archetype: String,
    pub id: RequirementId,
    pub label: String,
}

impl RequirementRef {
    pub fn new(archetype: impl Into<String>, requirement: Requirement<'_>) -> Self {
        Self {
            archetype: archetype.into(),
            id: requirement.id(),
            label: requirement.label(),
        }
    }
}

// ==================== Detail ====================

/// Structured parameters of a diagnostic, enough to render a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    None,
    RootCount {
        count: usize,
    },
    /// Observed count against an expected range.
    Range {
        class: String,
        count: usize,
        expected: Multiplicity,
    },
    NonCompliant {
        nodes: Vec<Subject>,
    },
    EdgeClass {
        expected: Option<String>,
        found: String,
    },
    EdgeId {
        expected: String,
        found: String,
    },
    Property {
        name: String,
    },
    PropertyType {
        name: String,
        expected: String,
        found: String,
    },
    Query {
        query: String,
        message: String,
    },
}

// ==================== Diagnostic ====================

/// One compliance violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub subject: Subject,
    pub requirement: Option<RequirementRef>,
    pub detail: Detail,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: Subject) -> Self {
        Self {
            kind,
            subject,
            requirement: None,
            detail: Detail::None,
        }
    }

    pub fn with_requirement(mut self, requirement: RequirementRef) -> Self {
        self.requirement = Some(requirement);
        self
    }

    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.detail = detail;
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Render with a formatter: `(action, constraint)`.
    pub fn render(&self, formatter: &dyn MessageFormatter) -> (String, String) {
        (formatter.action(self), formatter.constraint(self))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.code(),
            EnglishMessages.constraint(self)
        )
    }
}

/// Append-only collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Diagnostics in one category.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.category() == category)
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Codes in order, handy for assertions.
    pub fn codes(&self) -> Vec<&'static str> {
        self.diagnostics.iter().map(Diagnostic::code).collect()
    }

    /// Merge another collection.
    pub fn merge(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub(crate) fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
