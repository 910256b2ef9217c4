//! Message rendering.
//!
//! Diagnostics carry structured detail only. A [`MessageFormatter`] turns one
//! into a short action ("what to do") and a longer constraint ("what is
//! wrong"). [`EnglishMessages`] is the stock formatter.

use crate::diagnostic::{Detail, Diagnostic, DiagnosticKind, Subject};

/// Renders diagnostics as text.
pub trait MessageFormatter {
    /// Short instruction for fixing the violation.
    fn action(&self, diagnostic: &Diagnostic) -> String;

    /// Description of the violated constraint.
    fn constraint(&self, diagnostic: &Diagnostic) -> String;
}

/// English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMessages;

fn requirement_label(diagnostic: &Diagnostic) -> String {
    diagnostic
        .requirement
        .as_ref()
        .map_or_else(|| "archetype".to_string(), |r| r.label.clone())
}

fn subject_list(nodes: &[Subject]) -> String {
    nodes
        .iter()
        .map(Subject::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl MessageFormatter for EnglishMessages {
    fn action(&self, diagnostic: &Diagnostic) -> String {
        let subject = &diagnostic.subject;
        match (diagnostic.kind, &diagnostic.detail) {
            (DiagnosticKind::TreeMultipleRoots, _) => "Keep a single root node".to_string(),
            (DiagnosticKind::NodeMissingSpecification, _) => {
                "Remove nodes the archetype does not describe".to_string()
            }
            (
                DiagnosticKind::NodeRangeIncorrect1 | DiagnosticKind::NodeRangeIncorrect2,
                Detail::Range {
                    class, expected, ..
                },
            ) => format!("Use {} '{}' node(s) under {}", expected, class, subject),
            (DiagnosticKind::EdgeRangeIncorrect, Detail::Range { class, expected, .. }) => {
                format!("Use {} '{}' edge(s) from {}", expected, class, subject)
            }
            (DiagnosticKind::EdgeClassIncorrect, Detail::EdgeClass { expected: Some(e), .. }) => {
                format!("Change the class of {} to '{}'", subject, e)
            }
            (DiagnosticKind::EdgeClassUnknown, _) => {
                format!("Declare the class of {} or change it", subject)
            }
            (DiagnosticKind::EdgeIdIncorrect, Detail::EdgeId { expected, .. }) => {
                format!("Change the id of {} to '{}'", subject, expected)
            }
            (DiagnosticKind::PropertyMissing, Detail::Property { name }) => {
                format!("Add property '{}' to {}", name, subject)
            }
            (DiagnosticKind::PropertyTypeIncorrect, Detail::PropertyType { expected, .. }) => {
                format!("Give {} a value of type {}", subject, expected)
            }
            (DiagnosticKind::PropertyUnknown, _) => {
                format!("Give {} a value of a recognized type", subject)
            }
            (DiagnosticKind::ElementMissingPropertyList, _) => {
                format!("Give {} a property list", subject)
            }
            (DiagnosticKind::QueryPropertyClassUnknown, Detail::Query { query, .. }) => {
                format!("Fix or register query '{}'", query)
            }
            (
                DiagnosticKind::NodeQueryUnsatisfied
                | DiagnosticKind::EdgeQueryUnsatisfied
                | DiagnosticKind::PropertyQueryUnsatisfied
                | DiagnosticKind::ItemQueryUnsatisfied,
                _,
            ) => format!("Make {} satisfy {}", subject, requirement_label(diagnostic)),
            _ => format!("Fix {}", subject),
        }
    }

    fn constraint(&self, diagnostic: &Diagnostic) -> String {
        let subject = &diagnostic.subject;
        let label = requirement_label(diagnostic);
        match (diagnostic.kind, &diagnostic.detail) {
            (DiagnosticKind::TreeMultipleRoots, Detail::RootCount { count }) => {
                format!("tree has {} roots, expected 1", count)
            }
            (DiagnosticKind::NodeMissingSpecification, Detail::NonCompliant { nodes }) => format!(
                "{} node(s) match no requirement of an exclusive archetype: {}",
                nodes.len(),
                subject_list(nodes)
            ),
            (
                DiagnosticKind::NodeRangeIncorrect1,
                Detail::Range {
                    class,
                    count,
                    expected,
                },
            ) => format!(
                "{} has {} '{}' node(s), {} expects {}",
                subject, count, class, label, expected
            ),
            (
                DiagnosticKind::NodeRangeIncorrect2,
                Detail::Range {
                    class,
                    count,
                    expected,
                },
            ) => format!(
                "{} has {} '{}' child node(s), {} expects {}",
                subject, count, class, label, expected
            ),
            (
                DiagnosticKind::EdgeRangeIncorrect,
                Detail::Range {
                    class,
                    count,
                    expected,
                },
            ) => format!(
                "{} has {} '{}' edge(s), {} expects {}",
                subject, count, class, label, expected
            ),
            (DiagnosticKind::EdgeClassUnknown, Detail::EdgeClass { found, .. }) => {
                format!("{} has undeclared class '{}'", subject, found)
            }
            (DiagnosticKind::EdgeClassIncorrect, Detail::EdgeClass { expected, found }) => {
                format!(
                    "{} has class '{}', {} expects '{}'",
                    subject,
                    found,
                    label,
                    expected.as_deref().unwrap_or("")
                )
            }
            (DiagnosticKind::EdgeIdIncorrect, Detail::EdgeId { expected, found }) => format!(
                "{} has id '{}', {} expects '{}'",
                subject, found, label, expected
            ),
            (DiagnosticKind::PropertyMissing, Detail::Property { name }) => {
                format!("{} lacks property '{}' required by {}", subject, name, label)
            }
            (DiagnosticKind::PropertyUnknown, Detail::PropertyType { found, .. }) => {
                format!("{} holds a value of unrecognized type {}", subject, found)
            }
            (
                DiagnosticKind::PropertyTypeIncorrect,
                Detail::PropertyType {
                    expected, found, ..
                },
            ) => format!(
                "{} is of type {}, {} expects {}",
                subject, found, label, expected
            ),
            (DiagnosticKind::ElementMissingPropertyList, _) => {
                format!("{} has no property list, {} needs one", subject, label)
            }
            (DiagnosticKind::QueryPropertyClassUnknown, Detail::Query { query, message }) => {
                format!("query '{}' of {} is unusable: {}", query, label, message)
            }
            (_, Detail::Query { query, message }) => {
                format!("{} fails {} ({}): {}", subject, label, query, message)
            }
            (kind, _) => format!("{} violates {} ({})", subject, label, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::RequirementRef;
    use archetype_core::{Multiplicity, Node, NodeId};
    use archetype_model::{NodeRequirement, Requirement, RequirementId};

    fn requirement() -> RequirementRef {
        let mut req = NodeRequirement::new("category");
        req.id = RequirementId::new(2);
        RequirementRef::new("ecology", Requirement::Node(&req))
    }

    #[test]
    fn test_range_messages() {
        // GIVEN
        let root = Node::new(NodeId::new(0), "ecology", "eco");
        let diagnostic = Diagnostic::new(DiagnosticKind::NodeRangeIncorrect2, Subject::node(&root))
            .with_requirement(requirement())
            .with_detail(Detail::Range {
                class: "category".to_string(),
                count: 0,
                expected: Multiplicity::at_least(1),
            });

        // WHEN
        let (action, constraint) = diagnostic.render(&EnglishMessages);

        // THEN
        assert_eq!(action, "Use 1..* 'category' node(s) under ecology:eco");
        assert!(constraint.starts_with("ecology:eco has 0 'category' child node(s)"));
        assert!(constraint.ends_with("expects 1..*"));
    }

    #[test]
    fn test_display_prefixes_code() {
        let diagnostic = Diagnostic::new(DiagnosticKind::TreeMultipleRoots, Subject::Tree)
            .with_detail(Detail::RootCount { count: 2 });

        assert_eq!(
            diagnostic.to_string(),
            "[TREE_MULTIPLE_ROOTS] tree has 2 roots, expected 1"
        );
    }

    #[test]
    fn test_every_kind_renders() {
        for kind in DiagnosticKind::ALL {
            let (action, constraint) =
                Diagnostic::new(kind, Subject::Tree).render(&EnglishMessages);
            assert!(!action.is_empty());
            assert!(!constraint.is_empty());
        }
    }
}
