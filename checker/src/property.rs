//! Property checks.

use archetype_core::{ElementId, Properties};
use archetype_model::{PropertyRequirement, Requirement};

use crate::diagnostic::{Detail, Diagnostic, DiagnosticKind, Subject};
use crate::engine::CheckPass;
use crate::error::CheckResult;
use crate::registry::QueryItem;

impl CheckPass<'_> {
    /// Check presence and type of required properties on one element.
    ///
    /// A null value is present but has no type; only its constraints run.
    pub(crate) fn check_properties(
        &mut self,
        requirements: &[PropertyRequirement],
        owner: ElementId,
        properties: Option<&Properties>,
        owner_subject: &Subject,
    ) -> CheckResult<()> {
        let engine = self.engine;
        for req in requirements {
            let requirement = self.requirement(Requirement::Property(req));
            let name_detail = || Detail::Property {
                name: req.name.clone(),
            };

            let Some(properties) = properties else {
                self.emit(
                    Diagnostic::new(
                        DiagnosticKind::ElementMissingPropertyList,
                        owner_subject.clone(),
                    )
                    .with_requirement(requirement)
                    .with_detail(name_detail()),
                );
                continue;
            };

            let subject = Subject::property(owner_subject, &req.name);
            let Some(value) = properties.get(&req.name) else {
                if !req.multiplicity.allows_zero() {
                    self.emit(
                        Diagnostic::new(DiagnosticKind::PropertyMissing, subject)
                            .with_requirement(requirement)
                            .with_detail(name_detail()),
                    );
                }
                continue;
            };

            if !value.is_null() {
                let resolved = engine.config.value_types.resolve(value);
                let kind = match resolved {
                    None => Some(DiagnosticKind::PropertyUnknown),
                    Some(found) if found != req.declared_type => {
                        Some(DiagnosticKind::PropertyTypeIncorrect)
                    }
                    Some(_) => None,
                };
                if let Some(kind) = kind {
                    let found = resolved.or(value.type_name()).unwrap_or_default();
                    self.emit(
                        Diagnostic::new(kind, subject.clone())
                            .with_requirement(requirement)
                            .with_detail(Detail::PropertyType {
                                name: req.name.clone(),
                                expected: req.declared_type.clone(),
                                found: found.to_string(),
                            }),
                    );
                }
            }

            let item = QueryItem::Value {
                owner,
                name: &req.name,
                value,
            };
            self.apply_constraints(&req.constraints, item, &subject)?;
        }
        Ok(())
    }
}
