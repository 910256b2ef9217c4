//! Recognized property type names.

use crate::value::{TYPE_BOOLEAN, TYPE_DOUBLE, TYPE_INTEGER, TYPE_LIST, TYPE_STRING};
use crate::Value;
use std::collections::BTreeSet;

/// The set of type names a property may be declared against.
///
/// Scalars are always recognized. Object values are recognized by their
/// concrete type name, or else by the first recognized interface they
/// implement, or else by the first recognized interface of their supertype.
#[derive(Debug, Clone)]
pub struct ValueTypes {
    names: BTreeSet<String>,
}

impl Default for ValueTypes {
    fn default() -> Self {
        let names = [TYPE_BOOLEAN, TYPE_INTEGER, TYPE_DOUBLE, TYPE_STRING, TYPE_LIST]
            .into_iter()
            .map(String::from)
            .collect();
        Self { names }
    }
}

impl ValueTypes {
    /// Create the default set (scalars only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an additional type or interface name.
    pub fn register(&mut self, name: impl Into<String>) -> &mut Self {
        self.names.insert(name.into());
        self
    }

    /// Builder-style variant of [`ValueTypes::register`].
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Check whether a name is recognized.
    pub fn is_recognized(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Resolve the type name a value is checked against.
    ///
    /// Returns `None` when nothing about the value is recognized; null values
    /// never resolve.
    pub fn resolve<'v>(&self, value: &'v Value) -> Option<&'v str> {
        match value {
            Value::Null => None,
            Value::Object(o) => {
                if self.is_recognized(&o.type_name) {
                    return Some(&o.type_name);
                }
                o.interfaces
                    .iter()
                    .chain(o.super_interfaces.iter())
                    .find(|name| self.is_recognized(name))
                    .map(String::as_str)
            }
            scalar => scalar.type_name().filter(|name| self.is_recognized(name)),
        }
    }

    /// All recognized names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectValue;

    #[test]
    fn test_scalars_resolve_to_own_name() {
        let types = ValueTypes::new();

        assert_eq!(types.resolve(&Value::Int(1)), Some("Integer"));
        assert_eq!(types.resolve(&Value::from("a")), Some("String"));
        assert_eq!(types.resolve(&Value::Null), None);
    }

    #[test]
    fn test_object_falls_back_to_interface() {
        // GIVEN Point is not registered but Geometry is
        let types = ValueTypes::new().with("Geometry");
        let point = Value::from(
            ObjectValue::new("Point")
                .with_interface("Serializable")
                .with_interface("Geometry"),
        );

        // THEN the first recognized interface wins
        assert_eq!(types.resolve(&point), Some("Geometry"));
    }

    #[test]
    fn test_object_falls_back_to_super_interface() {
        let types = ValueTypes::new().with("Shape");
        let polygon = Value::from(
            ObjectValue::new("Polygon")
                .with_interface("Comparable")
                .with_super_interface("Shape"),
        );

        assert_eq!(types.resolve(&polygon), Some("Shape"));
    }

    #[test]
    fn test_unrecognized_object_is_unknown() {
        let types = ValueTypes::new();
        let blob = Value::from(ObjectValue::new("Blob").with_interface("Opaque"));

        assert_eq!(types.resolve(&blob), None);
    }

    #[test]
    fn test_concrete_name_preferred_over_interface() {
        let types = ValueTypes::new().with("Point").with("Geometry");
        let point = Value::from(ObjectValue::new("Point").with_interface("Geometry"));

        assert_eq!(types.resolve(&point), Some("Point"));
    }
}
