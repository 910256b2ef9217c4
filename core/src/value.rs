//! Property values.
//!
//! Values are the typed data stored in node and edge property lists.
//! Scalars map to fixed runtime type names; object values carry their own
//! type name plus the interface names they implement, which lets a property
//! be declared against an abstract type (see [`crate::ValueTypes`]).

use std::collections::BTreeMap;
use std::fmt;

/// Runtime type name of [`Value::Bool`].
pub const TYPE_BOOLEAN: &str = "Boolean";
/// Runtime type name of [`Value::Int`].
pub const TYPE_INTEGER: &str = "Integer";
/// Runtime type name of [`Value::Float`].
pub const TYPE_DOUBLE: &str = "Double";
/// Runtime type name of [`Value::String`].
pub const TYPE_STRING: &str = "String";
/// Runtime type name of [`Value::List`].
pub const TYPE_LIST: &str = "List";

/// A value that can be stored in a property list.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/absent value. Has no runtime type.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Structured value with a declared type and interfaces.
    Object(ObjectValue),
}

/// A structured value such as a geometry or a domain record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectValue {
    /// Concrete type name.
    pub type_name: String,
    /// Interfaces implemented directly by the concrete type, in declaration order.
    pub interfaces: Vec<String>,
    /// Interfaces implemented by the supertype, in declaration order.
    pub super_interfaces: Vec<String>,
    /// Named fields.
    pub fields: BTreeMap<String, Value>,
}

impl ObjectValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn with_super_interface(mut self, name: impl Into<String>) -> Self {
        self.super_interfaces.push(name.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl Value {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string reference if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list if this is a List value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as object if this is an Object value.
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// The concrete runtime type name, `None` for null.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TYPE_BOOLEAN),
            Value::Int(_) => Some(TYPE_INTEGER),
            Value::Float(_) => Some(TYPE_DOUBLE),
            Value::String(_) => Some(TYPE_STRING),
            Value::List(_) => Some(TYPE_LIST),
            Value::Object(o) => Some(&o.type_name),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(o) => write!(f, "{}{{..}}", o.type_name),
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<ObjectValue> for Value {
    fn from(o: ObjectValue) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Property list storage. Ordered so that key iteration is deterministic.
pub type Properties = BTreeMap<String, Value>;

/// Helper macro to create property lists.
#[macro_export]
macro_rules! props {
    () => {
        $crate::Properties::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut map = $crate::Properties::new();
            $(
                map.insert($key.to_string(), $crate::Value::from($value));
            )+
            map
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_names() {
        assert_eq!(Value::Null.type_name(), None);
        assert_eq!(Value::Bool(true).type_name(), Some("Boolean"));
        assert_eq!(Value::Int(42).type_name(), Some("Integer"));
        assert_eq!(Value::Float(3.5).type_name(), Some("Double"));
        assert_eq!(Value::from("x").type_name(), Some("String"));
        assert_eq!(Value::from(vec!["a", "b"]).type_name(), Some("List"));
    }

    #[test]
    fn test_object_type_name() {
        let point = ObjectValue::new("Point")
            .with_interface("Geometry")
            .with_field("x", 1.0);

        assert_eq!(Value::from(point).type_name(), Some("Point"));
    }

    #[test]
    fn test_as_float_widens_int() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::from("3").as_float(), None);
    }

    #[test]
    fn test_props_macro() {
        let empty: Properties = props!();
        assert!(empty.is_empty());

        let props = props! {
            "name" => "wolf",
            "weight" => 40i64,
            "endangered" => false,
        };
        assert_eq!(props.get("name"), Some(&Value::String("wolf".into())));
        assert_eq!(props.get("weight"), Some(&Value::Int(40)));
        assert_eq!(props.get("endangered"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_display_list() {
        let value = Value::from(vec![1i64, 2i64]);
        assert_eq!(value.to_string(), "[1, 2]");
    }
}
