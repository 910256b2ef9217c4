//! Query registry.
//!
//! A constraint requirement names a query and supplies parameters by name.
//! Each [`QueryFactory`] declares the parameters it accepts; the registry
//! validates a constraint's parameters against that schema before building
//! the query, so factories only ever see well-typed input.

use archetype_core::{EdgeId, ElementId, NodeId, Properties, Value, TYPE_DOUBLE};
use archetype_graph::TargetTree;
use archetype_model::ConstraintRequirement;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::config::{CheckOptions, CheckerConfig};
use crate::diagnostic::{DiagnosticKind, Diagnostics};
use crate::error::{CheckResult, QueryError, QueryResult};

/// Parameter type accepting any non-null value.
pub const TYPE_ANY: &str = "Any";

// ==================== Items ====================

/// The thing a query is applied to.
#[derive(Debug, Clone, Copy)]
pub enum QueryItem<'a> {
    Node(NodeId),
    Edge(EdgeId),
    /// A property value and the element carrying it.
    Value {
        owner: ElementId,
        name: &'a str,
        value: &'a Value,
    },
    /// The target tree as a whole.
    Tree,
}

impl QueryItem<'_> {
    /// The diagnostic kind raised when a query on this item is unsatisfied.
    pub fn unsatisfied_kind(&self) -> DiagnosticKind {
        match self {
            QueryItem::Node(_) => DiagnosticKind::NodeQueryUnsatisfied,
            QueryItem::Edge(_) => DiagnosticKind::EdgeQueryUnsatisfied,
            QueryItem::Value { .. } => DiagnosticKind::PropertyQueryUnsatisfied,
            QueryItem::Tree => DiagnosticKind::ItemQueryUnsatisfied,
        }
    }
}

/// What a query sees while it runs.
pub struct QueryContext<'a> {
    pub tree: &'a dyn TargetTree,
    pub registry: &'a Arc<QueryRegistry>,
    pub config: &'a Arc<CheckerConfig>,
    pub options: &'a CheckOptions,
    /// Composition depth of the running check; 0 for the outermost.
    pub depth: usize,
}

/// Result of applying a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Satisfied,
    Unsatisfied(String),
    /// Diagnostics of a nested check, plus the nodes it found compliant.
    Nested {
        diagnostics: Diagnostics,
        compliant: BTreeSet<NodeId>,
    },
}

impl QueryOutcome {
    pub fn unsatisfied(message: impl Into<String>) -> Self {
        QueryOutcome::Unsatisfied(message.into())
    }

    /// `Satisfied` when `ok`, else `Unsatisfied` with the lazily built message.
    pub fn check(ok: bool, message: impl FnOnce() -> String) -> Self {
        if ok {
            QueryOutcome::Satisfied
        } else {
            QueryOutcome::Unsatisfied(message())
        }
    }
}

// ==================== Traits ====================

/// A built predicate.
pub trait Query: Send + Sync {
    fn evaluate(&self, item: &QueryItem<'_>, ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome>;
}

/// Declares one parameter a factory accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    /// One of the scalar type names, `List`, or [`TYPE_ANY`].
    pub type_name: &'static str,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            required: false,
        }
    }

    /// Integers are accepted where a `Double` is declared.
    fn accepts(&self, value: &Value) -> bool {
        match self.type_name {
            TYPE_ANY => true,
            TYPE_DOUBLE => matches!(value, Value::Float(_) | Value::Int(_)),
            other => value.type_name() == Some(other),
        }
    }
}

/// Builds queries of one name.
pub trait QueryFactory: Send + Sync {
    fn name(&self) -> &str;

    fn params(&self) -> &[ParamSpec] {
        &[]
    }

    fn build(&self, params: &QueryParams) -> QueryResult<Box<dyn Query>>;
}

// ==================== Params ====================

/// Validated parameters of one constraint. Null values count as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    query: String,
    values: Properties,
}

impl QueryParams {
    pub fn new(query: impl Into<String>, values: Properties) -> Self {
        Self {
            query: query.into(),
            values: values.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    /// A required string parameter.
    pub fn require_str(&self, name: &str) -> QueryResult<&str> {
        self.str(name)
            .ok_or_else(|| QueryError::missing_param(&self.query, name))
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

// ==================== Registry ====================

/// Explicit mapping from query names to factories.
#[derive(Default)]
pub struct QueryRegistry {
    factories: BTreeMap<String, Box<dyn QueryFactory>>,
}

impl fmt::Debug for QueryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryRegistry")
            .field("queries", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl QueryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in query except composition, which
    /// needs an archetype library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_builtins(&mut registry);
        registry
    }

    /// Register a factory, replacing any previous one of the same name.
    pub fn register(&mut self, factory: impl QueryFactory + 'static) -> &mut Self {
        self.factories
            .insert(factory.name().to_string(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Resolve a constraint to a built query.
    pub fn resolve(&self, constraint: &ConstraintRequirement) -> QueryResult<Box<dyn Query>> {
        let factory = self
            .factories
            .get(&constraint.query)
            .ok_or_else(|| QueryError::unknown(&constraint.query))?;
        let params = QueryParams::new(&constraint.query, constraint.params.clone());
        validate(factory.as_ref(), &params)?;
        factory.build(&params)
    }
}

fn validate(factory: &dyn QueryFactory, params: &QueryParams) -> QueryResult<()> {
    let schema = factory.params();
    for name in params.names() {
        if !schema.iter().any(|spec| spec.name == name) {
            return Err(QueryError::unexpected_param(params.query(), name));
        }
    }
    for spec in schema {
        match params.get(spec.name) {
            None if spec.required => {
                return Err(QueryError::missing_param(params.query(), spec.name));
            }
            None => {}
            Some(value) if !spec.accepts(value) => {
                return Err(QueryError::wrong_param_type(
                    params.query(),
                    spec.name,
                    spec.type_name,
                    value.type_name().unwrap_or("Null"),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archetype_core::{props, TYPE_BOOLEAN, TYPE_INTEGER, TYPE_LIST, TYPE_STRING};

    struct Always;

    impl Query for Always {
        fn evaluate(&self, _: &QueryItem<'_>, _: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
            Ok(QueryOutcome::Satisfied)
        }
    }

    struct AlwaysFactory;

    impl QueryFactory for AlwaysFactory {
        fn name(&self) -> &str {
            "test.always"
        }

        fn params(&self) -> &[ParamSpec] {
            const PARAMS: &[ParamSpec] = &[
                ParamSpec::required("label", TYPE_STRING),
                ParamSpec::optional("weight", TYPE_DOUBLE),
                ParamSpec::optional("flag", TYPE_BOOLEAN),
                ParamSpec::optional("count", TYPE_INTEGER),
                ParamSpec::optional("items", TYPE_LIST),
            ];
            PARAMS
        }

        fn build(&self, _: &QueryParams) -> QueryResult<Box<dyn Query>> {
            Ok(Box::new(Always))
        }
    }

    fn registry() -> QueryRegistry {
        let mut registry = QueryRegistry::new();
        registry.register(AlwaysFactory);
        registry
    }

    fn constraint(params: Properties) -> ConstraintRequirement {
        let mut c = ConstraintRequirement::new("test.always");
        c.params = params;
        c
    }

    #[test]
    fn test_resolve_valid_params() {
        let registry = registry();

        // Integers widen to Double
        let c = constraint(props! { "label" => "x", "weight" => 2 });

        assert!(registry.resolve(&c).is_ok());
        assert!(registry.contains("test.always"));
    }

    #[test]
    fn test_resolve_unknown_query() {
        let registry = registry();

        let err = registry
            .resolve(&ConstraintRequirement::new("test.never"))
            .err()
            .unwrap();

        assert_eq!(err, QueryError::unknown("test.never"));
    }

    #[test]
    fn test_schema_violations() {
        let registry = registry();

        let missing = registry.resolve(&constraint(props! {})).err().unwrap();
        let unexpected = registry
            .resolve(&constraint(props! { "label" => "x", "colour" => "red" }))
            .err()
            .unwrap();
        let wrong = registry
            .resolve(&constraint(props! { "label" => "x", "count" => "many" }))
            .err()
            .unwrap();

        assert_eq!(missing, QueryError::missing_param("test.always", "label"));
        assert_eq!(
            unexpected,
            QueryError::unexpected_param("test.always", "colour")
        );
        assert_eq!(
            wrong,
            QueryError::wrong_param_type("test.always", "count", "Integer", "String")
        );
    }

    #[test]
    fn test_null_params_count_as_absent() {
        let params = QueryParams::new("q", props! { "a" => Value::Null, "b" => 1 });

        assert!(params.get("a").is_none());
        assert_eq!(params.int("b"), Some(1));
        assert_eq!(params.float("b"), Some(1.0));
    }
}
