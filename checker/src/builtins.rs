//! Built-in queries.
//!
//! | name                   | item           | parameters                  |
//! |------------------------|----------------|-----------------------------|
//! | `value.matches`        | value/node/edge| `pattern: String`           |
//! | `value.range`          | value          | `min`, `max: Double`        |
//! | `value.one_of`         | value          | `values: List`              |
//! | `value.length`         | value          | `min`, `max: Integer`       |
//! | `node.unique_property` | node           | `property: String`          |
//! | `node.leaf`            | node           |                             |
//! | `edge.no_self`         | edge           |                             |
//! | `archetype.multiplicity`| value         |                             |
//! | `archetype.parents`    | value          |                             |
//!
//! Value queries accept null values. Matching text of a node or edge is its
//! instance id.

use archetype_core::{Multiplicity, Value, TYPE_DOUBLE, TYPE_INTEGER, TYPE_LIST, TYPE_STRING};
use regex_lite::Regex;

use crate::error::{CheckResult, QueryError, QueryResult};
use crate::registry::{
    ParamSpec, Query, QueryContext, QueryFactory, QueryItem, QueryOutcome, QueryParams,
    QueryRegistry,
};

/// Register every built-in query.
pub fn register_builtins(registry: &mut QueryRegistry) {
    registry
        .register(MatchesFactory)
        .register(RangeFactory)
        .register(OneOfFactory)
        .register(LengthFactory)
        .register(UniquePropertyFactory)
        .register(LeafFactory)
        .register(NoSelfFactory)
        .register(MultiplicityTextFactory)
        .register(ParentPatternsFactory);
}

fn not_applicable(query: &str, applies_to: &str) -> QueryOutcome {
    QueryOutcome::unsatisfied(format!("{} applies to {} only", query, applies_to))
}

// ==================== value.matches ====================

pub struct MatchesFactory;

struct Matches {
    regex: Regex,
}

impl QueryFactory for MatchesFactory {
    fn name(&self) -> &str {
        "value.matches"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::required("pattern", TYPE_STRING)];
        PARAMS
    }

    fn build(&self, params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        let pattern = params.require_str("pattern")?;
        let regex = Regex::new(pattern).map_err(|e| QueryError::build(self.name(), e.to_string()))?;
        Ok(Box::new(Matches { regex }))
    }
}

impl Query for Matches {
    fn evaluate(&self, item: &QueryItem<'_>, ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let text = match item {
            QueryItem::Value { value, .. } => match value {
                Value::Null => return Ok(QueryOutcome::Satisfied),
                Value::String(s) => s.clone(),
                other => {
                    return Ok(QueryOutcome::unsatisfied(format!(
                        "{} is not a string",
                        other
                    )))
                }
            },
            QueryItem::Node(id) => match ctx.tree.node(*id) {
                Some(node) => node.instance.clone(),
                None => return Ok(QueryOutcome::Satisfied),
            },
            QueryItem::Edge(id) => match ctx.tree.edge(*id) {
                Some(edge) => edge.instance.clone(),
                None => return Ok(QueryOutcome::Satisfied),
            },
            QueryItem::Tree => {
                return Ok(not_applicable("value.matches", "values, nodes and edges"))
            }
        };
        Ok(QueryOutcome::check(self.regex.is_match(&text), || {
            format!("'{}' does not match /{}/", text, self.regex.as_str())
        }))
    }
}

// ==================== value.range ====================

pub struct RangeFactory;

struct Range {
    min: Option<f64>,
    max: Option<f64>,
}

impl QueryFactory for RangeFactory {
    fn name(&self) -> &str {
        "value.range"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::optional("min", TYPE_DOUBLE),
            ParamSpec::optional("max", TYPE_DOUBLE),
        ];
        PARAMS
    }

    fn build(&self, params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        let min = params.float("min");
        let max = params.float("max");
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(QueryError::build(
                    self.name(),
                    format!("min {} exceeds max {}", lo, hi),
                ));
            }
        }
        Ok(Box::new(Range { min, max }))
    }
}

impl Query for Range {
    fn evaluate(&self, item: &QueryItem<'_>, _ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let QueryItem::Value { value, .. } = item else {
            return Ok(not_applicable("value.range", "property values"));
        };
        if value.is_null() {
            return Ok(QueryOutcome::Satisfied);
        }
        let Some(n) = value.as_float() else {
            return Ok(QueryOutcome::unsatisfied(format!("{} is not a number", value)));
        };
        let above = self.min.map_or(true, |min| n >= min);
        let below = self.max.map_or(true, |max| n <= max);
        Ok(QueryOutcome::check(above && below, || {
            format!("{} is outside [{}, {}]", value, bound(self.min), bound(self.max))
        }))
    }
}

fn bound(b: Option<f64>) -> String {
    b.map_or_else(|| "*".to_string(), |b| b.to_string())
}

// ==================== value.one_of ====================

pub struct OneOfFactory;

struct OneOf {
    values: Vec<Value>,
}

impl QueryFactory for OneOfFactory {
    fn name(&self) -> &str {
        "value.one_of"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::required("values", TYPE_LIST)];
        PARAMS
    }

    fn build(&self, params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        let values = params
            .list("values")
            .ok_or_else(|| QueryError::missing_param(self.name(), "values"))?;
        Ok(Box::new(OneOf {
            values: values.to_vec(),
        }))
    }
}

impl Query for OneOf {
    fn evaluate(&self, item: &QueryItem<'_>, _ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let QueryItem::Value { value, .. } = item else {
            return Ok(not_applicable("value.one_of", "property values"));
        };
        if value.is_null() {
            return Ok(QueryOutcome::Satisfied);
        }
        Ok(QueryOutcome::check(self.values.contains(*value), || {
            format!("{} is not one of {}", value, Value::List(self.values.clone()))
        }))
    }
}

// ==================== value.length ====================

pub struct LengthFactory;

struct Length {
    min: Option<usize>,
    max: Option<usize>,
}

impl QueryFactory for LengthFactory {
    fn name(&self) -> &str {
        "value.length"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::optional("min", TYPE_INTEGER),
            ParamSpec::optional("max", TYPE_INTEGER),
        ];
        PARAMS
    }

    fn build(&self, params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        let to_len = |name: &str| -> QueryResult<Option<usize>> {
            params
                .int(name)
                .map(|n| {
                    usize::try_from(n).map_err(|_| {
                        QueryError::build(self.name(), format!("{} must not be negative", name))
                    })
                })
                .transpose()
        };
        Ok(Box::new(Length {
            min: to_len("min")?,
            max: to_len("max")?,
        }))
    }
}

impl Query for Length {
    fn evaluate(&self, item: &QueryItem<'_>, _ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let QueryItem::Value { value, .. } = item else {
            return Ok(not_applicable("value.length", "property values"));
        };
        let len = match value {
            Value::Null => return Ok(QueryOutcome::Satisfied),
            Value::String(s) => s.chars().count(),
            Value::List(items) => items.len(),
            other => {
                return Ok(QueryOutcome::unsatisfied(format!(
                    "{} has no length",
                    other
                )))
            }
        };
        let ok = self.min.map_or(true, |min| len >= min) && self.max.map_or(true, |max| len <= max);
        Ok(QueryOutcome::check(ok, || format!("length {} is out of range", len)))
    }
}

// ==================== node.unique_property ====================

pub struct UniquePropertyFactory;

struct UniqueProperty {
    property: String,
}

impl QueryFactory for UniquePropertyFactory {
    fn name(&self) -> &str {
        "node.unique_property"
    }

    fn params(&self) -> &[ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::required("property", TYPE_STRING)];
        PARAMS
    }

    fn build(&self, params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        Ok(Box::new(UniqueProperty {
            property: params.require_str("property")?.to_string(),
        }))
    }
}

impl Query for UniqueProperty {
    /// Sibling nodes of the same class must not share the property's value.
    fn evaluate(&self, item: &QueryItem<'_>, ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let QueryItem::Node(id) = item else {
            return Ok(not_applicable("node.unique_property", "nodes"));
        };
        let Some(node) = ctx.tree.node(*id) else {
            return Ok(QueryOutcome::Satisfied);
        };
        let value = match node.get_property(&self.property) {
            Some(v) if !v.is_null() => v,
            _ => return Ok(QueryOutcome::Satisfied),
        };

        let siblings = match ctx.tree.parent(*id) {
            Some(parent) => ctx.tree.children(parent).to_vec(),
            None => ctx.tree.roots(),
        };
        let duplicate = siblings
            .iter()
            .filter(|other| **other != *id)
            .filter_map(|other| ctx.tree.node(*other))
            .any(|other| {
                other.class == node.class && other.get_property(&self.property) == Some(value)
            });

        Ok(QueryOutcome::check(!duplicate, || {
            format!(
                "duplicate value {} for unique property '{}'",
                value, self.property
            )
        }))
    }
}

// ==================== node.leaf ====================

pub struct LeafFactory;

struct Leaf;

impl QueryFactory for LeafFactory {
    fn name(&self) -> &str {
        "node.leaf"
    }

    fn build(&self, _params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        Ok(Box::new(Leaf))
    }
}

impl Query for Leaf {
    fn evaluate(&self, item: &QueryItem<'_>, ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let QueryItem::Node(id) = item else {
            return Ok(not_applicable("node.leaf", "nodes"));
        };
        let count = ctx.tree.children(*id).len();
        Ok(QueryOutcome::check(count == 0, || {
            format!("node has {} children", count)
        }))
    }
}

// ==================== edge.no_self ====================

pub struct NoSelfFactory;

struct NoSelf;

impl QueryFactory for NoSelfFactory {
    fn name(&self) -> &str {
        "edge.no_self"
    }

    fn build(&self, _params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        Ok(Box::new(NoSelf))
    }
}

impl Query for NoSelf {
    fn evaluate(&self, item: &QueryItem<'_>, ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let QueryItem::Edge(id) = item else {
            return Ok(not_applicable("edge.no_self", "edges"));
        };
        let self_loop = ctx.tree.edge(*id).is_some_and(|edge| edge.is_self_loop());
        Ok(QueryOutcome::check(!self_loop, || {
            "Self-referential edge not allowed".to_string()
        }))
    }
}

// ==================== archetype.multiplicity ====================

pub struct MultiplicityTextFactory;

struct MultiplicityText;

impl QueryFactory for MultiplicityTextFactory {
    fn name(&self) -> &str {
        "archetype.multiplicity"
    }

    fn build(&self, _params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        Ok(Box::new(MultiplicityText))
    }
}

impl Query for MultiplicityText {
    fn evaluate(&self, item: &QueryItem<'_>, _ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let QueryItem::Value { value, .. } = item else {
            return Ok(not_applicable("archetype.multiplicity", "property values"));
        };
        Ok(match value {
            Value::Null => QueryOutcome::Satisfied,
            Value::String(text) => match text.parse::<Multiplicity>() {
                Ok(_) => QueryOutcome::Satisfied,
                Err(e) => QueryOutcome::unsatisfied(e.to_string()),
            },
            other => QueryOutcome::unsatisfied(format!("{} is not a multiplicity", other)),
        })
    }
}

// ==================== archetype.parents ====================

/// `*`, `class`, `class:id`, `*:id` or `class:*`.
const PARENT_PATTERN: &str = r"^(\*|[A-Za-z_][\w.\-]*)(:(\*|[\w.\-]+))?$";

pub struct ParentPatternsFactory;

struct ParentPatterns {
    regex: Regex,
}

impl QueryFactory for ParentPatternsFactory {
    fn name(&self) -> &str {
        "archetype.parents"
    }

    fn build(&self, _params: &QueryParams) -> QueryResult<Box<dyn Query>> {
        let regex =
            Regex::new(PARENT_PATTERN).map_err(|e| QueryError::build(self.name(), e.to_string()))?;
        Ok(Box::new(ParentPatterns { regex }))
    }
}

impl Query for ParentPatterns {
    /// Every entry is blank or a node reference.
    fn evaluate(&self, item: &QueryItem<'_>, _ctx: &QueryContext<'_>) -> CheckResult<QueryOutcome> {
        let QueryItem::Value { value, .. } = item else {
            return Ok(not_applicable("archetype.parents", "property values"));
        };
        let items = match value {
            Value::Null => return Ok(QueryOutcome::Satisfied),
            Value::List(items) => items,
            other => {
                return Ok(QueryOutcome::unsatisfied(format!(
                    "{} is not a list",
                    other
                )))
            }
        };
        let bad: Vec<String> = items
            .iter()
            .filter(|entry| match entry {
                Value::Null => false,
                Value::String(s) => {
                    let s = s.trim();
                    !s.is_empty() && !self.regex.is_match(s)
                }
                _ => true,
            })
            .map(|entry| entry.to_string())
            .collect();
        Ok(QueryOutcome::check(bad.is_empty(), || {
            format!("invalid parent patterns: {}", bad.join(", "))
        }))
    }
}
