//! Archetype Compliance Checker
//!
//! Validates specification trees against archetypes:
//! - `ArchetypeEngine`: one pass over every node requirement
//! - `Checker`: stateful facade with archetype self-checks
//! - `QueryRegistry`: explicit mapping from query names to factories
//! - Built-in queries and sub-archetype composition
//! - Structured diagnostics and message formatting

pub mod builtins;
mod checker;
mod compose;
mod config;
mod diagnostic;
mod dispatch;
mod edge;
mod engine;
mod error;
pub mod matcher;
mod messages;
mod meta;
mod node;
mod property;
mod registry;

pub use checker::Checker;
pub use compose::{ArchetypeLibrary, ComposeFactory, COMPOSE_QUERY};
pub use config::{CancelToken, CheckOptions, CheckerConfig, DEFAULT_MAX_COMPOSITION_DEPTH};
pub use diagnostic::{
    Category, Detail, Diagnostic, DiagnosticKind, Diagnostics, RequirementRef, Subject,
};
pub use engine::{ArchetypeEngine, Evaluation};
pub use error::{CheckError, CheckResult, QueryError, QueryResult};
pub use messages::{EnglishMessages, MessageFormatter};
pub use meta::{meta_archetype, meta_engine, META_ARCHETYPE_NAME};
pub use registry::{
    ParamSpec, Query, QueryContext, QueryFactory, QueryItem, QueryOutcome, QueryParams,
    QueryRegistry, TYPE_ANY,
};
