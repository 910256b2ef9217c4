//! Checker error types.
//!
//! Ordinary compliance violations are never errors; they are recorded as
//! [`Diagnostic`](crate::Diagnostic)s. The types here cover query
//! construction and the few conditions that abort a check.

use archetype_model::ModelError;
use thiserror::Error;

/// Result type for query construction.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors resolving or building a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Unknown query: {0}")]
    UnknownQuery(String),

    #[error("Query '{query}' requires parameter '{param}'")]
    MissingParam { query: String, param: String },

    #[error("Query '{query}' does not accept parameter '{param}'")]
    UnexpectedParam { query: String, param: String },

    #[error("Parameter '{param}' of query '{query}' must be of type {expected}, found {found}")]
    WrongParamType {
        query: String,
        param: String,
        expected: String,
        found: String,
    },

    #[error("Query '{query}' could not be built: {message}")]
    Build { query: String, message: String },
}

impl QueryError {
    pub fn unknown(query: impl Into<String>) -> Self {
        Self::UnknownQuery(query.into())
    }

    pub fn missing_param(query: impl Into<String>, param: impl Into<String>) -> Self {
        Self::MissingParam {
            query: query.into(),
            param: param.into(),
        }
    }

    pub fn unexpected_param(query: impl Into<String>, param: impl Into<String>) -> Self {
        Self::UnexpectedParam {
            query: query.into(),
            param: param.into(),
        }
    }

    pub fn wrong_param_type(
        query: impl Into<String>,
        param: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::WrongParamType {
            query: query.into(),
            param: param.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn build(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Build {
            query: query.into(),
            message: message.into(),
        }
    }
}

/// Result type for checks.
pub type CheckResult<T> = Result<T, CheckError>;

/// Conditions that abort a check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Check cancelled")]
    Cancelled,

    /// The target has nodes but none of them is a root.
    #[error("Target is not a tree: {0} nodes and no root")]
    NotATree(usize),

    #[error("Malformed archetype: {0}")]
    MalformedArchetype(#[from] ModelError),

    /// A query of the meta-archetype did not resolve.
    #[error("Meta-archetype query '{query}' is unresolved: {source}")]
    UnresolvedMetaQuery {
        query: String,
        #[source]
        source: QueryError,
    },

    #[error("Sub-archetype composition exceeded depth {limit}")]
    CompositionDepthExceeded { limit: usize },
}
