//! Checker configuration and per-call options.

use archetype_core::ValueTypes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CheckError, CheckResult};

/// Default bound on nested sub-archetype checks.
pub const DEFAULT_MAX_COMPOSITION_DEPTH: usize = 8;

/// Engine-wide settings, fixed at construction.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// How deep `archetype.compose` may nest before the check aborts.
    pub max_composition_depth: usize,
    /// Type names a property value may resolve to.
    pub value_types: ValueTypes,
    /// Report edges whose class the target tree does not know.
    pub edge_class_check: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_composition_depth: DEFAULT_MAX_COMPOSITION_DEPTH,
            value_types: ValueTypes::default(),
            edge_class_check: true,
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_composition_depth(mut self, depth: usize) -> Self {
        self.max_composition_depth = depth;
        self
    }

    /// Recognize an additional type name, e.g. an interface of object values.
    pub fn with_value_type(mut self, name: impl Into<String>) -> Self {
        self.value_types.register(name);
        self
    }

    pub fn with_edge_class_check(mut self, enabled: bool) -> Self {
        self.edge_class_check = enabled;
        self
    }
}

/// Cooperative cancellation flag shared between a caller and a running check.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Options for a single check call.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub cancel: Option<CancelToken>,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fail with [`CheckError::Cancelled`] once the token is set.
    pub fn check_cancelled(&self) -> CheckResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(CheckError::Cancelled),
            _ => Ok(()),
        }
    }
}
