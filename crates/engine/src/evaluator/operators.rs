//! Custom operator registry
//!
//! Anatomy, clothing, and positioning modules register predicates by name at
//! startup; the evaluator invokes them uniformly regardless of category. An
//! unknown operator name is a configuration error, never a silent false.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ScopeError;
use crate::evaluator::EvalContext;

/// A registered operator: already-evaluated arguments in, value out
pub type CustomOperator =
    Box<dyn Fn(&EvalContext<'_>, &[Value]) -> Result<Value, ScopeError> + Send + Sync>;

/// Registered-handler map from operator name to predicate
#[derive(Default)]
pub struct OperatorRegistry {
    handlers: HashMap<String, CustomOperator>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator under a name, replacing any previous handler
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&EvalContext<'_>, &[Value]) -> Result<Value, ScopeError> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&CustomOperator> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered operator names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.names())
            .finish()
    }
}
