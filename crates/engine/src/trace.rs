//! Trace/diagnostics interface
//!
//! An injectable collaborator used by test and debug tooling to capture
//! per-candidate filter evaluations. Production resolution paths pass no
//! trace; resolvers must check `is_enabled` before computing breakdowns so
//! tracing adds no unconditional overhead.

use std::cell::RefCell;

use storyforge_domain::{EntityId, LogicExpr};

use crate::evaluator::Breakdown;

/// Sink for filter-evaluation diagnostics
pub trait ScopeTrace {
    /// Whether the sink wants entries (and breakdowns computed) at all
    fn is_enabled(&self) -> bool;

    /// Record one candidate's filter evaluation
    fn log_filter_evaluation(
        &self,
        entity: &EntityId,
        logic: &LogicExpr,
        result: bool,
        breakdown: Option<&Breakdown>,
    );
}

/// One recorded filter evaluation
#[derive(Debug, Clone)]
pub struct FilterTraceEntry {
    pub entity: EntityId,
    pub clause: String,
    pub passed: bool,
    pub breakdown: Option<Breakdown>,
}

/// Collecting trace for tests and debug tooling
///
/// Interior mutability keeps the resolver-facing interface read-only; the
/// engine is single-threaded, so a `RefCell` suffices.
#[derive(Default)]
pub struct CollectingTrace {
    entries: RefCell<Vec<FilterTraceEntry>>,
}

impl CollectingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded entries
    pub fn entries(&self) -> Vec<FilterTraceEntry> {
        self.entries.borrow().clone()
    }
}

impl ScopeTrace for CollectingTrace {
    fn is_enabled(&self) -> bool {
        true
    }

    fn log_filter_evaluation(
        &self,
        entity: &EntityId,
        logic: &LogicExpr,
        result: bool,
        breakdown: Option<&Breakdown>,
    ) {
        self.entries.borrow_mut().push(FilterTraceEntry {
            entity: entity.clone(),
            clause: logic.describe(),
            passed: result,
            breakdown: breakdown.cloned(),
        });
    }
}
