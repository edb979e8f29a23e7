//! Clothing accessibility subsystem
//!
//! Layer-priority ordering, coverage/blocking analysis, and the
//! accessibility facade the node resolvers call. Layer-priority and
//! blocking logic live only here; resolvers stay clothing-agnostic.

mod accessibility;
mod coverage;
mod priority;

pub use accessibility::{AccessibilityService, FullBlockPolicy};
pub use coverage::{Blocker, CoverageAnalyzer};
pub use priority::PriorityManager;
