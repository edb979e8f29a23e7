//! StoryForge scope resolution engine.
//!
//! Resolves scope expressions - declarative queries over the entity world
//! model - to sets of entities, for action targeting and narrative rules.
//!
//! ## Structure
//!
//! - `ports` - The entity-store port and its in-memory adapter
//! - `evaluator/` - JSON-logic rule evaluation with custom operators
//! - `operators` - The standard narrative operator set
//! - `clothing/` - Layered clothing accessibility services
//! - `resolvers/` - One resolver per scope AST node kind
//! - `engine` - Runtime context and the resolution facade
//! - `cache` - Version-validated scope result cache

pub mod cache;
pub mod clothing;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod operators;
pub mod ports;
pub mod resolvers;
pub mod trace;
pub mod validation;


pub use cache::ScopeCache;
pub use engine::{RuntimeContext, RuntimeContextBuilder, ScopeEngine};
pub use error::ScopeError;
pub use evaluator::{Breakdown, EvalContext, RuleEvaluator};
pub use ports::{EntityStore, InMemoryEntityStore};
pub use trace::{CollectingTrace, FilterTraceEntry, ScopeTrace};
