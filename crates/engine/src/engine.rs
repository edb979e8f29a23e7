//! Scope engine facade and runtime context
//!
//! [`RuntimeContext`] bundles the collaborators a resolution needs: the
//! entity store, the rule evaluator, and the clothing accessibility service.
//! Capabilities are validated once, at construction, so resolvers never have
//! to re-check them. [`ScopeEngine::resolve`] is the single entry point:
//! validate inputs first, then traverse, then collect entity ids.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use storyforge_domain::{EntityId, ScopeNode};

use crate::clothing::{AccessibilityService, FullBlockPolicy};
use crate::error::ScopeError;
use crate::evaluator::RuleEvaluator;
use crate::ports::EntityStore;
use crate::resolvers::{resolve_node, ResolveEnv};
use crate::trace::ScopeTrace;
use crate::validation::{validate_actor, validate_ast};

/// Shared collaborators for scope resolution
///
/// Construct through [`RuntimeContext::builder`]; a context that builds
/// successfully is guaranteed to carry every capability resolvers use.
pub struct RuntimeContext {
    store: Arc<dyn EntityStore>,
    evaluator: Arc<RuleEvaluator>,
    clothing: Arc<AccessibilityService>,
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext").finish_non_exhaustive()
    }
}

impl RuntimeContext {
    pub fn builder() -> RuntimeContextBuilder {
        RuntimeContextBuilder::default()
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    pub fn evaluator(&self) -> &RuleEvaluator {
        self.evaluator.as_ref()
    }

    pub fn clothing(&self) -> &AccessibilityService {
        self.clothing.as_ref()
    }
}

/// Builder validating capabilities at construction time
#[derive(Default)]
pub struct RuntimeContextBuilder {
    store: Option<Arc<dyn EntityStore>>,
    evaluator: Option<Arc<RuleEvaluator>>,
    clothing: Option<Arc<AccessibilityService>>,
    full_block_policy: FullBlockPolicy,
}

impl RuntimeContextBuilder {
    pub fn entity_store(mut self, store: Arc<dyn EntityStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn rule_evaluator(mut self, evaluator: Arc<RuleEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Replace the default clothing service, e.g. with a custom layer order
    pub fn clothing_service(mut self, clothing: Arc<AccessibilityService>) -> Self {
        self.clothing = Some(clothing);
        self
    }

    /// Full-block handling for the default clothing service; ignored when an
    /// explicit service is supplied
    pub fn full_block_policy(mut self, policy: FullBlockPolicy) -> Self {
        self.full_block_policy = policy;
        self
    }

    pub fn build(self) -> Result<RuntimeContext, ScopeError> {
        let store = self.store.ok_or_else(|| {
            ScopeError::parameter_validation(
                "RuntimeContextBuilder::build",
                "an entity store",
                "none",
            )
        })?;
        let evaluator = self.evaluator.ok_or_else(|| {
            ScopeError::parameter_validation(
                "RuntimeContextBuilder::build",
                "a rule evaluator",
                "none",
            )
        })?;
        let clothing = match self.clothing {
            Some(clothing) => clothing,
            None => Arc::new(
                AccessibilityService::new(Arc::clone(&store))
                    .with_policy(self.full_block_policy),
            ),
        };
        Ok(RuntimeContext {
            store,
            evaluator,
            clothing,
        })
    }
}

/// Scope resolution entry point
///
/// Stateless: every call is pure over the store snapshot it reads. Callers
/// wanting memoization layer a [`crate::cache::ScopeCache`] on top.
pub struct ScopeEngine;

impl ScopeEngine {
    /// Resolve a scope expression to the set of entities it names
    ///
    /// Inputs are validated before any store access; resolver errors
    /// propagate unchanged. Results are ordered and de-duplicated.
    pub fn resolve(
        node: &ScopeNode,
        actor: &EntityId,
        ctx: &RuntimeContext,
        trace: Option<&dyn ScopeTrace>,
    ) -> Result<BTreeSet<EntityId>, ScopeError> {
        validate_ast(node, "ScopeEngine::resolve")?;
        validate_actor(actor, "ScopeEngine::resolve")?;

        let env = ResolveEnv::new(actor, ctx, trace);
        let values = resolve_node(node, &env)?;
        let resolved: BTreeSet<EntityId> =
            values.iter().filter_map(|v| v.entity_id()).collect();
        debug!(
            actor = %actor,
            node = node.kind_name(),
            values = values.len(),
            entities = resolved.len(),
            "Scope resolved"
        );
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::InMemoryEntityStore;
    use serde_json::json;
    use storyforge_domain::components::types;

    fn context_with(store: Arc<InMemoryEntityStore>) -> RuntimeContext {
        RuntimeContext::builder()
            .entity_store(store)
            .rule_evaluator(Arc::new(RuleEvaluator::new()))
            .build()
            .expect("context")
    }

    #[test]
    fn test_builder_requires_store() {
        let err = RuntimeContext::builder()
            .rule_evaluator(Arc::new(RuleEvaluator::new()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("entity store"));
    }

    #[test]
    fn test_builder_requires_evaluator() {
        let err = RuntimeContext::builder()
            .entity_store(Arc::new(InMemoryEntityStore::new()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("rule evaluator"));
    }

    #[test]
    fn test_actor_scope_resolves_to_actor() {
        let ctx = context_with(Arc::new(InMemoryEntityStore::new()));
        let out = ScopeEngine::resolve(&ScopeNode::Actor, &EntityId::new("a"), &ctx, None)
            .expect("resolve");
        assert_eq!(out, BTreeSet::from([EntityId::new("a")]));
    }

    #[test]
    fn test_location_scope_follows_position() {
        let store = Arc::new(InMemoryEntityStore::new());
        store.set_component(
            EntityId::new("a"),
            types::POSITION,
            json!({ "locationId": "tavern" }),
        );
        let ctx = context_with(store);
        let out = ScopeEngine::resolve(&ScopeNode::Location, &EntityId::new("a"), &ctx, None)
            .expect("resolve");
        assert_eq!(out, BTreeSet::from([EntityId::new("tavern")]));
    }

    #[test]
    fn test_union_deduplicates_and_orders() {
        let store = Arc::new(InMemoryEntityStore::new());
        store.set_component(EntityId::new("b"), "core:actor", json!({}));
        store.set_component(EntityId::new("a"), "core:actor", json!({}));
        let ctx = context_with(store);
        let node = ScopeNode::Union {
            left: Box::new(ScopeNode::Actor),
            right: Box::new(ScopeNode::Entities {
                component: "core:actor".to_string(),
            }),
        };
        let out =
            ScopeEngine::resolve(&node, &EntityId::new("a"), &ctx, None).expect("resolve");
        assert_eq!(
            out.into_iter().collect::<Vec<_>>(),
            vec![EntityId::new("a"), EntityId::new("b")]
        );
    }

    #[test]
    fn test_invalid_actor_rejected_before_traversal() {
        let ctx = context_with(Arc::new(InMemoryEntityStore::new()));
        let err =
            ScopeEngine::resolve(&ScopeNode::Actor, &EntityId::new(""), &ctx, None).unwrap_err();
        assert!(matches!(err, ScopeError::ParameterValidation { .. }));
    }
}
