//! Scope result cache
//!
//! Memoizes resolved scopes per `(actor, scope name)` and validates every
//! hit against the store's version counter, so a stale entry is never
//! served after a component write. Invalidation hooks exist for mutation
//! paths that want to evict eagerly instead of waiting for the version
//! check.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use storyforge_domain::{EntityId, ScopeNode};

use crate::engine::{RuntimeContext, ScopeEngine};
use crate::error::ScopeError;

struct CacheEntry {
    version: u64,
    result: BTreeSet<EntityId>,
}

/// Version-validated cache of resolved scopes
#[derive(Default)]
pub struct ScopeCache {
    entries: HashMap<(EntityId, String), CacheEntry>,
}

impl ScopeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cached result, if one exists and the store has not changed since
    /// it was stored
    pub fn get(
        &self,
        actor: &EntityId,
        scope_name: &str,
        ctx: &RuntimeContext,
    ) -> Option<BTreeSet<EntityId>> {
        let entry = self
            .entries
            .get(&(actor.clone(), scope_name.to_string()))?;
        if entry.version != ctx.store().version() {
            return None;
        }
        Some(entry.result.clone())
    }

    /// Resolve through the cache, filling it on a miss
    pub fn resolve(
        &mut self,
        scope_name: &str,
        node: &ScopeNode,
        actor: &EntityId,
        ctx: &RuntimeContext,
    ) -> Result<BTreeSet<EntityId>, ScopeError> {
        if let Some(hit) = self.get(actor, scope_name, ctx) {
            debug!(actor = %actor, scope = scope_name, "Scope cache hit");
            return Ok(hit);
        }
        let version = ctx.store().version();
        let result = ScopeEngine::resolve(node, actor, ctx, None)?;
        self.entries.insert(
            (actor.clone(), scope_name.to_string()),
            CacheEntry {
                version,
                result: result.clone(),
            },
        );
        Ok(result)
    }

    /// Evict every scope cached for one actor
    pub fn invalidate_entity(&mut self, entity: &EntityId) {
        self.entries.retain(|(actor, _), _| actor != entity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::RuleEvaluator;
    use crate::ports::InMemoryEntityStore;
    use serde_json::json;
    use std::sync::Arc;

    fn fixture() -> (Arc<InMemoryEntityStore>, RuntimeContext) {
        let store = Arc::new(InMemoryEntityStore::new());
        let ctx = RuntimeContext::builder()
            .entity_store(Arc::clone(&store) as Arc<dyn crate::ports::EntityStore>)
            .rule_evaluator(Arc::new(RuleEvaluator::new()))
            .build()
            .expect("context");
        (store, ctx)
    }

    #[test]
    fn test_hit_after_resolve() {
        let (_store, ctx) = fixture();
        let mut cache = ScopeCache::new();
        let actor = EntityId::new("a");
        let first = cache
            .resolve("self", &ScopeNode::Actor, &actor, &ctx)
            .expect("resolve");
        assert_eq!(cache.get(&actor, "self", &ctx), Some(first));
    }

    #[test]
    fn test_store_write_invalidates() {
        let (store, ctx) = fixture();
        let mut cache = ScopeCache::new();
        let actor = EntityId::new("a");
        cache
            .resolve("self", &ScopeNode::Actor, &actor, &ctx)
            .expect("resolve");
        store.set_component(EntityId::new("b"), "core:actor", json!({}));
        assert_eq!(cache.get(&actor, "self", &ctx), None);
    }

    #[test]
    fn test_invalidate_entity_scopes_eviction() {
        let (_store, ctx) = fixture();
        let mut cache = ScopeCache::new();
        let a = EntityId::new("a");
        let b = EntityId::new("b");
        cache.resolve("self", &ScopeNode::Actor, &a, &ctx).expect("resolve");
        cache.resolve("self", &ScopeNode::Actor, &b, &ctx).expect("resolve");
        cache.invalidate_entity(&a);
        assert_eq!(cache.get(&a, "self", &ctx), None);
        assert!(cache.get(&b, "self", &ctx).is_some());
    }

    #[test]
    fn test_clear_empties_cache() {
        let (_store, ctx) = fixture();
        let mut cache = ScopeCache::new();
        let actor = EntityId::new("a");
        cache
            .resolve("self", &ScopeNode::Actor, &actor, &ctx)
            .expect("resolve");
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
