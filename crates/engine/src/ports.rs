//! Outbound port to the entity/component store
//!
//! The store is an external collaborator; the engine only reads from it.
//! Component payloads cross this boundary as JSON documents and are
//! deserialized into typed views where the engine needs structure.
//!
//! All reads happen on the calling thread against a snapshot the host keeps
//! consistent for the duration of one resolve call. Mutation (equip/unequip)
//! happens between calls, outside this crate.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde_json::Value;

use storyforge_domain::EntityId;

/// Read access to the component store
#[cfg_attr(test, mockall::automock)]
pub trait EntityStore: Send + Sync {
    /// Whether the entity exists at all
    fn has_entity(&self, entity: &EntityId) -> bool;

    /// The component payload for `(entity, component_type)`, if present
    fn component(&self, entity: &EntityId, component_type: &str) -> Option<Value>;

    /// Every component on an entity, keyed by component type
    fn components_of(&self, entity: &EntityId) -> BTreeMap<String, Value>;

    /// Every entity carrying the named component
    fn entities_with_component(&self, component_type: &str) -> Vec<EntityId>;

    /// Monotonically increasing mutation counter, used by caller-side
    /// caches. Stores that never mutate may return a constant.
    fn version(&self) -> u64;
}

/// In-memory component store
///
/// Reference implementation for hosts and tests. Mutations bump the version
/// counter so cached scope results can be validated at lookup time.
#[derive(Default)]
pub struct InMemoryEntityStore {
    components: RwLock<HashMap<EntityId, BTreeMap<String, Value>>>,
    version: AtomicU64,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) a component on an entity
    pub fn set_component(&self, entity: EntityId, component_type: &str, data: Value) {
        let mut components = self.write_components();
        components
            .entry(entity)
            .or_default()
            .insert(component_type.to_string(), data);
        self.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove a component from an entity
    pub fn remove_component(&self, entity: &EntityId, component_type: &str) {
        let mut components = self.write_components();
        if let Some(entry) = components.get_mut(entity) {
            entry.remove(component_type);
            if entry.is_empty() {
                components.remove(entity);
            }
        }
        self.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove an entity and all its components
    pub fn remove_entity(&self, entity: &EntityId) {
        self.write_components().remove(entity);
        self.version.fetch_add(1, Ordering::Relaxed);
    }

    fn read_components(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<EntityId, BTreeMap<String, Value>>> {
        self.components.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_components(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<EntityId, BTreeMap<String, Value>>> {
        self.components.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl EntityStore for InMemoryEntityStore {
    fn has_entity(&self, entity: &EntityId) -> bool {
        self.read_components().contains_key(entity)
    }

    fn component(&self, entity: &EntityId, component_type: &str) -> Option<Value> {
        self.read_components()
            .get(entity)
            .and_then(|components| components.get(component_type))
            .cloned()
    }

    fn components_of(&self, entity: &EntityId) -> BTreeMap<String, Value> {
        self.read_components()
            .get(entity)
            .cloned()
            .unwrap_or_default()
    }

    fn entities_with_component(&self, component_type: &str) -> Vec<EntityId> {
        let components = self.read_components();
        let mut out: Vec<EntityId> = components
            .iter()
            .filter(|(_, types)| types.contains_key(component_type))
            .map(|(entity, _)| entity.clone())
            .collect();
        // HashMap iteration order is arbitrary; result sets must be stable
        out.sort();
        out
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }
}
