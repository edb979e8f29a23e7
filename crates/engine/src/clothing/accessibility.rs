//! Clothing accessibility service
//!
//! The facade callers use to ask "what is accessible on entity X, under mode
//! Y". Composes the priority manager and coverage/blocking analyzer over the
//! entity's equipment component:
//!
//! 1. No equipment component - empty result.
//! 2. Topmost-family modes keep only the highest occupied layer per slot;
//!    layer-named modes keep exactly that layer.
//! 3. `MustRemoveFirst` blockers exclude a row from removal-mode results
//!    only; `FullBlock` blockers exclude it from all queries (or removal
//!    only, under the `RemovalOnly` policy).
//! 4. Survivors are sorted into the priority manager's canonical order.

use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use storyforge_domain::components::types;
use storyforge_domain::{
    AccessMode, AccessedItem, BlockType, EntityId, EquipmentComponent, Layer,
};

use crate::clothing::{CoverageAnalyzer, PriorityManager};
use crate::error::ScopeError;
use crate::ports::EntityStore;

/// How widely a `FullBlock` declaration suppresses an item.
///
/// Source material is split on whether a fully blocked item should also
/// vanish from description-oriented queries, so the reach is a policy knob
/// rather than a fixed behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullBlockPolicy {
    /// Blocked items disappear from every accessibility query
    #[default]
    AllQueries,
    /// Blocked items disappear from removal-mode queries only
    RemovalOnly,
}

/// Facade over equipment state, layering, and blocking
pub struct AccessibilityService {
    store: Arc<dyn EntityStore>,
    priority: PriorityManager,
    analyzer: CoverageAnalyzer,
    full_block_policy: FullBlockPolicy,
}

impl AccessibilityService {
    /// Build the service. The store is a construction-time requirement;
    /// per-call dependency checks do not exist.
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            analyzer: CoverageAnalyzer::new(Arc::clone(&store)),
            priority: PriorityManager::new(),
            store,
            full_block_policy: FullBlockPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FullBlockPolicy) -> Self {
        self.full_block_policy = policy;
        self
    }

    pub fn full_block_policy(&self) -> FullBlockPolicy {
        self.full_block_policy
    }

    /// Accessible items on a body under a mode, in canonical order
    pub fn accessible_items(
        &self,
        entity: &EntityId,
        mode: AccessMode,
    ) -> Result<Vec<AccessedItem>, ScopeError> {
        let Some(raw) = self.store.component(entity, types::EQUIPMENT) else {
            return Ok(Vec::new());
        };
        let equipment: EquipmentComponent = serde_json::from_value(raw).map_err(|e| {
            ScopeError::resolution(
                "clothing.accessibility",
                format!("malformed equipment component on {}: {}", entity, e),
            )
        })?;

        let mut rows = self.candidate_rows(&equipment, mode);
        rows.retain(|row| !self.is_blocked(&equipment, row, mode));
        self.priority.sort(&mut rows);

        debug!(
            entity = %entity,
            mode = %mode,
            rows = rows.len(),
            "Resolved accessible clothing"
        );
        Ok(rows)
    }

    /// Mode-named lookup for callers holding an unvalidated mode string.
    /// An unknown mode is a configuration error, not a silent empty result.
    pub fn accessible_items_named(
        &self,
        entity: &EntityId,
        mode: &str,
    ) -> Result<Vec<AccessedItem>, ScopeError> {
        let mode = AccessMode::from_str(mode).map_err(|e| {
            let err = ScopeError::configuration(e.to_string());
            tracing::error!(mode = %mode, "Unknown clothing access mode requested");
            err
        })?;
        self.accessible_items(entity, mode)
    }

    /// The topmost accessible item in one slot, if any
    pub fn topmost_in_slot(
        &self,
        entity: &EntityId,
        slot: &str,
        mode: AccessMode,
    ) -> Result<Option<AccessedItem>, ScopeError> {
        Ok(self
            .accessible_items(entity, mode)?
            .into_iter()
            .find(|row| row.slot.as_str() == slot))
    }

    /// Occupied rows surviving the mode's layer selection
    fn candidate_rows(&self, equipment: &EquipmentComponent, mode: AccessMode) -> Vec<AccessedItem> {
        let mut rows = Vec::new();
        for (slot, layers) in &equipment.equipped {
            let mut occupied: Vec<(Layer, &EntityId)> =
                layers.iter().map(|(layer, item)| (*layer, item)).collect();
            if mode == AccessMode::TopmostNoAccessories {
                occupied.retain(|(layer, _)| *layer != Layer::Accessories);
            }
            if let Some(restriction) = mode.layer_restriction() {
                occupied.retain(|(layer, _)| *layer == restriction);
            }
            if mode.is_topmost_family() {
                // Standard occlusion: only the highest occupied layer in
                // the slot is reachable.
                occupied = occupied.into_iter().max_by_key(|(layer, _)| *layer)
                    .into_iter()
                    .collect();
            }
            for (layer, item) in occupied {
                let priority = self
                    .analyzer
                    .coverage_mapping(item)
                    .map(|mapping| mapping.coverage_priority)
                    .unwrap_or(layer);
                rows.push(AccessedItem {
                    item: item.clone(),
                    slot: slot.clone(),
                    layer,
                    priority,
                });
            }
        }
        rows
    }

    /// Whether a candidate row is excluded by a blocking declaration
    fn is_blocked(
        &self,
        equipment: &EquipmentComponent,
        row: &AccessedItem,
        mode: AccessMode,
    ) -> bool {
        let blockers = self
            .analyzer
            .blockers_for(equipment, &row.slot, row.layer, &row.item);
        blockers.iter().any(|blocker| match blocker.block_type {
            BlockType::MustRemoveFirst => mode.is_removal(),
            BlockType::FullBlock => {
                mode.is_removal() || self.full_block_policy == FullBlockPolicy::AllQueries
            }
        })
    }
}
