//! Coverage/blocking analyzer
//!
//! Computes, for a worn item, which other worn rows it covers (via
//! `coverage_mapping`) and which currently-equipped items block it from
//! removal or from all interaction (via `blocks_removal`). Blocking is
//! evaluated against the current equip state only - a blocker that has been
//! unequipped no longer blocks anything - and is never inferred: only
//! explicit declarations on the blocking item count.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use storyforge_domain::components::types;
use storyforge_domain::{
    BlockType, BlocksRemoval, CoverageMapping, EntityId, EquipmentComponent, Layer, SlotId,
};

use crate::ports::EntityStore;

/// One blocking relationship affecting a worn row
#[derive(Debug, Clone, PartialEq)]
pub struct Blocker {
    pub blocker: EntityId,
    pub block_type: BlockType,
    pub reason: String,
}

/// Analyzes coverage and blocking relationships over one equipment state
pub struct CoverageAnalyzer {
    store: Arc<dyn EntityStore>,
}

impl CoverageAnalyzer {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// The item's coverage mapping, if it declares one
    pub fn coverage_mapping(&self, item: &EntityId) -> Option<CoverageMapping> {
        let raw = self.store.component(item, types::COVERAGE_MAPPING)?;
        self.deserialize(item, types::COVERAGE_MAPPING, raw)
    }

    /// Worn rows in slots the item's coverage mapping covers, excluding the
    /// item itself. Used by description composition.
    pub fn covered_items(
        &self,
        equipment: &EquipmentComponent,
        item: &EntityId,
    ) -> Vec<EntityId> {
        let Some(mapping) = self.coverage_mapping(item) else {
            return Vec::new();
        };
        equipment
            .items()
            .filter(|(slot, _, worn)| *worn != item && mapping.covers_slot(slot))
            .map(|(_, _, worn)| worn.clone())
            .collect()
    }

    /// All blocking relationships targeting `(slot, layer)`, declared by
    /// *other* currently equipped items
    pub fn blockers_for(
        &self,
        equipment: &EquipmentComponent,
        slot: &SlotId,
        layer: Layer,
        item: &EntityId,
    ) -> Vec<Blocker> {
        let mut blockers = Vec::new();
        for (_, _, worn) in equipment.items() {
            if worn == item {
                continue;
            }
            let Some(raw) = self.store.component(worn, types::BLOCKS_REMOVAL) else {
                continue;
            };
            let Some(declaration) =
                self.deserialize::<BlocksRemoval>(worn, types::BLOCKS_REMOVAL, raw)
            else {
                continue;
            };
            if let Some(entry) = declaration.blocking_entry(slot, layer) {
                blockers.push(Blocker {
                    blocker: worn.clone(),
                    block_type: entry.block_type,
                    reason: entry.reason.clone(),
                });
            }
        }
        blockers
    }

    fn deserialize<T: serde::de::DeserializeOwned>(
        &self,
        entity: &EntityId,
        component_type: &str,
        raw: Value,
    ) -> Option<T> {
        match serde_json::from_value(raw) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                // Schema validation happens at content load; a malformed
                // payload here is a store defect, not a resolution error.
                warn!(
                    entity = %entity,
                    component = component_type,
                    error = %e,
                    "Ignoring malformed component payload"
                );
                None
            }
        }
    }
}
