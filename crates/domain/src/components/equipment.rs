//! Equipment component - the worn-items index per body slot
//!
//! `equipped[slot][layer]` holds at most one item id, and an item may be
//! equipped in only one `(slot, layer)` pair at a time. `BTreeMap` keeps
//! iteration order deterministic, which downstream canonical-ordering
//! guarantees depend on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clothing::Layer;
use crate::error::DomainError;
use crate::ids::{EntityId, SlotId};

/// The worn-items index for one body
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentComponent {
    #[serde(default)]
    pub equipped: BTreeMap<SlotId, BTreeMap<Layer, EntityId>>,
}

impl EquipmentComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// The item occupying `(slot, layer)`, if any
    pub fn item_at(&self, slot: &SlotId, layer: Layer) -> Option<&EntityId> {
        self.equipped.get(slot).and_then(|layers| layers.get(&layer))
    }

    /// All occupied `(slot, layer, item)` rows, in slot/layer order
    pub fn items(&self) -> impl Iterator<Item = (&SlotId, Layer, &EntityId)> {
        self.equipped.iter().flat_map(|(slot, layers)| {
            layers.iter().map(move |(layer, item)| (slot, *layer, item))
        })
    }

    /// Whether the item is equipped anywhere on this body
    pub fn is_equipped(&self, item: &EntityId) -> bool {
        self.items().any(|(_, _, worn)| worn == item)
    }

    /// The highest occupied layer in a slot
    pub fn topmost_in_slot(&self, slot: &SlotId) -> Option<(Layer, &EntityId)> {
        self.equipped
            .get(slot)
            .and_then(|layers| layers.iter().next_back())
            .map(|(layer, item)| (*layer, item))
    }

    /// Equip an item, enforcing the at-most-one invariants
    pub fn equip(&mut self, slot: SlotId, layer: Layer, item: EntityId) -> Result<(), DomainError> {
        if self.is_equipped(&item) {
            return Err(DomainError::constraint(format!(
                "item {} is already equipped",
                item
            )));
        }
        if let Some(occupant) = self.item_at(&slot, layer) {
            return Err(DomainError::constraint(format!(
                "slot {} layer {} is already occupied by {}",
                slot, layer, occupant
            )));
        }
        self.equipped.entry(slot).or_default().insert(layer, item);
        Ok(())
    }

    /// Remove the item at `(slot, layer)`, dropping emptied slot maps
    pub fn unequip(&mut self, slot: &SlotId, layer: Layer) -> Option<EntityId> {
        let layers = self.equipped.get_mut(slot)?;
        let removed = layers.remove(&layer);
        if layers.is_empty() {
            self.equipped.remove(slot);
        }
        removed
    }
}
