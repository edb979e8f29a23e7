//! Wearable component - declares an item wearable and where it sits

use serde::{Deserialize, Serialize};

use crate::clothing::Layer;
use crate::ids::SlotId;

/// The slots a wearable occupies when equipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSlots {
    pub primary: SlotId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<SlotId>,
}

/// Declares an item wearable: its default layer, the slots it occupies,
/// and (optionally) which layers it may be equipped in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WearableComponent {
    pub layer: Layer,
    pub equipment_slots: EquipmentSlots,
    /// Empty means the default layer only
    #[serde(default)]
    pub allowed_layers: Vec<Layer>,
}

impl WearableComponent {
    /// Whether the item may be equipped in the given layer
    pub fn allows_layer(&self, layer: Layer) -> bool {
        if self.allowed_layers.is_empty() {
            return layer == self.layer;
        }
        self.allowed_layers.contains(&layer)
    }

    /// All slots this wearable occupies
    pub fn slots(&self) -> impl Iterator<Item = &SlotId> {
        std::iter::once(&self.equipment_slots.primary).chain(self.equipment_slots.secondary.iter())
    }
}
