//! Blocks-removal component - explicit removal-order constraints
//!
//! Constraints are declared only on the blocking item, never inferred.
//! A belt that must come off before trousers declares a `MustRemoveFirst`
//! entry for the trousers' `(slot, layers)`.

use serde::{Deserialize, Serialize};

use crate::clothing::Layer;
use crate::ids::SlotId;

/// Blocking semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Excluded from the removal candidate set until the blocker is gone.
    /// A guarded precedence, not a hard prohibition.
    MustRemoveFirst,
    /// Excluded from accessibility queries while the blocker is present
    /// (scope controlled by the accessibility service's full-block policy).
    FullBlock,
}

/// One blocked `(slot, layers)` target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedSlot {
    pub slot: SlotId,
    /// Empty means every layer in the slot
    #[serde(default)]
    pub layers: Vec<Layer>,
    pub block_type: BlockType,
    #[serde(default)]
    pub reason: String,
}

impl BlockedSlot {
    /// Whether this entry targets the given `(slot, layer)` pair
    pub fn matches(&self, slot: &SlotId, layer: Layer) -> bool {
        if &self.slot != slot {
            return false;
        }
        self.layers.is_empty() || self.layers.contains(&layer)
    }
}

/// Removal-order constraints declared by one blocking item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocksRemoval {
    #[serde(default)]
    pub blocked_slots: Vec<BlockedSlot>,
}

impl BlocksRemoval {
    /// The first declaration targeting `(slot, layer)`, if any
    pub fn blocking_entry(&self, slot: &SlotId, layer: Layer) -> Option<&BlockedSlot> {
        self.blocked_slots.iter().find(|b| b.matches(slot, layer))
    }
}
