//! Clothing priority manager - pure ordering over layers and coverage classes
//!
//! Produces the single canonical ordering downstream consumers depend on:
//! coverage priority first, then layer, then slot name, then item id as the
//! final determinism tiebreaker. "First" means outermost unless a
//! mode-specific override order is supplied.

use std::cmp::Ordering;

use storyforge_domain::{AccessedItem, Layer};

/// Total order over accessibility rows
#[derive(Debug, Clone)]
pub struct PriorityManager {
    /// Highest-ranked (outermost) layer first
    layer_order: Vec<Layer>,
}

impl Default for PriorityManager {
    fn default() -> Self {
        let mut order = Layer::ORDERED.to_vec();
        order.reverse();
        Self { layer_order: order }
    }
}

impl PriorityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a mode-specific layer order, highest-ranked first
    pub fn with_layer_order(layer_order: Vec<Layer>) -> Self {
        Self { layer_order }
    }

    /// Rank of a layer in the current order; unlisted layers sink last
    pub fn layer_rank(&self, layer: Layer) -> usize {
        self.layer_order
            .iter()
            .position(|l| *l == layer)
            .unwrap_or(self.layer_order.len())
    }

    /// Compare two rows under the canonical order
    pub fn compare(&self, a: &AccessedItem, b: &AccessedItem) -> Ordering {
        self.layer_rank(a.priority)
            .cmp(&self.layer_rank(b.priority))
            .then_with(|| self.layer_rank(a.layer).cmp(&self.layer_rank(b.layer)))
            .then_with(|| a.slot.cmp(&b.slot))
            .then_with(|| a.item.cmp(&b.item))
    }

    /// Sort rows into the canonical order
    pub fn sort(&self, rows: &mut [AccessedItem]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}
