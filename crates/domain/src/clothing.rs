//! Clothing value objects - layers, access modes, and query result rows
//!
//! Worn items live on a fixed stack of layers. The layer order is total:
//! `underwear < base < outer < accessories`, outermost last. Accessibility
//! queries select rows from the equipment index under an [`AccessMode`] and
//! return them as [`AccessedItem`] rows in a single canonical order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{EntityId, SlotId};

/// A named depth level for worn items, defining a total visibility order
///
/// Derived `Ord` follows declaration order, so `Layer::Underwear` is the
/// innermost and `Layer::Accessories` the outermost layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Underwear,
    #[default]
    Base,
    Outer,
    Accessories,
}

impl Layer {
    /// Canonical innermost-to-outermost order
    pub const ORDERED: [Layer; 4] = [
        Layer::Underwear,
        Layer::Base,
        Layer::Outer,
        Layer::Accessories,
    ];

    /// All layers for UI dropdowns and iteration
    pub fn all() -> &'static [Layer] {
        &Self::ORDERED
    }

    /// Get a display name for the layer
    pub fn display_name(&self) -> &'static str {
        match self {
            Layer::Underwear => "underwear",
            Layer::Base => "base",
            Layer::Outer => "outer",
            Layer::Accessories => "accessories",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Layer {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "underwear" => Ok(Layer::Underwear),
            "base" => Ok(Layer::Base),
            "outer" => Ok(Layer::Outer),
            "accessories" => Ok(Layer::Accessories),
            _ => Err(DomainError::parse(format!("Unknown layer: {}", s))),
        }
    }
}

/// How an accessibility query selects rows from the equipment index
///
/// The topmost family applies per-slot occlusion (only the highest occupied
/// layer survives). The layer-named modes select exactly one layer. `Removal`
/// is the removal-oriented mode: topmost occlusion plus `blocks_removal`
/// exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    #[default]
    Topmost,
    TopmostNoAccessories,
    All,
    Outer,
    Base,
    Underwear,
    Removal,
}

impl AccessMode {
    /// Get a display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            AccessMode::Topmost => "topmost",
            AccessMode::TopmostNoAccessories => "topmost_no_accessories",
            AccessMode::All => "all",
            AccessMode::Outer => "outer",
            AccessMode::Base => "base",
            AccessMode::Underwear => "underwear",
            AccessMode::Removal => "removal",
        }
    }

    /// Whether this mode keeps only the highest occupied layer per slot
    pub fn is_topmost_family(&self) -> bool {
        matches!(
            self,
            AccessMode::Topmost | AccessMode::TopmostNoAccessories | AccessMode::Removal
        )
    }

    /// Whether this mode selects removal candidates
    pub fn is_removal(&self) -> bool {
        matches!(self, AccessMode::Removal)
    }

    /// Single-layer restriction for the layer-named modes
    pub fn layer_restriction(&self) -> Option<Layer> {
        match self {
            AccessMode::Outer => Some(Layer::Outer),
            AccessMode::Base => Some(Layer::Base),
            AccessMode::Underwear => Some(Layer::Underwear),
            _ => None,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AccessMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topmost" => Ok(AccessMode::Topmost),
            "topmost_no_accessories" => Ok(AccessMode::TopmostNoAccessories),
            "all" => Ok(AccessMode::All),
            "outer" => Ok(AccessMode::Outer),
            "base" => Ok(AccessMode::Base),
            "underwear" => Ok(AccessMode::Underwear),
            "removal" => Ok(AccessMode::Removal),
            _ => Err(DomainError::parse(format!(
                "Unknown clothing access mode: {}",
                s
            ))),
        }
    }
}

/// One row of an accessibility query result
///
/// `priority` is the coverage-priority class: the item's declared
/// `coverage_mapping.coverage_priority` when present, otherwise the layer it
/// is equipped in. Rows sort by priority, then layer, then slot name, so any
/// given equip state yields a single canonical ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessedItem {
    pub item: EntityId,
    pub slot: SlotId,
    pub layer: Layer,
    pub priority: Layer,
}
