//! Typed component schemas
//!
//! All world state lives in `(entityId, componentType) -> data` records.
//! Component payloads arrive as JSON documents (validated by the external
//! schema collaborator at content-load time); these are the typed views the
//! engine deserializes them into.

mod anatomy;
mod blocking;
mod coverage;
mod equipment;
mod wearable;

pub use anatomy::{BodyComponent, BodyPart};
pub use blocking::{BlockType, BlockedSlot, BlocksRemoval};
pub use coverage::CoverageMapping;
pub use equipment::EquipmentComponent;
pub use wearable::{EquipmentSlots, WearableComponent};

/// Well-known component type ids
pub mod types {
    /// Declares an item wearable: its layer and the slots it occupies
    pub const WEARABLE: &str = "clothing:wearable";
    /// The worn-items index per body slot
    pub const EQUIPMENT: &str = "clothing:equipment";
    /// Declares which slots an item visually/physically covers
    pub const COVERAGE_MAPPING: &str = "clothing:coverage_mapping";
    /// Explicit removal-order constraints declared on the blocking item
    pub const BLOCKS_REMOVAL: &str = "clothing:blocks_removal";
    /// Anatomy body graph of part entities with typed sockets
    pub const BODY: &str = "anatomy:body";
    /// Where an entity currently is
    pub const POSITION: &str = "core:position";
    /// Closeness circle membership (positioning predicates)
    pub const CLOSENESS: &str = "positioning:closeness";
    /// Sittable furniture with occupiable spots
    pub const ALLOWS_SITTING: &str = "positioning:allows_sitting";
}
