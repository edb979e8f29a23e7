extern crate self as storyforge_domain;

pub mod clothing;
pub mod components;
pub mod error;
pub mod ids;
pub mod logic;
pub mod scope;

pub use clothing::{AccessMode, AccessedItem, Layer};
pub use components::{
    BlockType, BlockedSlot, BlocksRemoval, BodyComponent, BodyPart, CoverageMapping,
    EquipmentComponent, EquipmentSlots, WearableComponent,
};
pub use error::DomainError;
pub use ids::{ConditionId, EntityId, SlotId};
pub use logic::{CompareOp, LogicExpr};
pub use scope::ScopeNode;
