//! Coverage mapping component - which slots a worn item covers

use serde::{Deserialize, Serialize};

use crate::clothing::Layer;
use crate::ids::SlotId;

/// Declares which slots an item visually/physically covers, and the
/// coverage-priority class used to rank it against other worn items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMapping {
    #[serde(default)]
    pub covers: Vec<SlotId>,
    pub coverage_priority: Layer,
}

impl CoverageMapping {
    pub fn covers_slot(&self, slot: &SlotId) -> bool {
        self.covers.contains(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_slot() {
        let mapping = CoverageMapping {
            covers: vec![SlotId::new("torso_lower"), SlotId::new("legs")],
            coverage_priority: Layer::Outer,
        };
        assert!(mapping.covers_slot(&SlotId::new("legs")));
        assert!(!mapping.covers_slot(&SlotId::new("feet")));
    }

    #[test]
    fn test_deserialize_from_schema_document() {
        let mapping: CoverageMapping = serde_json::from_value(serde_json::json!({
            "covers": ["torso_lower"],
            "coveragePriority": "base"
        }))
        .expect("deserialize");
        assert_eq!(mapping.coverage_priority, Layer::Base);
    }
}
