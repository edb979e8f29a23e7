//! Anatomy body graph - body parts, sockets, and the slots a body exposes
//!
//! A body is a tree of part entities. Each part carries a type, optional
//! descriptive properties, typed sockets (the equipment slots the part
//! exposes), and attached child parts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{EntityId, SlotId};

/// One body-part node in the anatomy graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPart {
    pub entity: EntityId,
    /// Part type, e.g. "torso", "leg", "hand"
    pub part_type: String,
    /// Descriptive properties matched by anatomy predicates
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    /// Equipment slots this part exposes
    #[serde(default)]
    pub sockets: Vec<SlotId>,
    /// Attached child parts
    #[serde(default)]
    pub children: Vec<BodyPart>,
}

/// The anatomy body graph component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyComponent {
    pub root: BodyPart,
}

impl BodyComponent {
    /// All parts in the graph, preorder
    pub fn parts(&self) -> Vec<&BodyPart> {
        let mut out = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(part) = stack.pop() {
            out.push(part);
            for child in part.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// All parts of a given type
    pub fn parts_of_type<'a>(&'a self, part_type: &'a str) -> impl Iterator<Item = &'a BodyPart> {
        self.parts()
            .into_iter()
            .filter(move |part| part.part_type == part_type)
    }

    /// All equipment slots the body exposes, in graph order
    pub fn slots(&self) -> Vec<&SlotId> {
        self.parts()
            .into_iter()
            .flat_map(|part| part.sockets.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn humanoid() -> BodyComponent {
        BodyComponent {
            root: BodyPart {
                entity: EntityId::new("torso-1"),
                part_type: "torso".to_string(),
                properties: BTreeMap::new(),
                sockets: vec![SlotId::new("torso_upper"), SlotId::new("torso_lower")],
                children: vec![
                    BodyPart {
                        entity: EntityId::new("leg-l"),
                        part_type: "leg".to_string(),
                        properties: BTreeMap::from([(
                            "side".to_string(),
                            Value::String("left".to_string()),
                        )]),
                        sockets: vec![],
                        children: vec![],
                    },
                    BodyPart {
                        entity: EntityId::new("leg-r"),
                        part_type: "leg".to_string(),
                        properties: BTreeMap::from([(
                            "side".to_string(),
                            Value::String("right".to_string()),
                        )]),
                        sockets: vec![SlotId::new("feet")],
                        children: vec![],
                    },
                ],
            },
        }
    }

    #[test]
    fn test_parts_preorder() {
        let body = humanoid();
        let types: Vec<_> = body.parts().iter().map(|p| p.part_type.clone()).collect();
        assert_eq!(types, vec!["torso", "leg", "leg"]);
    }

    #[test]
    fn test_parts_of_type() {
        let body = humanoid();
        assert_eq!(body.parts_of_type("leg").count(), 2);
        assert_eq!(body.parts_of_type("wing").count(), 0);
    }

    #[test]
    fn test_slots_collects_all_sockets() {
        let body = humanoid();
        let slots: Vec<_> = body.slots().iter().map(|s| s.as_str()).collect();
        assert_eq!(slots, vec!["torso_upper", "torso_lower", "feet"]);
    }
}
