//! Scope AST - the declarative query tree resolved against world state
//!
//! The textual scope DSL (`actor.topmost_clothing`,
//! `entities(core:actor).filter({...})`) is compiled to this tree by an
//! external parser at content-load time. Nodes are immutable once parsed;
//! resolution never mutates them.

use serde::{Deserialize, Serialize};

use crate::clothing::AccessMode;
use crate::logic::LogicExpr;

/// One node of a scope expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", rename_all_fields = "camelCase")]
pub enum ScopeNode {
    /// The acting entity itself
    Actor,

    /// The actor's current location entity
    Location,

    /// Every entity carrying the named component
    Entities { component: String },

    /// Field or component access on each upstream value
    Property { parent: Box<ScopeNode>, field: String },

    /// Flattens each upstream collection into its elements
    Iteration { parent: Box<ScopeNode> },

    /// Keeps upstream values for which the rule logic is truthy
    Filter {
        parent: Box<ScopeNode>,
        logic: LogicExpr,
    },

    /// Materializes a clothing-access view of each upstream body
    ClothingStep {
        parent: Box<ScopeNode>,
        mode: AccessMode,
    },

    /// Set union of both arms
    Union {
        left: Box<ScopeNode>,
        right: Box<ScopeNode>,
    },
}

impl ScopeNode {
    /// Depth of the expression tree, counting this node
    pub fn depth(&self) -> usize {
        match self {
            ScopeNode::Actor | ScopeNode::Location | ScopeNode::Entities { .. } => 1,
            ScopeNode::Property { parent, .. }
            | ScopeNode::Iteration { parent }
            | ScopeNode::Filter { parent, .. }
            | ScopeNode::ClothingStep { parent, .. } => 1 + parent.depth(),
            ScopeNode::Union { left, right } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Stable node-kind name used in diagnostics and resolution paths
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScopeNode::Actor => "actor",
            ScopeNode::Location => "location",
            ScopeNode::Entities { .. } => "entities",
            ScopeNode::Property { .. } => "property",
            ScopeNode::Iteration { .. } => "iteration",
            ScopeNode::Filter { .. } => "filter",
            ScopeNode::ClothingStep { .. } => "clothingStep",
            ScopeNode::Union { .. } => "union",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_counts_longest_chain() {
        let node = ScopeNode::Filter {
            parent: Box::new(ScopeNode::Iteration {
                parent: Box::new(ScopeNode::Entities {
                    component: "core:actor".to_string(),
                }),
            }),
            logic: LogicExpr::Literal(serde_json::Value::Bool(true)),
        };
        assert_eq!(node.depth(), 3);

        let union = ScopeNode::Union {
            left: Box::new(node),
            right: Box::new(ScopeNode::Actor),
        };
        assert_eq!(union.depth(), 4);
    }

    #[test]
    fn test_deserialize_tagged_document() {
        let node: ScopeNode = serde_json::from_value(serde_json::json!({
            "kind": "clothingStep",
            "parent": { "kind": "actor" },
            "mode": "topmost"
        }))
        .expect("deserialize");
        assert!(matches!(
            node,
            ScopeNode::ClothingStep {
                mode: AccessMode::Topmost,
                ..
            }
        ));
    }

    #[test]
    fn test_kind_name_matches_tag() {
        let node = ScopeNode::Entities {
            component: "core:actor".to_string(),
        };
        let doc = serde_json::to_value(&node).expect("serialize");
        assert_eq!(doc["kind"], node.kind_name());
    }
}
