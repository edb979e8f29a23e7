//! Node resolvers - one resolver per scope AST node kind
//!
//! Each resolver consumes the values produced by its parent node and emits
//! the values for the next step. Values flow as [`ResolvedValue`]s so the
//! pipeline stays clothing-agnostic: the clothing step only materializes an
//! access descriptor, and iteration adapts accessibility rows to the generic
//! shape (`itemId`/`slotName`/`layer`/`priority`).

mod clothing_step;
mod filter;
mod iteration;
mod property;

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use storyforge_domain::components::types;
use storyforge_domain::{AccessMode, EntityId, ScopeNode};

use crate::engine::RuntimeContext;
use crate::error::ScopeError;
use crate::trace::ScopeTrace;

/// A clothing-access view of one body, consumed by a following iteration,
/// property, or filter step
#[derive(Debug, Clone, PartialEq)]
pub struct ClothingAccess {
    pub entity: EntityId,
    pub mode: AccessMode,
}

/// One value flowing between resolution steps
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// An entity reference
    Entity(EntityId),
    /// Raw component/field data
    Json(Value),
    /// A clothing-access descriptor produced by a clothing step
    ClothingAccess(ClothingAccess),
}

impl ResolvedValue {
    /// The entity this value refers to, if it refers to one
    pub fn entity_id(&self) -> Option<EntityId> {
        match self {
            ResolvedValue::Entity(id) => Some(id.clone()),
            ResolvedValue::Json(Value::String(s)) if !s.trim().is_empty() => {
                Some(EntityId::new(s.clone()))
            }
            ResolvedValue::Json(Value::Object(obj)) => obj
                .get("itemId")
                .or_else(|| obj.get("id"))
                .and_then(Value::as_str)
                .map(EntityId::new),
            _ => None,
        }
    }

    /// Stable identity used for union de-duplication
    fn union_key(&self) -> String {
        match self {
            ResolvedValue::Entity(id) => format!("entity:{}", id),
            ResolvedValue::Json(v) => format!("json:{}", v),
            ResolvedValue::ClothingAccess(access) => {
                format!("clothing:{}:{}", access.entity, access.mode)
            }
        }
    }
}

/// Read-only evaluation context threaded through one resolution
pub(crate) struct ResolveEnv<'a> {
    pub actor: &'a EntityId,
    pub ctx: &'a RuntimeContext,
    pub trace: Option<&'a dyn ScopeTrace>,
    /// Accumulated node path for diagnostics, e.g. "union.left.filter"
    pub path: String,
}

impl<'a> ResolveEnv<'a> {
    pub fn new(actor: &'a EntityId, ctx: &'a RuntimeContext, trace: Option<&'a dyn ScopeTrace>) -> Self {
        Self {
            actor,
            ctx,
            trace,
            path: String::new(),
        }
    }

    fn child(&self, segment: &str) -> ResolveEnv<'a> {
        let path = if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", self.path, segment)
        };
        ResolveEnv {
            actor: self.actor,
            ctx: self.ctx,
            trace: self.trace,
            path,
        }
    }
}

/// Dispatch one AST node to its resolver
pub(crate) fn resolve_node(
    node: &ScopeNode,
    env: &ResolveEnv<'_>,
) -> Result<Vec<ResolvedValue>, ScopeError> {
    let env = env.child(node.kind_name());
    match node {
        ScopeNode::Actor => Ok(vec![ResolvedValue::Entity(env.actor.clone())]),

        ScopeNode::Location => Ok(actor_location(&env)
            .map(ResolvedValue::Entity)
            .into_iter()
            .collect()),

        ScopeNode::Entities { component } => Ok(env
            .ctx
            .store()
            .entities_with_component(component)
            .into_iter()
            .map(ResolvedValue::Entity)
            .collect()),

        ScopeNode::Property { parent, field } => {
            let upstream = resolve_node(parent, &env)?;
            property::resolve_property(upstream, field, &env)
        }

        ScopeNode::Iteration { parent } => {
            let upstream = resolve_node(parent, &env)?;
            Ok(iteration::resolve_iteration(upstream, &env))
        }

        ScopeNode::Filter { parent, logic } => {
            let upstream = resolve_node(parent, &env)?;
            filter::resolve_filter(upstream, logic, &env)
        }

        ScopeNode::ClothingStep { parent, mode } => {
            let upstream = resolve_node(parent, &env)?;
            Ok(clothing_step::resolve_clothing_step(upstream, *mode, &env))
        }

        ScopeNode::Union { left, right } => {
            let mut values = resolve_node(left, &env.child("left"))?;
            values.extend(resolve_node(right, &env.child("right"))?);
            let mut seen = BTreeSet::new();
            values.retain(|value| seen.insert(value.union_key()));
            Ok(values)
        }
    }
}

/// The actor's current location entity, if positioned
fn actor_location(env: &ResolveEnv<'_>) -> Option<EntityId> {
    let position = env.ctx.store().component(env.actor, types::POSITION)?;
    match position.get("locationId").and_then(Value::as_str) {
        Some(location) => Some(EntityId::new(location)),
        None => {
            debug!(
                actor = %env.actor,
                path = %env.path,
                "Position component has no locationId"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_extraction() {
        assert_eq!(
            ResolvedValue::Entity(EntityId::new("a")).entity_id(),
            Some(EntityId::new("a"))
        );
        assert_eq!(
            ResolvedValue::Json(json!("b")).entity_id(),
            Some(EntityId::new("b"))
        );
        assert_eq!(
            ResolvedValue::Json(json!({ "itemId": "belt-1", "layer": "accessories" }))
                .entity_id(),
            Some(EntityId::new("belt-1"))
        );
        assert_eq!(ResolvedValue::Json(json!(7)).entity_id(), None);
        assert_eq!(ResolvedValue::Json(json!("  ")).entity_id(), None);
    }

    #[test]
    fn test_union_keys_distinguish_kinds() {
        let entity = ResolvedValue::Entity(EntityId::new("a"));
        let json = ResolvedValue::Json(json!("a"));
        assert_ne!(entity.union_key(), json.union_key());
        assert_eq!(entity.union_key(), entity.clone().union_key());
    }
}
