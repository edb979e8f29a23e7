//! Array iteration resolver
//!
//! Flattens each upstream collection into its elements. No clothing
//! ordering logic lives here: for a clothing-access view the resolver
//! delegates entirely to the accessibility service and adapts the rows to
//! the generic `{itemId, slotName, layer, priority}` shape. A failure in
//! the clothing subsystem degrades that sub-expression to empty instead of
//! aborting the whole resolution.

use serde_json::{json, Value};
use tracing::warn;

use storyforge_domain::EntityId;

use crate::resolvers::{ClothingAccess, ResolveEnv, ResolvedValue};

pub(crate) fn resolve_iteration(
    upstream: Vec<ResolvedValue>,
    env: &ResolveEnv<'_>,
) -> Vec<ResolvedValue> {
    let mut out = Vec::new();
    for value in upstream {
        match value {
            // Iterating a single entity yields the entity itself
            ResolvedValue::Entity(id) => out.push(ResolvedValue::Entity(id)),

            ResolvedValue::Json(Value::Array(items)) => {
                out.extend(items.into_iter().map(element_value));
            }

            ResolvedValue::Json(Value::Object(map)) => {
                out.extend(map.into_iter().map(|(_, v)| element_value(v)));
            }

            ResolvedValue::Json(Value::String(id)) if !id.trim().is_empty() => {
                out.push(ResolvedValue::Entity(EntityId::new(id)));
            }

            ResolvedValue::Json(_) => {}

            ResolvedValue::ClothingAccess(access) => {
                out.extend(iterate_clothing(access, env));
            }
        }
    }
    out
}

/// Interpret one collection element: id strings and id-carrying objects
/// become entity references, everything else stays data
fn element_value(value: Value) -> ResolvedValue {
    match value {
        Value::String(id) if !id.trim().is_empty() => ResolvedValue::Entity(EntityId::new(id)),
        Value::Object(ref obj) => match obj.get("id").and_then(Value::as_str) {
            Some(id) => ResolvedValue::Entity(EntityId::new(id)),
            None => ResolvedValue::Json(value),
        },
        other => ResolvedValue::Json(other),
    }
}

fn iterate_clothing(access: ClothingAccess, env: &ResolveEnv<'_>) -> Vec<ResolvedValue> {
    match env
        .ctx
        .clothing()
        .accessible_items(&access.entity, access.mode)
    {
        Ok(rows) => rows
            .into_iter()
            .map(|row| {
                ResolvedValue::Json(json!({
                    "itemId": row.item.as_str(),
                    "slotName": row.slot.as_str(),
                    "layer": row.layer,
                    "priority": row.priority,
                }))
            })
            .collect(),
        Err(e) => {
            // An empty target list is safe degraded behavior for a game
            // action; an uncaught failure is not.
            warn!(
                entity = %access.entity,
                mode = %access.mode,
                path = %env.path,
                error = %e,
                "Clothing accessibility failed; treating sub-expression as empty"
            );
            Vec::new()
        }
    }
}
