//! Clothing step resolver
//!
//! Turns each upstream entity into a clothing-access descriptor. No items
//! are enumerated here; the descriptor carries the access mode forward and
//! a following property or iteration step materializes the rows.

use serde_json::Value;
use tracing::debug;

use storyforge_domain::{AccessMode, EntityId};

use crate::resolvers::{ClothingAccess, ResolveEnv, ResolvedValue};

pub(crate) fn resolve_clothing_step(
    upstream: Vec<ResolvedValue>,
    mode: AccessMode,
    env: &ResolveEnv<'_>,
) -> Vec<ResolvedValue> {
    let mut out = Vec::new();
    for value in upstream {
        match value {
            ResolvedValue::Entity(entity) => {
                out.push(ResolvedValue::ClothingAccess(ClothingAccess {
                    entity,
                    mode,
                }));
            }
            ResolvedValue::Json(Value::String(id)) if !id.trim().is_empty() => {
                out.push(ResolvedValue::ClothingAccess(ClothingAccess {
                    entity: EntityId::new(id),
                    mode,
                }));
            }
            other => {
                debug!(
                    path = %env.path,
                    mode = %mode,
                    value = ?other,
                    "Clothing step skipped non-entity value"
                );
            }
        }
    }
    out
}
