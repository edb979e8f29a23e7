//! Property resolver - field and component access on upstream values
//!
//! On an entity, a field is `id`, `components`, or a component path
//! (`components.positioning:closeness.partners` or the bare
//! `positioning:closeness.partners` form). On JSON data it is a dot path.
//! On a clothing-access view it is a slot name, yielding the topmost
//! accessible item in that slot. Missing fields yield nothing rather than
//! failing: an empty sub-result is a normal outcome.

use serde_json::json;
use tracing::warn;

use storyforge_domain::EntityId;

use crate::error::ScopeError;
use crate::evaluator::lookup_var;
use crate::resolvers::{ResolveEnv, ResolvedValue};

pub(crate) fn resolve_property(
    upstream: Vec<ResolvedValue>,
    field: &str,
    env: &ResolveEnv<'_>,
) -> Result<Vec<ResolvedValue>, ScopeError> {
    let mut out = Vec::new();
    for value in upstream {
        match value {
            ResolvedValue::Entity(entity) => {
                if let Some(resolved) = entity_property(&entity, field, env) {
                    out.push(resolved);
                }
            }
            ResolvedValue::Json(data) => {
                if let Some(found) = lookup_var(&data, field) {
                    out.push(ResolvedValue::Json(found));
                }
            }
            ResolvedValue::ClothingAccess(access) => {
                // A field on a clothing view addresses one slot
                match env
                    .ctx
                    .clothing()
                    .topmost_in_slot(&access.entity, field, access.mode)
                {
                    Ok(Some(row)) => out.push(ResolvedValue::Entity(row.item)),
                    Ok(None) => {}
                    Err(e) => {
                        // Degrade to empty: zero targets is recoverable,
                        // an aborted resolution is not.
                        warn!(
                            entity = %access.entity,
                            slot = field,
                            path = %env.path,
                            error = %e,
                            "Clothing slot access failed; treating as empty"
                        );
                    }
                }
            }
        }
    }
    Ok(out)
}

fn entity_property(
    entity: &EntityId,
    field: &str,
    env: &ResolveEnv<'_>,
) -> Option<ResolvedValue> {
    if field == "id" {
        return Some(ResolvedValue::Json(json!(entity.as_str())));
    }
    if field == "components" {
        return Some(ResolvedValue::Json(json!(env.ctx.store().components_of(entity))));
    }
    let path = field.strip_prefix("components.").unwrap_or(field);
    let (component_type, rest) = match path.split_once('.') {
        Some((component_type, rest)) => (component_type, Some(rest)),
        None => (path, None),
    };
    let data = env.ctx.store().component(entity, component_type)?;
    match rest {
        Some(rest) => lookup_var(&data, rest).map(ResolvedValue::Json),
        None => Some(ResolvedValue::Json(data)),
    }
}
