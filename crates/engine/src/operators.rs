//! Standard custom operators
//!
//! The anatomy, clothing, and positioning predicate set registered at
//! startup. Each operator resolves its entity argument against the variable
//! document ("actor"/"entity" aliases or a literal id) and reads components
//! through the entity store.

use serde_json::{json, Value};
use std::str::FromStr;

use storyforge_domain::components::types;
use storyforge_domain::{BodyComponent, EntityId, EquipmentComponent, Layer, SlotId};

use crate::error::ScopeError;
use crate::evaluator::{EvalContext, RuleEvaluator};

/// Register the standard anatomy/clothing/positioning operators
pub fn register_standard_operators(evaluator: &mut RuleEvaluator) {
    evaluator.register_operator("hasPartOfType", has_part_of_type);
    evaluator.register_operator("hasPartWithProperty", has_part_with_property);
    evaluator.register_operator("hasClothingInSlot", has_clothing_in_slot);
    evaluator.register_operator("hasClothingInSlotLayer", has_clothing_in_slot_layer);
    evaluator.register_operator("isCloseTo", is_close_to);
    evaluator.register_operator("hasAvailableSeat", has_available_seat);
}

/// Resolve an operator entity argument: "actor"/"entity" alias into the
/// variable document, any other string is taken as a literal entity id
fn entity_arg(ctx: &EvalContext<'_>, operator: &str, value: &Value) -> Result<EntityId, ScopeError> {
    let resolved = match value {
        Value::String(s) if s == "actor" || s == "entity" => {
            ctx.vars.get(s).and_then(|doc| doc.get("id")).cloned()
        }
        Value::String(s) => Some(Value::String(s.clone())),
        Value::Object(obj) => obj.get("id").cloned(),
        _ => None,
    };
    match resolved {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(EntityId::new(id)),
        _ => Err(ScopeError::configuration(format!(
            "operator \"{}\" could not resolve an entity from {}",
            operator, value
        ))),
    }
}

fn string_arg(operator: &str, args: &[Value], index: usize) -> Result<String, ScopeError> {
    args.get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ScopeError::configuration(format!(
                "operator \"{}\" requires a string argument at position {}",
                operator, index
            ))
        })
}

fn arity(operator: &str, args: &[Value], expected: usize) -> Result<(), ScopeError> {
    if args.len() != expected {
        return Err(ScopeError::configuration(format!(
            "operator \"{}\" requires {} arguments, got {}",
            operator,
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn body(ctx: &EvalContext<'_>, entity: &EntityId) -> Option<BodyComponent> {
    let raw = ctx.store.component(entity, types::BODY)?;
    serde_json::from_value(raw).ok()
}

fn equipment(ctx: &EvalContext<'_>, entity: &EntityId) -> Option<EquipmentComponent> {
    let raw = ctx.store.component(entity, types::EQUIPMENT)?;
    serde_json::from_value(raw).ok()
}

/// `hasPartOfType(entity, partType)`
fn has_part_of_type(ctx: &EvalContext<'_>, args: &[Value]) -> Result<Value, ScopeError> {
    arity("hasPartOfType", args, 2)?;
    let entity = entity_arg(ctx, "hasPartOfType", &args[0])?;
    let part_type = string_arg("hasPartOfType", args, 1)?;
    let found = body(ctx, &entity)
        .map(|body| body.parts_of_type(&part_type).next().is_some())
        .unwrap_or(false);
    Ok(json!(found))
}

/// `hasPartWithProperty(entity, partType, property, expected)`
fn has_part_with_property(ctx: &EvalContext<'_>, args: &[Value]) -> Result<Value, ScopeError> {
    arity("hasPartWithProperty", args, 4)?;
    let entity = entity_arg(ctx, "hasPartWithProperty", &args[0])?;
    let part_type = string_arg("hasPartWithProperty", args, 1)?;
    let property = string_arg("hasPartWithProperty", args, 2)?;
    let expected = &args[3];
    let found = body(ctx, &entity)
        .map(|body| {
            body.parts_of_type(&part_type)
                .any(|part| part.properties.get(&property) == Some(expected))
        })
        .unwrap_or(false);
    Ok(json!(found))
}

/// `hasClothingInSlot(entity, slot)`
fn has_clothing_in_slot(ctx: &EvalContext<'_>, args: &[Value]) -> Result<Value, ScopeError> {
    arity("hasClothingInSlot", args, 2)?;
    let entity = entity_arg(ctx, "hasClothingInSlot", &args[0])?;
    let slot = SlotId::new(string_arg("hasClothingInSlot", args, 1)?);
    let found = equipment(ctx, &entity)
        .map(|eq| eq.topmost_in_slot(&slot).is_some())
        .unwrap_or(false);
    Ok(json!(found))
}

/// `hasClothingInSlotLayer(entity, slot, layer)`
fn has_clothing_in_slot_layer(ctx: &EvalContext<'_>, args: &[Value]) -> Result<Value, ScopeError> {
    arity("hasClothingInSlotLayer", args, 3)?;
    let entity = entity_arg(ctx, "hasClothingInSlotLayer", &args[0])?;
    let slot = SlotId::new(string_arg("hasClothingInSlotLayer", args, 1)?);
    let layer = Layer::from_str(&string_arg("hasClothingInSlotLayer", args, 2)?)?;
    let found = equipment(ctx, &entity)
        .map(|eq| eq.item_at(&slot, layer).is_some())
        .unwrap_or(false);
    Ok(json!(found))
}

/// `isCloseTo(entity, other)` - closeness-circle membership
fn is_close_to(ctx: &EvalContext<'_>, args: &[Value]) -> Result<Value, ScopeError> {
    arity("isCloseTo", args, 2)?;
    let entity = entity_arg(ctx, "isCloseTo", &args[0])?;
    let other = entity_arg(ctx, "isCloseTo", &args[1])?;
    let found = ctx
        .store
        .component(&entity, types::CLOSENESS)
        .and_then(|closeness| closeness.get("partners").cloned())
        .and_then(|partners| match partners {
            Value::Array(items) => Some(
                items
                    .iter()
                    .any(|p| p.as_str() == Some(other.as_str())),
            ),
            _ => None,
        })
        .unwrap_or(false);
    Ok(json!(found))
}

/// `hasAvailableSeat(entity)` - any unoccupied spot on sittable furniture
fn has_available_seat(ctx: &EvalContext<'_>, args: &[Value]) -> Result<Value, ScopeError> {
    arity("hasAvailableSeat", args, 1)?;
    let entity = entity_arg(ctx, "hasAvailableSeat", &args[0])?;
    let found = ctx
        .store
        .component(&entity, types::ALLOWS_SITTING)
        .and_then(|sitting| sitting.get("spots").cloned())
        .and_then(|spots| match spots {
            Value::Array(items) => Some(items.iter().any(|spot| spot.is_null())),
            _ => None,
        })
        .unwrap_or(false);
    Ok(json!(found))
}
