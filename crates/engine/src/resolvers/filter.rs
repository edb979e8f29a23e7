//! Filter resolver
//!
//! Evaluates the rule logic per candidate and keeps the truthy ones. When a
//! trace is attached and enabled, each evaluation also produces the
//! recursive clause breakdown; the breakdown is skipped otherwise so
//! production paths pay nothing for it.

use serde_json::{json, Map, Value};

use storyforge_domain::{EntityId, LogicExpr};

use crate::error::ScopeError;
use crate::evaluator::EvalContext;
use crate::ports::EntityStore;
use crate::resolvers::{ResolveEnv, ResolvedValue};

pub(crate) fn resolve_filter(
    upstream: Vec<ResolvedValue>,
    logic: &LogicExpr,
    env: &ResolveEnv<'_>,
) -> Result<Vec<ResolvedValue>, ScopeError> {
    let evaluator = env.ctx.evaluator();
    let trace = env.trace.filter(|t| t.is_enabled());
    let mut kept = Vec::new();

    for value in upstream {
        let vars = candidate_vars(&value, env);
        let eval_ctx = EvalContext {
            vars: &vars,
            store: env.ctx.store(),
        };
        let passed = evaluator.evaluate_bool(logic, &eval_ctx)?;

        if let Some(trace) = trace {
            let breakdown = evaluator.explain(logic, &eval_ctx)?;
            trace.log_filter_evaluation(&candidate_label(&value), logic, passed, Some(&breakdown));
        }

        if passed {
            kept.push(value);
        }
    }
    Ok(kept)
}

/// Build the variable document for one candidate
///
/// Entity candidates expose `entity` and `actor` docs plus the entity's
/// `id`/`components` at top level; clothing rows additionally expose their
/// `itemId`/`slotName`/`layer`/`priority` fields.
fn candidate_vars(value: &ResolvedValue, env: &ResolveEnv<'_>) -> Value {
    let actor_doc = entity_doc(env.ctx.store(), env.actor);
    match value {
        ResolvedValue::Entity(id) => entity_candidate_vars(id, actor_doc, env),

        ResolvedValue::Json(Value::String(id)) => {
            entity_candidate_vars(&EntityId::new(id.clone()), actor_doc, env)
        }

        ResolvedValue::Json(Value::Object(obj)) if obj.contains_key("itemId") => {
            let mut vars = match obj.get("itemId").and_then(Value::as_str) {
                Some(item) => entity_candidate_vars(&EntityId::new(item), actor_doc, env),
                None => json!({ "actor": actor_doc }),
            };
            if let Value::Object(target) = &mut vars {
                for (key, val) in obj {
                    target.insert(key.clone(), val.clone());
                }
            }
            vars
        }

        ResolvedValue::Json(other) => json!({
            "actor": actor_doc,
            "value": other,
        }),

        ResolvedValue::ClothingAccess(access) => {
            let mut vars = entity_candidate_vars(&access.entity, actor_doc, env);
            if let Value::Object(target) = &mut vars {
                target.insert("mode".to_string(), json!(access.mode));
            }
            vars
        }
    }
}

fn entity_candidate_vars(entity: &EntityId, actor_doc: Value, env: &ResolveEnv<'_>) -> Value {
    let entity_doc = entity_doc(env.ctx.store(), entity);
    let mut vars = Map::new();
    vars.insert("actor".to_string(), actor_doc);
    // Mirror the entity doc at top level for unqualified var paths
    if let Value::Object(fields) = &entity_doc {
        for (key, val) in fields {
            vars.insert(key.clone(), val.clone());
        }
    }
    vars.insert("entity".to_string(), entity_doc);
    Value::Object(vars)
}

fn entity_doc(store: &dyn EntityStore, entity: &EntityId) -> Value {
    json!({
        "id": entity.as_str(),
        "components": store.components_of(entity),
    })
}

/// An id to tag trace entries with, even for non-entity candidates
fn candidate_label(value: &ResolvedValue) -> EntityId {
    value
        .entity_id()
        .unwrap_or_else(|| EntityId::new("<non-entity>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuntimeContext;
    use crate::evaluator::RuleEvaluator;
    use crate::ports::InMemoryEntityStore;
    use crate::trace::{CollectingTrace, ScopeTrace};
    use std::sync::Arc;

    fn context_with(store: Arc<InMemoryEntityStore>) -> RuntimeContext {
        RuntimeContext::builder()
            .entity_store(store)
            .rule_evaluator(Arc::new(RuleEvaluator::new()))
            .build()
            .expect("context")
    }

    fn is_actor_logic() -> LogicExpr {
        LogicExpr::from_json(&json!({
            "==": [{ "var": "entity.components.core:actor.type" }, "npc"]
        }))
        .expect("parse")
    }

    #[test]
    fn test_filter_keeps_matching_entities() {
        let store = Arc::new(InMemoryEntityStore::new());
        store.set_component(EntityId::new("npc-1"), "core:actor", json!({ "type": "npc" }));
        store.set_component(EntityId::new("door-1"), "core:actor", json!({ "type": "prop" }));
        let ctx = context_with(store);
        let actor = EntityId::new("npc-1");
        let env = ResolveEnv::new(&actor, &ctx, None);

        let kept = resolve_filter(
            vec![
                ResolvedValue::Entity(EntityId::new("npc-1")),
                ResolvedValue::Entity(EntityId::new("door-1")),
            ],
            &is_actor_logic(),
            &env,
        )
        .expect("filter");
        assert_eq!(kept, vec![ResolvedValue::Entity(EntityId::new("npc-1"))]);
    }

    #[test]
    fn test_clothing_row_fields_are_filterable() {
        let ctx = context_with(Arc::new(InMemoryEntityStore::new()));
        let actor = EntityId::new("a");
        let env = ResolveEnv::new(&actor, &ctx, None);
        let logic =
            LogicExpr::from_json(&json!({ "==": [{ "var": "layer" }, "base"] })).expect("parse");

        let rows = vec![
            ResolvedValue::Json(json!({ "itemId": "pants-1", "layer": "base" })),
            ResolvedValue::Json(json!({ "itemId": "belt-1", "layer": "accessories" })),
        ];
        let kept = resolve_filter(rows, &logic, &env).expect("filter");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entity_id(), Some(EntityId::new("pants-1")));
    }

    #[test]
    fn test_breakdown_only_computed_when_trace_enabled() {
        struct DisabledTrace;
        impl ScopeTrace for DisabledTrace {
            fn is_enabled(&self) -> bool {
                false
            }
            fn log_filter_evaluation(
                &self,
                _: &EntityId,
                _: &LogicExpr,
                _: bool,
                _: Option<&crate::evaluator::Breakdown>,
            ) {
                panic!("disabled trace must never receive entries");
            }
        }

        let store = Arc::new(InMemoryEntityStore::new());
        store.set_component(EntityId::new("npc-1"), "core:actor", json!({ "type": "npc" }));
        let ctx = context_with(store);
        let actor = EntityId::new("npc-1");
        let trace = DisabledTrace;
        let env = ResolveEnv::new(&actor, &ctx, Some(&trace));

        resolve_filter(
            vec![ResolvedValue::Entity(EntityId::new("npc-1"))],
            &is_actor_logic(),
            &env,
        )
        .expect("filter");
    }

    #[test]
    fn test_enabled_trace_receives_breakdowns() {
        let store = Arc::new(InMemoryEntityStore::new());
        store.set_component(EntityId::new("npc-1"), "core:actor", json!({ "type": "npc" }));
        let ctx = context_with(store);
        let actor = EntityId::new("npc-1");
        let trace = CollectingTrace::new();
        let env = ResolveEnv::new(&actor, &ctx, Some(&trace));

        resolve_filter(
            vec![ResolvedValue::Entity(EntityId::new("npc-1"))],
            &is_actor_logic(),
            &env,
        )
        .expect("filter");

        let entries = trace.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].passed);
        let breakdown = entries[0].breakdown.as_ref().expect("breakdown");
        assert!(breakdown.result);
    }

    #[test]
    fn test_configuration_errors_propagate() {
        let ctx = context_with(Arc::new(InMemoryEntityStore::new()));
        let actor = EntityId::new("a");
        let env = ResolveEnv::new(&actor, &ctx, None);
        let logic = LogicExpr::from_json(&json!({ "condition_ref": "core:ghost" })).expect("parse");

        let err = resolve_filter(
            vec![ResolvedValue::Entity(EntityId::new("a"))],
            &logic,
            &env,
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }
}
