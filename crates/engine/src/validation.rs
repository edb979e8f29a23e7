//! Parameter validation for public entry points
//!
//! Pure checks, no side effects, and always the first call of every public
//! entry point: malformed inputs fail here before any component-store
//! access. Runtime-context capabilities are validated once, at construction
//! time, by [`crate::engine::RuntimeContextBuilder`].

use storyforge_domain::{EntityId, ScopeNode};

use crate::error::ScopeError;

/// Scope expressions deeper than this are rejected as authoring errors
/// before traversal; legitimate content stays well below it.
pub const MAX_SCOPE_DEPTH: usize = 12;

/// Validate a scope AST before traversal
pub fn validate_ast(node: &ScopeNode, source: &str) -> Result<(), ScopeError> {
    let depth = node.depth();
    if depth > MAX_SCOPE_DEPTH {
        return Err(ScopeError::parameter_validation(
            source,
            format!("a scope expression of depth <= {}", MAX_SCOPE_DEPTH),
            format!("depth {}", depth),
        )
        .with_hint("split the scope into named sub-scopes"));
    }
    validate_node(node, source)
}

fn validate_node(node: &ScopeNode, source: &str) -> Result<(), ScopeError> {
    match node {
        ScopeNode::Actor | ScopeNode::Location => Ok(()),
        ScopeNode::Entities { component } => {
            if component.trim().is_empty() {
                return Err(ScopeError::parameter_validation(
                    source,
                    "a component type id in entities(...)",
                    "an empty string",
                ));
            }
            Ok(())
        }
        ScopeNode::Property { parent, field } => {
            if field.trim().is_empty() {
                return Err(ScopeError::parameter_validation(
                    source,
                    "a field name in a property step",
                    "an empty string",
                ));
            }
            validate_node(parent, source)
        }
        ScopeNode::Iteration { parent } => validate_node(parent, source),
        ScopeNode::Filter { parent, .. } => validate_node(parent, source),
        ScopeNode::ClothingStep { parent, .. } => validate_node(parent, source),
        ScopeNode::Union { left, right } => {
            validate_node(left, source)?;
            validate_node(right, source)
        }
    }
}

/// Validate the acting entity reference
pub fn validate_actor(actor: &EntityId, source: &str) -> Result<(), ScopeError> {
    if actor.is_empty() {
        return Err(ScopeError::parameter_validation(
            source,
            "a non-empty actor entity id",
            "an empty id",
        ));
    }
    // A brace-prefixed id is almost always a serialized object passed where
    // an id belongs.
    if actor.as_str().trim_start().starts_with('{') {
        return Err(ScopeError::parameter_validation(
            source,
            "an actor entity id",
            format!("\"{}\"", actor),
        )
        .with_hint(
            "this looks like a serialized context object; pass the actor's entity id instead",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use storyforge_domain::LogicExpr;

    #[test]
    fn test_valid_actor_passes() {
        assert!(validate_actor(&EntityId::new("actor-1"), "test").is_ok());
    }

    #[test]
    fn test_empty_actor_fails() {
        let err = validate_actor(&EntityId::new("   "), "test").unwrap_err();
        assert!(matches!(err, ScopeError::ParameterValidation { .. }));
    }

    #[test]
    fn test_context_like_actor_gets_hint() {
        let err =
            validate_actor(&EntityId::new("{\"actor\":{\"id\":\"a\"}}"), "test").unwrap_err();
        let ScopeError::ParameterValidation { hint, .. } = err else {
            panic!("expected parameter validation");
        };
        assert!(hint.expect("hint").contains("context object"));
    }

    #[test]
    fn test_empty_component_name_fails() {
        let node = ScopeNode::Entities {
            component: "".to_string(),
        };
        assert!(validate_ast(&node, "test").is_err());
    }

    #[test]
    fn test_empty_property_field_fails() {
        let node = ScopeNode::Property {
            parent: Box::new(ScopeNode::Actor),
            field: " ".to_string(),
        };
        assert!(validate_ast(&node, "test").is_err());
    }

    #[test]
    fn test_excessive_depth_fails() {
        let mut node = ScopeNode::Actor;
        for _ in 0..MAX_SCOPE_DEPTH {
            node = ScopeNode::Iteration {
                parent: Box::new(node),
            };
        }
        let err = validate_ast(&node, "test").unwrap_err();
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn test_union_arms_both_validated() {
        let node = ScopeNode::Union {
            left: Box::new(ScopeNode::Actor),
            right: Box::new(ScopeNode::Filter {
                parent: Box::new(ScopeNode::Entities {
                    component: "".to_string(),
                }),
                logic: LogicExpr::Literal(Value::Bool(true)),
            }),
        };
        assert!(validate_ast(&node, "test").is_err());
    }
}
