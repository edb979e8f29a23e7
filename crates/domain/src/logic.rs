//! Rule logic expression tree
//!
//! Filters and reusable condition fragments are authored in a JSON-logic
//! style surface (`{"and": [{"==": [{"var": "type"}, "actor"]}, ...]}`).
//! This module is the typed tree that surface compiles to, with a serde
//! codec for the object encoding and human-readable clause descriptions
//! used by trace breakdowns.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::DomainError;
use crate::ids::ConditionId;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Ne),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One node of a rule logic expression
#[derive(Debug, Clone, PartialEq)]
pub enum LogicExpr {
    /// A literal JSON value
    Literal(Value),

    /// Variable lookup by dot path, with an optional default
    Var {
        path: String,
        default: Option<Value>,
    },

    And(Vec<LogicExpr>),
    Or(Vec<LogicExpr>),
    Not(Box<LogicExpr>),

    Compare {
        op: CompareOp,
        left: Box<LogicExpr>,
        right: Box<LogicExpr>,
    },

    /// Membership: string containment or array membership
    In {
        needle: Box<LogicExpr>,
        haystack: Box<LogicExpr>,
    },

    /// Named reusable rule fragment, expanded in place by the evaluator
    ConditionRef(ConditionId),

    /// Registered custom operator (anatomy/clothing/positioning predicates)
    Custom {
        operator: String,
        args: Vec<LogicExpr>,
    },
}

impl LogicExpr {
    /// Parse the JSON-logic object encoding
    pub fn from_json(value: &Value) -> Result<Self, DomainError> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => return Ok(LogicExpr::Literal(other.clone())),
        };
        if obj.len() != 1 {
            // Plain objects (including {}) are literals; operators are
            // single-key objects.
            return Ok(LogicExpr::Literal(value.clone()));
        }
        let (key, arg) = obj
            .iter()
            .next()
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| DomainError::parse("empty logic object"))?;

        if let Some(op) = CompareOp::from_symbol(key) {
            let (left, right) = Self::binary_args(key, arg)?;
            return Ok(LogicExpr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        match key {
            "and" | "or" => {
                let clauses = Self::list_args(key, arg)?;
                if clauses.is_empty() {
                    return Err(DomainError::parse(format!(
                        "\"{}\" requires at least one clause",
                        key
                    )));
                }
                Ok(if key == "and" {
                    LogicExpr::And(clauses)
                } else {
                    LogicExpr::Or(clauses)
                })
            }
            "not" | "!" => {
                let inner = match arg {
                    Value::Array(items) if items.len() == 1 => Self::from_json(&items[0])?,
                    other => Self::from_json(other)?,
                };
                Ok(LogicExpr::Not(Box::new(inner)))
            }
            "in" => {
                let (needle, haystack) = Self::binary_args(key, arg)?;
                Ok(LogicExpr::In {
                    needle: Box::new(needle),
                    haystack: Box::new(haystack),
                })
            }
            "var" => match arg {
                Value::String(path) => Ok(LogicExpr::Var {
                    path: path.clone(),
                    default: None,
                }),
                Value::Array(items) => {
                    let path = items
                        .first()
                        .and_then(Value::as_str)
                        .ok_or_else(|| DomainError::parse("\"var\" requires a string path"))?;
                    Ok(LogicExpr::Var {
                        path: path.to_string(),
                        default: items.get(1).cloned(),
                    })
                }
                _ => Err(DomainError::parse("\"var\" requires a string path")),
            },
            "condition_ref" => match arg {
                Value::String(id) => Ok(LogicExpr::ConditionRef(ConditionId::new(id.clone()))),
                _ => Err(DomainError::parse(
                    "\"condition_ref\" requires a condition id string",
                )),
            },
            operator => {
                let args = match arg {
                    Value::Array(items) => items
                        .iter()
                        .map(Self::from_json)
                        .collect::<Result<Vec<_>, _>>()?,
                    single => vec![Self::from_json(single)?],
                };
                Ok(LogicExpr::Custom {
                    operator: operator.to_string(),
                    args,
                })
            }
        }
    }

    /// Emit the JSON-logic object encoding
    pub fn to_json(&self) -> Value {
        match self {
            LogicExpr::Literal(v) => v.clone(),
            LogicExpr::Var { path, default } => match default {
                Some(d) => json!({ "var": [path, d] }),
                None => json!({ "var": path }),
            },
            LogicExpr::And(clauses) => {
                json!({ "and": clauses.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            LogicExpr::Or(clauses) => {
                json!({ "or": clauses.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            LogicExpr::Not(inner) => json!({ "not": inner.to_json() }),
            LogicExpr::Compare { op, left, right } => {
                let mut obj = Map::new();
                obj.insert(
                    op.symbol().to_string(),
                    Value::Array(vec![left.to_json(), right.to_json()]),
                );
                Value::Object(obj)
            }
            LogicExpr::In { needle, haystack } => {
                json!({ "in": [needle.to_json(), haystack.to_json()] })
            }
            LogicExpr::ConditionRef(id) => json!({ "condition_ref": id.as_str() }),
            LogicExpr::Custom { operator, args } => {
                let mut obj = Map::new();
                obj.insert(
                    operator.clone(),
                    Value::Array(args.iter().map(Self::to_json).collect()),
                );
                Value::Object(obj)
            }
        }
    }

    /// Human-readable clause text for trace breakdowns
    pub fn describe(&self) -> String {
        match self {
            LogicExpr::Literal(v) => v.to_string(),
            LogicExpr::Var { path, .. } => format!("var(\"{}\")", path),
            LogicExpr::And(clauses) => format!("all of {} clauses", clauses.len()),
            LogicExpr::Or(clauses) => format!("any of {} clauses", clauses.len()),
            LogicExpr::Not(inner) => format!("not ({})", inner.describe()),
            LogicExpr::Compare { op, left, right } => {
                format!("{} {} {}", left.describe(), op.symbol(), right.describe())
            }
            LogicExpr::In { needle, haystack } => {
                format!("{} in {}", needle.describe(), haystack.describe())
            }
            LogicExpr::ConditionRef(id) => format!("condition_ref(\"{}\")", id),
            LogicExpr::Custom { operator, args } => {
                let rendered: Vec<String> = args.iter().map(Self::describe).collect();
                format!("{}({})", operator, rendered.join(", "))
            }
        }
    }

    fn binary_args(key: &str, arg: &Value) -> Result<(LogicExpr, LogicExpr), DomainError> {
        let items = arg.as_array().ok_or_else(|| {
            DomainError::parse(format!("\"{}\" requires an argument array", key))
        })?;
        if items.len() != 2 {
            return Err(DomainError::parse(format!(
                "\"{}\" requires exactly two arguments, got {}",
                key,
                items.len()
            )));
        }
        Ok((Self::from_json(&items[0])?, Self::from_json(&items[1])?))
    }

    fn list_args(key: &str, arg: &Value) -> Result<Vec<LogicExpr>, DomainError> {
        let items = arg.as_array().ok_or_else(|| {
            DomainError::parse(format!("\"{}\" requires an argument array", key))
        })?;
        items.iter().map(Self::from_json).collect()
    }
}

impl Serialize for LogicExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LogicExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        LogicExpr::from_json(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario_filter() {
        let expr = LogicExpr::from_json(&json!({
            "and": [
                { "==": [{ "var": "type" }, "actor"] },
                { ">": [{ "var": "level" }, 5] }
            ]
        }))
        .expect("parse");

        let LogicExpr::And(clauses) = &expr else {
            panic!("expected and node");
        };
        assert_eq!(clauses.len(), 2);
        assert!(matches!(
            clauses[0],
            LogicExpr::Compare {
                op: CompareOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_var_with_default() {
        let expr = LogicExpr::from_json(&json!({ "var": ["level", 1] })).expect("parse");
        assert_eq!(
            expr,
            LogicExpr::Var {
                path: "level".to_string(),
                default: Some(json!(1)),
            }
        );
    }

    #[test]
    fn test_parse_condition_ref() {
        let expr = LogicExpr::from_json(&json!({
            "condition_ref": "positioning:both-actors-facing-each-other"
        }))
        .expect("parse");
        assert_eq!(
            expr,
            LogicExpr::ConditionRef(ConditionId::new(
                "positioning:both-actors-facing-each-other"
            ))
        );
    }

    #[test]
    fn test_unknown_single_key_object_is_custom_operator() {
        let expr =
            LogicExpr::from_json(&json!({ "hasPartOfType": ["actor", "leg"] })).expect("parse");
        assert_eq!(
            expr,
            LogicExpr::Custom {
                operator: "hasPartOfType".to_string(),
                args: vec![
                    LogicExpr::Literal(json!("actor")),
                    LogicExpr::Literal(json!("leg")),
                ],
            }
        );
    }

    #[test]
    fn test_scalars_and_plain_objects_are_literals() {
        assert_eq!(
            LogicExpr::from_json(&json!(true)).expect("parse"),
            LogicExpr::Literal(json!(true))
        );
        // Two keys: data, not an operator
        let doc = json!({ "a": 1, "b": 2 });
        assert_eq!(
            LogicExpr::from_json(&doc).expect("parse"),
            LogicExpr::Literal(doc)
        );
    }

    #[test]
    fn test_binary_arity_is_enforced() {
        let err = LogicExpr::from_json(&json!({ "==": [1] })).unwrap_err();
        assert!(err.to_string().contains("exactly two arguments"));
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = json!({
            "or": [
                { "in": [{ "var": "entity.id" }, { "var": "actor.components.positioning:closeness.partners" }] },
                { "condition_ref": "core:always" }
            ]
        });
        let expr = LogicExpr::from_json(&doc).expect("parse");
        assert_eq!(expr.to_json(), doc);
    }

    #[test]
    fn test_describe_comparison() {
        let expr = LogicExpr::from_json(&json!({ "==": [{ "var": "type" }, "actor"] }))
            .expect("parse");
        assert_eq!(expr.describe(), "var(\"type\") == \"actor\"");
    }

    #[test]
    fn test_serde_through_derive_containers() {
        #[derive(Deserialize)]
        struct Holder {
            logic: LogicExpr,
        }
        let holder: Holder = serde_json::from_value(json!({
            "logic": { "not": { "var": "hidden" } }
        }))
        .expect("deserialize");
        assert!(matches!(holder.logic, LogicExpr::Not(_)));
    }
}
