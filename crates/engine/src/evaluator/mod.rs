//! Rule evaluator
//!
//! Interprets a [`LogicExpr`] tree against a variable document. Built-in
//! operators (logical, comparison, membership, variable lookup) are handled
//! here; named condition fragments expand in place with cycle detection, and
//! custom operators dispatch through the [`OperatorRegistry`].

mod operators;

pub use operators::{CustomOperator, OperatorRegistry};

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::error;

use storyforge_domain::{CompareOp, ConditionId, LogicExpr};

use crate::error::ScopeError;
use crate::ports::EntityStore;

/// Evaluation environment for one candidate
///
/// `vars` is the variable document built by the caller (filter resolver,
/// tests, tooling); `store` lets custom operators read components.
pub struct EvalContext<'a> {
    pub vars: &'a Value,
    pub store: &'a dyn EntityStore,
}

/// Recursive clause-by-clause result of a filter evaluation
///
/// Mirrors the rule tree: each node reports its own boolean outcome and a
/// human-readable description, so a trace shows exactly why a candidate
/// passed or failed. Computed only when tracing is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub description: String,
    pub result: bool,
    pub children: Vec<Breakdown>,
}

/// Named reusable rule fragments, resolved by `condition_ref`
#[derive(Default)]
pub struct ConditionRegistry {
    fragments: HashMap<ConditionId, LogicExpr>,
}

impl ConditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment under an id, replacing any previous definition
    pub fn register(&mut self, id: impl Into<ConditionId>, fragment: LogicExpr) {
        self.fragments.insert(id.into(), fragment);
    }

    pub fn get(&self, id: &ConditionId) -> Option<&LogicExpr> {
        self.fragments.get(id)
    }

    pub fn contains(&self, id: &ConditionId) -> bool {
        self.fragments.contains_key(id)
    }
}

/// Evaluates rule logic over a variable context
#[derive(Default)]
pub struct RuleEvaluator {
    operators: OperatorRegistry,
    conditions: ConditionRegistry,
}

impl RuleEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registries(operators: OperatorRegistry, conditions: ConditionRegistry) -> Self {
        Self {
            operators,
            conditions,
        }
    }

    /// Register a custom operator by name
    pub fn register_operator<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&EvalContext<'_>, &[Value]) -> Result<Value, ScopeError> + Send + Sync + 'static,
    {
        self.operators.register(name, handler);
    }

    /// Register a named condition fragment
    pub fn register_condition(&mut self, id: impl Into<ConditionId>, fragment: LogicExpr) {
        self.conditions.register(id, fragment);
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    /// Evaluate an expression to a value
    pub fn evaluate(&self, expr: &LogicExpr, ctx: &EvalContext<'_>) -> Result<Value, ScopeError> {
        self.eval(expr, ctx, &mut Vec::new())
    }

    /// Evaluate an expression to a boolean via truthiness
    pub fn evaluate_bool(
        &self,
        expr: &LogicExpr,
        ctx: &EvalContext<'_>,
    ) -> Result<bool, ScopeError> {
        Ok(truthy(&self.evaluate(expr, ctx)?))
    }

    /// Evaluate with a clause-by-clause breakdown for tracing
    pub fn explain(
        &self,
        expr: &LogicExpr,
        ctx: &EvalContext<'_>,
    ) -> Result<Breakdown, ScopeError> {
        self.explain_inner(expr, ctx, &mut Vec::new())
    }

    fn eval(
        &self,
        expr: &LogicExpr,
        ctx: &EvalContext<'_>,
        active_refs: &mut Vec<ConditionId>,
    ) -> Result<Value, ScopeError> {
        match expr {
            LogicExpr::Literal(v) => Ok(v.clone()),

            LogicExpr::Var { path, default } => {
                Ok(lookup_var(ctx.vars, path)
                    .or_else(|| default.clone())
                    .unwrap_or(Value::Null))
            }

            LogicExpr::And(clauses) => {
                for clause in clauses {
                    if !truthy(&self.eval(clause, ctx, active_refs)?) {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }

            LogicExpr::Or(clauses) => {
                for clause in clauses {
                    if truthy(&self.eval(clause, ctx, active_refs)?) {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }

            LogicExpr::Not(inner) => Ok(Value::Bool(!truthy(&self.eval(inner, ctx, active_refs)?))),

            LogicExpr::Compare { op, left, right } => {
                let left = self.eval(left, ctx, active_refs)?;
                let right = self.eval(right, ctx, active_refs)?;
                Ok(Value::Bool(compare(*op, &left, &right)))
            }

            LogicExpr::In { needle, haystack } => {
                let needle = self.eval(needle, ctx, active_refs)?;
                let haystack = self.eval(haystack, ctx, active_refs)?;
                Ok(Value::Bool(membership(&needle, &haystack)))
            }

            LogicExpr::ConditionRef(id) => {
                let fragment = self.enter_condition(id, active_refs)?;
                let result = self.eval(&fragment, ctx, active_refs);
                active_refs.pop();
                result
            }

            LogicExpr::Custom { operator, args } => {
                let handler = self.operators.get(operator).ok_or_else(|| {
                    let err = ScopeError::configuration(format!(
                        "unregistered custom operator \"{}\"",
                        operator
                    ));
                    error!(operator = %operator, "Rule references an unregistered custom operator");
                    err
                })?;
                let evaluated: Vec<Value> = args
                    .iter()
                    .map(|arg| self.eval(arg, ctx, active_refs))
                    .collect::<Result<_, _>>()?;
                handler(ctx, &evaluated)
            }
        }
    }

    fn explain_inner(
        &self,
        expr: &LogicExpr,
        ctx: &EvalContext<'_>,
        active_refs: &mut Vec<ConditionId>,
    ) -> Result<Breakdown, ScopeError> {
        match expr {
            LogicExpr::And(clauses) | LogicExpr::Or(clauses) => {
                let children: Vec<Breakdown> = clauses
                    .iter()
                    .map(|clause| self.explain_inner(clause, ctx, active_refs))
                    .collect::<Result<_, _>>()?;
                let result = match expr {
                    LogicExpr::And(_) => children.iter().all(|c| c.result),
                    _ => children.iter().any(|c| c.result),
                };
                Ok(Breakdown {
                    description: expr.describe(),
                    result,
                    children,
                })
            }

            LogicExpr::Not(inner) => {
                let child = self.explain_inner(inner, ctx, active_refs)?;
                Ok(Breakdown {
                    description: expr.describe(),
                    result: !child.result,
                    children: vec![child],
                })
            }

            LogicExpr::ConditionRef(id) => {
                let fragment = self.enter_condition(id, active_refs)?;
                let child = self.explain_inner(&fragment, ctx, active_refs);
                active_refs.pop();
                let child = child?;
                Ok(Breakdown {
                    description: expr.describe(),
                    result: child.result,
                    children: vec![child],
                })
            }

            leaf => {
                let result = truthy(&self.eval(leaf, ctx, active_refs)?);
                Ok(Breakdown {
                    description: leaf.describe(),
                    result,
                    children: Vec::new(),
                })
            }
        }
    }

    /// Resolve a condition reference and push it on the expansion stack,
    /// rejecting direct and transitive cycles
    fn enter_condition(
        &self,
        id: &ConditionId,
        active_refs: &mut Vec<ConditionId>,
    ) -> Result<LogicExpr, ScopeError> {
        if active_refs.contains(id) {
            let chain: Vec<&str> = active_refs.iter().map(ConditionId::as_str).collect();
            let err = ScopeError::configuration(format!(
                "condition_ref cycle: {} -> {}",
                chain.join(" -> "),
                id
            ));
            error!(condition = %id, "Self-referential condition fragment");
            return Err(err);
        }
        let fragment = self.conditions.get(id).cloned().ok_or_else(|| {
            let err =
                ScopeError::configuration(format!("unknown condition reference \"{}\"", id));
            error!(condition = %id, "Rule references an unknown condition");
            err
        })?;
        active_refs.push(id.clone());
        Ok(fragment)
    }
}

/// JSON-logic truthiness: null, false, 0, "", and [] are falsy
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Dot-path lookup into the variable document; empty path is the whole doc
pub fn lookup_var(vars: &Value, path: &str) -> Option<Value> {
    if path.is_empty() {
        return Some(vars.clone());
    }
    let mut current = vars;
    for segment in path.split('.') {
        current = match current {
            Value::Object(obj) => obj.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Loose equality: numeric comparison when both sides coerce to numbers,
/// structural equality otherwise
fn loose_eq(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    match (as_number(left), as_number(right)) {
        (Some(l), Some(r)) => {
            // Strings that both parse numerically already failed structural
            // equality above; only coerce across types.
            if left.is_string() && right.is_string() {
                false
            } else {
                l == r
            }
        }
        _ => false,
    }
}

/// Compare two values; incomparable operands order as false
fn compare(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::Eq => loose_eq(left, right),
        CompareOp::Ne => !loose_eq(left, right),
        ordering => {
            let cmp = match (as_number(left), as_number(right)) {
                (Some(l), Some(r)) => l.partial_cmp(&r),
                _ => match (left.as_str(), right.as_str()) {
                    (Some(l), Some(r)) => Some(l.cmp(r)),
                    _ => None,
                },
            };
            let Some(cmp) = cmp else {
                return false;
            };
            match ordering {
                CompareOp::Lt => cmp.is_lt(),
                CompareOp::Le => cmp.is_le(),
                CompareOp::Gt => cmp.is_gt(),
                CompareOp::Ge => cmp.is_ge(),
                CompareOp::Eq | CompareOp::Ne => unreachable!("handled above"),
            }
        }
    }
}

/// Membership: substring for string haystacks, element for arrays
fn membership(needle: &Value, haystack: &Value) -> bool {
    match haystack {
        Value::String(s) => needle.as_str().is_some_and(|n| s.contains(n)),
        Value::Array(items) => items.iter().any(|item| loose_eq(item, needle)),
        _ => false,
    }
}
