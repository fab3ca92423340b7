//! Boolean conditions gating collections, groups and sound instances.
//!
//! Conditions are a closed set of variants evaluated against an explicit
//! [`ConditionContext`]. Evaluation is pure: no interior mutability, safe to
//! call any number of times per resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A value a host publishes into the evaluation context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ContextValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            ContextValue::Int(v) => Some(*v as f64),
            ContextValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn truthy(&self) -> bool {
        match self {
            ContextValue::Bool(v) => *v,
            ContextValue::Int(v) => *v != 0,
            ContextValue::Float(v) => *v != 0.0,
            ContextValue::Text(v) => !v.is_empty(),
        }
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        ContextValue::Bool(v)
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        ContextValue::Int(v)
    }
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        ContextValue::Float(v)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        ContextValue::Text(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        ContextValue::Text(v)
    }
}

/// Key/value facts that conditions are evaluated against.
///
/// The default context is empty; objects can carry an override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionContext {
    values: BTreeMap<String, ContextValue>,
}

impl ConditionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl CompareOp {
    fn apply(self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
        }
    }
}

/// A composable predicate.
///
/// Missing context keys make `Flag`, `Equals` and `Compare` false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Constant { value: bool },
    /// Truthy value under `key`.
    Flag { key: String },
    Equals { key: String, value: ContextValue },
    /// Numeric comparison `context[key] op value`.
    Compare { key: String, op: CompareOp, value: f64 },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn flag(key: impl Into<String>) -> Self {
        Condition::Flag { key: key.into() }
    }

    pub fn equals(key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        Condition::Equals {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn compare(key: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Condition::Compare {
            key: key.into(),
            op,
            value,
        }
    }

    pub fn not(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    pub fn evaluate(&self, context: &ConditionContext) -> bool {
        match self {
            Condition::Constant { value } => *value,
            Condition::Flag { key } => context.get(key).is_some_and(ContextValue::truthy),
            Condition::Equals { key, value } => match (context.get(key), value) {
                (Some(actual), expected) if actual == expected => true,
                // 3 == 3.0
                (Some(actual), expected) => match (actual.as_f64(), expected.as_f64()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                },
                (None, _) => false,
            },
            Condition::Compare { key, op, value } => context
                .get(key)
                .and_then(ContextValue::as_f64)
                .is_some_and(|actual| op.apply(actual, *value)),
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(context)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.evaluate(context)),
            Condition::Not { condition } => !condition.evaluate(context),
        }
    }
}

/// Anything that may carry a condition. No condition means always active.
pub trait Conditional {
    fn condition(&self) -> Option<&Condition>;

    fn evaluate(&self, context: &ConditionContext) -> bool {
        self.condition().map_or(true, |c| c.evaluate(context))
    }
}
