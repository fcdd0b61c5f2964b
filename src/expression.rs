//! `valueFrom` values and the expression evaluation capability.
//!
//! The core never interprets expressions itself. It hands the script and an
//! [`ExpressionContext`] to an [`Evaluator`]; [`jaq::JaqEvaluator`] is the one
//! shipped with the crate.
pub mod jaq;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExpressionError;

pub use jaq::JaqEvaluator;

/// Per-evaluation context. Never stored on a model.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionContext<'a> {
    pub job: &'a Value,
    pub self_: &'a Value,
}

impl<'a> ExpressionContext<'a> {
    pub fn new(job: &'a Value, self_: &'a Value) -> Self {
        Self { job, self_ }
    }

    /// The value scripts are run against: `{"job": …, "self": …}`.
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "job": self.job, "self": self.self_ })
    }
}

pub trait Evaluator {
    fn evaluate(&self, script: &str, ctx: &ExpressionContext<'_>) -> Result<Value, ExpressionError>;
}

/// A binding's `valueFrom`, a stream redirection or a string argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ValueFromDecl", into = "ValueFromDecl")]
pub enum ValueFrom {
    Literal(String),
    Expression(String),
}

impl ValueFrom {
    /// Classify a raw string: `$(…)` and `${…}` are expressions.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(inner) = trimmed.strip_prefix("$(").and_then(|s| s.strip_suffix(')')) {
            return ValueFrom::Expression(inner.trim().to_string());
        }
        if let Some(inner) = trimmed.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
            return ValueFrom::Expression(inner.trim().to_string());
        }
        ValueFrom::Literal(raw.to_string())
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, ValueFrom::Expression(_))
    }

    pub fn evaluate(&self, evaluator: &dyn Evaluator, ctx: &ExpressionContext<'_>) -> Result<Value, ExpressionError> {
        match self {
            ValueFrom::Literal(text) => Ok(Value::String(text.clone())),
            ValueFrom::Expression(script) => {
                tracing::trace!(script = %script, "evaluating expression");
                evaluator.evaluate(script, ctx)
            }
        }
    }
}

// wire shape: either a plain string or `{class: "Expression", script: "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ValueFromDecl {
    Text(String),
    Object {
        #[serde(default = "expression_class")]
        class: String,
        script: String,
    },
}

fn expression_class() -> String { "Expression".to_string() }

impl From<ValueFromDecl> for ValueFrom {
    fn from(decl: ValueFromDecl) -> Self {
        match decl {
            ValueFromDecl::Text(raw) => ValueFrom::parse(&raw),
            ValueFromDecl::Object { script, .. } => ValueFrom::Expression(script),
        }
    }
}

impl From<ValueFrom> for ValueFromDecl {
    fn from(value: ValueFrom) -> Self {
        match value {
            ValueFrom::Literal(text) => ValueFromDecl::Text(text),
            ValueFrom::Expression(script) => ValueFromDecl::Object { class: expression_class(), script },
        }
    }
}
