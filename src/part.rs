// Command-line parts: one token per parameter, ordered before joining.

use serde::Serialize;
use serde_json::Value;

use crate::expression::{Evaluator, ExpressionContext};

/// Everything a synthesis call needs besides the model itself.
#[derive(Clone, Copy)]
pub struct SynthesisContext<'a> {
    pub job: &'a Value,
    pub evaluator: &'a dyn Evaluator,
}

impl<'a> SynthesisContext<'a> {
    pub fn new(job: &'a Value, evaluator: &'a dyn Evaluator) -> Self {
        Self { job, evaluator }
    }

    pub fn expression<'b>(&self, self_: &'b Value) -> ExpressionContext<'b>
    where
        'a: 'b,
    {
        ExpressionContext::new(self.job, self_)
    }
}

/// Ordering key of a part. Derived `Ord` compares `position` first, then the
/// declaration index; indices are unique per tool so no two parts tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SortingKey {
    pub position: i64,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Input,
    Argument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLinePart {
    pub value: String,
    pub sorting_key: SortingKey,
    pub origin: Origin,
}

impl CommandLinePart {
    pub fn new(value: impl Into<String>, sorting_key: SortingKey, origin: Origin) -> Self {
        Self { value: value.into(), sorting_key, origin }
    }

    pub fn is_empty(&self) -> bool { self.value.is_empty() }
}

/// Stable sort by `(position, index)`.
pub fn sort_parts(parts: &mut [CommandLinePart]) {
    parts.sort_by_key(|p| p.sorting_key);
}

/// `prefix + separator + payload`, or the bare prefix when there is no payload.
pub(crate) fn prefixed(prefix: &str, separator: &str, payload: &str) -> String {
    if payload.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}{separator}{payload}")
    }
}

/// Text a runtime value contributes to the command line.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(xs) => xs.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Object(map) => match map.get("path").and_then(Value::as_str) {
            Some(path) => path.to_string(),
            None => value.to_string(),
        },
    }
}
