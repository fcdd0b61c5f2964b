//! Entries of a tool's `arguments` list.
//!
//! An argument is either a bare string (literal or expression) or a full
//! binding whose `valueFrom` produces the value. Arguments are always placed
//! on the command line; there is no inclusion gate.

use serde::Deserialize;
use serde_json::Value;

use crate::binding::{BindingRule, ItemSeparator};
use crate::error::{ModelError, Result};
use crate::expression::{Evaluator, ExpressionContext, ValueFrom};
use crate::part::{prefixed, value_text, CommandLinePart, Origin, SortingKey, SynthesisContext};
use crate::validation::Validation;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArgumentDecl {
    Text(ValueFrom),
    Binding(BindingRule),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentKind {
    Text(ValueFrom),
    Binding(BindingRule),
}

#[derive(Debug, Clone)]
pub struct ArgumentModel {
    kind: ArgumentKind,
    loc: String,
    validation: Validation,
}

impl ArgumentModel {
    pub fn from_value(loc: impl Into<String>, decl: &Value) -> Result<Self> {
        let loc = loc.into();
        let kind = match crate::path_de::from_value_with_path::<ArgumentDecl>(decl) {
            Ok(ArgumentDecl::Text(value_from)) => ArgumentKind::Text(value_from),
            Ok(ArgumentDecl::Binding(binding)) => ArgumentKind::Binding(binding),
            Err(message) => return Err(ModelError::InvalidDeclaration { loc, message }),
        };
        Ok(Self { kind, loc, validation: Validation::new() })
    }

    pub fn kind(&self) -> &ArgumentKind { &self.kind }
    pub fn loc(&self) -> &str { &self.loc }
    pub fn validation(&self) -> &Validation { &self.validation }

    pub fn position(&self) -> i64 {
        match &self.kind {
            ArgumentKind::Text(_) => 0,
            ArgumentKind::Binding(binding) => binding.position(),
        }
    }

    pub fn command_part(&self, cx: &SynthesisContext<'_>, index: usize) -> Result<CommandLinePart> {
        let key = SortingKey { position: self.position(), index };
        let text = match &self.kind {
            ArgumentKind::Text(value_from) => {
                let out = value_from.evaluate(cx.evaluator, &cx.expression(&Value::Null))?;
                value_text(&out)
            }
            ArgumentKind::Binding(binding) => {
                let out = match &binding.value_from {
                    Some(value_from) => value_from.evaluate(cx.evaluator, &cx.expression(&Value::Null))?,
                    None => Value::Null,
                };
                render(binding, &out)
            }
        };
        Ok(CommandLinePart::new(text, key, Origin::Argument))
    }

    pub fn validate(&mut self, evaluator: &dyn Evaluator, job: &Value) -> Result<&Validation> {
        self.validate_fresh(evaluator, job)?;
        Ok(&self.validation)
    }

    pub(crate) fn validate_fresh(&mut self, evaluator: &dyn Evaluator, job: &Value) -> Result<Validation> {
        let mut val = Validation::new();
        let ctx = ExpressionContext::new(job, &Value::Null);
        match &self.kind {
            ArgumentKind::Text(value_from) => {
                value_from.evaluate(evaluator, &ctx)?;
            }
            ArgumentKind::Binding(binding) => {
                val.merge(binding.validate(&self.loc));
                match &binding.value_from {
                    None => val.warning(format!("{}.valueFrom", self.loc), "Argument binding has no valueFrom"),
                    Some(ValueFrom::Expression(script)) if script.trim().is_empty() => {}
                    Some(value_from) => {
                        value_from.evaluate(evaluator, &ctx)?;
                    }
                }
            }
        }
        self.validation.merge(val.clone());
        Ok(val)
    }
}

fn render(binding: &BindingRule, value: &Value) -> String {
    let prefix = binding.prefix();
    let separator = binding.separator();
    match value {
        Value::Bool(true) => prefix.to_string(),
        Value::Bool(false) => String::new(),
        Value::Array(xs) => {
            let texts: Vec<String> = xs.iter().map(value_text).collect();
            match binding.item_separator.effective() {
                ItemSeparator::Text(sep) => prefixed(prefix, separator, &texts.join(sep)),
                ItemSeparator::Null => texts.iter()
                    .map(|t| prefixed(prefix, separator, t))
                    .collect::<Vec<_>>()
                    .join(" "),
                ItemSeparator::Absent => prefixed(prefix, separator, &texts.join(" ")),
            }
        }
        other => prefixed(prefix, separator, &value_text(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::JaqEvaluator;
    use serde_json::json;

    fn arg(decl: Value) -> ArgumentModel { ArgumentModel::from_value("arguments[0]", &decl).unwrap() }

    fn text(a: &ArgumentModel, job: Value) -> String {
        let cx = SynthesisContext::new(&job, &JaqEvaluator);
        a.command_part(&cx, 3).unwrap().value
    }

    #[test]
    fn plain_and_expression_strings() {
        assert_eq!(text(&arg(json!("--verbose")), json!({})), "--verbose");
        assert_eq!(text(&arg(json!("$(.job.threads)")), json!({"threads": 8})), "8");
    }

    #[test]
    fn binding_with_prefix_and_position() {
        let a = arg(json!({"prefix": "-t", "valueFrom": "$(.job.threads)", "position": 2}));
        assert_eq!(a.position(), 2);
        assert_eq!(text(&a, json!({"threads": 4})), "-t 4");

        let cx_job = json!({});
        let cx = SynthesisContext::new(&cx_job, &JaqEvaluator);
        let part = a.command_part(&cx, 5).unwrap();
        assert_eq!(part.sorting_key, SortingKey { position: 2, index: 5 });
        assert_eq!(part.origin, Origin::Argument);
    }

    #[test]
    fn array_results_follow_item_separator() {
        let a = arg(json!({"prefix": "-x", "itemSeparator": null, "valueFrom": "$(.job.xs)"}));
        assert_eq!(text(&a, json!({"xs": ["a", "b"]})), "-x a -x b");
        let a = arg(json!({"prefix": "-x", "itemSeparator": ";", "valueFrom": "$(.job.xs)"}));
        assert_eq!(text(&a, json!({"xs": ["a", "b"]})), "-x a;b");
    }

    #[test]
    fn boolean_results_are_flags() {
        let a = arg(json!({"prefix": "--force", "valueFrom": "$(.job.force)"}));
        assert_eq!(text(&a, json!({"force": true})), "--force");
        assert_eq!(text(&a, json!({"force": false})), "");
    }

    #[test]
    fn missing_value_from_is_a_warning() {
        let mut a = arg(json!({"prefix": "-q"}));
        let report = a.validate(&JaqEvaluator, &json!({})).unwrap();
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings[0].loc, "arguments[0].valueFrom");
        assert_eq!(text(&a, json!({})), "-q");
    }

    #[test]
    fn rejects_non_string_non_object() {
        assert!(matches!(
            ArgumentModel::from_value("arguments[1]", &json!(7)),
            Err(ModelError::InvalidDeclaration { .. })
        ));
    }
}
