use anyhow::{anyhow, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

use super::{Evaluator, ExpressionContext};
use crate::error::ExpressionError;

/// Runs expression scripts as jq filters over `{"job": …, "self": …}`.
///
/// Only the first output is used; a filter that yields nothing evaluates to
/// `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaqEvaluator;

impl Evaluator for JaqEvaluator {
    fn evaluate(&self, script: &str, ctx: &ExpressionContext<'_>) -> Result<Value, ExpressionError> {
        let input = ctx.to_value();
        let outputs = run_jaq(script, &input).map_err(|e| ExpressionError::Evaluate {
            script: script.to_string(),
            message: format!("{e:#}"),
        })?;
        let Some(first) = outputs.into_iter().next() else {
            return Ok(Value::Null);
        };
        serde_json::from_str::<Value>(&first).map_err(|e| ExpressionError::Evaluate {
            script: script.to_string(),
            message: e.to_string(),
        })
    }
}

pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<String>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let mut it = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    while let Some(item) = it.next() {
        let v = item.map_err(|e| anyhow!(format!("{e:?}")))?;
        out.push(format!("{v}"));
    }
    Ok(out)
}

fn format_parse_errors(
    errs: Vec<(load::File<&str, ()>, load::Error<&str>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`\n", file.code));
    }
    anyhow!(s)
}

fn format_undefined_errors(
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    anyhow!(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_job_and_self() {
        let job = json!({"threads": 4});
        let me = json!("reads");
        let ctx = ExpressionContext::new(&job, &me);
        assert_eq!(JaqEvaluator.evaluate(".job.threads", &ctx).unwrap(), json!(4));
        assert_eq!(JaqEvaluator.evaluate(".self + \".bam\"", &ctx).unwrap(), json!("reads.bam"));
    }

    #[test]
    fn empty_output_is_null() {
        let job = json!({});
        let ctx = ExpressionContext::new(&job, &Value::Null);
        assert_eq!(JaqEvaluator.evaluate("empty", &ctx).unwrap(), Value::Null);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let job = json!({});
        let ctx = ExpressionContext::new(&job, &Value::Null);
        assert!(JaqEvaluator.evaluate(".job.[", &ctx).is_err());
    }
}
