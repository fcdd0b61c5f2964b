//! The tool aggregate: parameters, arguments and base command in, one
//! ordered command line out.

use std::collections::{BTreeSet, HashSet};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::argument::ArgumentModel;
use crate::error::{ModelError, Result};
use crate::exit_codes::ExitCodes;
use crate::expression::{Evaluator, ValueFrom};
use crate::parameter::ParameterModel;
use crate::part::{sort_parts, CommandLinePart, Origin, SynthesisContext};
use crate::validation::{Validation, ValidationPolicy};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BaseCommandDecl {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolDecl {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    doc: Option<Value>,
    #[serde(default)]
    cwl_version: Option<String>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    inputs: Option<Value>,
    #[serde(default)]
    outputs: Option<Value>,
    #[serde(default)]
    base_command: Option<BaseCommandDecl>,
    #[serde(default)]
    arguments: Vec<Value>,
    #[serde(default)]
    requirements: Option<Value>,
    #[serde(default)]
    hints: Option<Value>,
    #[serde(default)]
    stdin: Option<ValueFrom>,
    #[serde(default)]
    stdout: Option<ValueFrom>,
    #[serde(default)]
    stderr: Option<ValueFrom>,
    #[serde(default)]
    success_codes: BTreeSet<i32>,
    #[serde(default)]
    temporary_fail_codes: BTreeSet<i32>,
    #[serde(default)]
    permanent_fail_codes: BTreeSet<i32>,
}

#[derive(Debug, Clone)]
pub struct CommandLineTool {
    pub id: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub cwl_version: Option<String>,
    pub class: String,

    inputs: Vec<ParameterModel>,
    arguments: Vec<ArgumentModel>,
    base_command: Vec<String>,

    /// passed through untouched
    pub outputs: Option<Value>,
    pub requirements: Option<Value>,
    pub hints: Option<Value>,

    pub stdin: Option<ValueFrom>,
    pub stdout: Option<ValueFrom>,
    pub stderr: Option<ValueFrom>,
    pub exit_codes: ExitCodes,

    validation: Validation,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineTool {
    pub fn from_value(doc: &Value) -> Result<Self> {
        let decl: ToolDecl = crate::path_de::from_value_with_path(doc)
            .map_err(|message| ModelError::InvalidDeclaration { loc: "$".to_string(), message })?;

        let inputs = input_list(decl.inputs)?
            .iter()
            .enumerate()
            .map(|(i, input)| ParameterModel::from_value(format!("inputs[{i}]"), input))
            .collect::<Result<Vec<_>>>()?;

        let arguments = decl.arguments
            .iter()
            .enumerate()
            .map(|(i, arg)| ArgumentModel::from_value(format!("arguments[{i}]"), arg))
            .collect::<Result<Vec<_>>>()?;

        let base_command = match decl.base_command {
            None => Vec::new(),
            Some(BaseCommandDecl::One(cmd)) => vec![cmd],
            Some(BaseCommandDecl::Many(cmds)) => cmds,
        };

        debug!(inputs = inputs.len(), arguments = arguments.len(), "loaded tool");

        Ok(CommandLineTool {
            id: decl.id,
            label: decl.label,
            description: decl.description.or_else(|| decl.doc.as_ref().and_then(crate::parameter::doc_text)),
            cwl_version: decl.cwl_version,
            class: decl.class.unwrap_or_else(|| "CommandLineTool".to_string()),
            inputs,
            arguments,
            base_command,
            outputs: decl.outputs,
            requirements: decl.requirements,
            hints: decl.hints,
            stdin: decl.stdin,
            stdout: decl.stdout,
            stderr: decl.stderr,
            exit_codes: ExitCodes {
                success: decl.success_codes,
                temporary_fail: decl.temporary_fail_codes,
                permanent_fail: decl.permanent_fail_codes,
            },
            validation: Validation::new(),
        })
    }
}

/// Inputs come as a list, or as a map keyed by id whose values are either
/// full declarations or bare type declarations.
fn input_list(raw: Option<Value>) -> Result<Vec<Value>> {
    match raw {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(xs)) => Ok(xs),
        Some(Value::Object(map)) => Ok(map.into_iter().map(|(id, decl)| {
            let mut obj = match decl {
                Value::Object(obj) => obj,
                type_decl => {
                    let mut obj = Map::new();
                    obj.insert("type".to_string(), type_decl);
                    obj
                }
            };
            obj.insert("id".to_string(), Value::String(id));
            Value::Object(obj)
        }).collect()),
        Some(other) => Err(ModelError::InvalidDeclaration {
            loc: "inputs".to_string(),
            message: format!("expected a list or a map of inputs, got {other}"),
        }),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// COMMAND LINE
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineTool {
    /// Ordered parts for `job`. Inputs take declaration indices `0..n`,
    /// arguments continue from `n`.
    pub fn command_line_parts(&self, job: &Value, evaluator: &dyn Evaluator) -> Result<Vec<CommandLinePart>> {
        let cx = SynthesisContext::new(job, evaluator);
        let mut parts = Vec::with_capacity(self.inputs.len() + self.arguments.len());

        for (index, input) in self.inputs.iter().enumerate() {
            if let Some(part) = input.command_part(&cx, job.get(input.id()), index, Origin::Input)? {
                parts.push(part);
            }
        }
        let offset = self.inputs.len();
        for (i, argument) in self.arguments.iter().enumerate() {
            parts.push(argument.command_part(&cx, offset + i)?);
        }

        sort_parts(&mut parts);
        Ok(parts)
    }

    /// Base command followed by the non-empty parts, single-space joined.
    /// Without a job, placeholder values from [`crate::job::mock_job`] are used.
    pub fn generate_command_line(&self, job: Option<&Value>, evaluator: &dyn Evaluator) -> Result<String> {
        let mock;
        let job = match job {
            Some(job) => job,
            None => {
                mock = crate::job::mock_job(self);
                &mock
            }
        };
        let parts = self.command_line_parts(job, evaluator)?;
        let line = self.base_command.iter()
            .map(String::as_str)
            .chain(parts.iter().filter(|p| !p.is_empty()).map(|p| p.value.as_str()))
            .collect::<Vec<_>>()
            .join(" ");
        debug!(%line, "generated command line");
        Ok(line)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineTool {
    /// Validate every input and argument and fold their findings into the
    /// tool's cumulative report, together with duplicate ids and overlapping
    /// exit codes.
    pub fn validate(&mut self, evaluator: &dyn Evaluator, policy: ValidationPolicy) -> Result<&Validation> {
        let job = crate::job::mock_job(self);
        let mut val = Validation::new();

        let mut seen = HashSet::new();
        for input in &mut self.inputs {
            val.merge(input.validate_fresh(evaluator, &job, policy)?);
            if !input.id().is_empty() && !seen.insert(input.id().to_string()) {
                val.error(format!("{}.id", input.loc()), format!("Duplicate input id \"{}\"", input.id()));
            }
        }
        for argument in &mut self.arguments {
            val.merge(argument.validate_fresh(evaluator, &job)?);
        }
        val.merge(self.exit_codes.validate());

        debug!(errors = val.errors.len(), warnings = val.warnings.len(), "validated tool");
        self.validation.merge(val);
        Ok(&self.validation)
    }

    pub fn validation(&self) -> &Validation { &self.validation }
}

// ————————————————————————————————————————————————————————————————————————————
// ACCESSORS
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineTool {
    pub fn inputs(&self) -> &[ParameterModel] { &self.inputs }
    pub fn inputs_mut(&mut self) -> &mut [ParameterModel] { &mut self.inputs }
    pub fn input(&self, id: &str) -> Option<&ParameterModel> { self.inputs.iter().find(|i| i.id() == id) }
    pub fn arguments(&self) -> &[ArgumentModel] { &self.arguments }
    pub fn base_command(&self) -> &[String] { &self.base_command }
}

// ------------------------------- Tests ------------------------------------ //
