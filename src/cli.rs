//! Minimal CLI: resolve | validate | command-line
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cwl_cmdline::{
    resolve_type, ArrayChecks, CommandLineTool, JaqEvaluator, RecordChecks, Validation, ValidationPolicy,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// resolve type declarations, validate tool descriptions, and preview command lines
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// more logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the canonical form of one type declaration
    Resolve(ResolveOut),
    /// validate one or more tool descriptions
    Validate(ValidateOut),
    /// print the command line a tool produces for a job
    CommandLine(CommandLineOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the tool inside each document (e.g. /tools/0)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more tool descriptions. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ResolveOut {
    /// JSON declaration (e.g. '["null","int"]'); anything that isn't JSON is taken as a type string
    #[arg(long = "type")]
    type_decl: String,
}

#[derive(clap::Parser, Debug)]
struct ValidateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// which guard selects the record structure checks
    #[arg(long, value_enum, default_value_t = RecordChecks::Intended)]
    record_checks: RecordChecks,

    /// whether arrays of enums/records may carry their element's symbols/fields
    #[arg(long, value_enum, default_value_t = ArrayChecks::Strict)]
    array_checks: ArrayChecks,
}

#[derive(clap::Parser, Debug)]
struct CommandLineOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// job file (JSON object keyed by input id); placeholder values if omitted
    #[arg(long)]
    job: Option<PathBuf>,

    /// print the ordered parts as JSON instead of the joined line
    #[arg(long)]
    parts: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<(PathBuf, Value)>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|e| anyhow!("failed to resolve input file paths: {e}"))?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let json_value = read_json(&source_path)?;
            let selected = match self.json_pointer.as_deref() {
                None => json_value,
                Some(ptr) => json_value.pointer(ptr).cloned().with_context(|| {
                    format!("JSON pointer {ptr} matched nothing in {}", source_path.display())
                })?,
            };
            match self.jq_expr.as_ref() {
                None => out.push((source_path, selected)),
                Some(jq_expr) => {
                    let result = cwl_cmdline::expression::jaq::run_jaq(jq_expr, &selected)
                        .with_context(|| format!("failed to apply jq expression to {}", source_path.display()))?;
                    for text in result {
                        let value = serde_json::from_str::<Value>(&text)
                            .with_context(|| format!("jq produced invalid JSON for {}", source_path.display()))?;
                        out.push((source_path.clone(), value));
                    }
                }
            }
        }
        Ok(out)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Resolve(target) => {
                let decl = serde_json::from_str::<Value>(&target.type_decl)
                    .unwrap_or_else(|_| Value::String(target.type_decl.clone()));
                let resolved = resolve_type(Some(&decl))?;
                println!("{}", serde_json::to_string_pretty(&resolved.to_canonical())?);
                Ok(ExitCode::SUCCESS)
            }
            Command::Validate(target) => {
                let policy = ValidationPolicy {
                    record_checks: target.record_checks,
                    array_checks: target.array_checks,
                };
                let documents = target.input_settings.load()?;
                let reports = documents
                    .par_iter()
                    .map(|(path, doc)| -> Result<(PathBuf, Validation)> {
                        let mut tool = CommandLineTool::from_value(doc)
                            .with_context(|| format!("failed to load {}", path.display()))?;
                        let report = tool.validate(&JaqEvaluator, policy)?.clone();
                        Ok((path.clone(), report))
                    })
                    .collect::<Result<Vec<_>>>()?;

                let mut failed = false;
                for (path, report) in &reports {
                    print_report(path, report);
                    failed |= !report.is_valid();
                }
                Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
            }
            Command::CommandLine(target) => {
                let documents = target.input_settings.load()?;
                let [(path, doc)] = documents.as_slice() else {
                    bail!("command-line expects exactly one tool, got {}", documents.len());
                };
                let tool = CommandLineTool::from_value(doc)
                    .with_context(|| format!("failed to load {}", path.display()))?;
                let job = target.job.as_deref().map(read_json).transpose()?;

                if target.parts {
                    let job = job.unwrap_or_else(|| cwl_cmdline::job::mock_job(&tool));
                    let parts = tool.command_line_parts(&job, &JaqEvaluator)?;
                    println!("{}", serde_json::to_string_pretty(&parts)?);
                } else {
                    println!("{}", tool.generate_command_line(job.as_ref(), &JaqEvaluator)?);
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_json(path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str::<Value>(&source)
        .with_context(|| format!("failed to parse JSON source file ({})", path.display()))
}

fn print_report(path: &Path, report: &Validation) {
    let status = if report.is_valid() { "ok".green().bold() } else { "invalid".red().bold() };
    println!("{} {status}", path.display());
    for issue in &report.errors {
        println!("  {} {}: {}", "error".red(), issue.loc.dimmed(), issue.message);
    }
    for issue in &report.warnings {
        println!("  {} {}: {}", "warning".yellow(), issue.loc.dimmed(), issue.message);
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(p) => {
                        matched_any = true;
                        out.push(p);
                    }
                    Err(e) => return Err(Box::new(e)),
                }
            }
            if !matched_any {
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
