//! Runs the JSON fixtures under `fixtures/`. An optional first argument is a
//! regex that selects fixtures by name.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use cwl_cmdline::path_de::from_str_with_path;
use cwl_cmdline::{ArrayChecks, CommandLineTool, JaqEvaluator, RecordChecks, ValidationPolicy};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    name: String,
    tool: Value,
    #[serde(default)]
    job: Option<Value>,
    expect: Expectation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Expectation {
    command_line: Option<String>,
    /// Locations of the expected validation errors, in report order.
    errors: Option<Vec<String>>,
    #[serde(default)]
    record_checks: Option<RecordChecks>,
    #[serde(default)]
    array_checks: Option<ArrayChecks>,
}

fn main() -> Result<ExitCode> {
    let filter = std::env::args()
        .nth(1)
        .map(|pattern| Regex::new(&pattern))
        .transpose()
        .context("invalid fixture filter")?;

    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    let mut paths = std::fs::read_dir(&root)
        .with_context(|| format!("failed to list {}", root.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<PathBuf>>();
    paths.sort();

    let (mut passed, mut failed) = (0usize, 0usize);
    for path in paths {
        let source = std::fs::read_to_string(&path)?;
        let fixture = from_str_with_path::<Fixture>(&source)
            .map_err(|e| anyhow!("{}: {e}", path.display()))?;
        if filter.as_ref().is_some_and(|re| !re.is_match(&fixture.name)) {
            continue;
        }
        match run_fixture(&fixture) {
            Ok(()) => {
                passed += 1;
                println!("ok   {}", fixture.name);
            }
            Err(e) => {
                failed += 1;
                println!("FAIL {}: {e:#}", fixture.name);
            }
        }
    }

    println!("{passed} passed, {failed} failed");
    Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn run_fixture(fixture: &Fixture) -> Result<()> {
    let mut tool = CommandLineTool::from_value(&fixture.tool)?;

    if let Some(expected) = fixture.expect.command_line.as_deref() {
        let actual = tool.generate_command_line(fixture.job.as_ref(), &JaqEvaluator)?;
        let expected = WHITESPACE.replace_all(expected.trim(), " ");
        if actual != expected {
            return Err(anyhow!("command line mismatch\n  expected: {expected}\n  actual:   {actual}"));
        }
    }

    if let Some(expected) = fixture.expect.errors.as_ref() {
        let policy = ValidationPolicy {
            record_checks: fixture.expect.record_checks.unwrap_or_default(),
            array_checks: fixture.expect.array_checks.unwrap_or_default(),
        };
        let report = tool.validate(&JaqEvaluator, policy)?;
        let actual = report.errors.iter().map(|i| i.loc.as_str()).collect::<Vec<_>>();
        if actual != *expected {
            return Err(anyhow!("validation mismatch\n  expected: {expected:?}\n  actual:   {actual:?}"));
        }
    }

    Ok(())
}
