//! Collected (non-fatal) diagnostics.
//!
//! A [`Validation`] is append-only: children hand their reports upward and the
//! owner extends its own report with them. Nothing ever replaces a report.

use serde::{Deserialize, Serialize};

/// One diagnostic with the location path it refers to, e.g. `inputs[2].id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub message: String,
    pub loc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl Validation {
    pub fn new() -> Self { Self::default() }

    pub fn error(&mut self, loc: impl Into<String>, message: impl Into<String>) {
        self.errors.push(Issue { message: message.into(), loc: loc.into() });
    }

    pub fn warning(&mut self, loc: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Issue { message: message.into(), loc: loc.into() });
    }

    /// Append another report to this one, keeping everything already here.
    pub fn merge(&mut self, other: Validation) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_valid(&self) -> bool { self.errors.is_empty() }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

// ------------------------------- Policy ----------------------------------- //

/// Which guard selects the record structural checks.
///
/// `Literal` reproduces the historical rule set where the record checks sit
/// behind the enum discriminator, so every enum also gets record findings and
/// real records get none. `Intended` guards them with `type == "record"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordChecks {
    Literal,
    #[default]
    Intended,
}

/// Whether an array may carry the `symbols`/`fields` of its enum or record
/// items.
///
/// Resolution copies the element shape onto the array, so `Strict` reports
/// every array of enums or records. `ElementAware` accepts those.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayChecks {
    #[default]
    Strict,
    ElementAware,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub record_checks: RecordChecks,
    pub array_checks: ArrayChecks,
}
