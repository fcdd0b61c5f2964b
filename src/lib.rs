//! Type resolution and command-line synthesis for workflow tool descriptions.
//!
//! ```
//! use cwl_cmdline::{CommandLineTool, JaqEvaluator};
//! use serde_json::json;
//!
//! let tool = CommandLineTool::from_value(&json!({
//!     "baseCommand": ["echo"],
//!     "inputs": [{"id": "name", "type": "string", "inputBinding": {"position": 1, "prefix": "--name"}}]
//! })).unwrap();
//! let line = tool.generate_command_line(Some(&json!({"name": "world"})), &JaqEvaluator).unwrap();
//! assert_eq!(line, "echo --name world");
//! ```
pub mod argument;
pub mod binding;
pub mod error;
pub mod exit_codes;
pub mod expression;
pub mod job;
pub mod parameter;
pub mod part;
pub mod path_de;
pub mod resolver;
pub mod tool;
pub mod types;
pub mod validation;

pub use binding::{BindingRule, ItemSeparator};
pub use error::{ExpressionError, ModelError, TypeResolutionError};
pub use expression::{Evaluator, ExpressionContext, JaqEvaluator, ValueFrom};
pub use parameter::ParameterModel;
pub use part::{CommandLinePart, Origin, SortingKey};
pub use resolver::{does_type_match, resolve_type};
pub use tool::CommandLineTool;
pub use types::{ResolvedType, TypeShape};
pub use validation::{ArrayChecks, Issue, RecordChecks, Validation, ValidationPolicy};
