//! Placeholder job values, used when a command line is previewed without a
//! real job.

use serde_json::{json, Map, Value};

use crate::parameter::ParameterModel;
use crate::tool::CommandLineTool;

/// One placeholder value per input, keyed by input id.
pub fn mock_job(tool: &CommandLineTool) -> Value {
    let mut job = Map::new();
    for input in tool.inputs() {
        job.insert(input.id().to_string(), mock_value(input));
    }
    Value::Object(job)
}

pub fn mock_value(param: &ParameterModel) -> Value {
    match param.type_() {
        Some("array") => {
            let item = mock_category(param.items(), param);
            json!([item.clone(), item])
        }
        category => mock_category(category, param),
    }
}

fn mock_category(category: Option<&str>, param: &ParameterModel) -> Value {
    let id = param.id().trim_start_matches('#');
    match category {
        Some("string") => json!(format!("{id}-string-value")),
        Some("int") | Some("long") => json!(0),
        Some("float") | Some("double") => json!(0.0),
        Some("boolean") => json!(true),
        Some("File") => json!({"class": "File", "path": format!("/path/to/{id}.ext")}),
        Some("enum") => param.symbols()
            .and_then(|s| s.first())
            .map_or_else(|| json!(""), |s| json!(s)),
        Some("record") => {
            let mut record = Map::new();
            for field in param.fields().unwrap_or(&[]) {
                record.insert(field.id().to_string(), mock_value(field));
            }
            Value::Object(record)
        }
        _ => Value::Null,
    }
}
