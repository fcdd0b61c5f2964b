use serde_json::Value;

/// Runtime type name of a value, the way a dynamically typed host reports it:
/// arrays and null are both `"object"`.
pub fn runtime_type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}

/// Cheap structural guard run before synthesis. Not a validator: a `record`
/// matches any non-array object regardless of its fields.
pub fn does_type_match(type_name: Option<&str>, value: &Value) -> bool {
    let Some(type_name) = type_name else { return true };
    match type_name {
        "int" | "float" | "long" | "double" => value.is_number(),
        "File" | "record" => value.is_object(),
        "array" => value.is_array(),
        "enum" => value.is_string(),
        other => runtime_type_name(value) == other,
    }
}
