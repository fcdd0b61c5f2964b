//! Type resolution: declaration → [`ResolvedType`].
//!
//! Accepted declaration grammar:
//! - bare names (`"string"`, `"File"`)
//! - shorthand with trailing `[]` / `?` markers (`"int[]?"`)
//! - unions with at most one non-null member (`["null", "string"]`)
//! - objects discriminated by `type`: `array`, `record`, `enum`, or a primitive
//!
//! Malformed input is an error, never a partially filled shape.
pub mod matching;
pub mod shorthand;

use serde_json::{Map, Value};
use tracing::trace;

use crate::binding::BindingRule;
use crate::error::TypeResolutionError;
use crate::types::{ResolvedType, TypeShape};

pub use matching::does_type_match;

/// Category names accepted as `{type: <name>}` objects without further fields.
const PRIMITIVE_CATEGORIES: [&str; 7] = ["string", "File", "null", "boolean", "int", "long", "double"];

/// `None` is an undefined declaration, `Some(Value::Null)` an explicit null.
pub fn resolve_type(decl: Option<&Value>) -> Result<ResolvedType, TypeResolutionError> {
    let mut is_required = true;
    let shape = match decl {
        None => {
            is_required = false;
            TypeShape::Absent
        }
        Some(value) => resolve_value(value, &mut is_required)?,
    };
    trace!(?shape, is_required, "resolved type");
    Ok(ResolvedType { shape, is_required })
}

fn resolve_value(value: &Value, is_required: &mut bool) -> Result<TypeShape, TypeResolutionError> {
    match value {
        Value::Null => {
            *is_required = false;
            Ok(TypeShape::Absent)
        }
        Value::String(s) => Ok(shorthand::parse(s, is_required)),
        Value::Array(members) => resolve_union(members, is_required),
        Value::Object(map) => resolve_object(map, is_required),
        other => Err(TypeResolutionError::UnexpectedShape(other.to_string())),
    }
}

fn resolve_union(members: &[Value], is_required: &mut bool) -> Result<TypeShape, TypeResolutionError> {
    let mut rest: Vec<&Value> = members.iter().collect();
    if let Some(null_idx) = rest.iter().position(|m| m.as_str() == Some("null")) {
        *is_required = false;
        rest.remove(null_idx);
    }
    let [member] = rest.as_slice() else {
        return Err(TypeResolutionError::UnionNotSupported(rest.len()));
    };
    match member {
        Value::String(_) | Value::Object(_) => resolve_value(member, is_required),
        other => Err(TypeResolutionError::UnexpectedShape(other.to_string())),
    }
}

fn resolve_object(map: &Map<String, Value>, is_required: &mut bool) -> Result<TypeShape, TypeResolutionError> {
    let category = match map.get("type") {
        Some(Value::String(s)) => s.as_str(),
        None | Some(Value::Null) => {
            return Err(TypeResolutionError::MissingTypeField(Value::Object(map.clone()).to_string()));
        }
        Some(other) => return Err(TypeResolutionError::UnmatchedComplexType(other.to_string())),
    };
    let name = || map.get("name").and_then(Value::as_str).map(str::to_string);

    match category {
        "array" => {
            let items_binding = match map.get("inputBinding") {
                None | Some(Value::Null) => None,
                Some(raw) => Some(
                    crate::path_de::from_value_with_path::<BindingRule>(raw)
                        .map_err(TypeResolutionError::InvalidItemsBinding)?,
                ),
            };
            match map.get("items") {
                None | Some(Value::Null) => {
                    *is_required = false;
                    Ok(TypeShape::Array { items: None, items_binding })
                }
                // primitive items are taken as-is, no shorthand re-parse
                Some(Value::String(s)) => Ok(TypeShape::Array {
                    items: Some(Box::new(TypeShape::Primitive(s.clone()))),
                    items_binding,
                }),
                // items share the array's optionality; an inner array collapses
                // onto the outer one, keeping its own items binding
                Some(nested) => match resolve_value(nested, is_required)? {
                    inner @ TypeShape::Array { .. } => Ok(inner),
                    item => Ok(TypeShape::Array { items: Some(Box::new(item)), items_binding }),
                },
            }
        }
        "record" => {
            let fields = match map.get("fields") {
                None | Some(Value::Null) => None,
                Some(Value::Array(xs)) => Some(xs.clone()),
                Some(other) => return Err(TypeResolutionError::MalformedFields(other.to_string())),
            };
            Ok(TypeShape::Record { fields, name: name() })
        }
        "enum" => {
            let symbols = match map.get("symbols") {
                None | Some(Value::Null) => None,
                Some(Value::Array(xs)) => Some(
                    xs.iter()
                        .map(|s| s.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| TypeResolutionError::MalformedSymbols(Value::Array(xs.clone()).to_string()))?,
                ),
                Some(other) => return Err(TypeResolutionError::MalformedSymbols(other.to_string())),
            };
            Ok(TypeShape::Enum { symbols, name: name() })
        }
        prim if PRIMITIVE_CATEGORIES.contains(&prim) => Ok(TypeShape::Primitive(prim.to_string())),
        other => Err(TypeResolutionError::UnmatchedComplexType(other.to_string())),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(v: Value) -> ResolvedType { resolve_type(Some(&v)).unwrap() }

    #[test]
    fn undefined_and_null_are_optional_and_empty() {
        for t in [resolve_type(None).unwrap(), resolve(Value::Null)] {
            assert!(!t.is_required);
            assert_eq!(t.shape, TypeShape::Absent);
            let c = t.to_canonical();
            for key in ["type", "items", "fields", "symbols", "itemsBinding", "typeName"] {
                assert!(c[key].is_null(), "{key} should be null");
            }
        }
    }

    #[test]
    fn bare_and_shorthand_strings() {
        let t = resolve(json!("string"));
        assert_eq!(t.type_(), Some("string"));
        assert!(t.is_required);

        let t = resolve(json!("int[]"));
        assert_eq!(t.type_(), Some("array"));
        assert_eq!(t.items(), Some("int"));
        assert!(t.is_required);

        let t = resolve(json!("File?"));
        assert_eq!(t.type_(), Some("File"));
        assert!(!t.is_required);

        let t = resolve(json!("int[]?"));
        assert_eq!(t.items(), Some("int"));
        assert!(!t.is_required);
    }

    #[test]
    fn union_with_null() {
        let t = resolve(json!(["null", "string"]));
        assert_eq!(t.type_(), Some("string"));
        assert!(!t.is_required);

        let t = resolve(json!([{"type": "enum", "symbols": ["x"], "name": "E"}, "null"]));
        assert_eq!(t.type_(), Some("enum"));
        assert!(!t.is_required);
    }

    #[test]
    fn multi_member_unions_fail() {
        let err = resolve_type(Some(&json!(["string", "int"]))).unwrap_err();
        assert_eq!(err, TypeResolutionError::UnionNotSupported(2));
        // only one null is removed
        assert!(resolve_type(Some(&json!(["null"]))).is_err());
        assert!(resolve_type(Some(&json!(["null", "null", "int"]))).is_err());
        assert!(matches!(
            resolve_type(Some(&json!([3]))),
            Err(TypeResolutionError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn enum_object() {
        let t = resolve(json!({"type": "enum", "symbols": ["a", "b"], "name": "Color"}));
        assert_eq!(t.type_(), Some("enum"));
        assert_eq!(t.symbols(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(t.type_name(), Some("Color"));
        assert!(t.items().is_none());
        assert!(t.fields().is_none());
    }

    #[test]
    fn record_object_keeps_fields_in_order() {
        let t = resolve(json!({
            "type": "record",
            "fields": [{"name": "b", "type": "int"}, {"name": "a", "type": "string"}]
        }));
        assert_eq!(t.type_(), Some("record"));
        let fields = t.fields().unwrap();
        assert_eq!(fields[0]["name"], "b");
        assert_eq!(fields[1]["name"], "a");
        assert!(t.type_name().is_none());
    }

    #[test]
    fn array_objects() {
        let t = resolve(json!({"type": "array", "items": "File", "inputBinding": {"prefix": "-I"}}));
        assert_eq!(t.type_(), Some("array"));
        assert_eq!(t.items(), Some("File"));
        assert_eq!(t.items_binding().map(|b| b.prefix()), Some("-I"));

        let t = resolve(json!({
            "type": "array",
            "items": {"type": "record", "name": "Pair", "fields": [{"name": "l", "type": "int"}]}
        }));
        assert_eq!(t.items(), Some("record"));
        assert_eq!(t.fields().map(|f| f.len()), Some(1));
        assert_eq!(t.type_name(), Some("Pair"));
    }

    #[test]
    fn primitive_category_objects() {
        assert_eq!(resolve(json!({"type": "long"})).type_(), Some("long"));
        // only null declarations and unions with "null" are optional
        let t = resolve(json!({"type": "null"}));
        assert_eq!(t.type_(), Some("null"));
        assert!(t.is_required);
        assert_eq!(t.is_required, resolve(json!("null")).is_required);
    }

    #[test]
    fn array_items_share_optionality() {
        let t = resolve(json!({"type": "array", "items": ["null", "string"]}));
        assert_eq!(t.type_(), Some("array"));
        assert_eq!(t.items(), Some("string"));
        assert!(!t.is_required);

        let t = resolve(json!({"type": "array"}));
        assert_eq!(t.type_(), Some("array"));
        assert!(t.items().is_none());
        assert!(!t.is_required);

        assert!(resolve(json!({"type": "array", "items": "string"})).is_required);
    }

    #[test]
    fn nested_arrays_collapse_to_innermost_items() {
        let t = resolve(json!({"type": "array", "items": {"type": "array", "items": "string"}}));
        assert_eq!(t.type_(), Some("array"));
        assert_eq!(t.items(), Some("string"));
        assert!(t.is_required);

        let t = resolve(json!({
            "type": "array",
            "inputBinding": {"prefix": "-outer"},
            "items": {"type": "array", "inputBinding": {"prefix": "-inner"}, "items": {
                "type": "array", "items": {"type": "enum", "name": "E", "symbols": ["x"]}
            }}
        }));
        assert_eq!(t.items(), Some("enum"));
        assert_eq!(t.symbols(), Some(&["x".to_string()][..]));
        // the innermost array has no binding of its own
        assert!(t.items_binding().is_none());
    }

    #[test]
    fn malformed_objects() {
        assert!(matches!(
            resolve_type(Some(&json!({"items": "int"}))),
            Err(TypeResolutionError::MissingTypeField(_))
        ));
        assert!(matches!(
            resolve_type(Some(&json!({"type": "map"}))),
            Err(TypeResolutionError::UnmatchedComplexType(t)) if t == "map"
        ));
        assert!(matches!(
            resolve_type(Some(&json!(42))),
            Err(TypeResolutionError::UnexpectedShape(_))
        ));
        assert!(matches!(
            resolve_type(Some(&json!({"type": "enum", "symbols": [1]}))),
            Err(TypeResolutionError::MalformedSymbols(_))
        ));
        assert!(matches!(
            resolve_type(Some(&json!({"type": "array", "items": "int", "inputBinding": {"position": "x"}}))),
            Err(TypeResolutionError::InvalidItemsBinding(_))
        ));
    }
}
