// Canonical resolved type. No raw declaration grammar here, only the shapes
// a declaration can resolve to.

use serde_json::{json, Value};

use crate::binding::BindingRule;

#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    /// undefined or null declaration
    Absent,
    /// `string`, `int`, `File`, ... or any bare name
    Primitive(String),
    Array {
        items: Option<Box<TypeShape>>,
        items_binding: Option<BindingRule>,
    },
    Record {
        fields: Option<Vec<Value>>,   // field declarations, each resolvable
        name: Option<String>,
    },
    Enum {
        symbols: Option<Vec<String>>,
        name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    pub shape: TypeShape,
    pub is_required: bool,
}

impl TypeShape {
    /// Category name (`"array"`, `"record"`, `"enum"` or the primitive name).
    pub fn category(&self) -> Option<&str> {
        match self {
            TypeShape::Absent => None,
            TypeShape::Primitive(name) => Some(name),
            TypeShape::Array { .. } => Some("array"),
            TypeShape::Record { .. } => Some("record"),
            TypeShape::Enum { .. } => Some("enum"),
        }
    }

    // a record/enum either at this level or as the element of an array
    fn structured(&self) -> &TypeShape {
        match self {
            TypeShape::Array { items: Some(items), .. } => items,
            other => other,
        }
    }
}

impl ResolvedType {
    pub fn absent() -> Self {
        Self { shape: TypeShape::Absent, is_required: false }
    }

    pub fn type_(&self) -> Option<&str> { self.shape.category() }

    pub fn items(&self) -> Option<&str> {
        match &self.shape {
            TypeShape::Array { items, .. } => items.as_deref().and_then(TypeShape::category),
            _ => None,
        }
    }

    pub fn items_binding(&self) -> Option<&BindingRule> {
        match &self.shape {
            TypeShape::Array { items_binding, .. } => items_binding.as_ref(),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&[Value]> {
        match self.shape.structured() {
            TypeShape::Record { fields, .. } => fields.as_deref(),
            _ => None,
        }
    }

    pub fn symbols(&self) -> Option<&[String]> {
        match self.shape.structured() {
            TypeShape::Enum { symbols, .. } => symbols.as_deref(),
            _ => None,
        }
    }

    /// Declared `name` of a record or enum.
    pub fn type_name(&self) -> Option<&str> {
        match self.shape.structured() {
            TypeShape::Record { name, .. } | TypeShape::Enum { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Flat `{type, items, fields, symbols, isRequired, itemsBinding, typeName}` view.
    pub fn to_canonical(&self) -> Value {
        json!({
            "type": self.type_(),
            "items": self.items(),
            "fields": self.fields(),
            "symbols": self.symbols(),
            "isRequired": self.is_required,
            "itemsBinding": self.items_binding(),
            "typeName": self.type_name(),
        })
    }
}
