use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::TypeShape;

/// `name` followed by any mix of `[]` and `?` markers.
static SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+)([\[\]?]+)$").expect("shorthand pattern is valid")
});

/// Parse a string declaration. Clears `is_required` on a `?` marker.
pub fn parse(raw: &str, is_required: &mut bool) -> TypeShape {
    let Some(caps) = SHORTHAND.captures(raw) else {
        return TypeShape::Primitive(raw.to_string());
    };
    let name = &caps[1];
    let markers = &caps[2];

    if markers.contains('?') {
        *is_required = false;
    }
    if markers.contains("[]") {
        TypeShape::Array {
            items: Some(Box::new(TypeShape::Primitive(name.to_string()))),
            items_binding: None,
        }
    } else {
        TypeShape::Primitive(name.to_string())
    }
}
