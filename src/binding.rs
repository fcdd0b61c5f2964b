//! Command-line binding rules (`inputBinding` and argument bindings).

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::expression::ValueFrom;
use crate::validation::Validation;

/// How array elements are combined into tokens.
///
/// Absence and an explicit `null` mean different things on the wire, so they
/// get separate variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ItemSeparator {
    /// key not present: default grouping
    #[default]
    Absent,
    /// `itemSeparator: null`: repeat the prefix for every element
    Null,
    Text(String),
}

impl ItemSeparator {
    // only called when the key is present
    fn deserialize_present<'de, D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<String>::deserialize(de)? {
            None => ItemSeparator::Null,
            Some(text) => ItemSeparator::Text(text),
        })
    }

    fn serialize_present<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ItemSeparator::Text(text) => ser.serialize_str(text),
            _ => ser.serialize_none(),
        }
    }

    fn is_absent(&self) -> bool { matches!(self, ItemSeparator::Absent) }

    /// An empty separator groups like an absent one.
    pub fn effective(&self) -> &ItemSeparator {
        match self {
            ItemSeparator::Text(text) if text.is_empty() => &ItemSeparator::Absent,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(
        default,
        deserialize_with = "ItemSeparator::deserialize_present",
        serialize_with = "ItemSeparator::serialize_present",
        skip_serializing_if = "ItemSeparator::is_absent"
    )]
    pub item_separator: ItemSeparator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<ValueFrom>,
    /// `shellQuote`, `loadContents` and friends, passed through untouched.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl BindingRule {
    pub fn prefix(&self) -> &str { self.prefix.as_deref().unwrap_or("") }

    pub fn separate(&self) -> bool { self.separate != Some(false) }

    pub fn position(&self) -> i64 { self.position.unwrap_or(0) }

    /// A single space iff there is a prefix and `separate` isn't false.
    pub fn separator(&self) -> &'static str {
        if !self.prefix().is_empty() && self.separate() { " " } else { "" }
    }

    pub fn validate(&self, loc: &str) -> Validation {
        let mut val = Validation::new();
        if self.position() < 0 {
            val.warning(format!("{loc}.position"), "Position is negative and will sort before every default position");
        }
        if self.prefix().chars().any(char::is_whitespace) {
            val.warning(format!("{loc}.prefix"), "Prefix contains whitespace");
        }
        if let Some(ValueFrom::Expression(script)) = &self.value_from {
            if script.trim().is_empty() {
                val.error(format!("{loc}.valueFrom"), "valueFrom expression must not be empty");
            }
        }
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(v: Value) -> BindingRule { serde_json::from_value(v).unwrap() }

    #[test]
    fn item_separator_keeps_three_states() {
        assert_eq!(rule(json!({})).item_separator, ItemSeparator::Absent);
        assert_eq!(rule(json!({"itemSeparator": null})).item_separator, ItemSeparator::Null);
        assert_eq!(rule(json!({"itemSeparator": ","})).item_separator, ItemSeparator::Text(",".into()));
        assert_eq!(rule(json!({"itemSeparator": ""})).item_separator.effective(), &ItemSeparator::Absent);
    }

    #[test]
    fn defaults() {
        let r = rule(json!({}));
        assert_eq!(r.prefix(), "");
        assert!(r.separate());
        assert_eq!(r.position(), 0);
        assert_eq!(r.separator(), "");

        let r = rule(json!({"prefix": "-o", "separate": false, "position": 3}));
        assert_eq!(r.separator(), "");
        assert_eq!(r.position(), 3);
        assert_eq!(rule(json!({"prefix": "-o"})).separator(), " ");
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let src = json!({"prefix": "-i", "itemSeparator": null, "shellQuote": false});
        let r = rule(src.clone());
        assert_eq!(r.extra.get("shellQuote"), Some(&json!(false)));
        assert_eq!(serde_json::to_value(&r).unwrap(), src);
    }

    #[test]
    fn diagnostics() {
        let r = rule(json!({"prefix": "--a b", "position": -1, "valueFrom": "$( )"}));
        let val = r.validate("inputs[0].inputBinding");
        assert_eq!(val.warnings.len(), 2);
        assert_eq!(val.errors.len(), 1);
        assert_eq!(val.errors[0].loc, "inputs[0].inputBinding.valueFrom");
    }
}
