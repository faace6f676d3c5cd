//! Field filter matching
//!
//! A field's `filters` map selects its candidate questions from a bank.
//! Keys address a top-level key, a dotted nested path (`meta.baseline`), or
//! fall back to the question's `meta` map. A sequence value means "member
//! of", anything else means "equals".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Expected value for one filter key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Actual value must be one of these
    AnyOf(Vec<Value>),
    /// Actual value must equal this
    Equals(Value),
}

impl FilterValue {
    /// Missing values compare as JSON null
    pub fn accepts(&self, actual: Option<&Value>) -> bool {
        let actual = actual.unwrap_or(&Value::Null);
        match self {
            FilterValue::AnyOf(allowed) => allowed.contains(actual),
            FilterValue::Equals(expected) => actual == expected,
        }
    }
}

/// Follow a dotted path through nested objects
pub fn get_nested<'a>(record: &'a Value, dotted_key: &str) -> Option<&'a Value> {
    dotted_key
        .split('.')
        .try_fold(record, |value, part| value.as_object()?.get(part))
}

/// Resolve a filter key against a record, falling back to `meta`
pub fn lookup<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    let direct = if key.contains('.') {
        get_nested(record, key)
    } else {
        record.get(key)
    };

    direct
        .filter(|v| !v.is_null())
        .or_else(|| record.get("meta").and_then(|meta| meta.get(key)))
}

/// True when every filter accepts the record (an empty map accepts all)
pub fn matches_filters(record: &Value, filters: &BTreeMap<String, FilterValue>) -> bool {
    filters
        .iter()
        .all(|(key, expected)| expected.accepts(lookup(record, key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(value: Value) -> BTreeMap<String, FilterValue> {
        serde_json::from_value(value).unwrap()
    }

    fn question() -> Value {
        json!({
            "id": "ppset_cosmos2B_friction_drop",
            "axis": "Physical realism",
            "meta": {"baseline": "cosmos2B", "attribute": "friction"},
            "videoA": {"method": "physpropprior"}
        })
    }

    #[test]
    fn test_empty_filters_accept_everything() {
        assert!(matches_filters(&question(), &BTreeMap::new()));
    }

    #[test]
    fn test_top_level_equals() {
        assert!(matches_filters(&question(), &filters(json!({"axis": "Physical realism"}))));
        assert!(!matches_filters(&question(), &filters(json!({"axis": "Force adherence"}))));
    }

    #[test]
    fn test_meta_fallback() {
        assert!(matches_filters(&question(), &filters(json!({"baseline": "cosmos2B"}))));
        assert!(!matches_filters(&question(), &filters(json!({"baseline": "force_prompting"}))));
    }

    #[test]
    fn test_dotted_path() {
        assert!(matches_filters(
            &question(),
            &filters(json!({"videoA.method": "physpropprior"}))
        ));
        assert!(!matches_filters(&question(), &filters(json!({"videoA.missing": "x"}))));
    }

    #[test]
    fn test_sequence_means_member_of() {
        let f = filters(json!({"attribute": ["friction", "deformation"]}));
        assert!(matches_filters(&question(), &f));
        let f = filters(json!({"attribute": ["restitution"]}));
        assert!(!matches_filters(&question(), &f));
    }

    #[test]
    fn test_all_filters_must_match() {
        let f = filters(json!({"baseline": "cosmos2B", "attribute": "deformation"}));
        assert!(!matches_filters(&question(), &f));
    }

    #[test]
    fn test_missing_key_only_matches_null() {
        assert!(!matches_filters(&question(), &filters(json!({"angle": "45"}))));
        assert!(matches_filters(&question(), &filters(json!({"angle": null}))));
    }
}
