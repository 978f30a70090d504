//! Feature encoder: loose input record -> fixed-order numeric vector
//!
//! The encoder is total. Records come from untrusted callers with
//! inconsistent naming and typing, so any slot that cannot be resolved
//! or parsed encodes as 0.0 instead of failing; the rule-based fallback
//! covers badly-formed requests downstream.

use crate::schema::Schema;
use diapredict_core::InputRecord;
use serde_json::Value;

/// Encode one record against the schema.
///
/// Always returns exactly `schema.num_features()` values, in schema
/// order. Per slot: resolve the field (canonical name, then aliases in
/// both directions), apply the categorical table when the feature has
/// one (unknown categories encode as the 0.0 baseline), otherwise
/// coerce numerically. Anything unresolvable encodes as 0.0.
pub fn encode(record: &InputRecord, schema: &Schema) -> Vec<f64> {
    schema
        .feature_names
        .iter()
        .map(|feature| encode_slot(record, schema, feature))
        .collect()
}

fn encode_slot(record: &InputRecord, schema: &Schema, feature: &str) -> f64 {
    let Some(raw) = schema.resolve_field(record, feature) else {
        return 0.0;
    };

    if let Some(mapping) = schema.categorical_mapping.get(feature) {
        return coerce_string(raw)
            .and_then(|category| mapping.get(category.trim()).copied())
            .unwrap_or(0.0);
    }

    coerce_numeric(raw).unwrap_or(0.0)
}

/// Numeric view of a JSON value: numbers pass through, strings are
/// trimmed and parsed. Everything else has no numeric form.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Canonical string view of a JSON value, for categorical lookup
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
