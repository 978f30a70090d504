//! Rule-based fallback classifier
//!
//! A deterministic threshold-rule engine used when the trained model is
//! unavailable or returns an invalid result. It reads a small fixed set
//! of raw fields directly from the record (no schema-based encoding)
//! and produces the same `PredictionResult` contract as the model path.

use crate::encode::{coerce_numeric, coerce_string};
use crate::schema::Schema;
use diapredict_core::{InputRecord, PredictionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GLUCOSE_FIELD: &str = "niveles_glucosa";
const AUTOANTIBODY_FIELD: &str = "autoanticuerpos";
const PREGNANCY_FIELD: &str = "historial_embarazos";

/// Thresholds and confidences for the fallback rules.
///
/// The values mirror the clinical heuristics of the source model
/// deployment and are deliberately configurable rather than re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackPolicy {
    /// Glucose above this is classified as type 1 outright
    #[serde(default = "default_type1_glucose")]
    pub type1_glucose: f64,

    /// Glucose above this plus positive autoantibodies is type 1
    #[serde(default = "default_type1_autoantibody_glucose")]
    pub type1_autoantibody_glucose: f64,

    /// Glucose above this is type 2
    #[serde(default = "default_type2_glucose")]
    pub type2_glucose: f64,

    /// Glucose at or above this is prediabetic
    #[serde(default = "default_prediabetic_glucose")]
    pub prediabetic_glucose: f64,

    #[serde(default = "default_type1_confidence")]
    pub type1_confidence: f64,

    #[serde(default = "default_type2_confidence")]
    pub type2_confidence: f64,

    #[serde(default = "default_prediabetic_confidence")]
    pub prediabetic_confidence: f64,

    #[serde(default = "default_gestational_confidence")]
    pub gestational_confidence: f64,

    /// Confidence when no rule matches and type 2 is assumed
    #[serde(default = "default_default_confidence")]
    pub default_confidence: f64,
}

fn default_type1_glucose() -> f64 {
    200.0
}

fn default_type1_autoantibody_glucose() -> f64 {
    150.0
}

fn default_type2_glucose() -> f64 {
    126.0
}

fn default_prediabetic_glucose() -> f64 {
    100.0
}

fn default_type1_confidence() -> f64 {
    0.85
}

fn default_type2_confidence() -> f64 {
    0.75
}

fn default_prediabetic_confidence() -> f64 {
    0.65
}

fn default_gestational_confidence() -> f64 {
    0.70
}

fn default_default_confidence() -> f64 {
    0.60
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            type1_glucose: default_type1_glucose(),
            type1_autoantibody_glucose: default_type1_autoantibody_glucose(),
            type2_glucose: default_type2_glucose(),
            prediabetic_glucose: default_prediabetic_glucose(),
            type1_confidence: default_type1_confidence(),
            type2_confidence: default_type2_confidence(),
            prediabetic_confidence: default_prediabetic_confidence(),
            gestational_confidence: default_gestational_confidence(),
            default_confidence: default_default_confidence(),
        }
    }
}

/// Subtype markers used to resolve a rule outcome to one of the
/// schema's target class names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subtype {
    Type1,
    Type2,
    Prediabetic,
    Gestational,
}

impl Subtype {
    fn markers(self) -> &'static [&'static str] {
        match self {
            Self::Type1 => &["type 1", "tipo 1"],
            Self::Type2 => &["type 2", "tipo 2"],
            Self::Prediabetic => &["prediab"],
            Self::Gestational => &["gestational", "gestacional"],
        }
    }
}

/// Classify a record with the threshold rules. Pure and total: the same
/// record always yields the same result, and no input can make it fail.
pub fn classify_fallback(
    record: &InputRecord,
    schema: &Schema,
    policy: &FallbackPolicy,
) -> PredictionResult {
    let glucose = schema
        .resolve_field(record, GLUCOSE_FIELD)
        .and_then(coerce_numeric)
        .unwrap_or(100.0);

    let autoantibody = schema
        .resolve_field(record, AUTOANTIBODY_FIELD)
        .and_then(coerce_string)
        .unwrap_or_else(|| "Negative".to_string());
    let autoantibody_positive = autoantibody.trim().eq_ignore_ascii_case("positive");

    let (subtype, confidence) = if glucose > policy.type1_glucose
        || (glucose > policy.type1_autoantibody_glucose && autoantibody_positive)
    {
        (Subtype::Type1, policy.type1_confidence)
    } else if glucose > policy.type2_glucose {
        (Subtype::Type2, policy.type2_confidence)
    } else if glucose >= policy.prediabetic_glucose {
        (Subtype::Prediabetic, policy.prediabetic_confidence)
    } else if has_gestational_marker(record, schema) {
        (Subtype::Gestational, policy.gestational_confidence)
    } else {
        (Subtype::Type2, policy.default_confidence)
    };

    // With a single target class there is nowhere for the remaining
    // mass to go; the prediction is certain by construction
    let confidence = if schema.target_names.len() == 1 {
        1.0
    } else {
        confidence
    };

    let predicted = resolve_target(&schema.target_names, subtype);
    let probabilities = distribute_mass(&schema.target_names, &predicted, confidence);

    PredictionResult::success(
        predicted,
        confidence,
        probabilities,
        "Rule-based fallback prediction: primary model unavailable or returned an invalid result",
    )
}

fn has_gestational_marker(record: &InputRecord, schema: &Schema) -> bool {
    schema
        .resolve_field(record, PREGNANCY_FIELD)
        .and_then(coerce_string)
        .map(|text| {
            let text = text.to_ascii_lowercase();
            Subtype::Gestational
                .markers()
                .iter()
                .any(|marker| text.contains(marker))
        })
        .unwrap_or(false)
}

/// Map a rule outcome onto a member of `target_names`. Matching is a
/// case-insensitive substring scan; when no class matches the marker
/// the first target name stands in, keeping the output contract valid
/// for schemas with unconventional class labels.
fn resolve_target(target_names: &[String], subtype: Subtype) -> String {
    target_names
        .iter()
        .find(|name| {
            let name = name.to_ascii_lowercase();
            subtype.markers().iter().any(|marker| name.contains(marker))
        })
        .unwrap_or(&target_names[0])
        .clone()
}

/// Give the predicted class its confidence and split the remaining mass
/// uniformly across the other classes so the distribution sums to ~1
fn distribute_mass(
    target_names: &[String],
    predicted: &str,
    confidence: f64,
) -> BTreeMap<String, f64> {
    let others = target_names.len().saturating_sub(1);
    let remainder = if others > 0 {
        (1.0 - confidence) / others as f64
    } else {
        0.0
    };

    target_names
        .iter()
        .map(|name| {
            let p = if name == predicted { confidence } else { remainder };
            (name.clone(), p)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::from_yaml(
            r#"
feature_names: [niveles_glucosa, autoanticuerpos, historial_embarazos]
target_names:
  - "Type 1 Diabetes"
  - "Type 2 Diabetes"
  - "Prediabetic"
  - "Gestational Diabetes"
"#,
        )
        .unwrap()
    }

    fn classify(value: serde_json::Value) -> PredictionResult {
        let record = value.as_object().unwrap().clone();
        classify_fallback(&record, &schema(), &FallbackPolicy::default())
    }

    #[test]
    fn test_high_glucose_is_type1() {
        let result = classify(json!({"niveles_glucosa": 250}));
        assert_eq!(result.predicted_class, "Type 1 Diabetes");
        assert_eq!(result.probability, 0.85);
        assert!(result.success);
    }

    #[test]
    fn test_moderate_glucose_with_positive_autoantibodies_is_type1() {
        let result = classify(json!({
            "niveles_glucosa": 160,
            "autoanticuerpos": "Positive"
        }));
        assert_eq!(result.predicted_class, "Type 1 Diabetes");
        assert_eq!(result.probability, 0.85);
    }

    #[test]
    fn test_moderate_glucose_negative_autoantibodies_is_type2() {
        let result = classify(json!({
            "niveles_glucosa": 160,
            "autoanticuerpos": "Negative"
        }));
        assert_eq!(result.predicted_class, "Type 2 Diabetes");
        assert_eq!(result.probability, 0.75);
    }

    #[test]
    fn test_elevated_glucose_is_prediabetic() {
        let result = classify(json!({"niveles_glucosa": 110}));
        assert_eq!(result.predicted_class, "Prediabetic");
        assert_eq!(result.probability, 0.65);
    }

    #[test]
    fn test_default_glucose_is_prediabetic() {
        // The glucose default of 100 sits on the prediabetic boundary
        let result = classify(json!({}));
        assert_eq!(result.predicted_class, "Prediabetic");
        assert_eq!(result.probability, 0.65);
    }

    #[test]
    fn test_gestational_marker_with_low_glucose() {
        let result = classify(json!({
            "niveles_glucosa": 90,
            "historial_embarazos": "Previous gestational diabetes"
        }));
        assert_eq!(result.predicted_class, "Gestational Diabetes");
        assert_eq!(result.probability, 0.70);
    }

    #[test]
    fn test_low_glucose_no_history_defaults_to_type2() {
        let result = classify(json!({"niveles_glucosa": 85}));
        assert_eq!(result.predicted_class, "Type 2 Diabetes");
        assert_eq!(result.probability, 0.60);
    }

    #[test]
    fn test_probability_mass_sums_to_one() {
        for glucose in [50, 105, 180, 250] {
            let result = classify(json!({"niveles_glucosa": glucose}));
            let total: f64 = result.probabilities.values().sum();
            assert!((total - 1.0).abs() < 1e-6, "sum {total} for glucose {glucose}");
            assert_eq!(
                result.probabilities[&result.predicted_class],
                result.probability
            );
        }
    }

    #[test]
    fn test_fallback_is_pure() {
        let record = json!({"niveles_glucosa": 140}).as_object().unwrap().clone();
        let schema = schema();
        let policy = FallbackPolicy::default();
        let a = classify_fallback(&record, &schema, &policy);
        let b = classify_fallback(&record, &schema, &policy);
        assert_eq!(a.predicted_class, b.predicted_class);
        assert_eq!(a.probabilities, b.probabilities);
    }

    #[test]
    fn test_feature_importance_is_empty() {
        let result = classify(json!({"niveles_glucosa": 250}));
        assert!(result.feature_importance.is_empty());
    }

    #[test]
    fn test_message_discloses_rule_based_path() {
        let result = classify(json!({}));
        assert!(result.message.to_lowercase().contains("fallback"));
        assert!(result.message.to_lowercase().contains("rule"));
    }

    #[test]
    fn test_single_target_class_gets_full_mass() {
        let schema = Schema::from_yaml(
            r#"
feature_names: [niveles_glucosa]
target_names: ["Type 2 Diabetes"]
"#,
        )
        .unwrap();
        let record = json!({"niveles_glucosa": 250}).as_object().unwrap().clone();
        let result = classify_fallback(&record, &schema, &FallbackPolicy::default());

        assert_eq!(result.probability, 1.0);
        assert_eq!(result.probabilities[&result.predicted_class], 1.0);
        let total: f64 = result.probabilities.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unconventional_target_names_still_yield_a_member() {
        let schema = Schema::from_yaml(
            r#"
feature_names: [niveles_glucosa]
target_names: [ClassA, ClassB]
"#,
        )
        .unwrap();
        let record = json!({"niveles_glucosa": 250}).as_object().unwrap().clone();
        let result = classify_fallback(&record, &schema, &FallbackPolicy::default());
        assert!(schema.target_names.contains(&result.predicted_class));
    }
}
