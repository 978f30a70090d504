//! Prediction orchestrator: encode -> invoke -> degrade
//!
//! Per-request flow: Received -> Encoded -> ClassifierInvoked ->
//! {Succeeded | FallbackInvoked} -> Responded. Both terminal states are
//! answers; there is no retry within a request. Fallback triggering is
//! a deliberate branch on two conditions only: the classifier returned
//! an error, or its class index has no corresponding target name.

use crate::classifier::SubtypeClassifier;
use crate::encode::encode;
use crate::fallback::{classify_fallback, FallbackPolicy};
use crate::schema::Schema;
use diapredict_core::{InputRecord, PredictionResult};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A prediction plus how it was produced, for metrics and logging
pub struct PredictionOutcome {
    pub result: PredictionResult,
    /// Whether the rule-based fallback produced the answer
    pub fallback_used: bool,
}

/// Predict a subtype for one record, degrading to the rule-based
/// fallback when the classifier is absent, fails, or returns an
/// out-of-range class index.
pub fn predict(
    record: &InputRecord,
    schema: &Schema,
    classifier: Option<&dyn SubtypeClassifier>,
    policy: &FallbackPolicy,
) -> PredictionResult {
    predict_outcome(record, schema, classifier, policy).result
}

/// As `predict`, but also reports which path produced the answer
pub fn predict_outcome(
    record: &InputRecord,
    schema: &Schema,
    classifier: Option<&dyn SubtypeClassifier>,
    policy: &FallbackPolicy,
) -> PredictionOutcome {
    let Some(classifier) = classifier else {
        debug!("no classifier loaded, answering with fallback rules");
        return fallback_outcome(record, schema, policy);
    };

    let vector = encode(record, schema);

    let (index, proba) = match invoke(classifier, &vector) {
        Ok(output) => output,
        Err(reason) => {
            warn!(model = classifier.name(), %reason, "classifier failed, answering with fallback rules");
            return fallback_outcome(record, schema, policy);
        }
    };

    if index >= schema.target_names.len() {
        warn!(
            model = classifier.name(),
            index,
            classes = schema.target_names.len(),
            "classifier returned an out-of-range class index, answering with fallback rules"
        );
        return fallback_outcome(record, schema, policy);
    }

    let predicted_class = schema.target_names[index].clone();
    let probability = proba.get(index).copied().unwrap_or(0.0);

    // Pair class names with probabilities position-wise; a length
    // mismatch clamps to the shorter sequence rather than failing
    let probabilities: BTreeMap<String, f64> = schema
        .target_names
        .iter()
        .zip(&proba)
        .map(|(name, p)| (name.clone(), *p))
        .collect();

    let mut result = PredictionResult::success(
        predicted_class,
        probability,
        probabilities,
        "Prediction successful",
    );

    if let Some(importances) = classifier.feature_importances() {
        result = result.with_feature_importance(
            schema
                .feature_names
                .iter()
                .zip(&importances)
                .map(|(name, w)| (name.clone(), *w))
                .collect(),
        );
    }

    PredictionOutcome {
        result,
        fallback_used: false,
    }
}

fn invoke(
    classifier: &dyn SubtypeClassifier,
    vector: &[f64],
) -> diapredict_core::Result<(usize, Vec<f64>)> {
    let index = classifier.predict(vector)?;
    let proba = classifier.predict_proba(vector)?;
    Ok((index, proba))
}

fn fallback_outcome(
    record: &InputRecord,
    schema: &Schema,
    policy: &FallbackPolicy,
) -> PredictionOutcome {
    PredictionOutcome {
        result: classify_fallback(record, schema, policy),
        fallback_used: true,
    }
}
