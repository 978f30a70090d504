//! Core types for diapredict

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One inbound request body: a loose mapping from field name to value.
///
/// Field names may arrive in any casing or locale (canonical feature
/// names, localized aliases, or a mix); values may be strings, numbers,
/// or absent. Records live only for the duration of one request.
pub type InputRecord = serde_json::Map<String, serde_json::Value>;

/// Structured prediction result shared by the model path and the
/// rule-based fallback path.
///
/// Serializes with the camelCase field names of the public JSON
/// contract (`predictedClass`, `featureImportance`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Predicted class name, always a member of the schema's target names
    pub predicted_class: String,

    /// Confidence of the predicted class (0.0-1.0)
    pub probability: f64,

    /// Per-class probabilities, summing to ~1.0
    pub probabilities: BTreeMap<String, f64>,

    /// Per-feature importance weights; empty when the classifier does
    /// not expose them
    pub feature_importance: BTreeMap<String, f64>,

    /// Whether the request produced an answer (degraded answers count)
    pub success: bool,

    /// Human-readable description of how the answer was produced
    pub message: String,
}

impl PredictionResult {
    /// Create a successful result
    pub fn success(
        predicted_class: impl Into<String>,
        probability: f64,
        probabilities: BTreeMap<String, f64>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            predicted_class: predicted_class.into(),
            probability,
            probabilities,
            feature_importance: BTreeMap::new(),
            success: true,
            message: message.into(),
        }
    }

    /// Attach per-feature importance weights
    pub fn with_feature_importance(mut self, importance: BTreeMap<String, f64>) -> Self {
        self.feature_importance = importance;
        self
    }
}
