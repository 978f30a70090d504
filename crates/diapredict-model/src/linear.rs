//! Linear subtype model loaded from a JSON artifact
//!
//! A per-class linear scorer with softmax probabilities. This is the
//! built-in classifier capability: one weight row and bias per target
//! class, optionally with stored per-feature importances.

use crate::classifier::SubtypeClassifier;
use crate::schema::Schema;
use diapredict_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSubtypeModel {
    /// Model name/identifier
    #[serde(default = "default_name")]
    pub name: String,

    /// One weight row per target class, each row one weight per feature
    pub weights: Vec<Vec<f64>>,

    /// One bias per target class
    pub bias: Vec<f64>,

    /// Stored per-feature importance weights, if the training process
    /// exported them
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

fn default_name() -> String {
    "linear-subtype".to_string()
}

impl LinearSubtypeModel {
    /// Load a model from a JSON artifact
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!("failed to read model file {:?}: {e}", path.as_ref()))
        })?;
        let model: Self = serde_json::from_str(&contents)
            .map_err(|e| Error::config(format!("malformed model artifact: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    /// Verify the model's dimensions against a schema. Run once at load
    /// time so a mismatched artifact is rejected before serving.
    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        if self.weights.len() != schema.target_names.len() {
            return Err(Error::config(format!(
                "model has {} classes but schema names {}",
                self.weights.len(),
                schema.target_names.len()
            )));
        }
        let num_features = schema.num_features();
        if self.weights.iter().any(|row| row.len() != num_features) {
            return Err(Error::config(format!(
                "model weight rows do not match the schema's {num_features} features"
            )));
        }
        if let Some(importances) = &self.feature_importances {
            if importances.len() != num_features {
                return Err(Error::config(
                    "model feature importances do not align with the schema",
                ));
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.weights.is_empty() {
            return Err(Error::config("model has no weight rows"));
        }
        if self.bias.len() != self.weights.len() {
            return Err(Error::config(format!(
                "model has {} weight rows but {} biases",
                self.weights.len(),
                self.bias.len()
            )));
        }
        let width = self.weights[0].len();
        if self.weights.iter().any(|row| row.len() != width) {
            return Err(Error::config("model weight rows have inconsistent widths"));
        }
        Ok(())
    }

    /// Softmax over the per-class linear scores
    fn softmax(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.weights[0].len() {
            return Err(Error::model(format!(
                "feature vector has {} values, model expects {}",
                features.len(),
                self.weights[0].len()
            )));
        }

        let scores: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                bias + row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>()
            })
            .collect();

        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        Ok(exps.into_iter().map(|e| e / total).collect())
    }
}

impl SubtypeClassifier for LinearSubtypeModel {
    fn predict(&self, features: &[f64]) -> Result<usize> {
        let proba = self.softmax(features)?;
        let (index, _) = proba
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .ok_or_else(|| Error::invalid_output("model produced no class scores"))?;
        Ok(index)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.softmax(features)
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        self.feature_importances.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
