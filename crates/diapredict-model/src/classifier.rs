//! Classifier capability trait
//!
//! The trained model is an opaque artifact; the service only requires
//! these three operations. Prediction is a blocking in-process
//! computation, so the trait is synchronous and handlers call it
//! directly.

use diapredict_core::Result;

/// Capability exposed by a loaded subtype classifier.
///
/// `predict` and `predict_proba` are required; `feature_importances` is
/// optional and checked once at load time rather than per call.
pub trait SubtypeClassifier: Send + Sync {
    /// Predict the class index for an encoded feature vector
    fn predict(&self, features: &[f64]) -> Result<usize>;

    /// Per-class probabilities for an encoded feature vector, indexed
    /// like the schema's target names
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>>;

    /// Importance weight per feature, aligned with the schema's feature
    /// names, when the model exposes them
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }

    /// Model name for logs and the health endpoint
    fn name(&self) -> &str;
}
