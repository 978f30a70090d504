//! Application state
//!
//! Everything request handlers touch is built once at startup and
//! immutable afterward: the schema, the optional classifier, and the
//! metrics handle. No locking is needed at request time.

use anyhow::Result;
use diapredict_model::{LinearSubtypeModel, Schema, SubtypeClassifier};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Loaded schema registry
    pub schema: Arc<Schema>,

    /// Loaded classifier capability; `None` means every request answers
    /// via the rule-based fallback
    pub classifier: Option<Arc<dyn SubtypeClassifier>>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Initialize application state from configuration.
    ///
    /// A schema that fails to load is fatal: there is no serving
    /// without one. A model that fails to load is not: the service
    /// starts in fallback-only mode with a warning.
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        info!("Loading schema from: {}", config.schema_path);
        let schema = Schema::from_file(&config.schema_path)?;
        info!(
            "Schema loaded: {} features, {} classes",
            schema.num_features(),
            schema.target_names.len()
        );

        let classifier = Self::load_classifier(&config, &schema);

        Ok(Self {
            config: Arc::new(config),
            schema: Arc::new(schema),
            classifier,
            metrics_handle,
        })
    }

    /// Whether a classifier capability is loaded
    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    fn load_classifier(
        config: &ServerConfig,
        schema: &Schema,
    ) -> Option<Arc<dyn SubtypeClassifier>> {
        let Some(path) = &config.model_path else {
            warn!("No model path configured, serving with fallback rules only");
            return None;
        };

        info!("Loading model from: {path}");
        let loaded = LinearSubtypeModel::from_file(path)
            .and_then(|model| model.check_schema(schema).map(|()| model));

        match loaded {
            Ok(model) => {
                info!("Model loaded: {}", model.name);
                Some(Arc::new(model))
            }
            Err(e) => {
                // Keep serving rather than failing completely
                warn!("Failed to load model {path}: {e}; serving with fallback rules only");
                None
            }
        }
    }
}
