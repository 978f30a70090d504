//! Server configuration

use diapredict_model::FallbackPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the schema YAML artifact (feature order, classes,
    /// categorical encodings)
    #[serde(default = "default_schema_path")]
    pub schema_path: String,

    /// Path to the model JSON artifact; when absent or unloadable the
    /// service answers with the rule-based fallback
    #[serde(default)]
    pub model_path: Option<String>,

    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Thresholds and confidences for the rule-based fallback
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(schema) = &cli.schema {
            config.schema_path = schema.clone();
        }
        if let Some(model) = &cli.model {
            config.model_path = Some(model.clone());
        }
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            schema_path: default_schema_path(),
            model_path: None,
            listen: default_listen(),
            port: default_port(),
            fallback: FallbackPolicy::default(),
        }
    }
}

fn default_schema_path() -> String {
    "./config/schema.yaml".to_string()
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert!(config.model_path.is_none());
        assert_eq!(config.fallback.type1_confidence, 0.85);
    }

    #[test]
    fn test_parse_with_partial_fallback_section() {
        let yaml = r#"
schema_path: ./schema.yaml
model_path: ./model.json
port: 8080
fallback:
  type1_confidence: 0.9
"#;
        let config: ServerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.model_path.as_deref(), Some("./model.json"));
        assert_eq!(config.fallback.type1_confidence, 0.9);
        // Unspecified policy fields keep their defaults
        assert_eq!(config.fallback.type2_confidence, 0.75);
    }
}
