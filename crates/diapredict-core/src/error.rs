//! Error types for diapredict

/// Result type alias using diapredict's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for diapredict operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Schema or server configuration errors (fatal at startup)
    #[error("configuration error: {0}")]
    Config(String),

    /// Classifier invocation errors
    #[error("model error: {0}")]
    Model(String),

    /// Structurally invalid classifier output (e.g. class index out of range)
    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    /// Filesystem errors while loading artifacts
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new model invocation error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new invalid-output error
    pub fn invalid_output(msg: impl Into<String>) -> Self {
        Self::InvalidOutput(msg.into())
    }
}
