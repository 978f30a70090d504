//! Diapredict Core
//!
//! Shared types and error handling for the diapredict prediction service.
//!
//! This crate provides:
//! - The `PredictionResult` wire contract shared by the model path and
//!   the rule-based fallback path
//! - The `InputRecord` type for loosely-structured request bodies
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{InputRecord, PredictionResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{InputRecord, PredictionResult};
}
