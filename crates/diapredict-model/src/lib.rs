//! Diapredict Model
//!
//! Feature-vector construction and prediction orchestration for the
//! diabetes subtype prediction service.
//!
//! The crate is organized around four collaborators, leaves first:
//! - `schema`: the schema registry (feature order, target classes,
//!   categorical encodings, field aliases), loaded once at startup
//! - `encode`: the total feature encoder mapping loose input records
//!   onto fixed-order numeric vectors
//! - `fallback`: the deterministic threshold-rule classifier used when
//!   the primary model is unavailable or misbehaves
//! - `orchestrator`: the encode -> invoke -> degrade flow producing the
//!   single `PredictionResult` contract shared by both paths

pub mod classifier;
pub mod encode;
pub mod fallback;
pub mod linear;
pub mod orchestrator;
pub mod schema;

pub use classifier::SubtypeClassifier;
pub use encode::encode;
pub use fallback::{classify_fallback, FallbackPolicy};
pub use linear::LinearSubtypeModel;
pub use orchestrator::{predict, predict_outcome, PredictionOutcome};
pub use schema::Schema;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::SubtypeClassifier;
    pub use crate::encode::encode;
    pub use crate::fallback::{classify_fallback, FallbackPolicy};
    pub use crate::linear::LinearSubtypeModel;
    pub use crate::orchestrator::{predict, predict_outcome, PredictionOutcome};
    pub use crate::schema::Schema;
}
