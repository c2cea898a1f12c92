//! PhishGuard Core
//!
//! Core types shared across the PhishGuard inference pipeline.
//!
//! This crate provides:
//! - The fixed feature schema and the `FeatureVector` every extractor produces
//! - Model identifiers, verdict labels, and the `PredictionResult` record
//! - The error taxonomy surfaced at the pipeline boundary

pub mod error;
pub mod features;
pub mod types;

pub use error::{Error, ErrorKind, ExtractionFailureKind, Result};
pub use features::{FeatureKind, FeatureSchema, FeatureSpec, FeatureVector};
pub use types::{Label, ModelId, PredictionResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, ErrorKind, ExtractionFailureKind, Result};
    pub use crate::features::{FeatureSchema, FeatureVector};
    pub use crate::types::{Label, ModelId, PredictionResult};
}
