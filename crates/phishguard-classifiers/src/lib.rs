//! PhishGuard Classifiers
//!
//! Pre-trained phishing classifiers and the machinery that dispatches to them.
//!
//! - [`GradientBoostedTrees`] and [`NeuralNetwork`] evaluate model artifacts
//!   natively on CPU, with no external runtime.
//! - [`ModelRegistry`] holds the closed set of models a process serves.
//! - [`Predictor`] validates a feature vector, resolves the requested model,
//!   scores, and thresholds the score into a label.

pub mod ann;
pub mod classifier;
pub mod config;
pub mod gbdt;
pub mod predictor;
pub mod registry;

pub use ann::{Activation, NeuralNetwork};
pub use classifier::{Classifier, ModelKind, Score};
pub use config::{ClassifierConfig, ModelSpec};
pub use gbdt::{GradientBoostedTrees, Objective};
pub use predictor::{DecisionPolicy, Predictor, DEFAULT_THRESHOLD, MARGIN_THRESHOLD};
pub use registry::{
    init_registry_from_config, ModelRegistry, ModelRegistryBuilder, SharedRegistry,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, ModelKind, Score};
    pub use crate::predictor::{DecisionPolicy, Predictor};
    pub use crate::registry::{ModelRegistry, SharedRegistry};
}
