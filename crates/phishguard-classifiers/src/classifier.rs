//! Classifier trait and common types

use phishguard_core::{FeatureVector, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for all phishing classifiers
///
/// Scoring is pure CPU work over a fixed-size vector, so the trait is
/// synchronous. Implementations must be deterministic: the same vector
/// always yields the same score.
pub trait Classifier: Send + Sync {
    /// Score a feature vector
    fn score(&self, features: &FeatureVector) -> Result<Score>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Get the model family
    fn kind(&self) -> ModelKind;
}

/// Raw classifier output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Calibrated probability that the URL is phishing
    Probability(f32),

    /// Uncalibrated log-odds; positive leans phishing
    Margin(f32),
}

impl Score {
    /// Underlying number, whatever its meaning
    pub fn value(&self) -> f32 {
        match self {
            Self::Probability(v) | Self::Margin(v) => *v,
        }
    }
}

/// Model family, as named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Gradient-boosted decision trees
    Gbdt,

    /// Feed-forward neural network
    Ann,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gbdt => "gbdt",
            Self::Ann => "ann",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logistic function
pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
