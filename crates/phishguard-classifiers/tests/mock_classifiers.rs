//! Mock classifiers for testing
//!
//! Provides configurable implementations of the Classifier trait for testing
//! dispatch, thresholding, and error handling without model artifacts.

use phishguard_classifiers::{Classifier, ModelKind, Score};
use phishguard_core::{Error, FeatureSchema, FeatureVector, Result};
use std::sync::atomic::{AtomicU32, Ordering};

/// A configurable mock classifier for testing
pub struct MockClassifier {
    name: String,
    score: Score,
    kind: ModelKind,
    call_count: AtomicU32,
}

impl MockClassifier {
    /// Create a mock returning probability 0.5
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: Score::Probability(0.5),
            kind: ModelKind::Gbdt,
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the probability this classifier will return
    pub fn with_probability(mut self, p: f32) -> Self {
        self.score = Score::Probability(p);
        self
    }

    /// Return a raw margin instead of a probability
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.score = Score::Margin(margin);
        self
    }

    pub fn with_kind(mut self, kind: ModelKind) -> Self {
        self.kind = kind;
        self
    }

    /// Get the number of times score was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Classifier for MockClassifier {
    fn score(&self, _features: &FeatureVector) -> Result<Score> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.score)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModelKind {
        self.kind
    }
}

/// A classifier that always fails - for testing error paths
pub struct FailingClassifier {
    name: String,
    error_message: String,
}

impl FailingClassifier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            error_message: "Simulated classifier failure".to_string(),
        }
    }

    /// Set a custom error message
    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

impl Classifier for FailingClassifier {
    fn score(&self, _features: &FeatureVector) -> Result<Score> {
        // Not an inference error; the predictor wraps it
        Err(Error::schema(&self.error_message))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Ann
    }
}

/// Scores with the sigmoid of one feature, for determinism checks
pub struct FeatureEchoClassifier {
    index: usize,
}

impl FeatureEchoClassifier {
    pub fn new(feature: &str) -> Self {
        Self {
            index: FeatureSchema::standard().index_of(feature).unwrap_or(0),
        }
    }
}

impl Classifier for FeatureEchoClassifier {
    fn score(&self, features: &FeatureVector) -> Result<Score> {
        let x = features.values()[self.index];
        Ok(Score::Probability(1.0 / (1.0 + (-x).exp())))
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Ann
    }
}

/// All-zero vector in the standard schema
pub fn zero_features() -> FeatureVector {
    let schema = FeatureSchema::standard();
    FeatureVector::new(schema, vec![0.0; schema.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_classifier_basic() {
        let classifier = MockClassifier::new("test").with_probability(0.8);

        let score = classifier.score(&zero_features()).unwrap();
        assert_eq!(score, Score::Probability(0.8));
        assert_eq!(classifier.call_count(), 1);
    }

    #[test]
    fn test_mock_classifier_margin() {
        let classifier = MockClassifier::new("raw").with_margin(-1.5);
        assert_eq!(classifier.score(&zero_features()).unwrap(), Score::Margin(-1.5));
    }

    #[test]
    fn test_failing_classifier() {
        let classifier = FailingClassifier::new("fail-test").with_error("Custom error");

        let result = classifier.score(&zero_features());
        assert!(result.is_err());
    }

    #[test]
    fn test_echo_classifier() {
        let classifier = FeatureEchoClassifier::new("url_length");
        assert_eq!(classifier.score(&zero_features()).unwrap(), Score::Probability(0.5));
    }
}
