//! Predictor: model dispatch, thresholding, and result assembly

use crate::classifier::Score;
use crate::registry::SharedRegistry;
use phishguard_core::{Error, FeatureVector, Label, ModelId, PredictionResult, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Default probability at or above which a URL is labelled phishing
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Raw margin at or above which a URL is labelled phishing
pub const MARGIN_THRESHOLD: f32 = 0.0;

/// Turns scores into labels
///
/// `p >= threshold` is `PHISHING`. With a non-zero `suspicious_band`,
/// `threshold - band <= p < threshold` is `SUSPICIOUS`; everything below is
/// `SAFE`. Raw margins are labelled `PHISHING` at or above zero, `SAFE`
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    #[serde(default)]
    pub suspicious_band: f32,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            suspicious_band: 0.0,
        }
    }
}

impl DecisionPolicy {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            suspicious_band: 0.0,
        }
    }

    pub fn with_suspicious_band(mut self, band: f32) -> Self {
        self.suspicious_band = band;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(Error::config(format!(
                "decision threshold must be in (0, 1), got {}",
                self.threshold
            )));
        }
        if !(self.suspicious_band >= 0.0 && self.suspicious_band < self.threshold) {
            return Err(Error::config(format!(
                "suspicious band must be in [0, {}), got {}",
                self.threshold, self.suspicious_band
            )));
        }
        Ok(())
    }

    /// Label for a calibrated probability
    pub fn label_for_probability(&self, p: f32) -> Label {
        if p >= self.threshold {
            Label::Phishing
        } else if self.suspicious_band > 0.0 && p >= self.threshold - self.suspicious_band {
            Label::Suspicious
        } else {
            Label::Safe
        }
    }

    /// Label for a raw margin
    pub fn label_for_margin(&self, margin: f32) -> Label {
        if margin >= MARGIN_THRESHOLD {
            Label::Phishing
        } else {
            Label::Safe
        }
    }
}

/// Dispatches feature vectors to registered classifiers
///
/// Holds no per-request state; clones share the same registry.
#[derive(Clone)]
pub struct Predictor {
    registry: SharedRegistry,
    policy: DecisionPolicy,
}

impl Predictor {
    pub fn new(registry: SharedRegistry, policy: DecisionPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { registry, policy })
    }

    pub fn policy(&self) -> DecisionPolicy {
        self.policy
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Score `features` with the model named `model_id`
    ///
    /// Validation runs before model lookup, so a malformed vector is reported
    /// as a schema mismatch even for an unknown model. Any classifier error
    /// or unusable score becomes an inference failure.
    pub fn predict(
        &self,
        features: &FeatureVector,
        model_id: &ModelId,
    ) -> Result<PredictionResult> {
        let registry = self.registry.snapshot();
        registry.schema().validate(features)?;
        let classifier = registry.resolve(model_id)?;

        let start = Instant::now();
        let score = classifier.score(features).map_err(|e| match e {
            Error::Inference { .. } => e,
            other => Error::inference(model_id.as_str(), other.to_string()),
        })?;
        let latency_us = start.elapsed().as_micros() as u64;

        let result = match score {
            Score::Probability(p) => {
                if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                    warn!("Model '{}' produced invalid probability {}", model_id, p);
                    return Err(Error::inference(
                        model_id.as_str(),
                        format!("probability {} outside [0, 1]", p),
                    ));
                }
                PredictionResult::with_probability(
                    self.policy.label_for_probability(p),
                    p,
                    model_id.clone(),
                    self.policy.threshold,
                    latency_us,
                )
            }
            Score::Margin(m) => {
                if !m.is_finite() {
                    warn!("Model '{}' produced non-finite margin", model_id);
                    return Err(Error::inference(model_id.as_str(), "non-finite margin"));
                }
                PredictionResult::with_margin(
                    self.policy.label_for_margin(m),
                    m,
                    model_id.clone(),
                    MARGIN_THRESHOLD,
                    latency_us,
                )
            }
        };

        debug!(
            "Model '{}' scored {:?} -> {} in {}us",
            model_id,
            score,
            result.prediction(),
            latency_us
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tie_goes_to_phishing() {
        let policy = DecisionPolicy::default();
        assert_eq!(policy.label_for_probability(0.5), Label::Phishing);
        assert_eq!(policy.label_for_probability(0.4999), Label::Safe);
        assert_eq!(policy.label_for_margin(0.0), Label::Phishing);
        assert_eq!(policy.label_for_margin(-0.0001), Label::Safe);
    }

    #[test]
    fn test_suspicious_band() {
        let policy = DecisionPolicy::new(0.7).with_suspicious_band(0.2);
        assert_eq!(policy.label_for_probability(0.7), Label::Phishing);
        assert_eq!(policy.label_for_probability(0.55), Label::Suspicious);
        assert_eq!(policy.label_for_probability(0.51), Label::Suspicious);
        assert_eq!(policy.label_for_probability(0.49), Label::Safe);
    }

    #[test]
    fn test_zero_band_is_binary() {
        let policy = DecisionPolicy::default();
        for p in [0.0, 0.1, 0.3, 0.49] {
            assert_eq!(policy.label_for_probability(p), Label::Safe);
        }
    }

    #[test]
    fn test_policy_validation() {
        assert!(DecisionPolicy::default().validate().is_ok());
        assert!(DecisionPolicy::new(0.0).validate().is_err());
        assert!(DecisionPolicy::new(1.0).validate().is_err());
        assert!(DecisionPolicy::new(f32::NAN).validate().is_err());
        assert!(DecisionPolicy::new(0.5).with_suspicious_band(-0.1).validate().is_err());
        assert!(DecisionPolicy::new(0.5).with_suspicious_band(0.5).validate().is_err());
    }

    #[test]
    fn test_policy_defaults_from_yaml() {
        let policy: DecisionPolicy = serde_yaml::from_str("suspicious_band: 0.1").unwrap();
        assert_eq!(policy.threshold, DEFAULT_THRESHOLD);
        assert_eq!(policy.suspicious_band, 0.1);
    }
}
