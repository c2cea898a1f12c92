//! Core types for PhishGuard

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a registered model, e.g. `xgboost` or `ann`
///
/// Identifiers are case-insensitive and stored lowercased. Whether an
/// identifier is valid is decided by the model registry, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(Arc<str>);

impl ModelId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref().trim().to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Serialize for ModelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ModelId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

/// Discrete verdict for a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Safe,
    Suspicious,
    Phishing,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Suspicious => "SUSPICIOUS",
            Self::Phishing => "PHISHING",
        }
    }

    pub fn is_phishing(&self) -> bool {
        matches!(self, Self::Phishing)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one prediction
///
/// The first three serialized fields (`prediction`, `phishing_probability`,
/// `model_used`) are the stable result schema; the rest are diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    prediction: Label,
    phishing_probability: Option<f32>,
    model_used: ModelId,

    /// Cutoff the label was derived with: the probability threshold, or the
    /// margin cutoff for margin-only models
    threshold: f32,

    /// Uncalibrated decision margin, for models without probabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_margin: Option<f32>,

    /// Scoring latency in microseconds
    latency_us: u64,
}

impl PredictionResult {
    /// Result carrying a calibrated probability
    pub fn with_probability(
        prediction: Label,
        probability: f32,
        model_used: ModelId,
        threshold: f32,
        latency_us: u64,
    ) -> Self {
        Self {
            prediction,
            phishing_probability: Some(probability),
            model_used,
            threshold,
            raw_margin: None,
            latency_us,
        }
    }

    /// Result from a model that only exposes a raw margin
    pub fn with_margin(
        prediction: Label,
        margin: f32,
        model_used: ModelId,
        threshold: f32,
        latency_us: u64,
    ) -> Self {
        Self {
            prediction,
            phishing_probability: None,
            model_used,
            threshold,
            raw_margin: Some(margin),
            latency_us,
        }
    }

    pub fn prediction(&self) -> Label {
        self.prediction
    }

    pub fn phishing_probability(&self) -> Option<f32> {
        self.phishing_probability
    }

    pub fn model_used(&self) -> &ModelId {
        &self.model_used
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn raw_margin(&self) -> Option<f32> {
        self.raw_margin
    }

    pub fn latency_us(&self) -> u64 {
        self.latency_us
    }
}
