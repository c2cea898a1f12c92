//! Configuration for classifiers and model loading

use crate::ann::NeuralNetwork;
use crate::classifier::{Classifier, ModelKind};
use crate::gbdt::GradientBoostedTrees;
use crate::predictor::DecisionPolicy;
use phishguard_core::{Error, FeatureSchema, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for all classifiers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Model specifications by identifier
    #[serde(default)]
    pub models: BTreeMap<String, ModelSpec>,

    /// Decision threshold and label bands
    #[serde(default)]
    pub decision: DecisionPolicy,
}

/// One trained model on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model family
    pub kind: ModelKind,

    /// Artifact path; relative paths resolve against the config file's directory
    pub path: PathBuf,

    /// Free-form description shown in model listings
    #[serde(default)]
    pub description: Option<String>,
}

impl ModelSpec {
    pub fn new(kind: ModelKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            description: None,
        }
    }

    /// Load the artifact this spec points to
    pub fn load(&self, schema: FeatureSchema) -> Result<Arc<dyn Classifier>> {
        let classifier: Arc<dyn Classifier> = match self.kind {
            ModelKind::Gbdt => Arc::new(GradientBoostedTrees::from_file(&self.path, schema)?),
            ModelKind::Ann => Arc::new(NeuralNetwork::from_file(&self.path, schema)?),
        };
        Ok(classifier)
    }
}

impl ClassifierConfig {
    /// Load from a YAML file, resolving model paths against its directory
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&yaml)?;

        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse classifier config: {}", e)))
    }

    /// Join relative model paths onto `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for spec in self.models.values_mut() {
            if spec.path.is_relative() {
                spec.path = base.join(&spec.path);
            }
        }
    }

    /// Configured identifiers, sorted
    pub fn model_names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    /// Check that at least one model is configured and the policy is sound
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(Error::config("no models configured"));
        }
        self.decision.validate()
    }
}
