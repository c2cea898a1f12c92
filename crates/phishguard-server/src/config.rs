//! Application configuration

use anyhow::Context;
use clap::Args;
use phishguard_classifiers::{ClassifierConfig, ModelKind, ModelSpec};
use phishguard_core::Result;
use phishguard_extractor::ExtractionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whole-process configuration, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Models and decision policy
    #[serde(flatten)]
    pub classifiers: ClassifierConfig,

    /// Feature extraction budgets
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
        }
    }
}

/// Command-line overrides applied on top of the file
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Listen address
    #[arg(short = 'l', long, global = true)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, global = true)]
    pub port: Option<u16>,

    /// Decision threshold
    #[arg(long, global = true)]
    pub threshold: Option<f32>,

    /// Extraction timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    ///
    /// A missing file yields the defaults; the result is validated.
    pub fn load(
        config_path: impl AsRef<Path>,
        overrides: &ConfigOverrides,
    ) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref();

        let mut config = if config_path.exists() {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        if let Some(listen) = &overrides.listen {
            config.server.listen = listen.clone();
        }
        if let Some(port) = overrides.port {
            config.server.port = port;
        }
        if let Some(threshold) = overrides.threshold {
            config.classifiers.decision.threshold = threshold;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            config.extraction.timeout_ms = timeout_ms;
        }

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
        Ok(config)
    }

    /// Parse a YAML file, resolving model paths against its directory
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Some(dir) = path.parent() {
            config.classifiers.resolve_paths(dir);
        }
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        self.classifiers.validate()?;
        self.extraction.validate()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut classifiers = ClassifierConfig::default();
        classifiers.models.insert(
            "xgboost".to_string(),
            ModelSpec::new(ModelKind::Gbdt, "models/xgboost.json"),
        );
        classifiers.models.insert(
            "ann".to_string(),
            ModelSpec::new(ModelKind::Ann, "models/ann.json"),
        );

        Self {
            classifiers,
            extraction: ExtractionConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}
