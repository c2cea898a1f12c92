//! Shared application state

use crate::config::AppConfig;
use crate::pipeline::ScanPipeline;
use metrics_exporter_prometheus::PrometheusHandle;
use phishguard_classifiers::ClassifierConfig;
use phishguard_core::{Error, ModelId, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScanPipeline>,
    pub config: Arc<AppConfig>,

    /// File the configuration came from, re-read on model reload
    pub config_path: Option<PathBuf>,

    /// Prometheus exporter, absent when metrics are not installed
    pub metrics: Option<PrometheusHandle>,

    pub started_at: Instant,
}

impl AppState {
    pub fn new(pipeline: ScanPipeline, config: AppConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
            config_path: None,
            metrics: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Reload the model set from the configuration file
    ///
    /// Falls back to the startup configuration when there is no file.
    pub fn reload_models(&self) -> Result<Vec<ModelId>> {
        let classifiers: ClassifierConfig = match &self.config_path {
            Some(path) if path.exists() => {
                let config = AppConfig::from_file(path)
                    .map_err(|e| Error::config(format!("{:#}", e)))?;
                config.classifiers.validate()?;
                config.classifiers
            }
            _ => self.config.classifiers.clone(),
        };

        self.pipeline.reload_models(&classifiers)
    }
}
