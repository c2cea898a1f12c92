//! Scan pipeline: URL → features → prediction

use crate::config::AppConfig;
use phishguard_classifiers::{
    init_registry_from_config, ClassifierConfig, Predictor, SharedRegistry,
};
use phishguard_core::{Error, FeatureVector, ModelId, PredictionResult, Result};
use phishguard_extractor::{FeatureExtractor, NormalizedUrl};
use std::time::Instant;
use tracing::{debug, info, warn};

/// A prediction with the inputs it was computed from
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub result: PredictionResult,
    pub url: NormalizedUrl,
    pub features: FeatureVector,
}

/// The inbound `scan` operation
///
/// Each call owns its URL and feature vector; the extractor and predictor
/// are shared and read-only, so one pipeline serves concurrent scans.
pub struct ScanPipeline {
    extractor: FeatureExtractor,
    predictor: Predictor,
}

impl ScanPipeline {
    pub fn new(extractor: FeatureExtractor, predictor: Predictor) -> Self {
        Self {
            extractor,
            predictor,
        }
    }

    /// Load models and build a live extractor
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let extractor = FeatureExtractor::live(&config.extraction)?;
        let registry = init_registry_from_config(&config.classifiers, extractor.schema())?;
        let predictor = Predictor::new(SharedRegistry::new(registry), config.classifiers.decision)?;

        info!(
            "Scan pipeline ready: threshold {}, models {:?}",
            predictor.policy().threshold,
            predictor.registry().snapshot().ids()
        );
        Ok(Self::new(extractor, predictor))
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn registry(&self) -> &SharedRegistry {
        self.predictor.registry()
    }

    /// Scan a URL with the given model
    pub async fn scan(&self, url: &str, model: &ModelId) -> Result<PredictionResult> {
        Ok(self.scan_detailed(url, model).await?.result)
    }

    /// Scan, keeping the normalized URL and feature vector
    ///
    /// Extraction failures are returned before any model is consulted.
    pub async fn scan_detailed(&self, url: &str, model: &ModelId) -> Result<ScanReport> {
        let start = Instant::now();

        let outcome = async {
            let extraction = self.extractor.extract_detailed(url).await?;
            let result = self.predictor.predict(&extraction.features, model)?;
            Ok::<_, Error>(ScanReport {
                result,
                url: extraction.url,
                features: extraction.features,
            })
        }
        .await;

        let elapsed_us = start.elapsed().as_micros() as f64;
        match &outcome {
            Ok(report) => {
                let label = report.result.prediction();
                metrics::counter!(
                    "phishguard_scans_total",
                    "model" => model.to_string(),
                    "prediction" => label.as_str()
                )
                .increment(1);
                metrics::histogram!("phishguard_scan_latency_us").record(elapsed_us);

                debug!("Scanned {} with {}: {}", report.url, model, label);
            }
            Err(e) => {
                metrics::counter!("phishguard_errors_total", "kind" => e.kind().as_str())
                    .increment(1);
                warn!("Scan of '{}' with {} failed: {}", url, model, e);
            }
        }

        outcome
    }

    /// Build a registry from `config` and install it in place of the current one
    ///
    /// The current registry stays in service if loading fails.
    pub fn reload_models(&self, config: &ClassifierConfig) -> Result<Vec<ModelId>> {
        let registry = init_registry_from_config(config, self.extractor.schema())?;
        let ids = registry.ids();
        self.registry().swap(registry);

        info!("Reloaded models: {:?}", ids);
        Ok(ids)
    }
}
