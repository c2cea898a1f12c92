//! Feature extractor: raw URL → feature vector

use crate::config::ExtractionConfig;
use crate::inspector::{LiveInspector, SiteInspector};
use crate::lexical::LexicalFeatures;
use crate::normalize::NormalizedUrl;
use phishguard_core::{Error, FeatureSchema, FeatureVector, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Result of one extraction, with the URL it was computed from
#[derive(Debug, Clone)]
pub struct Extraction {
    pub url: NormalizedUrl,
    pub features: FeatureVector,
}

/// Maps URLs to feature vectors in the standard schema
///
/// Stateless apart from the shared inspector; one extractor serves any
/// number of concurrent requests.
#[derive(Clone)]
pub struct FeatureExtractor {
    inspector: Arc<dyn SiteInspector>,
    schema: FeatureSchema,
    timeout: Duration,
}

impl FeatureExtractor {
    /// Create an extractor over any inspector, bounding each extraction by `timeout`
    pub fn new(inspector: Arc<dyn SiteInspector>, timeout: Duration) -> Self {
        Self {
            inspector,
            schema: FeatureSchema::standard(),
            timeout,
        }
    }

    /// Extractor performing live HTTP and WHOIS inspection
    pub fn live(config: &ExtractionConfig) -> Result<Self> {
        config.validate()?;
        let inspector = LiveInspector::from_config(config)?;
        info!(
            "Live feature extraction enabled (timeout {:?}, max {} redirects)",
            config.timeout(),
            config.max_redirects
        );
        Ok(Self::new(Arc::new(inspector), config.timeout()))
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// Extract the feature vector for a raw URL
    pub async fn extract(&self, raw_url: &str) -> Result<FeatureVector> {
        Ok(self.extract_detailed(raw_url).await?.features)
    }

    /// Extract, keeping the normalized URL alongside the features
    ///
    /// Malformed input fails before the inspector is called. Inspection that
    /// outlives the extractor's timeout fails with a timeout error.
    pub async fn extract_detailed(&self, raw_url: &str) -> Result<Extraction> {
        let start = Instant::now();
        let url = NormalizedUrl::parse(raw_url)?;
        let lexical = LexicalFeatures::from_url(&url)?;

        let signals = tokio::time::timeout(self.timeout, self.inspector.inspect(&url))
            .await
            .map_err(|_| {
                Error::timeout(format!(
                    "inspecting {} exceeded {:?}",
                    url, self.timeout
                ))
            })??;

        let features = FeatureVector::from_named(
            self.schema,
            lexical.pairs().into_iter().chain(signals.pairs()),
        )?;
        self.schema.validate(&features)?;

        debug!(
            "Extracted {} features for {} via {} in {}ms",
            features.len(),
            url,
            self.inspector.name(),
            start.elapsed().as_millis()
        );

        Ok(Extraction { url, features })
    }
}
