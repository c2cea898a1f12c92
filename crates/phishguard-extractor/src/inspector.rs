//! Site inspection: the network half of feature extraction

use crate::config::ExtractionConfig;
use crate::http::HttpInspector;
use crate::lexical::flag;
use crate::normalize::NormalizedUrl;
use crate::whois::WhoisClient;
use async_trait::async_trait;
use phishguard_core::features::{names, UNKNOWN_DAYS};
use phishguard_core::Result;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::debug;

/// Signals gathered by visiting a site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteSignals {
    /// Landing page served over https with a certificate that verified
    pub tls_valid: bool,

    /// Days since the domain was registered, `None` when unknown
    pub domain_age_days: Option<f32>,

    /// Redirects followed to reach the landing page
    pub redirect_count: u32,

    /// Landing page contains a password input
    pub has_password_field: bool,
}

impl SiteSignals {
    /// `(feature name, value)` pairs
    pub fn pairs(&self) -> [(&'static str, f32); 4] {
        [
            (names::TLS_VALID, flag(self.tls_valid)),
            (
                names::DOMAIN_AGE_DAYS,
                self.domain_age_days.unwrap_or(UNKNOWN_DAYS),
            ),
            (names::REDIRECT_COUNT, self.redirect_count as f32),
            (names::HAS_PASSWORD_FIELD, flag(self.has_password_field)),
        ]
    }
}

/// Source of site signals for a URL
///
/// Implementations must either return complete signals or fail; they never
/// fill in defaults for lookups that did not succeed.
#[async_trait]
pub trait SiteInspector: Send + Sync {
    /// Gather signals for a normalized URL
    async fn inspect(&self, url: &NormalizedUrl) -> Result<SiteSignals>;

    /// Inspector name, for logging
    fn name(&self) -> &str;
}

/// Inspector backed by real HTTP fetches and WHOIS lookups
pub struct LiveInspector {
    http: HttpInspector,
    whois: WhoisClient,
}

impl LiveInspector {
    pub fn new(http: HttpInspector, whois: WhoisClient) -> Self {
        Self { http, whois }
    }

    /// Build both halves from configuration
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            http: HttpInspector::new(config)?,
            whois: WhoisClient::new(config.whois_timeout())?,
        })
    }
}

#[async_trait]
impl SiteInspector for LiveInspector {
    async fn inspect(&self, url: &NormalizedUrl) -> Result<SiteSignals> {
        let domain_age = async {
            match url.domain() {
                Some(domain) => self.whois.domain_age_days(domain).await,
                None => Ok(None),
            }
        };

        let (landing, domain_age_days) = tokio::try_join!(self.http.visit(url), domain_age)?;

        debug!(
            "Inspected {}: tls_valid={}, redirects={}, age={:?}",
            url, landing.tls_valid, landing.redirect_count, domain_age_days
        );

        Ok(SiteSignals {
            tls_valid: landing.tls_valid,
            domain_age_days,
            redirect_count: landing.redirect_count,
            has_password_field: landing.has_password_field,
        })
    }

    fn name(&self) -> &str {
        "live"
    }
}

/// Inspector returning fixed signals, for tests and offline runs
pub struct StaticInspector {
    signals: SiteSignals,
    delay: Option<Duration>,
    call_count: AtomicU32,
}

impl StaticInspector {
    pub fn new(signals: SiteSignals) -> Self {
        Self {
            signals,
            delay: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Signals of an established https site
    pub fn trusted(domain_age_days: f32) -> Self {
        Self::new(SiteSignals {
            tls_valid: true,
            domain_age_days: Some(domain_age_days),
            redirect_count: 0,
            has_password_field: false,
        })
    }

    /// Signals of a plain-http host without registration data
    pub fn untrusted() -> Self {
        Self::new(SiteSignals {
            tls_valid: false,
            domain_age_days: None,
            redirect_count: 0,
            has_password_field: true,
        })
    }

    /// Wait before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `inspect` was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SiteInspector for StaticInspector {
    async fn inspect(&self, _url: &NormalizedUrl) -> Result<SiteSignals> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self.signals)
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_age_encoded_as_sentinel() {
        let pairs = StaticInspector::untrusted().signals.pairs();
        assert_eq!(pairs[0], (names::TLS_VALID, 0.0));
        assert_eq!(pairs[1], (names::DOMAIN_AGE_DAYS, UNKNOWN_DAYS));
        assert_eq!(pairs[3], (names::HAS_PASSWORD_FIELD, 1.0));
    }

    #[tokio::test]
    async fn test_static_inspector_counts_calls() {
        let inspector = StaticInspector::trusted(9000.0);
        let url = NormalizedUrl::parse("https://www.wikipedia.org").unwrap();

        let signals = inspector.inspect(&url).await.unwrap();
        assert!(signals.tls_valid);
        assert_eq!(signals.domain_age_days, Some(9000.0));
        assert_eq!(inspector.call_count(), 1);
    }
}
