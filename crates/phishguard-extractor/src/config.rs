//! Extraction configuration

use phishguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time budgets and limits for live feature extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Budget for a whole extraction, including every lookup
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Budget for a single HTTP request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Budget for a single WHOIS query
    #[serde(default = "default_whois_timeout_ms")]
    pub whois_timeout_ms: u64,

    /// Redirects followed before the chain is cut off
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Bytes of page body inspected
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// User-Agent header for page fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_millis(self.whois_timeout_ms)
    }

    /// Reject budgets that would make extraction unbounded or useless
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 || self.request_timeout_ms == 0 || self.whois_timeout_ms == 0 {
            return Err(Error::config("extraction timeouts must be greater than zero"));
        }
        if self.max_body_bytes == 0 {
            return Err(Error::config("extraction.max_body_bytes must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            whois_timeout_ms: default_whois_timeout_ms(),
            max_redirects: default_max_redirects(),
            max_body_bytes: default_max_body_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_request_timeout_ms() -> u64 {
    8_000
}

fn default_whois_timeout_ms() -> u64 {
    5_000
}

fn default_max_redirects() -> u32 {
    5
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_user_agent() -> String {
    format!("PhishGuard/{}", env!("CARGO_PKG_VERSION"))
}
