//! Page fetching for site inspection

use crate::config::ExtractionConfig;
use crate::normalize::NormalizedUrl;
use phishguard_core::{Error, ExtractionFailureKind, Result};
use regex::Regex;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use tracing::{debug, warn};
use url::Url;

/// Where a visit ended up
#[derive(Debug, Clone, PartialEq)]
pub struct Landing {
    /// URL of the page that answered without redirecting
    pub final_url: Url,

    /// Redirects followed to get there
    pub redirect_count: u32,

    /// Landing page served over https with a verified certificate
    pub tls_valid: bool,

    /// Landing page contains a password input
    pub has_password_field: bool,
}

/// Fetches pages, following redirects by hand so they can be counted
///
/// Two clients are kept: one that verifies certificates and one that does
/// not. An https site is only fetched with the lenient client after the
/// strict one failed without timing out, and a page obtained that way is
/// reported with `tls_valid = false`.
pub struct HttpInspector {
    strict: reqwest::Client,
    lenient: reqwest::Client,
    max_redirects: u32,
    max_body_bytes: usize,
    password_input: Regex,
}

impl HttpInspector {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let build = |accept_invalid_certs: bool| {
            reqwest::Client::builder()
                .redirect(Policy::none())
                .timeout(config.request_timeout())
                .user_agent(config.user_agent.as_str())
                .danger_accept_invalid_certs(accept_invalid_certs)
                .build()
                .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
        };

        Ok(Self {
            strict: build(false)?,
            lenient: build(true)?,
            max_redirects: config.max_redirects,
            max_body_bytes: config.max_body_bytes,
            password_input: Regex::new(r#"(?i)<input\b[^>]*\btype\s*=\s*["']?password\b"#)
                .map_err(|e| Error::config(format!("Failed to compile password regex: {}", e)))?,
        })
    }

    /// Visit a URL, falling back to an unverified fetch when TLS fails
    pub async fn visit(&self, url: &NormalizedUrl) -> Result<Landing> {
        match self.follow(&self.strict, url.url()).await {
            Ok(mut landing) => {
                landing.tls_valid = landing.final_url.scheme() == "https";
                Ok(landing)
            }
            Err(strict_err) if !retry_without_verification(url, &strict_err) => Err(strict_err),
            Err(strict_err) => {
                debug!("Verified fetch of {} failed: {}", url, strict_err);

                let landing = self.follow(&self.lenient, url.url()).await?;
                if landing.final_url.scheme() == "https" {
                    warn!("{} only reachable without certificate verification", url);
                }
                Ok(landing)
            }
        }
    }

    async fn follow(&self, client: &reqwest::Client, start: &Url) -> Result<Landing> {
        let mut current = start.clone();
        let mut redirect_count = 0;

        loop {
            let response = client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| request_error(&current, e))?;

            if response.status().is_redirection() && redirect_count < self.max_redirects {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);

                if let Some(location) = location {
                    current = current.join(&location).map_err(|e| {
                        Error::unreachable(format!(
                            "{} redirected to invalid location '{}': {}",
                            current, location, e
                        ))
                    })?;
                    redirect_count += 1;
                    continue;
                }
            }

            let body = self.read_body(response, &current).await?;

            return Ok(Landing {
                final_url: current,
                redirect_count,
                tls_valid: false,
                has_password_field: self.password_input.is_match(&body),
            });
        }
    }

    /// Read at most `max_body_bytes` of the response body
    async fn read_body(&self, mut response: reqwest::Response, url: &Url) -> Result<String> {
        let mut body = Vec::new();

        while let Some(chunk) = response.chunk().await.map_err(|e| request_error(url, e))? {
            let room = self.max_body_bytes - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// A failed verified fetch is worth repeating unverified only for https URLs,
/// and never after a timeout
fn retry_without_verification(url: &NormalizedUrl, err: &Error) -> bool {
    url.is_https() && err.extraction_kind() != Some(ExtractionFailureKind::Timeout)
}

fn request_error(url: &Url, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(format!("request to {} timed out", url))
    } else {
        Error::unreachable(format!("request to {} failed: {}", url, err))
    }
}
