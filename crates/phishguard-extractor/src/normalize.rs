//! URL normalization

use phishguard_core::{Error, Result};
use std::fmt;
use url::{Host, Url};

/// Second-level labels that sit under a country-code TLD as a public suffix
/// (`bbc.co.uk`, `abc.net.au`).
const CC_SECOND_LEVEL: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "org"];

/// A parsed, canonical http(s) URL with a host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    url: Url,
    host: Host<String>,
}

impl NormalizedUrl {
    /// Normalize raw user input
    ///
    /// Surrounding whitespace is trimmed. Input without a scheme is treated as
    /// `http://`. Empty input, embedded whitespace, non-http(s) schemes and
    /// host-less URLs are rejected as malformed.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::malformed_url("url is empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(Error::malformed_url(format!(
                "url contains whitespace: {:?}",
                trimmed
            )));
        }

        let candidate = if has_scheme(trimmed) {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        let url = Url::parse(&candidate)
            .map_err(|e| Error::malformed_url(format!("{}: {}", trimmed, e)))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::malformed_url(format!(
                    "unsupported scheme '{}'",
                    other
                )))
            }
        }

        let host = url
            .host()
            .map(|h| h.to_owned())
            .ok_or_else(|| Error::malformed_url(format!("{}: missing host", trimmed)))?;

        if let Host::Domain(domain) = &host {
            if domain.is_empty() {
                return Err(Error::malformed_url(format!("{}: empty host", trimmed)));
            }
        }

        Ok(Self { url, host })
    }

    /// Canonical serialization
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn host(&self) -> &Host<String> {
        &self.host
    }

    /// Host as it appears in the URL (IPv6 in brackets)
    pub fn host_str(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Domain name, `None` for IP-literal hosts
    pub fn domain(&self) -> Option<&str> {
        match &self.host {
            Host::Domain(d) => Some(d.as_str()),
            Host::Ipv4(_) | Host::Ipv6(_) => None,
        }
    }

    pub fn is_ip_literal(&self) -> bool {
        self.domain().is_none()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `input` starts with `scheme://`
///
/// A `://` further along, as in `example.com/go?to=http://x`, belongs to the
/// path or query.
fn has_scheme(input: &str) -> bool {
    let Some(end) = input.find("://") else {
        return false;
    };
    let scheme = &input[..end];
    scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Registrable part of a domain name (`en.m.wikipedia.org` → `wikipedia.org`)
///
/// Uses a fixed rule set rather than the full public suffix list: the last
/// two labels, or the last three under a known ccTLD second level.
pub fn registrable_domain(domain: &str) -> String {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();

    let keep = registrable_label_count(&labels);
    if labels.len() <= keep {
        return labels.join(".");
    }
    labels[labels.len() - keep..].join(".")
}

/// Labels to the left of the registrable domain
pub fn subdomain_count(domain: &str) -> usize {
    let labels: Vec<&str> = domain
        .trim_end_matches('.')
        .split('.')
        .filter(|l| !l.is_empty())
        .collect();
    labels.len().saturating_sub(registrable_label_count(&labels))
}

fn registrable_label_count(labels: &[&str]) -> usize {
    match labels {
        [.., second, tld]
            if tld.len() == 2 && CC_SECOND_LEVEL.contains(&second.to_ascii_lowercase().as_str()) =>
        {
            3
        }
        _ => 2,
    }
}
