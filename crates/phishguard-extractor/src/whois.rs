//! WHOIS lookups for domain age
//!
//! Queries `whois.iana.org` for the TLD's registry server, then asks that
//! server for the registrable domain and reads its creation date.

use crate::normalize::registrable_domain;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use phishguard_core::{Error, Result};
use regex::Regex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const IANA_WHOIS: &str = "whois.iana.org";
const WHOIS_PORT: u16 = 43;
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

/// Date layouts seen in registry responses, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%d-%b-%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Minimal WHOIS client
pub struct WhoisClient {
    root_server: String,
    port: u16,
    timeout: Duration,
    referral: Regex,
    creation: Regex,
}

impl WhoisClient {
    /// Client querying the public IANA root, each query bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            root_server: IANA_WHOIS.to_string(),
            port: WHOIS_PORT,
            timeout,
            referral: Regex::new(r"(?im)^[ \t]*(?:refer|whois):[ \t]*(\S+)[ \t\r]*$")
                .map_err(|e| Error::config(format!("Failed to compile referral regex: {}", e)))?,
            creation: Regex::new(
                r"(?im)^[ \t]*(?:creation date|created(?: on)?|registered on|registration time|domain registration date)[ \t]*:[ \t]*(.+?)[ \t\r]*$",
            )
            .map_err(|e| Error::config(format!("Failed to compile creation date regex: {}", e)))?,
        })
    }

    /// Use a different root server and port
    pub fn with_root(mut self, server: impl Into<String>, port: u16) -> Self {
        self.root_server = server.into();
        self.port = port;
        self
    }

    /// Age of the domain's registration in days
    ///
    /// `Ok(None)` when the registry has no referral or no creation date;
    /// network failures and timeouts are errors.
    pub async fn domain_age_days(&self, domain: &str) -> Result<Option<f32>> {
        let registrable = registrable_domain(domain);
        let tld = match registrable.rsplit('.').next() {
            Some(tld) if !tld.is_empty() && tld != registrable => tld.to_string(),
            _ => return Ok(None),
        };

        let root_response = self.query(&self.root_server, &tld).await?;
        let Some(server) = self.parse_referral(&root_response) else {
            debug!("No WHOIS referral for .{}", tld);
            return Ok(None);
        };

        let record = self.query(&server, &registrable).await?;
        let age = self
            .parse_creation_date(&record)
            .map(|created| age_in_days(created, Utc::now()));

        debug!("WHOIS {} via {}: age {:?} days", registrable, server, age);
        Ok(age)
    }

    async fn query(&self, server: &str, query: &str) -> Result<String> {
        let exchange = async {
            let mut stream = TcpStream::connect((server, self.port)).await?;
            stream.write_all(format!("{}\r\n", query).as_bytes()).await?;

            let mut buf = Vec::new();
            stream.take(MAX_RESPONSE_BYTES).read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(Error::unreachable(format!("whois {}: {}", server, e))),
            Err(_) => Err(Error::timeout(format!(
                "whois {} did not answer within {:?}",
                server, self.timeout
            ))),
        }
    }

    fn parse_referral(&self, response: &str) -> Option<String> {
        self.referral
            .captures(response)
            .map(|c| c[1].trim_end_matches('.').to_string())
    }

    fn parse_creation_date(&self, record: &str) -> Option<DateTime<Utc>> {
        self.creation
            .captures_iter(record)
            .find_map(|c| parse_whois_date(&c[1]))
    }
}

/// Parse the date formats registries commonly use
pub fn parse_whois_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }

    let token = raw.split(|c: char| c.is_whitespace() || c == 'T').next()?;
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(token, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    })
}

fn age_in_days(created: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    (now - created).num_days().max(0) as f32
}
