//! Lexical URL features

use crate::normalize::{subdomain_count, NormalizedUrl};
use aho_corasick::{AhoCorasick, BuildError};
use phishguard_core::features::names;
use phishguard_core::{Error, Result};
use std::sync::OnceLock;

/// Characters counted by `num_special_chars` (`@` and `-` have their own features)
const SPECIAL_CHARS: &[char] = &['_', '~', '%', '?', '&', '=', '!', '$', '*', '+', ',', ';', '#'];

/// Words that show up disproportionately in credential-harvesting URLs
const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "login", "signin", "logon", "verify", "account", "update", "secure", "banking", "confirm",
    "password", "webscr", "suspend", "wallet", "billing",
];

static KEYWORD_MATCHER: OnceLock<std::result::Result<AhoCorasick, BuildError>> = OnceLock::new();

fn keyword_matcher() -> Result<&'static AhoCorasick> {
    KEYWORD_MATCHER
        .get_or_init(|| {
            AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(SUSPICIOUS_KEYWORDS)
        })
        .as_ref()
        .map_err(|e| Error::config(format!("Failed to build keyword matcher: {}", e)))
}

/// Number of distinct suspicious keywords occurring anywhere in `text`
pub fn suspicious_keyword_count(text: &str) -> Result<usize> {
    let matcher = keyword_matcher()?;
    let mut seen = vec![false; matcher.patterns_len()];
    for m in matcher.find_overlapping_iter(text) {
        seen[m.pattern().as_usize()] = true;
    }
    Ok(seen.into_iter().filter(|&hit| hit).count())
}

/// Features computed from the normalized URL string alone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalFeatures {
    pub url_length: usize,
    pub hostname_length: usize,
    pub path_length: usize,
    pub num_dots: usize,
    pub num_hyphens: usize,
    pub num_at: usize,
    pub num_special_chars: usize,
    pub num_digits: usize,
    pub num_subdomains: usize,
    pub has_ip_host: bool,
    pub uses_https: bool,
    pub num_suspicious_keywords: usize,
}

impl LexicalFeatures {
    pub fn from_url(url: &NormalizedUrl) -> Result<Self> {
        let text = url.as_str();
        let count = |c: char| text.chars().filter(|&x| x == c).count();

        Ok(Self {
            url_length: text.chars().count(),
            hostname_length: url.host_str().chars().count(),
            path_length: url.path().chars().count(),
            num_dots: count('.'),
            num_hyphens: count('-'),
            num_at: count('@'),
            num_special_chars: text.chars().filter(|c| SPECIAL_CHARS.contains(c)).count(),
            num_digits: text.chars().filter(char::is_ascii_digit).count(),
            num_subdomains: url.domain().map(subdomain_count).unwrap_or(0),
            has_ip_host: url.is_ip_literal(),
            uses_https: url.is_https(),
            num_suspicious_keywords: suspicious_keyword_count(text)?,
        })
    }

    /// `(feature name, value)` pairs
    pub fn pairs(&self) -> [(&'static str, f32); 12] {
        [
            (names::URL_LENGTH, self.url_length as f32),
            (names::HOSTNAME_LENGTH, self.hostname_length as f32),
            (names::PATH_LENGTH, self.path_length as f32),
            (names::NUM_DOTS, self.num_dots as f32),
            (names::NUM_HYPHENS, self.num_hyphens as f32),
            (names::NUM_AT, self.num_at as f32),
            (names::NUM_SPECIAL_CHARS, self.num_special_chars as f32),
            (names::NUM_DIGITS, self.num_digits as f32),
            (names::NUM_SUBDOMAINS, self.num_subdomains as f32),
            (names::HAS_IP_HOST, flag(self.has_ip_host)),
            (names::USES_HTTPS, flag(self.uses_https)),
            (names::NUM_SUSPICIOUS_KEYWORDS, self.num_suspicious_keywords as f32),
        ]
    }
}

pub(crate) fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}
