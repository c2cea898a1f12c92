//! PhishGuard Feature Extractor
//!
//! Turns a raw URL into the fixed-schema [`FeatureVector`] consumed by every
//! registered model.
//!
//! Extraction runs in two halves:
//! - Lexical features, computed from the normalized URL alone
//! - Site signals (TLS validity, redirects, domain age, password inputs),
//!   gathered by a [`SiteInspector`] over the network
//!
//! Input is normalized and rejected before any I/O happens, and all network
//! work is bounded by a timeout. Dropping the extraction future aborts any
//! in-flight connection.
//!
//! [`FeatureVector`]: phishguard_core::FeatureVector

pub mod config;
pub mod extractor;
pub mod http;
pub mod inspector;
pub mod lexical;
pub mod normalize;
pub mod whois;

pub use config::ExtractionConfig;
pub use extractor::{Extraction, FeatureExtractor};
pub use http::{HttpInspector, Landing};
pub use inspector::{LiveInspector, SiteInspector, SiteSignals, StaticInspector};
pub use lexical::LexicalFeatures;
pub use normalize::{registrable_domain, NormalizedUrl};
pub use whois::WhoisClient;
