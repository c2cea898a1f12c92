//! Error types for PhishGuard

use serde::Serialize;
use std::fmt;

/// Result type alias using PhishGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Why feature extraction could not produce a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionFailureKind {
    /// The input is empty, unparsable, or not an http(s) URL
    MalformedUrl,
    /// The site or one of its lookups (WHOIS) could not be reached
    Unreachable,
    /// Extraction exceeded its time budget
    Timeout,
}

impl fmt::Display for ExtractionFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MalformedUrl => "malformed url",
            Self::Unreachable => "unreachable",
            Self::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Core error type for PhishGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Feature extraction failed before any model was invoked
    #[error("extraction failed ({kind}): {message}")]
    Extraction {
        kind: ExtractionFailureKind,
        message: String,
    },

    /// Feature vector or model artifact disagrees with the feature schema
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Requested model identifier is not registered
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Classifier raised an error or produced an unusable score
    #[error("inference failed in model '{model}': {message}")]
    Inference { model: String, message: String },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Flat, machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ExtractionFailure,
    SchemaMismatch,
    UnknownModel,
    InferenceFailure,
    Config,
    Internal,
}

impl ErrorKind {
    /// Stable string form, used for metric labels and API error bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractionFailure => "extraction_failure",
            Self::SchemaMismatch => "schema_mismatch",
            Self::UnknownModel => "unknown_model",
            Self::InferenceFailure => "inference_failure",
            Self::Config => "config",
            Self::Internal => "internal",
        }
    }
}

impl Error {
    /// Create a new extraction error
    pub fn extraction(kind: ExtractionFailureKind, msg: impl Into<String>) -> Self {
        Self::Extraction {
            kind,
            message: msg.into(),
        }
    }

    /// Shorthand for a malformed-URL extraction error
    pub fn malformed_url(msg: impl Into<String>) -> Self {
        Self::extraction(ExtractionFailureKind::MalformedUrl, msg)
    }

    /// Shorthand for an unreachable-resource extraction error
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::extraction(ExtractionFailureKind::Unreachable, msg)
    }

    /// Shorthand for an extraction timeout
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::extraction(ExtractionFailureKind::Timeout, msg)
    }

    /// Create a new schema mismatch error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Create a new unknown model error
    pub fn unknown_model(id: impl Into<String>) -> Self {
        Self::UnknownModel(id.into())
    }

    /// Create a new inference error
    pub fn inference(model: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Inference {
            model: model.into(),
            message: msg.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Extraction { .. } => ErrorKind::ExtractionFailure,
            Self::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            Self::UnknownModel(_) => ErrorKind::UnknownModel,
            Self::Inference { .. } => ErrorKind::InferenceFailure,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Extraction sub-kind, if this is an extraction failure
    pub fn extraction_kind(&self) -> Option<ExtractionFailureKind> {
        match self {
            Self::Extraction { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
