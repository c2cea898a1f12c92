//! Feature schema and feature vectors
//!
//! Every extractor produces, and every registered model consumes, vectors
//! laid out by the same [`FeatureSchema`]. Vectors are validated against the
//! schema before they reach a classifier; a mismatch is reported as
//! [`Error::SchemaMismatch`], never truncated or padded.

use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value domain of a single feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Non-negative count or length
    Count,
    /// Boolean encoded as 0.0 / 1.0
    Flag,
    /// Age in days, or -1.0 when unknown
    Days,
}

impl FeatureKind {
    /// Check whether a value lies in this kind's domain
    pub fn accepts(&self, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            Self::Count => value >= 0.0,
            Self::Flag => value == 0.0 || value == 1.0,
            Self::Days => value >= 0.0 || value == UNKNOWN_DAYS,
        }
    }
}

/// Sentinel for a `Days` feature whose value could not be determined
pub const UNKNOWN_DAYS: f32 = -1.0;

/// Name and domain of one feature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub const fn new(name: &'static str, kind: FeatureKind) -> Self {
        Self { name, kind }
    }
}

/// Feature names of the standard schema
pub mod names {
    pub const URL_LENGTH: &str = "url_length";
    pub const HOSTNAME_LENGTH: &str = "hostname_length";
    pub const PATH_LENGTH: &str = "path_length";
    pub const NUM_DOTS: &str = "num_dots";
    pub const NUM_HYPHENS: &str = "num_hyphens";
    pub const NUM_AT: &str = "num_at";
    pub const NUM_SPECIAL_CHARS: &str = "num_special_chars";
    pub const NUM_DIGITS: &str = "num_digits";
    pub const NUM_SUBDOMAINS: &str = "num_subdomains";
    pub const HAS_IP_HOST: &str = "has_ip_host";
    pub const USES_HTTPS: &str = "uses_https";
    pub const NUM_SUSPICIOUS_KEYWORDS: &str = "num_suspicious_keywords";
    pub const TLS_VALID: &str = "tls_valid";
    pub const DOMAIN_AGE_DAYS: &str = "domain_age_days";
    pub const REDIRECT_COUNT: &str = "redirect_count";
    pub const HAS_PASSWORD_FIELD: &str = "has_password_field";
}

const STANDARD_FEATURES: &[FeatureSpec] = &[
    FeatureSpec::new(names::URL_LENGTH, FeatureKind::Count),
    FeatureSpec::new(names::HOSTNAME_LENGTH, FeatureKind::Count),
    FeatureSpec::new(names::PATH_LENGTH, FeatureKind::Count),
    FeatureSpec::new(names::NUM_DOTS, FeatureKind::Count),
    FeatureSpec::new(names::NUM_HYPHENS, FeatureKind::Count),
    FeatureSpec::new(names::NUM_AT, FeatureKind::Count),
    FeatureSpec::new(names::NUM_SPECIAL_CHARS, FeatureKind::Count),
    FeatureSpec::new(names::NUM_DIGITS, FeatureKind::Count),
    FeatureSpec::new(names::NUM_SUBDOMAINS, FeatureKind::Count),
    FeatureSpec::new(names::HAS_IP_HOST, FeatureKind::Flag),
    FeatureSpec::new(names::USES_HTTPS, FeatureKind::Flag),
    FeatureSpec::new(names::NUM_SUSPICIOUS_KEYWORDS, FeatureKind::Count),
    FeatureSpec::new(names::TLS_VALID, FeatureKind::Flag),
    FeatureSpec::new(names::DOMAIN_AGE_DAYS, FeatureKind::Days),
    FeatureSpec::new(names::REDIRECT_COUNT, FeatureKind::Count),
    FeatureSpec::new(names::HAS_PASSWORD_FIELD, FeatureKind::Flag),
];

/// Ordered, fixed set of named features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    specs: &'static [FeatureSpec],
}

impl FeatureSchema {
    /// The schema shared by the extractor and the bundled models
    pub const fn standard() -> Self {
        Self {
            specs: STANDARD_FEATURES,
        }
    }

    /// Build a schema from a static feature list
    pub const fn new(specs: &'static [FeatureSpec]) -> Self {
        Self { specs }
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn specs(&self) -> &'static [FeatureSpec] {
        self.specs
    }

    /// Feature names in schema order
    pub fn names(&self) -> impl DoubleEndedIterator<Item = &'static str> + ExactSizeIterator + '_ {
        self.specs.iter().map(|s| s.name)
    }

    /// Position of a feature by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    /// Check that a model artifact declares exactly this schema's names, in order
    pub fn check_names<S: AsRef<str>>(&self, declared: &[S]) -> Result<()> {
        if declared.len() != self.len() {
            return Err(Error::schema(format!(
                "model declares {} features, schema has {}",
                declared.len(),
                self.len()
            )));
        }

        for (i, (declared, spec)) in declared.iter().zip(self.specs).enumerate() {
            if declared.as_ref() != spec.name {
                return Err(Error::schema(format!(
                    "feature {} is '{}', schema expects '{}'",
                    i,
                    declared.as_ref(),
                    spec.name
                )));
            }
        }

        Ok(())
    }

    /// Validate a vector: same schema, same length, every value in its domain
    pub fn validate(&self, features: &FeatureVector) -> Result<()> {
        if features.schema != *self {
            return Err(Error::schema("feature vector was built for a different schema"));
        }

        if features.values.len() != self.len() {
            return Err(Error::schema(format!(
                "expected {} features, got {}",
                self.len(),
                features.values.len()
            )));
        }

        for (spec, value) in self.specs.iter().zip(&features.values) {
            if !spec.kind.accepts(*value) {
                return Err(Error::schema(format!(
                    "feature '{}' has out-of-range value {}",
                    spec.name, value
                )));
            }
        }

        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}

/// Ordered numeric features of one URL
///
/// Construction does not validate; the predictor validates before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f32>,
}

impl FeatureVector {
    /// Wrap raw values laid out in `schema` order
    pub fn new(schema: FeatureSchema, values: Vec<f32>) -> Self {
        Self { schema, values }
    }

    /// Assemble a vector from `(name, value)` pairs in any order
    ///
    /// Every schema feature must be supplied exactly once.
    pub fn from_named<'a>(
        schema: FeatureSchema,
        pairs: impl IntoIterator<Item = (&'a str, f32)>,
    ) -> Result<Self> {
        let mut slots: Vec<Option<f32>> = vec![None; schema.len()];

        for (name, value) in pairs {
            let idx = schema
                .index_of(name)
                .ok_or_else(|| Error::schema(format!("unknown feature '{}'", name)))?;
            if slots[idx].replace(value).is_some() {
                return Err(Error::schema(format!("feature '{}' supplied twice", name)));
            }
        }

        let values = slots
            .into_iter()
            .zip(schema.names())
            .map(|(slot, name)| {
                slot.ok_or_else(|| Error::schema(format!("feature '{}' missing", name)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a feature value by name
    pub fn get(&self, name: &str) -> Option<f32> {
        self.schema
            .index_of(name)
            .and_then(|i| self.values.get(i).copied())
    }

    /// `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.schema.names().zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn zeros() -> FeatureVector {
        FeatureVector::new(FeatureSchema::standard(), vec![0.0; 16])
    }

    #[test]
    fn test_standard_schema_layout() {
        let schema = FeatureSchema::standard();
        assert_eq!(schema.len(), 16);
        assert_eq!(schema.index_of(names::URL_LENGTH), Some(0));
        assert_eq!(schema.index_of(names::HAS_IP_HOST), Some(9));
        assert_eq!(schema.index_of(names::TLS_VALID), Some(12));
        assert_eq!(schema.index_of(names::HAS_PASSWORD_FIELD), Some(15));
        assert_eq!(schema.index_of("nope"), None);
    }

    #[test]
    fn test_validate_accepts_zeros() {
        assert!(FeatureSchema::standard().validate(&zeros()).is_ok());
    }

    #[test]
    fn test_validate_rejects_short_vector() {
        let short = FeatureVector::new(FeatureSchema::standard(), vec![0.0; 15]);
        let err = FeatureSchema::standard().validate(&short).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[test]
    fn test_validate_rejects_long_vector() {
        let long = FeatureVector::new(FeatureSchema::standard(), vec![0.0; 17]);
        assert!(FeatureSchema::standard().validate(&long).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_flag_and_nan() {
        let schema = FeatureSchema::standard();

        let mut values = vec![0.0; 16];
        values[9] = 0.5;
        assert!(schema.validate(&FeatureVector::new(schema, values)).is_err());

        let mut values = vec![0.0; 16];
        values[0] = f32::NAN;
        assert!(schema.validate(&FeatureVector::new(schema, values)).is_err());
    }

    #[test]
    fn test_domain_age_unknown_sentinel() {
        let schema = FeatureSchema::standard();
        let mut values = vec![0.0; 16];
        values[13] = UNKNOWN_DAYS;
        assert!(schema.validate(&FeatureVector::new(schema, values.clone())).is_ok());

        values[13] = -2.0;
        assert!(schema.validate(&FeatureVector::new(schema, values)).is_err());
    }

    #[test]
    fn test_validate_rejects_foreign_schema() {
        static OTHER: &[FeatureSpec] = &[FeatureSpec::new("only", FeatureKind::Count)];
        let foreign = FeatureVector::new(FeatureSchema::new(OTHER), vec![1.0]);
        assert!(FeatureSchema::standard().validate(&foreign).is_err());
    }

    #[test]
    fn test_from_named_any_order() {
        let schema = FeatureSchema::standard();
        let pairs: Vec<(&str, f32)> = schema
            .names()
            .enumerate()
            .map(|(i, n)| (n, i as f32))
            .rev()
            .collect();

        let vector = FeatureVector::from_named(schema, pairs).unwrap();
        assert_eq!(vector.values()[0], 0.0);
        assert_eq!(vector.values()[15], 15.0);
        assert_eq!(vector.get(names::NUM_AT), Some(5.0));
    }

    #[test]
    fn test_names_iterate_both_ways() {
        let schema = FeatureSchema::standard();
        assert_eq!(schema.names().len(), schema.len());
        assert_eq!(schema.names().next(), Some(names::URL_LENGTH));
        assert_eq!(schema.names().next_back(), Some(names::HAS_PASSWORD_FIELD));
    }

    #[test]
    fn test_from_named_missing_and_duplicate() {
        let schema = FeatureSchema::standard();
        let missing = FeatureVector::from_named(schema, vec![(names::URL_LENGTH, 1.0)]);
        assert!(matches!(missing, Err(Error::SchemaMismatch(_))));

        let mut pairs: Vec<(&str, f32)> = schema.names().map(|n| (n, 0.0)).collect();
        pairs.push((names::NUM_AT, 1.0));
        assert!(FeatureVector::from_named(schema, pairs).is_err());
    }

    #[test]
    fn test_check_names() {
        let schema = FeatureSchema::standard();
        let declared: Vec<String> = schema.names().map(String::from).collect();
        assert!(schema.check_names(&declared).is_ok());

        let mut swapped = declared.clone();
        swapped.swap(0, 1);
        assert!(schema.check_names(&swapped).is_err());
        assert!(schema.check_names(&declared[..10]).is_err());
    }

    #[test]
    fn test_serialize_as_ordered_map() {
        let json = serde_json::to_string(&zeros()).unwrap();
        assert!(json.starts_with("{\"url_length\":0.0,\"hostname_length\":0.0"));
    }

    proptest! {
        #[test]
        fn prop_counts_accept_non_negative(v in 0.0f32..1.0e6) {
            prop_assert!(FeatureKind::Count.accepts(v));
            prop_assert!(!FeatureKind::Count.accepts(-v - 1.0));
        }
    }
}
