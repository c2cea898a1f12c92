//! Predictor dispatch and thresholding tests

#[allow(dead_code)]
mod mock_classifiers;

use mock_classifiers::{zero_features, FailingClassifier, FeatureEchoClassifier, MockClassifier};
use phishguard_classifiers::{
    Classifier, DecisionPolicy, ModelRegistry, Predictor, SharedRegistry, MARGIN_THRESHOLD,
};
use phishguard_core::{Error, ErrorKind, FeatureSchema, FeatureVector, Label, ModelId};
use proptest::prelude::*;
use std::sync::Arc;

fn predictor_with(id: &str, classifier: Arc<dyn Classifier>) -> Predictor {
    let mut builder = ModelRegistry::builder(FeatureSchema::standard());
    builder.register(id, classifier).unwrap();
    let registry = SharedRegistry::new(builder.build().unwrap());
    Predictor::new(registry, DecisionPolicy::default()).unwrap()
}

fn two_model_predictor(xgboost: Arc<dyn Classifier>, ann: Arc<dyn Classifier>) -> Predictor {
    let mut builder = ModelRegistry::builder(FeatureSchema::standard());
    builder.register("xgboost", xgboost).unwrap();
    builder.register("ann", ann).unwrap();
    let registry = SharedRegistry::new(builder.build().unwrap());
    Predictor::new(registry, DecisionPolicy::default()).unwrap()
}

#[test]
fn test_probability_result() {
    let predictor = predictor_with(
        "xgboost",
        Arc::new(MockClassifier::new("xgb").with_probability(0.92)),
    );

    let result = predictor.predict(&zero_features(), &ModelId::from("xgboost")).unwrap();

    assert_eq!(result.prediction(), Label::Phishing);
    assert_eq!(result.phishing_probability(), Some(0.92));
    assert_eq!(result.model_used().as_str(), "xgboost");
    assert_eq!(result.threshold(), 0.5);
    assert_eq!(result.raw_margin(), None);
}

#[test]
fn test_probability_at_threshold_is_phishing() {
    let predictor = predictor_with(
        "xgboost",
        Arc::new(MockClassifier::new("xgb").with_probability(0.5)),
    );

    let result = predictor.predict(&zero_features(), &ModelId::from("xgboost")).unwrap();
    assert_eq!(result.prediction(), Label::Phishing);
}

#[test]
fn test_margin_is_not_reported_as_probability() {
    let predictor = predictor_with(
        "ann",
        Arc::new(MockClassifier::new("raw").with_margin(-2.0)),
    );

    let result = predictor.predict(&zero_features(), &ModelId::from("ann")).unwrap();

    assert_eq!(result.prediction(), Label::Safe);
    assert_eq!(result.phishing_probability(), None);
    assert_eq!(result.raw_margin(), Some(-2.0));

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["phishing_probability"].is_null());
}

#[test]
fn test_margin_result_records_margin_cutoff() {
    let mut builder = ModelRegistry::builder(FeatureSchema::standard());
    builder
        .register("ann", Arc::new(MockClassifier::new("raw").with_margin(0.25)))
        .unwrap();
    let registry = SharedRegistry::new(builder.build().unwrap());
    let predictor = Predictor::new(registry, DecisionPolicy::new(0.7)).unwrap();

    let result = predictor.predict(&zero_features(), &ModelId::from("ann")).unwrap();

    assert_eq!(result.prediction(), Label::Phishing);
    assert_eq!(result.threshold(), MARGIN_THRESHOLD);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["threshold"], 0.0);
}

#[test]
fn test_unknown_model_has_no_partial_result() {
    let xgb = Arc::new(MockClassifier::new("xgb").with_probability(0.9));
    let ann = Arc::new(MockClassifier::new("ann").with_probability(0.1));
    let predictor = two_model_predictor(xgb.clone(), ann.clone());

    let err = predictor
        .predict(&zero_features(), &ModelId::from("random_forest"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownModel);
    assert_eq!(xgb.call_count() + ann.call_count(), 0);
}

#[test]
fn test_schema_checked_before_model_lookup() {
    let mock = Arc::new(MockClassifier::new("xgb"));
    let predictor = predictor_with("xgboost", mock.clone());

    let short = FeatureVector::new(FeatureSchema::standard(), vec![0.0; 15]);
    let err = predictor.predict(&short, &ModelId::from("random_forest")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);

    let mut values = vec![0.0; 16];
    values[9] = 0.5; // has_ip_host is a flag
    let bad_flag = FeatureVector::new(FeatureSchema::standard(), values);
    let err = predictor.predict(&bad_flag, &ModelId::from("xgboost")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);

    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_classifier_error_becomes_inference_failure() {
    let predictor = predictor_with(
        "ann",
        Arc::new(FailingClassifier::new("broken").with_error("weights corrupted")),
    );

    let err = predictor.predict(&zero_features(), &ModelId::from("ann")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InferenceFailure);
    assert!(matches!(err, Error::Inference { ref model, .. } if model == "ann"));
    assert!(err.to_string().contains("weights corrupted"));
}

#[test]
fn test_out_of_range_probability_is_inference_failure() {
    for bad in [1.5, -0.1, f32::NAN, f32::INFINITY] {
        let predictor = predictor_with(
            "xgboost",
            Arc::new(MockClassifier::new("xgb").with_probability(bad)),
        );

        let err = predictor.predict(&zero_features(), &ModelId::from("xgboost")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InferenceFailure, "score {}", bad);
    }
}

#[test]
fn test_suspicious_band_policy() {
    let mut builder = ModelRegistry::builder(FeatureSchema::standard());
    builder
        .register("xgboost", Arc::new(MockClassifier::new("xgb").with_probability(0.4)))
        .unwrap();
    let predictor = Predictor::new(
        SharedRegistry::new(builder.build().unwrap()),
        DecisionPolicy::new(0.5).with_suspicious_band(0.15),
    )
    .unwrap();

    let result = predictor.predict(&zero_features(), &ModelId::from("xgboost")).unwrap();
    assert_eq!(result.prediction(), Label::Suspicious);
}

#[test]
fn test_invalid_policy_rejected() {
    let mut builder = ModelRegistry::builder(FeatureSchema::standard());
    builder.register("xgboost", Arc::new(MockClassifier::new("xgb"))).unwrap();

    let result = Predictor::new(
        SharedRegistry::new(builder.build().unwrap()),
        DecisionPolicy::new(1.5),
    );
    assert!(result.is_err());
}

#[test]
fn test_predictions_follow_registry_swap() {
    let mut builder = ModelRegistry::builder(FeatureSchema::standard());
    builder
        .register("xgboost", Arc::new(MockClassifier::new("v1").with_probability(0.2)))
        .unwrap();
    let shared = SharedRegistry::new(builder.build().unwrap());
    let predictor = Predictor::new(shared.clone(), DecisionPolicy::default()).unwrap();

    let id = ModelId::from("xgboost");
    assert_eq!(predictor.predict(&zero_features(), &id).unwrap().prediction(), Label::Safe);

    let mut builder = ModelRegistry::builder(FeatureSchema::standard());
    builder
        .register("xgboost", Arc::new(MockClassifier::new("v2").with_probability(0.8)))
        .unwrap();
    shared.swap(builder.build().unwrap());

    assert_eq!(predictor.predict(&zero_features(), &id).unwrap().prediction(), Label::Phishing);
}

fn standard_vector() -> impl Strategy<Value = FeatureVector> {
    (
        prop::collection::vec(0u16..500, 9),
        prop::collection::vec(any::<bool>(), 2),
        0u16..10,
        any::<bool>(),
        prop::option::of(0u32..20_000),
        0u8..10,
        any::<bool>(),
    )
        .prop_map(|(counts, flags, keywords, tls, age, redirects, password)| {
            let flag = |b: bool| if b { 1.0 } else { 0.0 };
            let mut values: Vec<f32> = counts.into_iter().map(f32::from).collect();
            values.extend(flags.into_iter().map(flag));
            values.push(f32::from(keywords));
            values.push(flag(tls));
            values.push(age.map(|a| a as f32).unwrap_or(-1.0));
            values.push(f32::from(redirects));
            values.push(flag(password));
            FeatureVector::new(FeatureSchema::standard(), values)
        })
}

proptest! {
    #[test]
    fn prop_probability_bounded_and_deterministic(features in standard_vector()) {
        let predictor = predictor_with(
            "ann",
            Arc::new(FeatureEchoClassifier::new("url_length")),
        );
        let id = ModelId::from("ann");

        let first = predictor.predict(&features, &id).unwrap();
        let second = predictor.predict(&features, &id).unwrap();

        let p = first.phishing_probability().unwrap();
        prop_assert!((0.0..=1.0).contains(&p));
        prop_assert_eq!(first.prediction(), second.prediction());
        prop_assert_eq!(first.phishing_probability(), second.phishing_probability());
    }

    #[test]
    fn prop_unregistered_ids_never_resolve(id in "[a-z_]{1,16}") {
        prop_assume!(id != "xgboost" && id != "ann");
        let predictor = two_model_predictor(
            Arc::new(MockClassifier::new("xgb")),
            Arc::new(MockClassifier::new("ann")),
        );

        let err = predictor.predict(&zero_features(), &ModelId::from(id)).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::UnknownModel);
    }
}
