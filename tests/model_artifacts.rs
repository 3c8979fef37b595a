//! Behavior-driven tests for model artifacts
//!
//! These tests verify how artifacts on disk become scoring models, and what
//! callers see when an artifact is broken.

use std::fs;

use creditlens_core::model::ModelSpec;
use creditlens_core::{FeatureMap, ModelError, Prediction};
use creditlens_tests::*;
use tempfile::tempdir;

// =============================================================================
// Loading
// =============================================================================

#[test]
fn when_the_demo_artifacts_are_loaded_their_schemas_are_exposed() {
    // Given/When: Both demo artifacts are opened
    let linear = load_demo_model("model.json");
    let trees = load_demo_model("tree_model.json");

    // Then: Each reports its kind and required features
    let linear_status = linear.status();
    assert!(linear_status.available);
    assert_eq!(linear_status.model.as_ref().map(|info| info.kind), Some("linear"));
    assert_eq!(linear.feature_names().len(), 13);

    let tree_status = trees.status();
    assert_eq!(tree_status.model.as_ref().map(|info| info.kind), Some("tree_ensemble"));
    assert_eq!(
        trees.feature_names(),
        ["trend_indicator", "volatility_30d", "mean_sentiment"]
    );
}

#[test]
fn when_an_artifact_is_malformed_open_fails_and_load_or_disable_degrades() {
    // Given: Artifacts that are unparseable, inconsistent, or cyclic
    let temp = tempdir().expect("tempdir");
    let broken = [
        ("garbage.json", "{ not json"),
        (
            "mismatch.json",
            r#"{"feature_names":["a","b"],"model":{"kind":"linear","intercept":0.0,"coefficients":[1.0]}}"#,
        ),
        (
            "cycle.json",
            r#"{"feature_names":["a"],"model":{"kind":"tree_ensemble","trees":[{"nodes":[
                {"feature":0,"threshold":1.0,"left":0,"right":0,"value":0.0}]}]}}"#,
        ),
    ];

    for (file, body) in broken {
        let path = temp.path().join(file);
        fs::write(&path, body).expect("write artifact");

        // When: The artifact is opened strictly, then leniently
        let strict = ScoringModel::open(&path);
        let lenient = ScoringModel::load_or_disable(&path);

        // Then: The strict path errors and the lenient path is disabled
        assert!(strict.is_err(), "{file} should not load");
        assert!(!lenient.is_available(), "{file} should disable the model");
        assert!(lenient.feature_names().is_empty());
    }

    // And: Deserializing the cyclic artifact directly still cannot produce a model
    let cyclic: ModelArtifact =
        serde_json::from_str(broken[2].1).expect("cycle.json deserializes");
    assert!(matches!(
        ScoringModel::from_artifact(&cyclic),
        Err(ModelError::Invalid(_))
    ));

    let garbage = ScoringModel::open(&temp.path().join("garbage.json")).expect_err("garbage");
    assert!(matches!(garbage, ModelError::Parse(_)));
    let missing = ScoringModel::open(&temp.path().join("absent.json")).expect_err("absent");
    assert!(matches!(missing, ModelError::Read { .. }));
}

#[test]
fn when_an_artifact_omits_optional_fields_defaults_apply() {
    // Given: A linear artifact without name, version or means
    let artifact = ModelArtifact::from_json(
        r#"{"feature_names":["close"],"model":{"kind":"linear","intercept":0.5,"coefficients":[2.0]}}"#,
    )
    .expect("artifact");

    // Then: The name falls back and means are empty (treated as zeros)
    assert_eq!(artifact.name, "unnamed");
    assert!(artifact.version.is_none());
    let ModelSpec::Linear { feature_means, .. } = &artifact.model else {
        panic!("expected linear model");
    };
    assert!(feature_means.is_empty());

    // When: It predicts
    let model = ScoringModel::from_artifact(&artifact).expect("valid artifact");
    let computed: FeatureMap = [("close", 3.0)].into_iter().collect();
    let (vector, _) = creditlens_core::reconcile(&computed, model.feature_names());

    // Then: Attribution is taken against a zero background
    let Prediction::Scored {
        raw_value,
        base_value,
        contributions,
    } = model.predict(&vector)
    else {
        panic!("expected a scored prediction");
    };
    assert!((raw_value - 6.5).abs() < 1e-12);
    assert!((base_value - 0.5).abs() < 1e-12);
    assert_eq!(contributions.get("close"), Some(6.0));
}

// =============================================================================
// Tree ensembles
// =============================================================================

#[test]
fn when_a_tree_model_scores_the_split_rule_is_strictly_less_than() {
    // Given: The demo tree model and volatility exactly on the 0.02 threshold
    let trees = load_demo_model("tree_model.json");
    let at_threshold: FeatureMap = [
        ("trend_indicator", 1.2),
        ("volatility_30d", 0.02),
        ("mean_sentiment", 0.4),
    ]
    .into_iter()
    .collect();
    let (vector, report) = creditlens_core::reconcile(&at_threshold, trees.feature_names());
    assert!(report.is_clean());

    // When: It predicts
    let prediction = trees.predict(&vector);

    // Then: The sample goes right (-0.01) in the first tree and right (0.008) in the second
    let raw = prediction.raw_value().expect("scored");
    assert!((raw - (0.005 - 0.01 + 0.008)).abs() < 1e-12, "raw was {raw}");
    let Prediction::Scored {
        base_value,
        contributions,
        ..
    } = prediction
    else {
        panic!("expected a scored prediction");
    };
    assert!((base_value - (0.005 + 0.0 + 0.002)).abs() < 1e-12);
    assert!((base_value + contributions.sum() - raw).abs() < 1e-12);
    assert_eq!(contributions.get("mean_sentiment"), Some(0.0));
}
