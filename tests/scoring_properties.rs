//! Property tests for the numeric guarantees of the scoring pipeline.

use creditlens_core::features::trend_indicator;
use creditlens_core::{FeatureMap, Prediction, SentimentScorer, UNAVAILABLE_SCORE};
use creditlens_tests::*;
use proptest::prelude::*;

fn arb_linear_features() -> impl Strategy<Value = Vec<f64>> {
    // close, ma_30, ma_90, trend, volatility, sentiment, pos, neg, news, FEDFUNDS, UNRATE, HY, filings
    (
        (1.0..1_000.0f64, 1.0..1_000.0f64, 1.0..1_000.0f64, 0.5..1.5f64),
        (0.0..0.2f64, -1.0..1.0f64, 0.0..20.0f64, 0.0..20.0f64),
        (0.0..100.0f64, 0.0..10.0f64, 2.0..15.0f64, 1.0..20.0f64, 0.0..20.0f64),
    )
        .prop_map(|((a, b, c, d), (e, f, g, h), (i, j, k, l, m))| {
            vec![a, b, c, d, e, f, g, h, i, j, k, l, m]
        })
}

fn arb_tree_features() -> impl Strategy<Value = Vec<f64>> {
    (0.5..1.5f64, 0.0..0.1f64, -1.0..1.0f64).prop_map(|(trend, vol, sentiment)| {
        vec![trend, vol, sentiment]
    })
}

fn computed(model: &ScoringModel, values: &[f64]) -> FeatureMap {
    model
        .feature_names()
        .iter()
        .cloned()
        .zip(values.iter().copied())
        .collect()
}

fn assert_additive(model: &ScoringModel, values: &[f64]) -> Result<(), TestCaseError> {
    let (vector, report) = creditlens_core::reconcile(&computed(model, values), model.feature_names());
    prop_assert!(report.is_clean());

    let prediction = model.predict(&vector);
    let Prediction::Scored {
        raw_value,
        base_value,
        contributions,
    } = &prediction
    else {
        return Err(TestCaseError::fail("model should be available"));
    };
    prop_assert!((base_value + contributions.sum() - raw_value).abs() < 1e-6);

    let result = ScoreCalculator::default().calculate(&prediction);
    prop_assert!((0..=100).contains(&result.score));
    let explanation = result.explanation.attribution().expect("attribution");
    prop_assert!(explanation.reconciliation_gap() < 1e-3);
    Ok(())
}

proptest! {
    #[test]
    fn linear_attributions_add_up(values in arb_linear_features()) {
        let model = load_demo_model("model.json");
        assert_additive(&model, &values)?;
    }

    #[test]
    fn tree_attributions_add_up(values in arb_tree_features()) {
        let model = load_demo_model("tree_model.json");
        assert_additive(&model, &values)?;
    }

    #[test]
    fn calibrated_scores_stay_on_the_scale(raw in prop::num::f64::ANY) {
        let result = ScoreCalculator::default().calculate(&Prediction::Scored {
            raw_value: raw,
            base_value: 0.0,
            contributions: Default::default(),
        });
        prop_assert!((0..=100).contains(&result.score));
        prop_assert_ne!(result.score, UNAVAILABLE_SCORE);
    }

    #[test]
    fn sentiment_is_bounded(text in ".{0,200}") {
        let score = SentimentScorer::default().score(&text);
        prop_assert!((-1.0..=1.0).contains(&score), "score {} for {:?}", score, text);
    }

    #[test]
    fn mean_sentiment_is_the_mean_of_scores(
        titles in prop::collection::vec(
            prop::sample::select(vec![
                "record profit beats expectations",
                "lawsuit and layoffs hit shares",
                "not a strong quarter",
                "very weak guidance",
                "shares unchanged",
            ]),
            1..12,
        )
    ) {
        let scorer = SentimentScorer::default();
        let expected = titles.iter().map(|title| scorer.score(title)).sum::<f64>() / titles.len() as f64;
        let mean = scorer.mean_sentiment(&titles).expect("non-empty");
        prop_assert!((mean - expected).abs() < 1e-9);
    }
}

#[test]
fn when_the_long_average_is_zero_the_trend_is_exactly_one() {
    assert_eq!(trend_indicator(5.0, 0.0), 1.0);
    assert_eq!(trend_indicator(0.0, 0.0), 1.0);
}

#[test]
fn empty_text_is_neutral() {
    assert_eq!(SentimentScorer::default().score(""), 0.0);
}
