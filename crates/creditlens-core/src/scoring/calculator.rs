use serde::{Deserialize, Serialize};

use super::{MODEL_UNAVAILABLE, UNAVAILABLE_SCORE};
use crate::model::{FeatureContributions, Prediction};

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

/// Linear map from raw model output onto the 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreCalibration {
    pub score_scale: f64,
    pub score_offset: f64,
    /// Decimal places kept in explanations.
    pub precision: u32,
}

impl Default for ScoreCalibration {
    fn default() -> Self {
        Self {
            score_scale: 2000.0,
            score_offset: 50.0,
            precision: 5,
        }
    }
}

impl ScoreCalibration {
    /// `clamp(round(offset + raw * scale), 0, 100)`, ties to even.
    pub fn score(&self, raw_value: f64) -> i32 {
        let calibrated = (self.score_offset + raw_value * self.score_scale).round_ties_even();
        if calibrated.is_nan() {
            tracing::warn!(raw_value, "calibrated score is not a number; using minimum");
            return MIN_SCORE;
        }
        calibrated.clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as i32
    }

    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.precision.min(15) as i32);
        (value * factor).round_ties_even() / factor
    }
}

/// Additive explanation of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub base_value: f64,
    pub prediction: f64,
    pub contributions: FeatureContributions,
}

impl Explanation {
    /// `|base + Σ contributions - prediction|`.
    pub fn reconciliation_gap(&self) -> f64 {
        (self.base_value + self.contributions.sum() - self.prediction).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScoreExplanation {
    Attribution(Explanation),
    Rules(Vec<String>),
    Unavailable(String),
}

impl ScoreExplanation {
    pub fn attribution(&self) -> Option<&Explanation> {
        match self {
            Self::Attribution(explanation) => Some(explanation),
            Self::Rules(_) | Self::Unavailable(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditScoreResult {
    pub score: i32,
    pub explanation: ScoreExplanation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_headline: Option<String>,
    /// Human-readable drop alert, see [`super::ScoreAlert::message`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

impl CreditScoreResult {
    pub fn unavailable() -> Self {
        Self {
            score: UNAVAILABLE_SCORE,
            explanation: ScoreExplanation::Unavailable(String::from(MODEL_UNAVAILABLE)),
            key_headline: None,
            alert: None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.score == UNAVAILABLE_SCORE
    }

    pub fn with_key_headline(mut self, headline: impl Into<String>) -> Self {
        self.key_headline = Some(headline.into());
        self
    }

    pub fn with_alert(mut self, alert: Option<String>) -> Self {
        self.alert = alert;
        self
    }
}

/// Turns model predictions into bounded, explained scores.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreCalculator {
    calibration: ScoreCalibration,
}

impl ScoreCalculator {
    pub fn new(calibration: ScoreCalibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> ScoreCalibration {
        self.calibration
    }

    pub fn calculate(&self, prediction: &Prediction) -> CreditScoreResult {
        let Prediction::Scored {
            raw_value,
            base_value,
            contributions,
        } = prediction
        else {
            return CreditScoreResult::unavailable();
        };

        let calibration = &self.calibration;
        CreditScoreResult {
            score: calibration.score(*raw_value),
            explanation: ScoreExplanation::Attribution(Explanation {
                base_value: calibration.round(*base_value),
                prediction: calibration.round(*raw_value),
                contributions: contributions
                    .iter()
                    .map(|(name, value)| (name, calibration.round(value)))
                    .collect(),
            }),
            key_headline: None,
            alert: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(raw_value: f64, base_value: f64, contributions: &[(&str, f64)]) -> Prediction {
        Prediction::Scored {
            raw_value,
            base_value,
            contributions: contributions.iter().copied().collect(),
        }
    }

    #[test]
    fn calibrates_and_rounds_explanation() {
        let calculator = ScoreCalculator::default();
        let prediction = scored(
            0.01,
            0.004,
            &[("close", 0.004_123_456), ("volatility_30d", 0.001_876_544)],
        );
        let result = calculator.calculate(&prediction);

        assert_eq!(result.score, 70);
        let explanation = result.explanation.attribution().expect("attribution");
        assert_eq!(explanation.prediction, 0.01);
        assert_eq!(explanation.contributions.get("close"), Some(0.00412));
        assert_eq!(explanation.contributions.get("volatility_30d"), Some(0.00188));
        assert!(explanation.reconciliation_gap() < 1e-3);
    }

    #[test]
    fn score_is_clamped() {
        let calibration = ScoreCalibration::default();
        assert_eq!(calibration.score(1.0), 100);
        assert_eq!(calibration.score(-1.0), 0);
        assert_eq!(calibration.score(f64::INFINITY), 100);
        assert_eq!(calibration.score(f64::NEG_INFINITY), 0);
        assert_eq!(calibration.score(f64::NAN), 0);
    }

    #[test]
    fn halves_round_to_even() {
        let calibration = ScoreCalibration {
            score_scale: 1.0,
            score_offset: 0.0,
            precision: 0,
        };
        assert_eq!(calibration.score(50.5), 50);
        assert_eq!(calibration.score(51.5), 52);
        assert_eq!(calibration.round(2.5), 2.0);
    }

    #[test]
    fn unavailable_prediction_yields_sentinel() {
        let result = ScoreCalculator::default().calculate(&Prediction::Unavailable);
        assert_eq!(result.score, UNAVAILABLE_SCORE);
        assert_eq!(
            result.explanation,
            ScoreExplanation::Unavailable(MODEL_UNAVAILABLE.to_owned())
        );
        let json = serde_json::to_string(&result).expect("serialize");
        assert_eq!(json, r#"{"score":-1,"explanation":"Model unavailable"}"#);
    }

    #[test]
    fn explanation_serializes_camel_case_in_schema_order() {
        let result = ScoreCalculator::default()
            .calculate(&scored(0.0, 0.0, &[("b", 0.0), ("a", 0.0)]))
            .with_key_headline("Acme wins contract");
        let json = serde_json::to_string(&result).expect("serialize");
        assert_eq!(
            json,
            r#"{"score":50,"explanation":{"baseValue":0.0,"prediction":0.0,"contributions":{"b":0.0,"a":0.0}},"keyHeadline":"Acme wins contract"}"#
        );
    }
}
