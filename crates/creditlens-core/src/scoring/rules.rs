use serde::{Deserialize, Serialize};

use super::{CreditScoreResult, ScoreExplanation, MAX_SCORE, MIN_SCORE};
use crate::features::{names, FeatureMap};

/// Cut-offs and penalties for the heuristic scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    pub high_volatility: f64,
    pub high_volatility_penalty: i32,
    pub moderate_volatility: f64,
    pub moderate_volatility_penalty: i32,
    pub downtrend: f64,
    pub downtrend_penalty: i32,
    pub heavy_news: f64,
    pub heavy_news_penalty: i32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            high_volatility: 0.03,
            high_volatility_penalty: 25,
            moderate_volatility: 0.015,
            moderate_volatility_penalty: 10,
            downtrend: 0.9,
            downtrend_penalty: 20,
            heavy_news: 15.0,
            heavy_news_penalty: 5,
        }
    }
}

impl RuleThresholds {
    pub fn penalties(&self) -> [i32; 4] {
        [
            self.high_volatility_penalty,
            self.moderate_volatility_penalty,
            self.downtrend_penalty,
            self.heavy_news_penalty,
        ]
    }
}

/// Model-free scorer: starts at 100 and subtracts fixed penalties.
///
/// Missing features read as neutral (volatility 0, trend 1, no news).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuleBasedScorer {
    thresholds: RuleThresholds,
}

impl RuleBasedScorer {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn calculate(&self, features: &FeatureMap) -> CreditScoreResult {
        let rules = &self.thresholds;
        let mut score = MAX_SCORE;
        let mut reasons = Vec::new();

        let volatility = features.get(names::VOLATILITY).unwrap_or(0.0);
        if volatility > rules.high_volatility {
            score = score.saturating_sub(rules.high_volatility_penalty);
            reasons.push(format!(
                "High 30-day volatility ({volatility:.2}) indicates increased market risk."
            ));
        } else if volatility > rules.moderate_volatility {
            score = score.saturating_sub(rules.moderate_volatility_penalty);
            reasons.push(format!(
                "Moderate 30-day volatility ({volatility:.2}) suggests some market uncertainty."
            ));
        }

        let trend = features.get(names::TREND_90D).unwrap_or(1.0);
        if trend < rules.downtrend {
            score = score.saturating_sub(rules.downtrend_penalty);
            reasons.push(format!(
                "Stock is in a significant downtrend (trading at {trend:.2} of its 90-day average)."
            ));
        }

        let news_volume = features.get(names::NEWS_VOLUME).unwrap_or(0.0);
        if news_volume > rules.heavy_news {
            score = score.saturating_sub(rules.heavy_news_penalty);
            reasons.push(format!(
                "High volume of recent news ({news_volume}) suggests a major ongoing event."
            ));
        }

        CreditScoreResult {
            score: score.clamp(MIN_SCORE, MAX_SCORE),
            explanation: ScoreExplanation::Rules(reasons),
            key_headline: None,
            alert: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(result: &CreditScoreResult) -> &[String] {
        match &result.explanation {
            ScoreExplanation::Rules(reasons) => reasons,
            other => panic!("expected rule reasons, got {other:?}"),
        }
    }

    #[test]
    fn calm_company_keeps_full_score() {
        let features: FeatureMap = [("volatility_30d", 0.01), ("trend_90d", 1.05)]
            .into_iter()
            .collect();
        let result = RuleBasedScorer::default().calculate(&features);
        assert_eq!(result.score, 100);
        assert!(reasons(&result).is_empty());
    }

    #[test]
    fn every_penalty_applies() {
        let features: FeatureMap = [
            ("volatility_30d", 0.05),
            ("trend_90d", 0.8),
            ("news_volume", 20.0),
        ]
        .into_iter()
        .collect();
        let result = RuleBasedScorer::default().calculate(&features);
        assert_eq!(result.score, 100 - 25 - 20 - 5);
        assert_eq!(reasons(&result).len(), 3);
        assert!(reasons(&result)[0].starts_with("High 30-day volatility (0.05)"));
    }

    #[test]
    fn moderate_volatility_takes_smaller_penalty() {
        let features: FeatureMap = [("volatility_30d", 0.02)].into_iter().collect();
        assert_eq!(RuleBasedScorer::default().calculate(&features).score, 90);
    }

    #[test]
    fn missing_features_are_neutral() {
        assert_eq!(RuleBasedScorer::default().calculate(&FeatureMap::new()).score, 100);
    }

    #[test]
    fn score_is_floored_at_zero() {
        let scorer = RuleBasedScorer::new(RuleThresholds {
            high_volatility_penalty: 90,
            downtrend_penalty: 90,
            ..RuleThresholds::default()
        });
        let features: FeatureMap = [("volatility_30d", 0.05), ("trend_90d", 0.5)]
            .into_iter()
            .collect();
        assert_eq!(scorer.calculate(&features).score, 0);
    }

    #[test]
    fn extreme_penalties_saturate_instead_of_overflowing() {
        let scorer = RuleBasedScorer::new(RuleThresholds {
            high_volatility_penalty: i32::MIN,
            downtrend_penalty: i32::MAX,
            ..RuleThresholds::default()
        });
        let volatile: FeatureMap = [("volatility_30d", 0.05)].into_iter().collect();
        assert_eq!(scorer.calculate(&volatile).score, 100);

        let falling: FeatureMap = [("trend_90d", 0.5)].into_iter().collect();
        assert_eq!(scorer.calculate(&falling).score, 0);
    }
}
