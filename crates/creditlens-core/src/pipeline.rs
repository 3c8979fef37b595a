//! End-to-end scoring of one ticker: engineer, reconcile, predict, calibrate.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{ScoringConfig, ScoringMethod};
use crate::features::{EngineeredFeatures, FeatureEngineer, FeatureVector, ReconciliationReport};
use crate::model::ScoringModel;
use crate::scoring::{AlertPolicy, CreditScoreResult, RuleBasedScorer, ScoreAlert, ScoreCalculator};
use crate::{InsufficientDataError, ScoringInputs, SentimentScorer};

/// Outcome of scoring one ticker, with everything needed to persist and explain it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntity {
    pub method: ScoringMethod,
    pub features: EngineeredFeatures,
    /// Model input; `None` for the rule scorer and for a disabled model.
    pub vector: Option<FeatureVector>,
    pub report: ReconciliationReport,
    pub result: CreditScoreResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<ScoreAlert>,
}

impl ScoredEntity {
    /// Features as stored with the score: the model vector when there is one.
    pub fn persisted_features(&self) -> Result<String, serde_json::Error> {
        match &self.vector {
            Some(vector) => serde_json::to_string(vector),
            None => serde_json::to_string(&self.features.features),
        }
    }

    pub fn persisted_explanation(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.result.explanation)
    }

    /// Compares against the previously stored score and records any alert.
    pub fn apply_alert(&mut self, policy: &AlertPolicy, previous: Option<i32>) {
        self.alert = policy.evaluate(previous, self.result.score);
        if let Some(alert) = &self.alert {
            let message = alert.message(self.features.ticker.as_str());
            tracing::warn!(
                ticker = %self.features.ticker,
                previous = alert.previous,
                current = alert.current,
                drop = alert.drop,
                "significant credit score drop"
            );
            self.result.alert = Some(message);
        }
    }
}

/// Feature engineer, model and calculator wired together.
///
/// Cheap to clone; the model is shared.
#[derive(Debug, Clone)]
pub struct CreditScorer {
    engineer: FeatureEngineer,
    model: Arc<ScoringModel>,
    calculator: ScoreCalculator,
    rules: RuleBasedScorer,
    method: ScoringMethod,
}

impl CreditScorer {
    pub fn new(engineer: FeatureEngineer, model: Arc<ScoringModel>, calculator: ScoreCalculator) -> Self {
        Self {
            engineer,
            model,
            calculator,
            rules: RuleBasedScorer::default(),
            method: ScoringMethod::Model,
        }
    }

    pub fn from_config(config: &ScoringConfig, model: Arc<ScoringModel>) -> Self {
        Self {
            engineer: FeatureEngineer::new(SentimentScorer::default(), config.features),
            model,
            calculator: ScoreCalculator::new(config.calibration),
            rules: RuleBasedScorer::new(config.rules),
            method: config.method,
        }
    }

    pub fn with_method(mut self, method: ScoringMethod) -> Self {
        self.method = method;
        self
    }

    pub fn method(&self) -> ScoringMethod {
        self.method
    }

    pub fn model(&self) -> &ScoringModel {
        &self.model
    }

    /// Scores one ticker.
    ///
    /// # Errors
    /// Only an empty price series fails. A disabled model yields the
    /// unavailable sentinel result.
    pub fn score(&self, inputs: &ScoringInputs) -> Result<ScoredEntity, InsufficientDataError> {
        let features = self.engineer.engineer_with_filings(
            &inputs.ticker,
            &inputs.bars,
            &inputs.articles,
            &inputs.macro_snapshot,
            &inputs.filings,
        )?;

        let (vector, report, result) = match self.method {
            ScoringMethod::Rules => (
                None,
                ReconciliationReport::default(),
                self.rules.calculate(&features.features),
            ),
            ScoringMethod::Model if !self.model.is_available() => (
                None,
                ReconciliationReport::default(),
                CreditScoreResult::unavailable(),
            ),
            ScoringMethod::Model => {
                let (vector, report) = features.reconcile(self.model.feature_names());
                let prediction = self.model.predict(&vector);
                (Some(vector), report, self.calculator.calculate(&prediction))
            }
        };
        let result = result.with_key_headline(features.key_headline());

        tracing::info!(
            ticker = %inputs.ticker,
            method = ?self.method,
            score = result.score,
            defaulted = report.defaulted_count(),
            "credit score calculated"
        );

        Ok(ScoredEntity {
            method: self.method,
            features,
            vector,
            report,
            result,
            alert: None,
        })
    }
}
