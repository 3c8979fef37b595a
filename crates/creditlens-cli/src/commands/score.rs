use std::time::Instant;

use creditlens_core::{
    AlertPolicy, CreditScoreResult, CreditScorer, ScoreAlert, ScoredEntity, ScoringInputs, Ticker,
};
use creditlens_warehouse::{NewScoreRecord, Warehouse};
use serde::Serialize;
use serde_json::Value;

use crate::cli::ScoreArgs;
use crate::error::CliError;

use super::{elapsed_ms, open_warehouse, release_model, CommandResult, Context};

/// Score history access shared by the scoring commands.
#[derive(Clone)]
pub struct Persistence {
    pub warehouse: Warehouse,
    pub policy: AlertPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutput {
    pub ticker: String,
    pub credit_score: CreditScoreResult,
    /// Model input when a model scored the ticker, otherwise the computed features.
    pub features: Value,
    pub defaulted_features: Vec<String>,
    pub alert: Option<ScoreAlert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
}

impl ScoreOutput {
    fn from_entity(entity: ScoredEntity, record_id: Option<i64>) -> Result<Self, CliError> {
        let features = match &entity.vector {
            Some(vector) => serde_json::to_value(vector)?,
            None => serde_json::to_value(&entity.features.features)?,
        };
        Ok(Self {
            ticker: entity.features.ticker.to_string(),
            credit_score: entity.result,
            features,
            defaulted_features: entity.report.defaulted,
            alert: entity.alert,
            record_id,
        })
    }
}

/// Scores one ticker and, unless persistence is off, alerts against and
/// appends to its history.
///
/// Blocking; callers run it on `spawn_blocking`.
pub fn score_inputs(
    scorer: &CreditScorer,
    inputs: &ScoringInputs,
    persistence: Option<&Persistence>,
) -> Result<ScoreOutput, CliError> {
    let mut entity = scorer.score(inputs)?;

    let Some(persistence) = persistence else {
        return ScoreOutput::from_entity(entity, None);
    };

    let previous = persistence
        .warehouse
        .latest_score(&inputs.ticker)?
        .map(|record| record.score);
    entity.apply_alert(&persistence.policy, previous);

    let record = NewScoreRecord {
        ticker: inputs.ticker.clone(),
        score: entity.result.score,
        method: entity.method.as_str().to_owned(),
        features: entity.persisted_features()?,
        explanation: entity.persisted_explanation()?,
        key_headline: entity.result.key_headline.clone(),
    };
    let id = persistence.warehouse.save_score(&record)?;
    tracing::info!(id, ticker = %inputs.ticker, score = record.score, "score persisted");

    ScoreOutput::from_entity(entity, Some(id))
}

pub async fn run(args: &ScoreArgs, context: Context) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let ticker = Ticker::parse(&args.ticker)?;

    let input_path = args.input.clone();
    let inputs = tokio::task::spawn_blocking(move || ScoringInputs::load(ticker, &input_path))
        .await??;

    let (model, model_warning) = context.scoring_model();
    let scorer = CreditScorer::from_config(&context.config, model.clone());

    let persistence = if args.scoring.no_persist {
        None
    } else {
        Some(Persistence {
            warehouse: open_warehouse(context.warehouse_config()).await?,
            policy: context.config.alert,
        })
    };

    let mut warnings = inputs.warnings.clone();
    let output = tokio::task::spawn_blocking(move || {
        score_inputs(&scorer, &inputs, persistence.as_ref())
    })
    .await??;
    release_model(model);

    warnings.extend(model_warning);
    if !output.defaulted_features.is_empty() {
        warnings.push(format!(
            "{} required feature(s) defaulted: {}",
            output.defaulted_features.len(),
            output.defaulted_features.join(", ")
        ));
    }

    let data = serde_json::to_value(output)?;
    Ok(CommandResult::ok(data)
        .with_warnings(warnings)
        .with_latency(elapsed_ms(started)))
}
