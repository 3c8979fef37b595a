use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use creditlens_core::{BatchSettings, CreditScorer, ScoringInputs, Ticker};
use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cli::BatchArgs;
use crate::error::CliError;

use super::score::{score_inputs, Persistence, ScoreOutput};
use super::{elapsed_ms, open_warehouse, release_model, CommandResult, Context};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// One `<TICKER>.json` document found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub symbol: String,
    pub path: PathBuf,
}

impl BatchJob {
    fn score(
        &self,
        scorer: &CreditScorer,
        persistence: Option<&Persistence>,
    ) -> Result<(ScoreOutput, Vec<String>), CliError> {
        let ticker = Ticker::parse(&self.symbol)?;
        let inputs = ScoringInputs::load(ticker, &self.path)?;
        let output = score_inputs(scorer, &inputs, persistence)?;
        Ok((output, inputs.warnings))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub ticker: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScoreOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl BatchOutcome {
    fn scored(result: ScoreOutput, warnings: Vec<String>) -> Self {
        Self {
            ticker: result.ticker.clone(),
            ok: true,
            result: Some(result),
            error: None,
            exit_code: None,
            warnings,
        }
    }

    fn failed(ticker: &str, error: &CliError) -> Self {
        Self {
            ticker: ticker.to_owned(),
            ok: false,
            result: None,
            error: Some(error.to_string()),
            exit_code: Some(error.exit_code()),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchResponseData {
    total: usize,
    scored: usize,
    failed: usize,
    results: Vec<BatchOutcome>,
}

/// `*.json` files directly under `dir`, sorted by file name.
pub fn discover_jobs(dir: &Path) -> Result<Vec<BatchJob>, CliError> {
    let mut jobs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_json = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        if !is_json || !path.is_file() {
            continue;
        }
        let Some(symbol) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        jobs.push(BatchJob {
            symbol: symbol.to_owned(),
            path: path.clone(),
        });
    }
    jobs.sort_by(|left, right| left.path.cmp(&right.path));
    Ok(jobs)
}

/// Spaces task starts `pause` apart; `None` when there is no pause.
fn start_limiter(pause: Duration) -> Option<Arc<DirectRateLimiter>> {
    Quota::with_period(pause).map(|quota| Arc::new(RateLimiter::direct(quota)))
}

/// Scores every job on at most `settings.workers` concurrent tasks.
///
/// Outcomes come back in job order. A failing ticker becomes a failed
/// outcome; only a panicked worker aborts the batch.
pub async fn score_batch(
    jobs: Vec<BatchJob>,
    scorer: CreditScorer,
    persistence: Option<Persistence>,
    settings: BatchSettings,
) -> Result<Vec<BatchOutcome>, CliError> {
    let total = jobs.len();
    let semaphore = Arc::new(Semaphore::new(settings.workers.max(1)));
    let limiter = start_limiter(Duration::from_millis(settings.pause_ms));
    let persistence = persistence.map(Arc::new);

    let mut tasks = JoinSet::new();
    for (index, job) in jobs.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|error| CliError::Command(error.to_string()))?;
        if let Some(limiter) = &limiter {
            limiter.until_ready().await;
        }

        let scorer = scorer.clone();
        let persistence = persistence.clone();
        tasks.spawn(async move {
            let symbol = job.symbol.clone();
            let scored = tokio::task::spawn_blocking(move || {
                job.score(&scorer, persistence.as_deref())
            })
            .await;
            drop(permit);

            let outcome = match scored {
                Ok(Ok((output, warnings))) => BatchOutcome::scored(output, warnings),
                Ok(Err(error)) => {
                    tracing::warn!(ticker = %symbol, error = %error, "batch ticker failed");
                    BatchOutcome::failed(&symbol, &error)
                }
                Err(join_error) => BatchOutcome::failed(&symbol, &CliError::Task(join_error)),
            };
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<BatchOutcome>> = vec![None; total];
    let mut completed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined?;
        completed += 1;
        tracing::info!(
            ticker = %outcome.ticker,
            ok = outcome.ok,
            completed,
            total,
            "batch progress"
        );
        slots[index] = Some(outcome);
    }

    Ok(slots.into_iter().flatten().collect())
}

pub async fn run(args: &BatchArgs, context: Context) -> Result<CommandResult, CliError> {
    let started = Instant::now();

    let mut settings = context.config.batch;
    if let Some(workers) = args.workers {
        settings.workers = workers;
    }
    if let Some(pause_ms) = args.pause_ms {
        settings.pause_ms = pause_ms;
    }
    if settings.workers == 0 {
        return Err(CliError::Command(String::from(
            "--workers must be at least 1",
        )));
    }

    let jobs = discover_jobs(&args.input_dir)?;
    let mut warnings = Vec::new();
    if jobs.is_empty() {
        warnings.push(format!(
            "no *.json input documents found in {}",
            args.input_dir.display()
        ));
    }

    let (model, model_warning) = context.scoring_model();
    warnings.extend(model_warning);
    let scorer = CreditScorer::from_config(&context.config, model.clone());

    let persistence = if args.scoring.no_persist || jobs.is_empty() {
        None
    } else {
        Some(Persistence {
            warehouse: open_warehouse(context.warehouse_config()).await?,
            policy: context.config.alert,
        })
    };

    let results = score_batch(jobs, scorer, persistence, settings).await?;
    release_model(model);

    let failed = results.iter().filter(|outcome| !outcome.ok).count();
    if failed > 0 {
        warnings.push(format!("{failed} of {} tickers failed", results.len()));
    }

    let data = serde_json::to_value(BatchResponseData {
        total: results.len(),
        scored: results.len() - failed,
        failed,
        results,
    })?;
    Ok(CommandResult::ok(data)
        .with_warnings(warnings)
        .with_latency(elapsed_ms(started)))
}
