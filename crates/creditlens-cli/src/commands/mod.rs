mod batch;
mod history;
mod model;
mod score;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use creditlens_core::{resolve_creditlens_home, ScoringConfig, ScoringMethod, ScoringModel};
use creditlens_warehouse::{Warehouse, WarehouseConfig};
use serde_json::Value;

use crate::cli::{Cli, Command, ScoringArgs};
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::Envelope;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            latency_ms: 0,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

/// Resolved home directory and effective configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub home: PathBuf,
    pub config: ScoringConfig,
}

impl Context {
    /// Compiled defaults, then the config file, as selected by the global flags.
    pub fn load(cli: &Cli) -> Result<Self, CliError> {
        let home = cli.home.clone().unwrap_or_else(resolve_creditlens_home);
        let config = match &cli.config {
            Some(path) => ScoringConfig::load(path)?,
            None => ScoringConfig::load_from_home(&home)?,
        };
        Ok(Self { home, config })
    }

    /// Applies command line overrides on top of the loaded configuration.
    pub fn with_scoring_overrides(mut self, args: &ScoringArgs) -> Result<Self, CliError> {
        if let Some(model) = &args.model {
            self.config.model_path = Some(model.clone());
        }
        if let Some(method) = args.method {
            self.config.method = method.into();
        }
        if let Some(scale) = args.score_scale {
            self.config.calibration.score_scale = scale;
        }
        if let Some(offset) = args.score_offset {
            self.config.calibration.score_offset = offset;
        }
        self.config.validate()?;
        Ok(self)
    }

    pub fn model_path(&self) -> PathBuf {
        self.config.model_path_in(&self.home)
    }

    pub fn warehouse_config(&self) -> WarehouseConfig {
        WarehouseConfig::in_home(&self.home)
    }

    /// Loads the configured model, degrading to the disabled state.
    ///
    /// The rule scorer never consults the model, so no artifact is read for it.
    pub fn scoring_model(&self) -> (Arc<ScoringModel>, Option<String>) {
        if self.config.method == ScoringMethod::Rules {
            return (
                Arc::new(ScoringModel::disabled("not loaded for rule-based scoring")),
                None,
            );
        }

        let path = self.model_path();
        let model = ScoringModel::load_or_disable(&path);
        let warning = model.status().reason.map(|reason| {
            format!("model unavailable ({}): {reason}", path.display())
        });
        (Arc::new(model), warning)
    }
}

/// Opens (and migrates) the score warehouse off the async runtime.
pub async fn open_warehouse(config: WarehouseConfig) -> Result<Warehouse, CliError> {
    let warehouse = tokio::task::spawn_blocking(move || Warehouse::open(config)).await??;
    Ok(warehouse)
}

/// Logs the model's shutdown once no scorer holds it any more.
pub fn release_model(model: Arc<ScoringModel>) {
    if let Ok(model) = Arc::try_unwrap(model) {
        model.close();
    }
}

pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let context = Context::load(cli)?;

    let command_result = match &cli.command {
        Command::Score(args) => {
            score::run(args, context.with_scoring_overrides(&args.scoring)?).await?
        }
        Command::Batch(args) => {
            batch::run(args, context.with_scoring_overrides(&args.scoring)?).await?
        }
        Command::History(args) => history::run(args, &context).await?,
        Command::Model(args) => model::run(args, &context)?,
    };

    let CommandResult {
        data,
        warnings,
        latency_ms,
    } = command_result;

    let mut meta = Metadata::new(latency_ms);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(Envelope { meta, data })
}
