use std::time::Instant;

use creditlens_core::{ModelStatus, ScoringModel};
use serde::Serialize;

use crate::cli::ModelArgs;
use crate::error::CliError;

use super::{elapsed_ms, CommandResult, Context};

#[derive(Debug, Serialize)]
struct ModelResponseData {
    path: String,
    #[serde(flatten)]
    status: ModelStatus,
}

/// Reports the artifact's schema, or fails with the load error.
///
/// Scoring degrades on a broken artifact; this command is where the
/// underlying error surfaces.
pub fn run(args: &ModelArgs, context: &Context) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let path = args.model.clone().unwrap_or_else(|| context.model_path());

    let model = ScoringModel::open(&path)?;
    let status = model.status();
    model.close();

    let data = serde_json::to_value(ModelResponseData {
        path: path.display().to_string(),
        status,
    })?;
    Ok(CommandResult::ok(data).with_latency(elapsed_ms(started)))
}
