use std::time::Instant;

use creditlens_core::Ticker;
use creditlens_warehouse::ScoreRecord;
use serde::Serialize;

use crate::cli::HistoryArgs;
use crate::error::CliError;

use super::{elapsed_ms, open_warehouse, CommandResult, Context};

#[derive(Debug, Serialize)]
struct HistoryResponseData {
    ticker: String,
    limit: usize,
    scores: Vec<ScoreRecord>,
}

pub async fn run(args: &HistoryArgs, context: &Context) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let ticker = Ticker::parse(&args.ticker)?;
    let limit = args.limit;

    let warehouse = open_warehouse(context.warehouse_config()).await?;
    let lookup = ticker.clone();
    let scores =
        tokio::task::spawn_blocking(move || warehouse.score_history(&lookup, limit)).await??;

    let mut result = CommandResult::ok(serde_json::to_value(HistoryResponseData {
        ticker: ticker.to_string(),
        limit,
        scores,
    })?);
    if result.data["scores"].as_array().is_some_and(Vec::is_empty) {
        result = result.with_warning(format!("no stored scores for {ticker}"));
    }
    Ok(result.with_latency(elapsed_ms(started)))
}
