//! CLI argument definitions for creditlens.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `score` | Score one ticker from a collaborator document |
//! | `batch` | Score every `<TICKER>.json` in a directory |
//! | `history` | Show stored scores for a ticker |
//! | `model` | Show model status and required features |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--config` | `$CREDITLENS_HOME/config.yaml` | YAML configuration file |
//! | `--home` | `$CREDITLENS_HOME` or `~/.creditlens` | Data directory |
//! | `--log-json` | `false` | Emit logs as JSON lines on stderr |
//!
//! # Examples
//!
//! ```bash
//! creditlens score ACME --input demos/ACME.json --model demos/model.json --pretty
//! creditlens batch --input-dir demos --workers 2
//! creditlens history ACME --limit 10
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use creditlens_core::ScoringMethod;

/// Explainable credit scores from market, news and macro data.
#[derive(Debug, Parser)]
#[command(
    name = "creditlens",
    author,
    version,
    about = "Explainable credit scores from market, news and macro data",
    long_about = "creditlens turns price history, news headlines and macro indicators into a \
0-100 credit score with a per-feature explanation, and keeps a local score history \
for drop alerts.\n\
\n\
Use 'creditlens <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Configuration file. Defaults to `config.yaml` in the home directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the config, default model and warehouse.
    #[arg(long, global = true, env = "CREDITLENS_HOME")]
    pub home: Option<PathBuf>,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score one ticker.
    Score(ScoreArgs),
    /// Score every `<TICKER>.json` document in a directory.
    Batch(BatchArgs),
    /// Show the stored score history for a ticker, oldest first.
    History(HistoryArgs),
    /// Show model availability and the feature schema it requires.
    Model(ModelArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Pretrained model with additive attribution.
    Model,
    /// Fixed volatility, trend and news-volume penalties.
    Rules,
}

impl From<MethodArg> for ScoringMethod {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Model => Self::Model,
            MethodArg::Rules => Self::Rules,
        }
    }
}

/// Options shared by the scoring commands.
#[derive(Debug, Clone, Args)]
pub struct ScoringArgs {
    /// Model artifact (JSON). Overrides `model_path` from the config.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Scoring method.
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Multiplier applied to the raw model output.
    #[arg(long)]
    pub score_scale: Option<f64>,

    /// Score assigned to a raw model output of zero.
    #[arg(long)]
    pub score_offset: Option<f64>,

    /// Do not read or write the score history.
    #[arg(long, default_value_t = false)]
    pub no_persist: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ScoreArgs {
    /// Ticker symbol (e.g. ACME, BRK.B).
    pub ticker: String,

    /// Collaborator document with `market_data`, `news`, `macro` and `filings`.
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub scoring: ScoringArgs,
}

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// Directory of `<TICKER>.json` documents.
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Maximum tickers scored concurrently.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Minimum pause between ticker starts, in milliseconds.
    #[arg(long)]
    pub pause_ms: Option<u64>,

    #[command(flatten)]
    pub scoring: ScoringArgs,
}

#[derive(Debug, Clone, Args)]
pub struct HistoryArgs {
    /// Ticker symbol.
    pub ticker: String,

    /// Number of most recent scores to return.
    #[arg(long, default_value_t = 30)]
    pub limit: usize,
}

#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// Model artifact (JSON). Overrides `model_path` from the config.
    #[arg(long)]
    pub model: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_score_with_overrides() {
        let cli = Cli::try_parse_from([
            "creditlens",
            "score",
            "acme",
            "--input",
            "acme.json",
            "--method",
            "rules",
            "--score-scale",
            "1500",
            "--no-persist",
            "--pretty",
        ])
        .expect("valid arguments");

        assert!(cli.pretty);
        let Command::Score(args) = cli.command else {
            panic!("expected score command");
        };
        assert_eq!(args.ticker, "acme");
        assert_eq!(args.scoring.method, Some(MethodArg::Rules));
        assert_eq!(args.scoring.score_scale, Some(1500.0));
        assert!(args.scoring.no_persist);
    }

    #[test]
    fn history_limit_defaults_to_thirty() {
        let cli = Cli::try_parse_from(["creditlens", "history", "ACME"]).expect("valid");
        let Command::History(args) = cli.command else {
            panic!("expected history command");
        };
        assert_eq!(args.limit, 30);
    }
}
