// Shared fixtures for the creditlens behavior tests
pub use creditlens_core::{
    AlertPolicy, CreditScorer, FeatureEngineer, MacroIndicator, MacroSnapshot, MarketBar,
    ModelArtifact, NewsArticle, ScoreCalculator, ScoringInputs, ScoringModel, Ticker,
    TradingDate,
};
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

/// Directory holding the sample model artifacts and input documents.
pub fn demos_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos")
}

pub fn ticker(symbol: &str) -> Ticker {
    Ticker::parse(symbol).expect("valid ticker")
}

/// `count` consecutive calendar days starting 2024-01-01.
pub fn trading_days(count: usize) -> Vec<TradingDate> {
    let start = TradingDate::parse("2024-01-01").expect("date");
    let start_millis = start
        .into_inner()
        .midnight()
        .assume_utc()
        .unix_timestamp()
        * 1_000;
    (0..count as i64)
        .map(|offset| {
            TradingDate::from_unix_millis(start_millis + offset * 86_400_000).expect("date")
        })
        .collect()
}

/// Daily bars with the given closes; open/high/low bracket the close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<MarketBar> {
    trading_days(closes.len())
        .into_iter()
        .zip(closes)
        .map(|(date, &close)| {
            MarketBar::new(date, close, close * 1.01, close * 0.99, close, 1_000_000.0)
                .expect("finite bar")
        })
        .collect()
}

/// 90 closes rising linearly from 100 to 190.
pub fn rising_closes() -> Vec<f64> {
    (0..90).map(|i| 100.0 + i as f64 * 90.0 / 89.0).collect()
}

pub fn headlines(titles: &[&str]) -> Vec<NewsArticle> {
    titles.iter().map(|title| NewsArticle::headline(*title)).collect()
}

pub fn macro_snapshot() -> MacroSnapshot {
    MacroSnapshot::new()
        .with(MacroIndicator::FedFunds, 5.33)
        .with(MacroIndicator::Unemployment, 3.9)
        .with(MacroIndicator::HighYieldSpread, 3.41)
}

pub fn load_demo_model(file: &str) -> Arc<ScoringModel> {
    Arc::new(ScoringModel::open(&demos_dir().join(file)).expect("demo model loads"))
}

/// Default engineer and calculator around `model`.
pub fn scorer_with(model: Arc<ScoringModel>) -> CreditScorer {
    CreditScorer::new(FeatureEngineer::default(), model, ScoreCalculator::default())
}
