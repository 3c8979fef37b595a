//! # Creditlens Core
//!
//! Explainable credit scoring for publicly traded companies.
//!
//! ## Overview
//!
//! Market price history, news headlines, macro indicators and (optionally)
//! regulatory filings are turned into a named feature set, aligned with the
//! schema of a pretrained model, scored, and explained feature by feature:
//!
//! - **Sentiment scorer** for short financial text
//! - **Feature engineer** producing rolling price statistics and news signals
//! - **Scoring model adapter** with additive attribution and a disabled state
//! - **Credit score calculator** mapping raw output onto 0-100
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | YAML configuration and home directory resolution |
//! | [`domain`] | Tickers, dates, bars, articles, filings, macro snapshots |
//! | [`error`] | Core error types |
//! | [`features`] | Feature engineering and schema reconciliation |
//! | [`inputs`] | Normalization of collaborator output documents |
//! | [`logging`] | Tracing subscriber setup |
//! | [`model`] | Model artifacts, prediction and attribution |
//! | [`pipeline`] | End-to-end [`CreditScorer`] |
//! | [`scoring`] | Calibration, explanations, alerts, rule scorer |
//! | [`sentiment`] | Lexicon sentiment scorer and news signals |
//!
//! ## Architecture
//!
//! ```text
//! ScoringInputs ──▶ FeatureEngineer ──▶ FeatureVector ──▶ ScoringModel
//!                   (SentimentScorer)     (reconciled)        │
//!                                                             ▼
//!                       CreditScoreResult ◀── ScoreCalculator ◀── Prediction
//! ```
//!
//! ## Degraded operation
//!
//! A model artifact that cannot be loaded does not abort the process.
//! [`ScoringModel::load_or_disable`] returns a disabled model whose every
//! prediction is [`Prediction::Unavailable`], which the calculator turns into
//! score `-1` with the explanation `"Model unavailable"`:
//!
//! ```rust
//! use creditlens_core::{Prediction, ScoreCalculator, ScoringModel};
//!
//! let model = ScoringModel::disabled("artifact missing");
//! assert!(!model.is_available());
//!
//! let result = ScoreCalculator::default().calculate(&Prediction::Unavailable);
//! assert_eq!(result.score, -1);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod features;
pub mod inputs;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod scoring;
pub mod sentiment;

pub use config::{resolve_creditlens_home, BatchSettings, ScoringConfig, ScoringMethod};
pub use domain::{
    Filing, MacroIndicator, MacroSnapshot, MarketBar, NewsArticle, PublishedAt, Ticker,
    TradingDate,
};
pub use error::{ConfigError, InputError, InsufficientDataError, ModelError, ValidationError};
pub use features::{
    reconcile, EngineeredFeatures, FeatureEngineer, FeatureMap, FeatureVector, FeatureWindows,
    ReconciliationReport,
};
pub use inputs::ScoringInputs;
pub use model::{
    Attribution, AttributionModel, FeatureContributions, ModelArtifact, ModelStatus, Prediction,
    ScoringModel,
};
pub use pipeline::{CreditScorer, ScoredEntity};
pub use scoring::{
    detect_significant_drop, AlertPolicy, CreditScoreResult, Explanation, RuleBasedScorer,
    RuleThresholds, ScoreAlert, ScoreCalculator, ScoreCalibration, ScoreExplanation,
    MODEL_UNAVAILABLE, UNAVAILABLE_SCORE,
};
pub use sentiment::{NewsSignals, SentimentScorer, NO_NEWS_HEADLINE};
