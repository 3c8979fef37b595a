//! # Credit score calculation
//!
//! Maps model output onto a bounded 0-100 score with an additive explanation,
//! detects significant drops against the previous score, and offers the
//! model-free rule scorer as an alternative.

mod alert;
mod calculator;
mod rules;

pub use alert::{detect_significant_drop, AlertPolicy, ScoreAlert, DEFAULT_DROP_THRESHOLD};
pub use calculator::{
    CreditScoreResult, Explanation, ScoreCalculator, ScoreCalibration, ScoreExplanation,
    MAX_SCORE, MIN_SCORE,
};
pub use rules::{RuleBasedScorer, RuleThresholds};

/// Score reported when no model is available.
pub const UNAVAILABLE_SCORE: i32 = -1;

/// Explanation reported with [`UNAVAILABLE_SCORE`].
pub const MODEL_UNAVAILABLE: &str = "Model unavailable";
