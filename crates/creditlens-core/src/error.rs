use std::path::PathBuf;

use thiserror::Error;

/// Validation errors for tickers, dates and bar values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("invalid ticker '{value}': {reason}")]
    InvalidTicker { value: String, reason: &'static str },

    #[error("timestamp must be RFC3339 or 'YYYY-MM-DD HH:MM:SS': '{value}'")]
    InvalidTimestamp { value: String },
    #[error("date must be YYYY-MM-DD or an RFC3339 UTC timestamp: '{value}'")]
    InvalidDate { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
}

/// The mandatory price series was empty, so no level features exist.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("insufficient market data for {ticker}: at least one price bar is required")]
pub struct InsufficientDataError {
    pub ticker: String,
}

/// Failures while loading or validating a model artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// Failures while decoding a scoring input document.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("input document must be a JSON object with a 'market_data' array")]
    Shape,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failures while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}
