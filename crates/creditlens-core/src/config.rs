//! YAML configuration.
//!
//! Resolution order: compiled defaults, then `$CREDITLENS_HOME/config.yaml`
//! (or an explicit `--config` file), then command line flags applied by the
//! caller.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scoring::{AlertPolicy, RuleThresholds, ScoreCalibration};
use crate::{ConfigError, FeatureWindows};

pub const HOME_ENV: &str = "CREDITLENS_HOME";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMethod {
    #[default]
    Model,
    Rules,
}

impl ScoringMethod {
    /// Name stored in the `method` column of the score history.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Rules => "rules",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub workers: usize,
    /// Minimum spacing between request starts.
    pub pause_ms: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            pause_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Model artifact; `$CREDITLENS_HOME/model.json` when unset.
    pub model_path: Option<PathBuf>,
    pub method: ScoringMethod,
    pub calibration: ScoreCalibration,
    pub alert: AlertPolicy,
    pub features: FeatureWindows,
    pub rules: RuleThresholds,
    pub batch: BatchSettings,
}

impl ScoringConfig {
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml, path)
    }

    /// Loads `home/config.yaml`, falling back to defaults when it does not exist.
    pub fn load_from_home(home: &Path) -> Result<Self, ConfigError> {
        let path = home.join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn model_path_in(&self, home: &Path) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| home.join("model.json"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let calibration = &self.calibration;
        if !calibration.score_scale.is_finite() || !calibration.score_offset.is_finite() {
            return Err(invalid("calibration score_scale and score_offset must be finite"));
        }
        if calibration.precision > 15 {
            return Err(invalid("calibration precision must be at most 15"));
        }
        if self.alert.drop_threshold < 0 {
            return Err(invalid("alert drop_threshold must not be negative"));
        }

        let windows = &self.features;
        if windows.short_window == 0 || windows.long_window == 0 {
            return Err(invalid("feature windows must be positive"));
        }
        if windows.volatility_window < 2 {
            return Err(invalid("volatility_window must be at least 2"));
        }
        if windows.filings_lookback_days < 0 {
            return Err(invalid("filings_lookback_days must not be negative"));
        }

        let rules = &self.rules;
        let thresholds = [
            rules.high_volatility,
            rules.moderate_volatility,
            rules.downtrend,
            rules.heavy_news,
        ];
        if thresholds.iter().any(|value| !value.is_finite()) {
            return Err(invalid("rule thresholds must be finite"));
        }
        if rules.penalties().iter().any(|penalty| !(0..=100).contains(penalty)) {
            return Err(invalid("rule penalties must be between 0 and 100"));
        }

        if self.batch.workers == 0 {
            return Err(invalid("batch workers must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_owned())
}

/// `$CREDITLENS_HOME`, else `~/.creditlens`, else `./.creditlens`.
pub fn resolve_creditlens_home() -> PathBuf {
    if let Some(path) = env::var_os(HOME_ENV) {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".creditlens");
    }

    PathBuf::from(".creditlens")
}
