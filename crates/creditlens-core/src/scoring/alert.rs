use serde::{Deserialize, Serialize};

use super::UNAVAILABLE_SCORE;

/// Points a score must fall by before an alert fires.
pub const DEFAULT_DROP_THRESHOLD: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPolicy {
    pub drop_threshold: i32,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            drop_threshold: DEFAULT_DROP_THRESHOLD,
        }
    }
}

impl AlertPolicy {
    pub fn evaluate(&self, previous: Option<i32>, current: i32) -> Option<ScoreAlert> {
        previous.and_then(|previous| detect_significant_drop(previous, current, self.drop_threshold))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreAlert {
    pub previous: i32,
    pub current: i32,
    pub drop: i32,
}

impl ScoreAlert {
    pub fn message(&self, ticker: &str) -> String {
        format!(
            "{ticker} credit score dropped {} points ({} -> {})",
            self.drop, self.previous, self.current
        )
    }
}

/// Fires when `current < previous - threshold`.
///
/// The unavailable sentinel on either side never alerts.
pub fn detect_significant_drop(previous: i32, current: i32, threshold: i32) -> Option<ScoreAlert> {
    if previous == UNAVAILABLE_SCORE || current == UNAVAILABLE_SCORE {
        return None;
    }
    if current < previous.saturating_sub(threshold) {
        Some(ScoreAlert {
            previous,
            current,
            drop: previous.saturating_sub(current),
        })
    } else {
        None
    }
}
