use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Longest accepted ticker, exchange suffix included (`RELIANCE.NS`).
const TICKER_MAX_CHARS: usize = 15;

/// Upper-cased exchange ticker of the scored company.
///
/// Score history is keyed by this value, so `acme`, ` ACME ` and `Acme`
/// all land on the same rows. An optional exchange suffix follows the last
/// `.` (`RELIANCE.NS`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

fn reject(value: &str, reason: &'static str) -> ValidationError {
    ValidationError::InvalidTicker {
        value: value.to_owned(),
        reason,
    }
}

impl Ticker {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let Some(first) = normalized.chars().next() else {
            return Err(ValidationError::EmptyTicker);
        };

        if !first.is_ascii_uppercase() {
            return Err(reject(input, "must start with a letter"));
        }
        if normalized.chars().count() > TICKER_MAX_CHARS {
            return Err(reject(input, "longer than 15 characters"));
        }
        if !normalized
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-'))
        {
            return Err(reject(input, "only letters, digits, '.' and '-' are allowed"));
        }
        if normalized.ends_with(['.', '-']) {
            return Err(reject(input, "must not end with a separator"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `suffix` names this ticker in a flattened market column such
    /// as `Close_BRK-B`. Data vendors spell class shares with `-` or `.`.
    pub fn labels_column(&self, suffix: &str) -> bool {
        suffix.len() == self.0.len()
            && suffix
                .chars()
                .zip(self.0.chars())
                .all(|(theirs, ours)| match (theirs, ours) {
                    ('-' | '.', '-' | '.') => true,
                    _ => theirs.eq_ignore_ascii_case(&ours),
                })
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}
