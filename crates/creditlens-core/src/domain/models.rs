use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{PublishedAt, TradingDate, ValidationError};

/// Daily OHLCV bar with ticker-agnostic field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBar {
    pub date: TradingDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl MarketBar {
    pub fn new(
        date: TradingDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, ValidationError> {
        validate_finite("open", open)?;
        validate_finite("high", high)?;
        validate_finite("low", low)?;
        validate_finite("close", close)?;
        validate_finite("volume", volume)?;

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Bar whose open/high/low equal the close. Handy when only closes are known.
    pub fn from_close(date: TradingDate, close: f64) -> Result<Self, ValidationError> {
        Self::new(date, close, close, close, close, 0.0)
    }
}

/// News article as returned by the news collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub published_at: Option<PublishedAt>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl NewsArticle {
    pub fn headline(title: impl Into<String>) -> Self {
        Self {
            published_at: None,
            title: title.into(),
            description: None,
            source: None,
            url: None,
        }
    }
}

/// Regulatory filing reference (10-K, 10-Q, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filing {
    pub filing_date: TradingDate,
    pub form: String,
    #[serde(default)]
    pub accession_number: Option<String>,
    #[serde(default)]
    pub primary_document: Option<String>,
}

/// Macroeconomic series tracked by the macro collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroIndicator {
    /// Gross domestic product.
    Gdp,
    /// Consumer price index (inflation).
    Cpi,
    /// Federal funds effective rate.
    FedFunds,
    /// Unemployment rate.
    Unemployment,
    /// High-yield index option-adjusted spread.
    HighYieldSpread,
}

impl MacroIndicator {
    pub const ALL: [MacroIndicator; 5] = [
        Self::Gdp,
        Self::Cpi,
        Self::FedFunds,
        Self::Unemployment,
        Self::HighYieldSpread,
    ];

    /// Canonical feature name, also the key used in macro snapshots.
    pub const fn feature_name(self) -> &'static str {
        match self {
            Self::Gdp => "GDP",
            Self::Cpi => "CPI",
            Self::FedFunds => "FEDFUNDS",
            Self::Unemployment => "UNRATE",
            Self::HighYieldSpread => "BAMLH0A0HYM2",
        }
    }

    /// Upstream series identifier.
    pub const fn series_id(self) -> &'static str {
        match self {
            Self::Cpi => "CPIAUCSL",
            other => other.feature_name(),
        }
    }

    /// Matches either the feature name or the series id, ignoring case.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|indicator| {
            name.eq_ignore_ascii_case(indicator.feature_name())
                || name.eq_ignore_ascii_case(indicator.series_id())
        })
    }
}

/// Latest value per macro indicator. Absent keys are missing, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroSnapshot(BTreeMap<String, f64>);

impl MacroSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value; non-finite values are ignored and reported as `false`.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.0.insert(name.into(), value);
        true
    }

    pub fn with(mut self, indicator: MacroIndicator, value: f64) -> Self {
        self.insert(indicator.feature_name(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn indicator(&self, indicator: MacroIndicator) -> Option<f64> {
        self.get(indicator.feature_name())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite_bar_fields() {
        let date = TradingDate::parse("2024-01-02").expect("date");
        let err = MarketBar::new(date, 1.0, 1.0, 1.0, f64::NAN, 10.0).expect_err("must fail");
        assert_eq!(err, ValidationError::NonFiniteValue { field: "close" });
    }

    #[test]
    fn macro_snapshot_ignores_non_finite_values() {
        let mut snapshot = MacroSnapshot::new();
        assert!(snapshot.insert("GDP", 27_000.0));
        assert!(!snapshot.insert("CPI", f64::INFINITY));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.indicator(MacroIndicator::Cpi), None);
    }

    #[test]
    fn cpi_uses_its_own_series_id() {
        assert_eq!(MacroIndicator::Cpi.feature_name(), "CPI");
        assert_eq!(MacroIndicator::Cpi.series_id(), "CPIAUCSL");
        assert_eq!(MacroIndicator::Gdp.series_id(), "GDP");
        assert_eq!(MacroIndicator::lookup("cpiaucsl"), Some(MacroIndicator::Cpi));
        assert_eq!(MacroIndicator::lookup("unrate"), Some(MacroIndicator::Unemployment));
        assert_eq!(MacroIndicator::lookup("VIX"), None);
    }

    #[test]
    fn article_deserializes_news_api_field_names() {
        let article: NewsArticle = serde_json::from_str(
            r#"{"publishedAt":"2024-05-01T12:00:00Z","title":"Acme posts record profit"}"#,
        )
        .expect("article");
        assert_eq!(article.title, "Acme posts record profit");
        assert!(article.published_at.is_some());
        assert!(article.description.is_none());
    }
}
