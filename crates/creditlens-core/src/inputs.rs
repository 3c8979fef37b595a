//! Normalization of collaborator output documents.
//!
//! One document per ticker:
//!
//! ```json
//! {
//!   "market_data": [{"Date": "2024-03-01", "Close_ACME": 101.2, "Volume_ACME": 1200}],
//!   "news": [{"publishedAt": "2024-03-01T09:30:00Z", "title": "...", "source": {"id": null, "name": "Reuters"}}],
//!   "macro": {"GDP": 27000.5, "CPIAUCSL": "310.3"},
//!   "filings": [{"filingDate": "2024-02-01", "form": "10-Q"}]
//! }
//! ```
//!
//! Market columns may be plain (`close`, `Close`) or suffixed with the ticker
//! (`Close_ACME`, `Close_`). Anything malformed is dropped and reported in
//! [`ScoringInputs::warnings`] instead of failing the document.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::{
    Filing, InputError, MacroIndicator, MacroSnapshot, MarketBar, NewsArticle, Ticker,
    PublishedAt, TradingDate,
};

/// Everything the feature engineer needs for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringInputs {
    pub ticker: Ticker,
    pub bars: Vec<MarketBar>,
    pub articles: Vec<NewsArticle>,
    pub macro_snapshot: MacroSnapshot,
    pub filings: Vec<Filing>,
    pub warnings: Vec<String>,
}

impl ScoringInputs {
    pub fn new(ticker: Ticker, bars: Vec<MarketBar>) -> Self {
        Self {
            ticker,
            bars,
            articles: Vec::new(),
            macro_snapshot: MacroSnapshot::new(),
            filings: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_articles(mut self, articles: Vec<NewsArticle>) -> Self {
        self.articles = articles;
        self
    }

    pub fn with_macro(mut self, macro_snapshot: MacroSnapshot) -> Self {
        self.macro_snapshot = macro_snapshot;
        self
    }

    pub fn with_filings(mut self, filings: Vec<Filing>) -> Self {
        self.filings = filings;
        self
    }

    pub fn load(ticker: Ticker, path: &Path) -> Result<Self, InputError> {
        let json = fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(ticker, &json)
    }

    pub fn from_json(ticker: Ticker, json: &str) -> Result<Self, InputError> {
        let document: Value = serde_json::from_str(json)?;
        let Some(document) = document.as_object() else {
            return Err(InputError::Shape);
        };
        let Some(rows) = document.get("market_data").and_then(Value::as_array) else {
            return Err(InputError::Shape);
        };

        let mut inputs = Self::new(ticker, Vec::new());
        inputs.bars = parse_bars(&inputs.ticker, rows, &mut inputs.warnings);
        inputs.articles = parse_articles(document.get("news"), &mut inputs.warnings);
        inputs.macro_snapshot = parse_macro(document.get("macro"), &mut inputs.warnings);
        inputs.filings = parse_filings(document.get("filings"), &mut inputs.warnings);

        for warning in &inputs.warnings {
            tracing::warn!(ticker = %inputs.ticker, warning = %warning, "input document normalized");
        }
        Ok(inputs)
    }
}

fn parse_bars(ticker: &Ticker, rows: &[Value], warnings: &mut Vec<String>) -> Vec<MarketBar> {
    let mut dropped = 0usize;
    let bars: Vec<MarketBar> = rows
        .iter()
        .filter_map(|row| {
            let bar = row.as_object().and_then(|row| parse_bar(ticker, row));
            if bar.is_none() {
                dropped += 1;
            }
            bar
        })
        .collect();

    if dropped > 0 {
        warnings.push(format!(
            "dropped {dropped} market rows without a valid date and close"
        ));
    }
    bars
}

fn parse_bar(ticker: &Ticker, row: &Map<String, Value>) -> Option<MarketBar> {
    let date = column(ticker, row, "date").and_then(parse_date)?;
    let close = column(ticker, row, "close").and_then(number)?;
    let field = |name: &str| column(ticker, row, name).and_then(number);

    MarketBar::new(
        date,
        field("open").unwrap_or(close),
        field("high").unwrap_or(close),
        field("low").unwrap_or(close),
        close,
        field("volume").unwrap_or(0.0),
    )
    .ok()
}

/// Finds `field`, `Field`, `Field_<TICKER>` or `Field_`.
fn column<'a>(ticker: &Ticker, row: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    row.iter()
        .find(|(key, _)| {
            if key.eq_ignore_ascii_case(field) {
                return true;
            }
            let Some((prefix, suffix)) = key.split_once('_') else {
                return false;
            };
            prefix.eq_ignore_ascii_case(field)
                && (suffix.is_empty() || ticker.labels_column(suffix))
        })
        .map(|(_, value)| value)
}

/// JSON number or numeric string; anything else (or non-finite) is missing.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite())
}

fn parse_date(value: &Value) -> Option<TradingDate> {
    match value {
        Value::String(text) => TradingDate::parse(text.trim()).ok(),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| TradingDate::from_unix_millis(millis).ok()),
        _ => None,
    }
}

fn parse_articles(news: Option<&Value>, warnings: &mut Vec<String>) -> Vec<NewsArticle> {
    let items = match news {
        Some(Value::Array(items)) => items.as_slice(),
        // Raw NewsAPI response body.
        Some(Value::Object(body)) => body
            .get("articles")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    };

    let mut skipped = 0usize;
    let articles: Vec<NewsArticle> = items
        .iter()
        .filter_map(|item| {
            let article = item.as_object().and_then(parse_article);
            if article.is_none() {
                skipped += 1;
            }
            article
        })
        .collect();

    if skipped > 0 {
        warnings.push(format!("skipped {skipped} news items without a title"));
    }
    articles
}

fn parse_article(item: &Map<String, Value>) -> Option<NewsArticle> {
    let title = text(item.get("title"))?;
    let published_at = match item.get("publishedAt").or_else(|| item.get("published_at")) {
        Some(Value::String(raw)) => match PublishedAt::parse(raw) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::debug!(value = %raw, error = %err, "ignoring article timestamp");
                None
            }
        },
        _ => None,
    };
    let source = match item.get("source") {
        Some(Value::Object(source)) => text(source.get("name")),
        other => text(other),
    };

    Some(NewsArticle {
        published_at,
        title,
        description: text(item.get("description")),
        source,
        url: text(item.get("url")),
    })
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn parse_macro(values: Option<&Value>, warnings: &mut Vec<String>) -> MacroSnapshot {
    let mut snapshot = MacroSnapshot::new();
    let Some(Value::Object(values)) = values else {
        return snapshot;
    };

    let mut missing = Vec::new();
    for (name, value) in values {
        let name = MacroIndicator::lookup(name)
            .map_or_else(|| name.clone(), |indicator| indicator.feature_name().to_owned());
        match number(value) {
            Some(value) => {
                snapshot.insert(name, value);
            }
            None => {
                tracing::debug!(indicator = %name, "macro value missing or not numeric");
                missing.push(name);
            }
        }
    }

    if !missing.is_empty() {
        warnings.push(format!("macro indicators without a value: {}", missing.join(", ")));
    }
    snapshot
}

fn parse_filings(filings: Option<&Value>, warnings: &mut Vec<String>) -> Vec<Filing> {
    let Some(Value::Array(items)) = filings else {
        return Vec::new();
    };

    let mut skipped = 0usize;
    let parsed: Vec<Filing> = items
        .iter()
        .filter_map(|item| {
            let filing = item.as_object().and_then(|item| {
                Some(Filing {
                    filing_date: item.get("filingDate").and_then(parse_date)?,
                    form: text(item.get("form"))?,
                    accession_number: text(item.get("accessionNumber")),
                    primary_document: text(item.get("primaryDocument")),
                })
            });
            if filing.is_none() {
                skipped += 1;
            }
            filing
        })
        .collect();

    if skipped > 0 {
        warnings.push(format!("skipped {skipped} filings without a date and form"));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> Ticker {
        Ticker::parse("acme").expect("ticker")
    }

    #[test]
    fn normalizes_ticker_suffixed_columns() {
        let inputs = ScoringInputs::from_json(
            acme(),
            r#"{"market_data": [
                {"Date": "2024-03-01", "Close_ACME": 101.5, "Open_ACME": 100.0, "Volume_ACME": 1200},
                {"Date_": "2024-03-04T00:00:00Z", "Close_": "102.25"}
            ]}"#,
        )
        .expect("inputs");

        assert_eq!(inputs.bars.len(), 2);
        assert_eq!(inputs.bars[0].open, 100.0);
        assert_eq!(inputs.bars[0].high, 101.5);
        assert_eq!(inputs.bars[0].volume, 1200.0);
        assert_eq!(inputs.bars[1].close, 102.25);
        assert_eq!(inputs.bars[1].date.to_string(), "2024-03-04");
        assert!(inputs.warnings.is_empty());
    }

    #[test]
    fn class_share_columns_match_either_separator() {
        let ticker = Ticker::parse("brk.b").expect("ticker");
        let inputs = ScoringInputs::from_json(
            ticker,
            r#"{"market_data": [{"Date_BRK-B": "2024-03-01", "Close_BRK-B": 410.0}]}"#,
        )
        .expect("inputs");
        assert_eq!(inputs.bars.len(), 1);
        assert_eq!(inputs.bars[0].close, 410.0);
    }

    #[test]
    fn other_tickers_columns_are_ignored() {
        let inputs = ScoringInputs::from_json(
            acme(),
            r#"{"market_data": [{"date": "2024-03-01", "Close_OTHER": 5.0}]}"#,
        )
        .expect("inputs");
        assert!(inputs.bars.is_empty());
        assert_eq!(inputs.warnings.len(), 1);
    }

    #[test]
    fn drops_rows_with_bad_date_or_close() {
        let inputs = ScoringInputs::from_json(
            acme(),
            r#"{"market_data": [
                {"date": "not a date", "close": 1.0},
                {"date": "2024-03-01", "close": null},
                {"date": 1709251200000, "close": 3.0},
                "garbage"
            ]}"#,
        )
        .expect("inputs");
        assert_eq!(inputs.bars.len(), 1);
        assert_eq!(inputs.bars[0].date.to_string(), "2024-03-01");
        assert_eq!(
            inputs.warnings,
            vec!["dropped 3 market rows without a valid date and close".to_owned()]
        );
    }

    #[test]
    fn parses_news_sources_and_macro_values() {
        let inputs = ScoringInputs::from_json(
            acme(),
            r#"{
                "market_data": [],
                "news": {"status": "ok", "articles": [
                    {"publishedAt": "2024-03-01T09:30:00Z", "title": "Acme wins contract", "source": {"id": null, "name": "Reuters"}},
                    {"publishedAt": "yesterday", "title": "Acme layoffs", "source": "Wire"},
                    {"title": ""}
                ]},
                "macro": {"GDP": 27000.5, "CPIAUCSL": "310.3", "UNRATE": ".", "VIX": 14}
            }"#,
        )
        .expect("inputs");

        assert_eq!(inputs.articles.len(), 2);
        assert_eq!(inputs.articles[0].source.as_deref(), Some("Reuters"));
        assert!(inputs.articles[0].published_at.is_some());
        assert_eq!(inputs.articles[1].source.as_deref(), Some("Wire"));
        assert!(inputs.articles[1].published_at.is_none());

        assert_eq!(inputs.macro_snapshot.indicator(MacroIndicator::Cpi), Some(310.3));
        assert_eq!(inputs.macro_snapshot.get("VIX"), Some(14.0));
        assert_eq!(inputs.macro_snapshot.indicator(MacroIndicator::Unemployment), None);
        assert_eq!(inputs.warnings.len(), 2);
    }

    #[test]
    fn parses_filings() {
        let inputs = ScoringInputs::from_json(
            acme(),
            r#"{"market_data": [], "filings": [
                {"filingDate": "2024-02-01", "form": "10-Q", "accessionNumber": "0000-24-01"},
                {"form": "8-K"}
            ]}"#,
        )
        .expect("inputs");
        assert_eq!(inputs.filings.len(), 1);
        assert_eq!(inputs.filings[0].form, "10-Q");
        assert_eq!(inputs.warnings.len(), 1);
    }

    #[test]
    fn rejects_documents_without_market_data() {
        let err = ScoringInputs::from_json(acme(), r#"{"news": []}"#).expect_err("must fail");
        assert!(matches!(err, InputError::Shape));
        let err = ScoringInputs::from_json(acme(), "[1, 2]").expect_err("must fail");
        assert!(matches!(err, InputError::Shape));
    }
}
