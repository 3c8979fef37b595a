//! # Feature Engineering
//!
//! Turns raw bars, articles, macro values and filings into a named feature
//! set, then aligns it with a model's schema.
//!
//! | Feature | Source | Omitted when |
//! |---------|--------|--------------|
//! | `open`, `high`, `low`, `close`, `volume` | latest bar | never (empty bars fail) |
//! | `ma_30`, `ma_90` | close SMA | fewer bars than the window |
//! | `trend_indicator` | `ma_30 / ma_90`, neutral 1 when `ma_90 <= 0` | either SMA omitted |
//! | `trend_90d` | `close / ma_90`, same fallback | `ma_90` omitted |
//! | `volatility_30d` | sample std of daily % change | fewer than 31 bars, zero price in window |
//! | `mean_sentiment`, `positive_event_count`, `negative_event_count`, `news_volume` | headlines | no articles |
//! | macro indicator names | macro snapshot | indicator absent |
//! | `filings_count_90d` | filings near the latest bar | no filings supplied |

mod rolling;
mod schema;

use serde::{Deserialize, Serialize};

use crate::{
    Filing, InsufficientDataError, MacroSnapshot, MarketBar, NewsArticle, NewsSignals,
    SentimentScorer, Ticker, TradingDate,
};

pub use rolling::{pct_change_volatility, pct_changes, simple_moving_average, trend_indicator};
pub use schema::{
    names, reconcile, FeatureMap, FeatureVector, ReconciliationReport, DEFAULT_FEATURE_VALUE,
};

/// Window lengths used by the rolling features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWindows {
    pub short_window: usize,
    pub long_window: usize,
    pub volatility_window: usize,
    pub filings_lookback_days: i64,
}

impl Default for FeatureWindows {
    fn default() -> Self {
        Self {
            short_window: 30,
            long_window: 90,
            volatility_window: 30,
            filings_lookback_days: 90,
        }
    }
}

/// Features computed for one ticker, before schema reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineeredFeatures {
    pub ticker: Ticker,
    pub as_of: TradingDate,
    pub bar_count: usize,
    pub features: FeatureMap,
    pub news: NewsSignals,
}

impl EngineeredFeatures {
    pub fn key_headline(&self) -> &str {
        &self.news.key_headline
    }

    /// Aligns the computed features with `required`, logging any defaults.
    pub fn reconcile<S: AsRef<str>>(&self, required: &[S]) -> (FeatureVector, ReconciliationReport) {
        let (vector, report) = reconcile(&self.features, required);
        if !report.defaulted.is_empty() {
            tracing::warn!(
                ticker = %self.ticker,
                defaulted = report.defaulted_count(),
                features = ?report.defaulted,
                "required features missing; defaulted to zero"
            );
        }
        if !report.dropped.is_empty() {
            tracing::debug!(
                ticker = %self.ticker,
                dropped = ?report.dropped,
                "computed features not in model schema"
            );
        }
        (vector, report)
    }
}

/// Builds feature sets from raw collaborator outputs.
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    scorer: SentimentScorer,
    windows: FeatureWindows,
}

impl FeatureEngineer {
    pub fn new(scorer: SentimentScorer, windows: FeatureWindows) -> Self {
        Self { scorer, windows }
    }

    /// Computes features from bars, articles and macro values.
    ///
    /// # Errors
    /// Returns [`InsufficientDataError`] when `bars` is empty. Missing news or
    /// macro values never fail; the affected features are simply absent.
    pub fn engineer(
        &self,
        ticker: &Ticker,
        bars: &[MarketBar],
        articles: &[NewsArticle],
        macro_snapshot: &MacroSnapshot,
    ) -> Result<EngineeredFeatures, InsufficientDataError> {
        self.engineer_with_filings(ticker, bars, articles, macro_snapshot, &[])
    }

    /// Same as [`FeatureEngineer::engineer`], adding filing activity.
    pub fn engineer_with_filings(
        &self,
        ticker: &Ticker,
        bars: &[MarketBar],
        articles: &[NewsArticle],
        macro_snapshot: &MacroSnapshot,
        filings: &[Filing],
    ) -> Result<EngineeredFeatures, InsufficientDataError> {
        let mut ordered: Vec<&MarketBar> = bars.iter().collect();
        ordered.sort_by_key(|bar| bar.date);
        let Some(latest) = ordered.last().copied() else {
            return Err(InsufficientDataError {
                ticker: ticker.to_string(),
            });
        };

        let mut features = FeatureMap::new();
        features.insert(names::OPEN, latest.open);
        features.insert(names::HIGH, latest.high);
        features.insert(names::LOW, latest.low);
        features.insert(names::CLOSE, latest.close);
        features.insert(names::VOLUME, latest.volume);

        let closes: Vec<f64> = ordered.iter().map(|bar| bar.close).collect();
        self.insert_price_features(&mut features, &closes, latest.close);

        let titles: Vec<&str> = articles.iter().map(|article| article.title.as_str()).collect();
        let news = self.scorer.summarize(&titles);
        if let Some(mean) = news.mean_sentiment {
            features.insert(names::MEAN_SENTIMENT, mean);
            features.insert(names::POSITIVE_EVENT_COUNT, news.positive_event_count as f64);
            features.insert(names::NEGATIVE_EVENT_COUNT, news.negative_event_count as f64);
            features.insert(names::NEWS_VOLUME, news.news_volume as f64);
        }

        for (name, value) in macro_snapshot.iter() {
            features.insert(name, value);
        }

        if !filings.is_empty() {
            let recent = filings
                .iter()
                .filter(|filing| {
                    latest.date.days_since(filing.filing_date) <= self.windows.filings_lookback_days
                })
                .count();
            features.insert(names::FILINGS_COUNT, recent as f64);
        }

        tracing::debug!(
            ticker = %ticker,
            bars = ordered.len(),
            articles = articles.len(),
            macro_indicators = macro_snapshot.len(),
            features = features.len(),
            "engineered features"
        );

        Ok(EngineeredFeatures {
            ticker: ticker.clone(),
            as_of: latest.date,
            bar_count: ordered.len(),
            features,
            news,
        })
    }

    fn insert_price_features(&self, features: &mut FeatureMap, closes: &[f64], close: f64) {
        let short_ma = simple_moving_average(closes, self.windows.short_window);
        let long_ma = simple_moving_average(closes, self.windows.long_window);

        if let Some(short_ma) = short_ma {
            features.insert(names::MA_SHORT, short_ma);
        }
        if let Some(long_ma) = long_ma {
            features.insert(names::MA_LONG, long_ma);
            features.insert(names::TREND_90D, trend_indicator(close, long_ma));
            if let Some(short_ma) = short_ma {
                features.insert(names::TREND_INDICATOR, trend_indicator(short_ma, long_ma));
            }
        }

        match pct_change_volatility(closes, self.windows.volatility_window) {
            Some(volatility) => {
                features.insert(names::VOLATILITY, volatility);
            }
            None => tracing::debug!(
                bars = closes.len(),
                window = self.windows.volatility_window,
                "volatility undefined for this series"
            ),
        }
    }
}
