use serde::Serialize;

use super::SentimentScorer;

/// Headline used when there is no news to pick from.
pub const NO_NEWS_HEADLINE: &str = "No recent news available.";

/// Keywords marking an adverse corporate event.
pub const NEGATIVE_EVENT_KEYWORDS: &[&str] =
    &["layoffs", "downgrade", "lawsuit", "recall", "outage", "fine"];

/// Keywords marking a favourable corporate event.
pub const POSITIVE_EVENT_KEYWORDS: &[&str] = &[
    "expansion",
    "profit",
    "upgrade",
    "hiring",
    "record",
    "partnership",
    "launch",
    "growth",
];

/// Aggregate news signals over a list of headlines.
///
/// The event buckets are independent detectors: a headline mentioning both a
/// lawsuit and record profit counts once in each.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsSignals {
    pub mean_sentiment: Option<f64>,
    pub positive_event_count: usize,
    pub negative_event_count: usize,
    pub news_volume: usize,
    pub key_headline: String,
}

impl NewsSignals {
    pub fn is_empty(&self) -> bool {
        self.news_volume == 0
    }
}

impl SentimentScorer {
    /// Arithmetic mean of per-text scores; `None` for an empty list.
    pub fn mean_sentiment<S: AsRef<str>>(&self, texts: &[S]) -> Option<f64> {
        if texts.is_empty() {
            return None;
        }
        let total: f64 = texts.iter().map(|text| self.score(text.as_ref())).sum();
        Some(total / texts.len() as f64)
    }

    /// Text with the largest absolute score; ties go to the earliest text.
    pub fn key_headline<S: AsRef<str>>(&self, texts: &[S]) -> String {
        let mut best: Option<(&str, f64)> = None;
        for text in texts {
            let text = text.as_ref();
            let magnitude = self.score(text).abs();
            if best.is_none_or(|(_, current)| magnitude > current) {
                best = Some((text, magnitude));
            }
        }
        best.map_or_else(|| NO_NEWS_HEADLINE.to_owned(), |(text, _)| text.to_owned())
    }

    pub fn summarize<S: AsRef<str>>(&self, texts: &[S]) -> NewsSignals {
        NewsSignals {
            mean_sentiment: self.mean_sentiment(texts),
            positive_event_count: count_events(texts, POSITIVE_EVENT_KEYWORDS),
            negative_event_count: count_events(texts, NEGATIVE_EVENT_KEYWORDS),
            news_volume: texts.len(),
            key_headline: self.key_headline(texts),
        }
    }
}

/// Number of texts whose lower-cased form contains any of `keywords`.
pub fn count_events<S: AsRef<str>>(texts: &[S], keywords: &[&str]) -> usize {
    texts
        .iter()
        .filter(|text| {
            let lowered = text.as_ref().to_lowercase();
            keywords.iter().any(|keyword| lowered.contains(keyword))
        })
        .count()
}
