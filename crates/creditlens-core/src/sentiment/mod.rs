//! # Sentiment
//!
//! Rule-based polarity scoring for short financial text, plus the aggregate
//! news signals the feature engineer consumes.
//!
//! ```rust
//! use creditlens_core::SentimentScorer;
//!
//! let scorer = SentimentScorer::default();
//! assert!(scorer.score("Acme posts record profit") > 0.0);
//! assert_eq!(scorer.score(""), 0.0);
//! ```

mod lexicon;
mod signals;

pub use lexicon::{FinancialLexicon, LexiconMatch};
pub use signals::{
    count_events, NewsSignals, NEGATIVE_EVENT_KEYWORDS, NO_NEWS_HEADLINE,
    POSITIVE_EVENT_KEYWORDS,
};

/// Pure, deterministic headline scorer.
#[derive(Debug, Clone, Default)]
pub struct SentimentScorer {
    lexicon: FinancialLexicon,
}

impl SentimentScorer {
    pub fn new(lexicon: FinancialLexicon) -> Self {
        Self { lexicon }
    }

    /// Polarity in [-1, 1]; 0 when nothing in the text is recognised.
    pub fn score(&self, text: &str) -> f64 {
        self.lexicon.analyze(text).score
    }
}
