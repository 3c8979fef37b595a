//! Financial sentiment lexicon used for rule-based headline scoring.

use std::collections::HashMap;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("beat", 0.6),
    ("beats", 0.6),
    ("boost", 0.5),
    ("bullish", 0.8),
    ("confident", 0.5),
    ("exceed", 0.6),
    ("exceeds", 0.6),
    ("expansion", 0.5),
    ("gain", 0.5),
    ("gains", 0.5),
    ("growth", 0.6),
    ("hiring", 0.4),
    ("improve", 0.5),
    ("improves", 0.5),
    ("launch", 0.3),
    ("launches", 0.3),
    ("optimistic", 0.6),
    ("outperform", 0.7),
    ("partnership", 0.4),
    ("positive", 0.5),
    ("profit", 0.6),
    ("profits", 0.6),
    ("rally", 0.7),
    ("rebound", 0.5),
    ("record", 0.6),
    ("recovery", 0.5),
    ("rise", 0.5),
    ("rises", 0.5),
    ("soar", 0.8),
    ("soars", 0.8),
    ("strong", 0.5),
    ("surge", 0.7),
    ("surges", 0.7),
    ("upgrade", 0.6),
    ("upgraded", 0.6),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bankruptcy", -0.9),
    ("bearish", -0.8),
    ("concern", -0.5),
    ("concerns", -0.5),
    ("crash", -0.9),
    ("crisis", -0.8),
    ("decline", -0.6),
    ("declines", -0.6),
    ("default", -0.9),
    ("disappoint", -0.7),
    ("disappoints", -0.7),
    ("downgrade", -0.6),
    ("downgraded", -0.6),
    ("drop", -0.6),
    ("drops", -0.6),
    ("fail", -0.7),
    ("fails", -0.7),
    ("fall", -0.5),
    ("falls", -0.5),
    ("fear", -0.6),
    ("fine", -0.4),
    ("fined", -0.5),
    ("fraud", -0.9),
    ("layoffs", -0.6),
    ("loss", -0.6),
    ("losses", -0.6),
    ("lawsuit", -0.6),
    ("miss", -0.6),
    ("misses", -0.6),
    ("outage", -0.5),
    ("plunge", -0.8),
    ("plunges", -0.8),
    ("probe", -0.5),
    ("recall", -0.5),
    ("risk", -0.4),
    ("slump", -0.7),
    ("trouble", -0.6),
    ("uncertainty", -0.5),
    ("warning", -0.5),
    ("weak", -0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "cannot", "cant", "can't", "don't", "dont",
    "doesn't", "doesnt", "didn't", "didnt", "won't", "wont", "isn't", "isnt", "aren't",
    "arent", "wasn't", "wasnt", "without", "hardly", "barely",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("highly", 1.5),
    ("significantly", 1.5),
    ("sharply", 1.6),
    ("dramatically", 1.8),
    ("massive", 1.7),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("marginally", 0.5),
];

/// Word-level sentiment lexicon with negation and intensifier handling.
#[derive(Debug, Clone)]
pub struct FinancialLexicon {
    words: HashMap<String, f64>,
    negations: Vec<String>,
    intensifiers: HashMap<String, f64>,
}

impl Default for FinancialLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl FinancialLexicon {
    pub fn new() -> Self {
        let words = POSITIVE_WORDS
            .iter()
            .chain(NEGATIVE_WORDS)
            .map(|(word, score)| ((*word).to_owned(), *score))
            .collect();
        let negations = NEGATIONS.iter().map(|word| (*word).to_owned()).collect();
        let intensifiers = INTENSIFIERS
            .iter()
            .map(|(word, multiplier)| ((*word).to_owned(), *multiplier))
            .collect();

        Self {
            words,
            negations,
            intensifiers,
        }
    }

    pub fn word_score(&self, word: &str) -> Option<f64> {
        self.words.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.iter().any(|negation| negation == word)
    }

    pub fn intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    /// Adds or overrides a word. Scores are clamped to [-1, 1].
    pub fn add_word(&mut self, word: &str, score: f64) {
        self.words
            .insert(word.to_lowercase(), score.clamp(-1.0, 1.0));
    }

    /// Scores text as the clamped mean of matched word scores.
    ///
    /// A negation flips the next sentiment word; an intensifier scales it.
    /// Any other unmatched word resets both modifiers.
    pub fn analyze(&self, text: &str) -> LexiconMatch {
        let mut matched = Vec::new();
        let mut negate_next = false;
        let mut multiplier = 1.0;

        for token in tokenize(text) {
            if self.is_negation(&token) {
                negate_next = true;
                continue;
            }
            if let Some(value) = self.intensifier(&token) {
                multiplier = value;
                continue;
            }

            if let Some(mut score) = self.word_score(&token) {
                if negate_next {
                    score = -score;
                }
                score *= multiplier;
                matched.push((token, score));
            }
            negate_next = false;
            multiplier = 1.0;
        }

        let score = if matched.is_empty() {
            0.0
        } else {
            let total: f64 = matched.iter().map(|(_, score)| score).sum();
            (total / matched.len() as f64).clamp(-1.0, 1.0)
        };

        LexiconMatch { score, matched }
    }
}

/// Outcome of scoring one text.
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconMatch {
    /// Polarity in [-1, 1].
    pub score: f64,
    /// Matched tokens and their adjusted scores.
    pub matched: Vec<(String, f64)>,
}

/// Lower-cased tokens with surrounding punctuation stripped.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|raw| {
        let token: String = raw
            .trim_matches(|ch: char| !ch.is_alphanumeric())
            .chars()
            .filter(|ch| ch.is_alphanumeric() || *ch == '\'')
            .flat_map(char::to_lowercase)
            .collect();
        (!token.is_empty()).then_some(token)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_positive_and_negative_words() {
        let lexicon = FinancialLexicon::new();
        assert!(lexicon.analyze("Shares surge after record quarter").score > 0.0);
        assert!(lexicon.analyze("Regulator files lawsuit, stock plunges").score < 0.0);
    }

    #[test]
    fn negation_flips_next_sentiment_word() {
        let lexicon = FinancialLexicon::new();
        let plain = lexicon.analyze("strong demand").score;
        let negated = lexicon.analyze("not strong demand").score;
        assert!(plain > 0.0);
        assert!((negated + plain).abs() < 1e-12);
    }

    #[test]
    fn intensifier_scales_but_stays_clamped() {
        let lexicon = FinancialLexicon::new();
        let mild = lexicon.analyze("slightly weak").score;
        let strong = lexicon.analyze("extremely bearish").score;
        assert!((mild - (-0.25)).abs() < 1e-12);
        assert_eq!(strong, -1.0);
    }

    #[test]
    fn punctuation_is_stripped_from_tokens() {
        let lexicon = FinancialLexicon::new();
        let result = lexicon.analyze("\"Profit!\" ... (growth).");
        assert_eq!(result.matched.len(), 2);
        assert!(result.score > 0.0);
    }

    #[test]
    fn empty_and_punctuation_only_text_is_neutral() {
        let lexicon = FinancialLexicon::new();
        assert_eq!(lexicon.analyze("").score, 0.0);
        assert_eq!(lexicon.analyze("  ?!... --- ").score, 0.0);
    }

    #[test]
    fn custom_words_are_clamped() {
        let mut lexicon = FinancialLexicon::new();
        lexicon.add_word("Moonshot", 3.0);
        assert_eq!(lexicon.word_score("moonshot"), Some(1.0));
    }
}
