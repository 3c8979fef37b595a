//! Feature maps and reconciliation against a model's required schema.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Canonical names of engineered features.
pub mod names {
    pub const OPEN: &str = "open";
    pub const HIGH: &str = "high";
    pub const LOW: &str = "low";
    pub const CLOSE: &str = "close";
    pub const VOLUME: &str = "volume";
    pub const MA_SHORT: &str = "ma_30";
    pub const MA_LONG: &str = "ma_90";
    pub const TREND_INDICATOR: &str = "trend_indicator";
    pub const TREND_90D: &str = "trend_90d";
    pub const VOLATILITY: &str = "volatility_30d";
    pub const MEAN_SENTIMENT: &str = "mean_sentiment";
    pub const POSITIVE_EVENT_COUNT: &str = "positive_event_count";
    pub const NEGATIVE_EVENT_COUNT: &str = "negative_event_count";
    pub const NEWS_VOLUME: &str = "news_volume";
    pub const FILINGS_COUNT: &str = "filings_count_90d";
}

/// Insertion-ordered feature name → value map.
///
/// Only finite values are stored; anything else stays missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap {
    entries: Vec<(String, f64)>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `name`. Returns `false` (and stores nothing) for
    /// non-finite values.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, f64)> for FeatureMap {
    fn from_iter<I: IntoIterator<Item = (N, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl Serialize for FeatureMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Model input whose keys and order equal the model's required schema.
///
/// Built only by [`reconcile`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(FeatureMap);

impl FeatureVector {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.names()
    }

    pub fn values(&self) -> Vec<f64> {
        self.0.iter().map(|(_, value)| value).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the vector's names equal `schema`, in order.
    pub fn matches_schema<S: AsRef<str>>(&self, schema: &[S]) -> bool {
        self.len() == schema.len()
            && self
                .names()
                .zip(schema)
                .all(|(name, expected)| name == expected.as_ref())
    }
}

/// Which required features had to be defaulted and which computed ones were ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub defaulted: Vec<String>,
    pub dropped: Vec<String>,
}

impl ReconciliationReport {
    pub fn defaulted_count(&self) -> usize {
        self.defaulted.len()
    }

    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty() && self.dropped.is_empty()
    }
}

/// Value given to required features that were not computed.
pub const DEFAULT_FEATURE_VALUE: f64 = 0.0;

/// Aligns computed features with `required`.
///
/// Required names that were not computed get [`DEFAULT_FEATURE_VALUE`];
/// computed names outside `required` are dropped; the result follows
/// `required` order exactly. Duplicate required names keep their first slot.
pub fn reconcile<S: AsRef<str>>(
    computed: &FeatureMap,
    required: &[S],
) -> (FeatureVector, ReconciliationReport) {
    let mut vector = FeatureMap::new();
    let mut report = ReconciliationReport::default();

    for name in required {
        let name = name.as_ref();
        if vector.contains(name) {
            continue;
        }
        match computed.get(name) {
            Some(value) => {
                vector.insert(name, value);
            }
            None => {
                vector.insert(name, DEFAULT_FEATURE_VALUE);
                report.defaulted.push(name.to_owned());
            }
        }
    }

    report.dropped = computed
        .names()
        .filter(|name| !vector.contains(name))
        .map(str::to_owned)
        .collect();

    (FeatureVector(vector), report)
}


#[cfg(test)]
mod prop_tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;

    fn arb_name() -> impl Strategy<Value = String> {
        prop::sample::select(vec![
            "close", "ma_30", "ma_90", "volatility_30d", "news_volume", "GDP", "CPI", "UNRATE",
        ])
        .prop_map(str::to_owned)
    }

    fn arb_computed() -> impl Strategy<Value = FeatureMap> {
        prop::collection::vec((arb_name(), -1.0e6..1.0e6f64), 0..8)
            .prop_map(|entries| entries.into_iter().collect())
    }

    fn arb_schema() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set(arb_name(), 0..8)
            .prop_map(|names| names.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    }

    proptest! {
        #[test]
        fn output_follows_schema_exactly(computed in arb_computed(), schema in arb_schema()) {
            let (vector, report) = reconcile(&computed, &schema);

            prop_assert!(vector.matches_schema(&schema));
            for (name, value) in vector.iter() {
                let expected = computed.get(name).unwrap_or(DEFAULT_FEATURE_VALUE);
                prop_assert_eq!(value, expected);
            }

            let defaulted: BTreeSet<&str> = report.defaulted.iter().map(String::as_str).collect();
            let missing: BTreeSet<&str> = schema
                .iter()
                .map(String::as_str)
                .filter(|name| !computed.contains(name))
                .collect();
            prop_assert_eq!(defaulted, missing);

            for name in &report.dropped {
                prop_assert!(!schema.contains(name));
                prop_assert!(computed.contains(name));
            }
        }
    }
}
