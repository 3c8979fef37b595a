//! # Scoring model adapter
//!
//! Wraps a trained model together with the feature schema it was trained on
//! and an additive attribution method. A model that failed to load is an
//! explicit [`ScoringModel::disabled`] state rather than a crash: it keeps
//! answering [`Prediction::Unavailable`].
//!
//! | Kind | Attribution |
//! |------|-------------|
//! | `linear` | `coef_i · (x_i − mean_i)`, base `intercept + Σ coef_i · mean_i` |
//! | `tree_ensemble` | decision-path credit, base `base_score + Σ root values` |
//!
//! Both satisfy `raw_value = base_value + Σ contributions`.

mod artifact;
mod linear;
mod trees;

use std::fmt::Debug;
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub use artifact::{ModelArtifact, ModelSpec, TreeSpec};
pub use linear::LinearModel;
pub use trees::{RegressionTree, TreeEnsemble, TreeNode};

use crate::features::{FeatureVector, DEFAULT_FEATURE_VALUE};
use crate::ModelError;

/// Raw output of an attribution-capable model for one input row.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    pub raw_value: f64,
    pub base_value: f64,
    /// One entry per input column, in column order.
    pub contributions: Vec<f64>,
}

impl Attribution {
    /// `raw - base - Σ contributions`; zero up to floating point error.
    pub fn residual(&self) -> f64 {
        self.raw_value - self.base_value - self.contributions.iter().sum::<f64>()
    }
}

/// A model that can both predict and explain a dense input row.
pub trait AttributionModel: Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    /// Whether rows of `width` columns line up with the model's parameters.
    fn accepts_width(&self, width: usize) -> bool;

    fn explain(&self, inputs: &[f64]) -> Attribution;

    fn predict(&self, inputs: &[f64]) -> f64 {
        self.explain(inputs).raw_value
    }
}

/// Per-feature contributions keyed by schema name, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureContributions(Vec<(String, f64)>);

impl FeatureContributions {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().map(|(_, value)| value).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, f64)> for FeatureContributions {
    fn from_iter<I: IntoIterator<Item = (N, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

impl Serialize for FeatureContributions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Scored {
        raw_value: f64,
        base_value: f64,
        contributions: FeatureContributions,
    },
    Unavailable,
}

impl Prediction {
    pub fn raw_value(&self) -> Option<f64> {
        match self {
            Self::Scored { raw_value, .. } => Some(*raw_value),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Scored { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: Option<String>,
    pub kind: &'static str,
}

/// Snapshot of the adapter state for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelInfo>,
    pub feature_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug)]
enum ModelState {
    Ready {
        info: ModelInfo,
        feature_names: Vec<String>,
        model: Box<dyn AttributionModel>,
    },
    Disabled {
        reason: String,
    },
}

/// Loaded model plus its feature schema, or an explicit disabled state.
///
/// Safe to share behind an `Arc` across concurrent scoring tasks.
#[derive(Debug)]
pub struct ScoringModel {
    state: ModelState,
}

impl ScoringModel {
    /// Loads and validates an artifact from disk.
    pub fn open(path: &Path) -> Result<Self, ModelError> {
        let artifact = ModelArtifact::load(path)?;
        tracing::info!(
            path = %path.display(),
            name = %artifact.name,
            kind = artifact.model.kind(),
            features = artifact.feature_names.len(),
            "scoring model loaded"
        );
        Self::from_artifact(&artifact)
    }

    /// Like [`ScoringModel::open`] but degrades to the disabled state on failure.
    pub fn load_or_disable(path: &Path) -> Self {
        match Self::open(path) {
            Ok(model) => model,
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "scoring model disabled");
                Self::disabled(err.to_string())
            }
        }
    }

    /// Validates an in-memory artifact and builds the model from it.
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        Ok(Self {
            state: ModelState::Ready {
                info: ModelInfo {
                    name: artifact.name.clone(),
                    version: artifact.version.clone(),
                    kind: artifact.model.kind(),
                },
                feature_names: artifact.feature_names.clone(),
                model: artifact.build(),
            },
        })
    }

    /// Wraps any [`AttributionModel`] with an explicit schema.
    pub fn with_model(
        name: impl Into<String>,
        feature_names: Vec<String>,
        model: Box<dyn AttributionModel>,
    ) -> Result<Self, ModelError> {
        if feature_names.is_empty() {
            return Err(ModelError::Invalid(String::from(
                "feature_names must not be empty",
            )));
        }
        if !model.accepts_width(feature_names.len()) {
            return Err(ModelError::Invalid(format!(
                "{} model does not accept {} features",
                model.kind(),
                feature_names.len()
            )));
        }
        Ok(Self {
            state: ModelState::Ready {
                info: ModelInfo {
                    name: name.into(),
                    version: None,
                    kind: model.kind(),
                },
                feature_names,
                model,
            },
        })
    }

    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::Disabled {
                reason: reason.into(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ModelState::Ready { .. })
    }

    /// Required input schema; empty when disabled.
    pub fn feature_names(&self) -> &[String] {
        match &self.state {
            ModelState::Ready { feature_names, .. } => feature_names,
            ModelState::Disabled { .. } => &[],
        }
    }

    pub fn status(&self) -> ModelStatus {
        match &self.state {
            ModelState::Ready {
                info,
                feature_names,
                ..
            } => ModelStatus {
                available: true,
                model: Some(info.clone()),
                feature_names: feature_names.clone(),
                reason: None,
            },
            ModelState::Disabled { reason } => ModelStatus {
                available: false,
                model: None,
                feature_names: Vec::new(),
                reason: Some(reason.clone()),
            },
        }
    }

    /// Predicts and explains one row.
    ///
    /// Inputs are read by schema name, so a vector not produced by
    /// [`crate::features::reconcile`] against this model is still aligned.
    pub fn predict(&self, vector: &FeatureVector) -> Prediction {
        let ModelState::Ready {
            feature_names,
            model,
            ..
        } = &self.state
        else {
            return Prediction::Unavailable;
        };

        if !vector.matches_schema(feature_names) {
            tracing::warn!(
                expected = feature_names.len(),
                actual = vector.len(),
                "feature vector does not match model schema; realigning"
            );
        }
        let inputs: Vec<f64> = feature_names
            .iter()
            .map(|name| vector.get(name).unwrap_or(DEFAULT_FEATURE_VALUE))
            .collect();

        let attribution = model.explain(&inputs);
        let residual = attribution.residual();
        if residual.abs() > 1e-6 {
            tracing::warn!(residual, "attribution does not reconcile with prediction");
        }

        Prediction::Scored {
            raw_value: attribution.raw_value,
            base_value: attribution.base_value,
            contributions: feature_names
                .iter()
                .cloned()
                .zip(attribution.contributions)
                .collect(),
        }
    }

    /// Releases the model. Further scoring needs a new instance.
    pub fn close(self) {
        if let ModelState::Ready { info, .. } = &self.state {
            tracing::debug!(name = %info.name, "scoring model closed");
        }
    }
}
