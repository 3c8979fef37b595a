//! Serialized model artifact format.
//!
//! ```json
//! {
//!   "name": "credit-risk",
//!   "version": "2024.06",
//!   "feature_names": ["close", "volatility_30d"],
//!   "model": { "kind": "linear", "intercept": 0.01, "coefficients": [0.0001, -0.4] }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::linear::LinearModel;
use super::trees::{RegressionTree, TreeEnsemble, TreeNode};
use super::AttributionModel;
use crate::ModelError;

/// On-disk model description with its required feature schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub feature_names: Vec<String>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
        /// Background means for attribution; zeros when omitted.
        #[serde(default)]
        feature_means: Vec<f64>,
    },
    TreeEnsemble {
        #[serde(default)]
        base_score: f64,
        trees: Vec<TreeSpec>,
    },
}

impl ModelSpec {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::TreeEnsemble { .. } => "tree_ensemble",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<TreeNode>,
}

fn default_name() -> String {
    String::from("unnamed")
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Checks shapes, indices and finiteness against the feature schema.
    pub fn validate(&self) -> Result<(), ModelError> {
        let width = self.feature_names.len();
        if width == 0 {
            return Err(invalid("feature_names must not be empty"));
        }
        for (index, name) in self.feature_names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(invalid(format!("feature_names[{index}] is blank")));
            }
            if self.feature_names[..index].contains(name) {
                return Err(invalid(format!("feature '{name}' is listed twice")));
            }
        }

        match &self.model {
            ModelSpec::Linear {
                intercept,
                coefficients,
                feature_means,
            } => {
                if coefficients.len() != width {
                    return Err(invalid(format!(
                        "expected {width} coefficients, found {}",
                        coefficients.len()
                    )));
                }
                if !feature_means.is_empty() && feature_means.len() != width {
                    return Err(invalid(format!(
                        "expected {width} feature_means, found {}",
                        feature_means.len()
                    )));
                }
                let all_finite = std::iter::once(intercept)
                    .chain(coefficients)
                    .chain(feature_means)
                    .all(|value| value.is_finite());
                if !all_finite {
                    return Err(invalid("linear parameters must be finite"));
                }
            }
            ModelSpec::TreeEnsemble { base_score, trees } => {
                if !base_score.is_finite() {
                    return Err(invalid("base_score must be finite"));
                }
                if trees.is_empty() {
                    return Err(invalid("tree ensemble has no trees"));
                }
                for (tree_index, tree) in trees.iter().enumerate() {
                    validate_tree(tree_index, tree, width)?;
                }
            }
        }

        Ok(())
    }

    /// Builds the runtime model. Call [`ModelArtifact::validate`] first.
    pub(crate) fn build(&self) -> Box<dyn AttributionModel> {
        match &self.model {
            ModelSpec::Linear {
                intercept,
                coefficients,
                feature_means,
            } => {
                let means = if feature_means.is_empty() {
                    vec![0.0; coefficients.len()]
                } else {
                    feature_means.clone()
                };
                Box::new(LinearModel::new(*intercept, coefficients.clone(), means))
            }
            ModelSpec::TreeEnsemble { base_score, trees } => Box::new(TreeEnsemble::new(
                *base_score,
                trees
                    .iter()
                    .map(|tree| RegressionTree::new(tree.nodes.clone()))
                    .collect(),
            )),
        }
    }
}

/// Children must point forward so every path terminates at a leaf.
fn validate_tree(tree_index: usize, tree: &TreeSpec, width: usize) -> Result<(), ModelError> {
    if tree.nodes.is_empty() {
        return Err(invalid(format!("tree {tree_index} has no nodes")));
    }
    for (node_index, node) in tree.nodes.iter().enumerate() {
        if !node.value().is_finite() {
            return Err(invalid(format!(
                "tree {tree_index} node {node_index} has a non-finite value"
            )));
        }
        if let TreeNode::Split {
            feature,
            threshold,
            left,
            right,
            ..
        } = node
        {
            if *feature >= width {
                return Err(invalid(format!(
                    "tree {tree_index} node {node_index} splits on feature {feature} of {width}"
                )));
            }
            if !threshold.is_finite() {
                return Err(invalid(format!(
                    "tree {tree_index} node {node_index} has a non-finite threshold"
                )));
            }
            for child in [*left, *right] {
                if child <= node_index || child >= tree.nodes.len() {
                    return Err(invalid(format!(
                        "tree {tree_index} node {node_index} has invalid child {child}"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ModelError {
    ModelError::Invalid(message.into())
}
