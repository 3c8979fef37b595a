//! Additive regression tree ensembles with path attribution.
//!
//! Every node carries the expected output of the samples that reached it.
//! Walking the decision path credits each split's feature with the change in
//! expected value from parent to child, so per tree the credits sum exactly to
//! `leaf - root`.

use serde::{Deserialize, Serialize};

use super::{Attribution, AttributionModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Goes `left` when `x[feature] < threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        value: f64,
    },
    Leaf { value: f64 },
}

impl TreeNode {
    pub fn value(&self) -> f64 {
        match self {
            Self::Split { value, .. } | Self::Leaf { value } => *value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    fn root_value(&self) -> f64 {
        self.nodes.first().map_or(0.0, TreeNode::value)
    }

    /// Highest feature index any split reads, if the tree splits at all.
    fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                TreeNode::Split { feature, .. } => Some(*feature),
                TreeNode::Leaf { .. } => None,
            })
            .max()
    }

    /// Adds this tree's path credits into `contributions`; returns the leaf value.
    ///
    /// A path never visits more nodes than the tree has, so a malformed tree
    /// that loops stops at the node it reached with the credits still summing
    /// to `value - root`.
    fn attribute(&self, inputs: &[f64], contributions: &mut [f64]) -> f64 {
        let mut index = 0;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    value,
                }) => {
                    let x = inputs.get(*feature).copied().unwrap_or(0.0);
                    let next = if x < *threshold { *left } else { *right };
                    let child_value = self.nodes.get(next).map_or(*value, TreeNode::value);
                    if let Some(slot) = contributions.get_mut(*feature) {
                        *slot += child_value - value;
                    }
                    index = next;
                }
                Some(TreeNode::Leaf { value }) => return *value,
                None => return self.root_value(),
            }
        }
        self.nodes.get(index).map_or(self.root_value(), TreeNode::value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    pub fn new(base_score: f64, trees: Vec<RegressionTree>) -> Self {
        Self { base_score, trees }
    }
}

impl AttributionModel for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }

    fn accepts_width(&self, width: usize) -> bool {
        self.trees
            .iter()
            .filter_map(RegressionTree::max_feature)
            .all(|feature| feature < width)
    }

    fn explain(&self, inputs: &[f64]) -> Attribution {
        let mut contributions = vec![0.0; inputs.len()];
        let mut raw_value = self.base_score;
        let mut base_value = self.base_score;
        for tree in &self.trees {
            raw_value += tree.attribute(inputs, &mut contributions);
            base_value += tree.root_value();
        }

        Attribution {
            raw_value,
            base_value,
            contributions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, root: f64, below: f64, above: f64) -> RegressionTree {
        RegressionTree::new(vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
                value: root,
            },
            TreeNode::Leaf { value: below },
            TreeNode::Leaf { value: above },
        ])
    }

    #[test]
    fn single_stump_credits_its_split_feature() {
        let ensemble = TreeEnsemble::new(0.1, vec![stump(1, 0.02, 0.0, 0.01, -0.03)]);
        let attribution = ensemble.explain(&[100.0, 0.05]);

        assert_eq!(attribution.contributions, vec![0.0, -0.03]);
        assert!((attribution.raw_value - 0.07).abs() < 1e-12);
        assert!((attribution.base_value - 0.1).abs() < 1e-12);
        assert!(attribution.residual().abs() < 1e-12);
    }

    #[test]
    fn deeper_path_splits_credit_between_features() {
        let tree = RegressionTree::new(vec![
            TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 1,
                right: 2,
                value: 0.5,
            },
            TreeNode::Leaf { value: 0.2 },
            TreeNode::Split {
                feature: 1,
                threshold: 10.0,
                left: 3,
                right: 4,
                value: 0.8,
            },
            TreeNode::Leaf { value: 0.6 },
            TreeNode::Leaf { value: 1.1 },
        ]);
        let ensemble = TreeEnsemble::new(0.0, vec![tree]);
        let attribution = ensemble.explain(&[2.0, 12.0]);

        assert!((attribution.contributions[0] - 0.3).abs() < 1e-12);
        assert!((attribution.contributions[1] - 0.3).abs() < 1e-12);
        assert!((attribution.raw_value - 1.1).abs() < 1e-12);
        assert!(attribution.residual().abs() < 1e-12);
    }

    #[test]
    fn contributions_sum_across_trees() {
        let ensemble = TreeEnsemble::new(
            -0.2,
            vec![stump(0, 5.0, 0.0, 0.4, -0.4), stump(0, 3.0, 0.1, -0.1, 0.3)],
        );
        let attribution = ensemble.explain(&[4.0]);

        assert!((attribution.contributions[0] - 0.6).abs() < 1e-12);
        assert!((attribution.base_value + 0.1).abs() < 1e-12);
        assert!(attribution.residual().abs() < 1e-12);
    }

    #[test]
    fn self_referencing_split_terminates() {
        let looping = RegressionTree::new(vec![TreeNode::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 0,
            value: 0.25,
        }]);
        let ensemble = TreeEnsemble::new(0.0, vec![looping]);

        let attribution = ensemble.explain(&[3.0]);

        assert_eq!(attribution.raw_value, 0.25);
        assert_eq!(attribution.contributions, vec![0.0]);
        assert!(attribution.residual().abs() < 1e-12);
    }

    #[test]
    fn width_must_cover_every_split_feature() {
        let ensemble = TreeEnsemble::new(0.0, vec![stump(2, 1.0, 0.0, 0.1, 0.2)]);
        assert!(ensemble.accepts_width(3));
        assert!(!ensemble.accepts_width(2));
    }
}
