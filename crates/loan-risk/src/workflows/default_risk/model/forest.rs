use serde::Deserialize;

use super::{
    check_row, default_threshold, probability_pair, validate_common, Classifier, InferenceError,
    ModelValidationError,
};
use crate::workflows::default_risk::features::EncodedFeatureVector;

/// Node of a flattened decision tree. Splits send `x[feature] <= threshold` left.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Fraction of positive (defaulting) training samples in this leaf.
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    fn validate(&self, tree: usize, feature_count: usize) -> Result<(), ModelValidationError> {
        if self.nodes.is_empty() {
            return Err(ModelValidationError::EmptyTree { tree });
        }

        let node_error = |node: usize, reason: String| ModelValidationError::Node {
            tree,
            node,
            reason,
        };

        for (index, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= feature_count {
                        return Err(node_error(
                            index,
                            format!("feature index {feature} out of range"),
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(node_error(index, "split threshold not finite".to_string()));
                    }
                    for child in [left, right] {
                        // children strictly after the parent rules out cycles
                        if child <= index || child >= self.nodes.len() {
                            return Err(node_error(
                                index,
                                format!("child index {child} invalid"),
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(node_error(index, format!("leaf value {value} outside [0, 1]")));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_value(&self, values: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if values[feature] <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Averaged ensemble of decision trees.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestModel {
    feature_names: Vec<String>,
    trees: Vec<DecisionTree>,
    threshold: f64,
}

impl RandomForestModel {
    pub fn new(
        feature_names: Vec<String>,
        trees: Vec<DecisionTree>,
    ) -> Result<Self, ModelValidationError> {
        let model = Self {
            feature_names,
            trees,
            threshold: default_threshold(),
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_common(&self.feature_names, self.threshold)?;
        if self.trees.is_empty() {
            return Err(ModelValidationError::EmptyForest);
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(index, self.feature_names.len())?;
        }
        Ok(())
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ModelValidationError> {
        self.threshold = threshold;
        self.validate()?;
        Ok(self)
    }
}

impl Classifier for RandomForestModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn decision_threshold(&self) -> f64 {
        self.threshold
    }

    fn predict_proba(&self, row: &EncodedFeatureVector) -> Result<[f64; 2], InferenceError> {
        check_row(&self.feature_names, row)?;
        let values = row.values();
        let total: f64 = self.trees.iter().map(|tree| tree.leaf_value(values)).sum();
        probability_pair(total / self.trees.len() as f64)
    }
}
