//! Binary classifiers consumed for inference only.
//!
//! Fitted parameters arrive as JSON artifacts tagged by `kind`; each variant is
//! validated on load so inference never indexes out of bounds.

mod forest;
mod logistic;

pub use forest::{DecisionTree, RandomForestModel, TreeNode};
pub use logistic::LogisticRegressionModel;

use serde::Deserialize;

use super::features::EncodedFeatureVector;

pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Inference surface of a fitted binary classifier.
pub trait Classifier: Send + Sync {
    /// Column order the classifier was fitted with.
    fn feature_names(&self) -> &[String];

    /// Positive-class probability above which `predict` returns 1.
    fn decision_threshold(&self) -> f64 {
        DEFAULT_DECISION_THRESHOLD
    }

    /// `[p(no default), p(default)]` for one row.
    fn predict_proba(&self, row: &EncodedFeatureVector) -> Result<[f64; 2], InferenceError>;

    fn predict(&self, row: &EncodedFeatureVector) -> Result<u8, InferenceError> {
        let [_, positive] = self.predict_proba(row)?;
        Ok(u8::from(positive > self.decision_threshold()))
    }
}

/// Inference call rejected its input or produced an unusable output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("expected {expected} features, received {found}")]
    Shape { expected: usize, found: usize },
    #[error("column {position} is '{found}', classifier expects '{expected}'")]
    ColumnOrder {
        position: usize,
        expected: String,
        found: String,
    },
    #[error("feature '{column}' is not a finite number")]
    NonFiniteInput { column: String },
    #[error("classifier produced an invalid probability {value}")]
    InvalidOutput { value: f64 },
}

/// Reject rows that do not line up with the fitted columns.
pub(crate) fn check_row(
    feature_names: &[String],
    row: &EncodedFeatureVector,
) -> Result<(), InferenceError> {
    if row.len() != feature_names.len() {
        return Err(InferenceError::Shape {
            expected: feature_names.len(),
            found: row.len(),
        });
    }

    for (position, (expected, (found, value))) in feature_names.iter().zip(row.iter()).enumerate()
    {
        if expected != found {
            return Err(InferenceError::ColumnOrder {
                position,
                expected: expected.clone(),
                found: found.to_string(),
            });
        }
        if !value.is_finite() {
            return Err(InferenceError::NonFiniteInput {
                column: found.to_string(),
            });
        }
    }

    Ok(())
}

/// Wrap a positive-class probability as the two-class pair, rejecting NaN and
/// values outside [0, 1].
pub(crate) fn probability_pair(positive: f64) -> Result<[f64; 2], InferenceError> {
    if !(0.0..=1.0).contains(&positive) {
        return Err(InferenceError::InvalidOutput { value: positive });
    }
    Ok([1.0 - positive, positive])
}

/// Classifier as written by the training pipeline, validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegressionModel),
    RandomForest(RandomForestModel),
}

/// Wire form of a classifier artifact. Only reachable through
/// `ClassifierArtifact::try_from`, which validates every parameter.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum RawClassifierArtifact {
    LogisticRegression {
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    RandomForest {
        feature_names: Vec<String>,
        trees: Vec<DecisionTree>,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
}

impl TryFrom<RawClassifierArtifact> for ClassifierArtifact {
    type Error = ModelValidationError;

    fn try_from(raw: RawClassifierArtifact) -> Result<Self, Self::Error> {
        match raw {
            RawClassifierArtifact::LogisticRegression {
                feature_names,
                coefficients,
                intercept,
                threshold,
            } => LogisticRegressionModel::new(feature_names, coefficients, intercept)?
                .with_threshold(threshold)
                .map(ClassifierArtifact::LogisticRegression),
            RawClassifierArtifact::RandomForest {
                feature_names,
                trees,
                threshold,
            } => RandomForestModel::new(feature_names, trees)?
                .with_threshold(threshold)
                .map(ClassifierArtifact::RandomForest),
        }
    }
}

impl ClassifierArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierArtifact::LogisticRegression(_) => "logistic_regression",
            ClassifierArtifact::RandomForest(_) => "random_forest",
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn feature_names(&self) -> &[String] {
        match self {
            ClassifierArtifact::LogisticRegression(model) => model.feature_names(),
            ClassifierArtifact::RandomForest(model) => model.feature_names(),
        }
    }

    fn decision_threshold(&self) -> f64 {
        match self {
            ClassifierArtifact::LogisticRegression(model) => model.decision_threshold(),
            ClassifierArtifact::RandomForest(model) => model.decision_threshold(),
        }
    }

    fn predict_proba(&self, row: &EncodedFeatureVector) -> Result<[f64; 2], InferenceError> {
        match self {
            ClassifierArtifact::LogisticRegression(model) => model.predict_proba(row),
            ClassifierArtifact::RandomForest(model) => model.predict_proba(row),
        }
    }
}

/// Structural problem found while validating a parsed artifact.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelValidationError {
    #[error("model declares no features")]
    NoFeatures,
    #[error("feature '{0}' declared more than once")]
    DuplicateFeature(String),
    #[error("{coefficients} coefficients for {features} features")]
    CoefficientCount { coefficients: usize, features: usize },
    #[error("parameter {name} is not finite")]
    NonFiniteParameter { name: String },
    #[error("decision threshold {0} outside [0, 1]")]
    Threshold(f64),
    #[error("forest contains no trees")]
    EmptyForest,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node}: {reason}")]
    Node {
        tree: usize,
        node: usize,
        reason: String,
    },
}

pub(crate) fn validate_common(
    feature_names: &[String],
    threshold: f64,
) -> Result<(), ModelValidationError> {
    if feature_names.is_empty() {
        return Err(ModelValidationError::NoFeatures);
    }
    for (index, name) in feature_names.iter().enumerate() {
        if feature_names[..index].contains(name) {
            return Err(ModelValidationError::DuplicateFeature(name.clone()));
        }
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ModelValidationError::Threshold(threshold));
    }
    Ok(())
}

pub(crate) fn default_threshold() -> f64 {
    DEFAULT_DECISION_THRESHOLD
}
