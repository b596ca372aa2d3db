//! Default-risk assessment for a single loan applicant.
//!
//! Form input is validated, its categorical fields are translated through the
//! fitted encoders, the resulting columns are projected into the classifier's
//! declared order, and the classifier's output is rendered as a verdict.

pub mod artifacts;
pub mod domain;
pub mod encoding;
pub mod features;
pub mod model;
pub mod presentation;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use artifacts::{load_classifier, load_encoders, ArtifactLoadError};
pub use domain::{
    form_schema, ApplicantRecord, CategoricalField, FieldKind, FieldRangeError, FormField,
    FormFieldView, FORM_FEATURES, FORM_FIELDS,
};
pub use encoding::{
    CategoryEncoder, EncodeError, EncodedCategories, EncoderTable, LabelEncoder, UnknownCategory,
};
pub use features::{EncodedFeatureVector, SchemaMismatch};
pub use model::{
    Classifier, ClassifierArtifact, DecisionTree, InferenceError, LogisticRegressionModel,
    ModelValidationError, RandomForestModel, TreeNode,
};
pub use presentation::{RiskAssessment, RiskVerdict};
pub use router::default_risk_router;
pub use service::{DefaultRiskService, ScoringError};
