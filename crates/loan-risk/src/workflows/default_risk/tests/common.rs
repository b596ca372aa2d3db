use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::default_risk::encoding::{EncoderTable, LabelEncoder};
use crate::workflows::default_risk::{
    default_risk_router, ApplicantRecord, CategoricalField, Classifier, DefaultRiskService,
    EncodedFeatureVector, InferenceError, LogisticRegressionModel,
};

/// Column order of the training frame, which differs from form order.
pub(super) const TRAINING_ORDER: [&str; 11] = [
    "person_age",
    "person_income",
    "person_home_ownership",
    "person_emp_length",
    "loan_intent",
    "loan_grade",
    "loan_amnt",
    "loan_int_rate",
    "loan_percent_income",
    "cb_person_default_on_file",
    "cb_person_cred_hist_length",
];

pub(super) const COEFFICIENTS: [f64; 11] = [
    -0.01, -0.000008, 0.25, -0.02, -0.05, 0.45, 0.00002, 0.12, 4.5, 0.3, -0.01,
];

pub(super) const INTERCEPT: f64 = -4.0;

pub(super) fn training_order() -> Vec<String> {
    TRAINING_ORDER.iter().map(|name| name.to_string()).collect()
}

pub(super) fn encoder_table() -> EncoderTable {
    EncoderTable::new()
        .with_encoder(
            CategoricalField::HomeOwnership,
            LabelEncoder::from_classes(["MORTGAGE", "OTHER", "OWN", "RENT"]).expect("unique"),
        )
        .with_encoder(
            CategoricalField::LoanIntent,
            LabelEncoder::from_classes([
                "DEBTCONSOLIDATION",
                "EDUCATION",
                "HOMEIMPROVEMENT",
                "MEDICAL",
                "PERSONAL",
                "VENTURE",
            ])
            .expect("unique"),
        )
        .with_encoder(
            CategoricalField::LoanGrade,
            LabelEncoder::from_classes(["A", "B", "C", "D", "E", "F", "G"]).expect("unique"),
        )
        .with_encoder(
            CategoricalField::PriorDefault,
            LabelEncoder::from_classes(["N", "Y"]).expect("unique"),
        )
}

pub(super) fn logistic_model() -> LogisticRegressionModel {
    LogisticRegressionModel::new(training_order(), COEFFICIENTS.to_vec(), INTERCEPT)
        .expect("valid model")
}

pub(super) fn logistic_service() -> DefaultRiskService<LogisticRegressionModel> {
    DefaultRiskService::new(Arc::new(logistic_model()), Arc::new(encoder_table()))
}

/// Probability the logistic fixture should produce for the default form.
pub(super) fn expected_default_probability() -> f64 {
    // training-order values for the form defaults: RENT=3, EDUCATION=1, A=0, Y=1
    let values = [30.0, 50_000.0, 3.0, 5.0, 1.0, 0.0, 10_000.0, 10.0, 0.2, 1.0, 5.0];
    let z = COEFFICIENTS
        .iter()
        .zip(values)
        .fold(INTERCEPT, |acc, (weight, value)| acc + weight * value);
    1.0 / (1.0 + (-z).exp())
}

pub(super) fn sample_record() -> ApplicantRecord {
    ApplicantRecord::default()
}

/// Classifier double that records every row it is asked to score.
pub(super) struct RecordingClassifier {
    pub(super) feature_names: Vec<String>,
    pub(super) probability: f64,
    pub(super) seen: Mutex<Vec<EncodedFeatureVector>>,
}

impl RecordingClassifier {
    pub(super) fn new(feature_names: Vec<String>, probability: f64) -> Self {
        Self {
            feature_names,
            probability,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn rows(&self) -> Vec<EncodedFeatureVector> {
        self.seen.lock().expect("rows mutex poisoned").clone()
    }
}

impl Classifier for RecordingClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, row: &EncodedFeatureVector) -> Result<[f64; 2], InferenceError> {
        self.seen
            .lock()
            .expect("rows mutex poisoned")
            .push(row.clone());
        Ok([1.0 - self.probability, self.probability])
    }
}

/// Classifier double whose inference call always fails.
pub(super) struct FailingClassifier {
    pub(super) feature_names: Vec<String>,
}

impl Classifier for FailingClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, row: &EncodedFeatureVector) -> Result<[f64; 2], InferenceError> {
        Err(InferenceError::Shape {
            expected: self.feature_names.len() + 1,
            found: row.len(),
        })
    }
}

pub(super) fn router_with<C>(classifier: C) -> axum::Router
where
    C: Classifier + 'static,
{
    let service = DefaultRiskService::new(Arc::new(classifier), Arc::new(encoder_table()));
    default_risk_router(Arc::new(service))
}

pub(super) async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}
