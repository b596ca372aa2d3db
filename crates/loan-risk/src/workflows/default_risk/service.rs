use std::collections::BTreeSet;
use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{debug, error, info};

use super::domain::{ApplicantRecord, FieldRangeError, FORM_FEATURES};
use super::encoding::{EncodeError, EncodedCategories, EncoderTable};
use super::features::{assemble, check_schema, named_features, EncodedFeatureVector, SchemaMismatch};
use super::model::{Classifier, InferenceError};
use super::presentation::RiskAssessment;

/// Scores applicants against an injected classifier and encoder table.
///
/// Both artifacts are read-only after construction, so one service can be
/// shared across concurrent requests behind an `Arc` without locking.
#[derive(Debug)]
pub struct DefaultRiskService<C> {
    classifier: Arc<C>,
    encoders: Arc<EncoderTable>,
}

impl<C> DefaultRiskService<C>
where
    C: Classifier + 'static,
{
    pub fn new(classifier: Arc<C>, encoders: Arc<EncoderTable>) -> Self {
        Self {
            classifier,
            encoders,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Startup check that the artifacts match the form: the classifier's
    /// declared features equal the form features and every declared choice
    /// of every categorical field has a trained code.
    pub fn verify_schema(&self) -> Result<(), ScoringError> {
        self.encoders.check_vocabulary()?;

        let available: BTreeSet<&str> = FORM_FEATURES.into_iter().collect();
        check_schema(&available, self.classifier.feature_names())?;
        Ok(())
    }

    pub fn encode(&self, record: &ApplicantRecord) -> Result<EncodedCategories, ScoringError> {
        Ok(self.encoders.encode_record(record)?)
    }

    /// Encode and lay out one applicant in the classifier's column order.
    pub fn feature_vector(
        &self,
        record: &ApplicantRecord,
    ) -> Result<EncodedFeatureVector, ScoringError> {
        let categories = self.encode(record)?;
        let named = named_features(record, &categories);
        let row = assemble(&named, self.classifier.feature_names())?;
        debug!(columns = row.len(), "feature vector assembled");
        Ok(row)
    }

    /// Run the full pipeline for one submission.
    pub fn assess(&self, record: &ApplicantRecord) -> Result<RiskAssessment, ScoringError> {
        record.validate()?;

        let row = self.feature_vector(record)?;

        let [_, probability] = self.classifier.predict_proba(&row).map_err(|err| {
            error!(error = %err, "classifier probability call failed");
            ScoringError::Inference(err)
        })?;
        let label = self.classifier.predict(&row).map_err(|err| {
            error!(error = %err, "classifier label call failed");
            ScoringError::Inference(err)
        })?;

        info!(probability, label, "default risk assessed");
        Ok(RiskAssessment::from_prediction(probability, label))
    }
}

/// Error raised while scoring a single applicant.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    InvalidField(#[from] FieldRangeError),
    #[error(transparent)]
    Encoding(#[from] EncodeError),
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),
    #[error("prediction failed: {0}")]
    Inference(#[source] InferenceError),
}

impl ScoringError {
    /// Whether the submitted values, rather than the loaded artifacts, caused the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScoringError::InvalidField(_)
                | ScoringError::Encoding(EncodeError::UnknownCategory { .. })
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Message safe to return to callers. Inference details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ScoringError::Inference(_) => {
                "prediction failed; the request was not scored".to_string()
            }
            err if err.is_client_error() => err.to_string(),
            err => format!("scoring configuration error: {err}"),
        }
    }
}
