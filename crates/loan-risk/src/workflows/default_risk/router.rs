use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::warn;

use super::domain::{form_schema, ApplicantRecord};
use super::model::Classifier;
use super::service::{DefaultRiskService, ScoringError};

/// Router builder exposing the applicant form and the assessment endpoint.
pub fn default_risk_router<C>(service: Arc<DefaultRiskService<C>>) -> Router
where
    C: Classifier + 'static,
{
    Router::new()
        .route("/api/v1/default-risk/form", get(form_handler))
        .route(
            "/api/v1/default-risk/assessments",
            post(assess_handler::<C>),
        )
        .with_state(service)
}

pub(crate) async fn form_handler() -> Response {
    (StatusCode::OK, Json(json!({ "fields": form_schema() }))).into_response()
}

pub(crate) async fn assess_handler<C>(
    State(service): State<Arc<DefaultRiskService<C>>>,
    Json(record): Json<ApplicantRecord>,
) -> Response
where
    C: Classifier + 'static,
{
    match service.assess(&record) {
        Ok(assessment) => (StatusCode::OK, Json(assessment)).into_response(),
        Err(err) => scoring_error_response(err),
    }
}

pub(crate) fn scoring_error_response(err: ScoringError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        warn!(error = %err, "assessment aborted");
    }
    let payload = json!({ "error": err.public_message() });
    (status, Json(payload)).into_response()
}
