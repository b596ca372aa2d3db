use loan_risk::config::ArtifactConfig;
use loan_risk::error::AppError;
use loan_risk::workflows::default_risk::{
    load_classifier, load_encoders, ClassifierArtifact, DefaultRiskService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type RiskService = DefaultRiskService<ClassifierArtifact>;

/// Load both artifacts and refuse to continue if they disagree with the form.
pub(crate) fn load_risk_service(artifacts: &ArtifactConfig) -> Result<Arc<RiskService>, AppError> {
    let classifier = load_classifier(&artifacts.model_path)?;
    let encoders = load_encoders(&artifacts.encoders_path)?;
    let service = DefaultRiskService::new(Arc::new(classifier), Arc::new(encoders));
    service.verify_schema()?;
    info!(
        model = %artifacts.model_path.display(),
        encoders = %artifacts.encoders_path.display(),
        "scoring artifacts verified"
    );
    Ok(Arc::new(service))
}
