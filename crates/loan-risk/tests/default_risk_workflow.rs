use std::sync::Arc;

use loan_risk::workflows::default_risk::{
    load_classifier, load_encoders, ApplicantRecord, ArtifactLoadError, CategoricalField,
    Classifier, ClassifierArtifact, DefaultRiskService, RiskVerdict, ScoringError,
};

const MODEL: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../artifacts/loan_default_model.json"
);
const FOREST: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../artifacts/loan_default_forest.json"
);
const ENCODERS_JSON: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../artifacts/encoders.json");
const ENCODERS_CSV: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../artifacts/encoders.csv");

fn service(model: &str, encoders: &str) -> DefaultRiskService<ClassifierArtifact> {
    let classifier = load_classifier(model).expect("classifier artifact loads");
    let encoders = load_encoders(encoders).expect("encoder artifact loads");
    let service = DefaultRiskService::new(Arc::new(classifier), Arc::new(encoders));
    service.verify_schema().expect("artifacts agree with the form");
    service
}

#[test]
fn shipped_logistic_artifact_scores_default_form_as_low_risk() {
    let service = service(MODEL, ENCODERS_JSON);
    assert_eq!(service.classifier().kind(), "logistic_regression");
    assert_eq!(service.classifier().feature_names()[0], "person_age");

    let assessment = service
        .assess(&ApplicantRecord::default())
        .expect("default form scores");

    // z = -1.55 for the default applicant
    let expected = 1.0 / (1.0 + 1.55_f64.exp());
    assert!((assessment.probability_of_default - expected).abs() < 1e-9);
    assert_eq!(assessment.predicted_label, 0);
    assert_eq!(assessment.verdict, RiskVerdict::Low);
    assert_eq!(assessment.probability_display, "17.51%");
}

#[test]
fn csv_and_json_encoders_agree() {
    let from_json = service(MODEL, ENCODERS_JSON);
    let from_csv = service(MODEL, ENCODERS_CSV);

    for grade in CategoricalField::LoanGrade.choices() {
        let record = ApplicantRecord {
            loan_grade: grade.to_string(),
            ..ApplicantRecord::default()
        };
        let json_row = from_json.feature_vector(&record).expect("json row");
        let csv_row = from_csv.feature_vector(&record).expect("csv row");
        assert_eq!(json_row, csv_row, "grade {grade}");
    }
}

#[test]
fn forest_artifact_averages_its_trees() {
    let service = service(FOREST, ENCODERS_JSON);
    assert_eq!(service.classifier().kind(), "random_forest");

    let assessment = service
        .assess(&ApplicantRecord::default())
        .expect("default form scores");

    let expected = (0.08 + 0.12 + 0.29) / 3.0;
    assert!((assessment.probability_of_default - expected).abs() < 1e-12);
    assert_eq!(assessment.predicted_label, 0);

    let risky = ApplicantRecord {
        income: 20_000,
        loan_percent_income: 0.5,
        interest_rate: 18.0,
        home_ownership: "RENT".to_string(),
        ..ApplicantRecord::default()
    };
    let assessment = service.assess(&risky).expect("risky applicant scores");
    assert!((assessment.probability_of_default - (0.72 + 0.66 + 0.47) / 3.0).abs() < 1e-12);
    assert_eq!(assessment.verdict, RiskVerdict::High);
}

#[test]
fn unseen_grade_is_rejected_with_field_context() {
    let service = service(MODEL, ENCODERS_JSON);
    let record = ApplicantRecord {
        loan_grade: "H".to_string(),
        ..ApplicantRecord::default()
    };

    let err = service.assess(&record).expect_err("grade H was never fitted");
    assert!(matches!(err, ScoringError::Encoding(_)));
    assert!(err.to_string().contains("'H'"));
}

#[test]
fn missing_artifact_reports_its_path() {
    let err = load_classifier("/nonexistent/loan_default_model.json").expect_err("no such file");
    assert!(matches!(err, ArtifactLoadError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/loan_default_model.json"));
}
