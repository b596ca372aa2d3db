use crate::infra::load_risk_service;
use clap::Args;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::workflows::default_risk::{form_schema, ApplicantRecord, FieldKind, RiskAssessment};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Applicant age in years
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(18..=100))]
    pub(crate) age: u32,
    /// Annual income
    #[arg(long, default_value_t = 50_000)]
    pub(crate) income: u64,
    /// Years of employment
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(0..=50))]
    pub(crate) employment_length: u32,
    /// RENT, OWN, MORTGAGE or OTHER
    #[arg(long, default_value = "RENT")]
    pub(crate) home_ownership: String,
    /// EDUCATION, MEDICAL, VENTURE, PERSONAL, DEBTCONSOLIDATION or HOMEIMPROVEMENT
    #[arg(long, default_value = "EDUCATION")]
    pub(crate) loan_intent: String,
    /// Loan grade A through G
    #[arg(long, default_value = "A")]
    pub(crate) loan_grade: String,
    /// Requested loan amount
    #[arg(long, default_value_t = 10_000)]
    pub(crate) loan_amount: u64,
    /// Interest rate in percent
    #[arg(long, default_value_t = 10.0)]
    pub(crate) interest_rate: f64,
    /// Loan amount as a fraction of income
    #[arg(long, default_value_t = 0.2)]
    pub(crate) loan_percent_income: f64,
    /// Length of credit history in years
    #[arg(long, default_value_t = 5)]
    pub(crate) credit_history_length: u32,
    /// Y if the applicant has defaulted before, otherwise N
    #[arg(long, default_value = "Y")]
    pub(crate) prior_default: String,
    /// Classifier artifact (defaults to APP_MODEL_PATH)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Encoder artifact (defaults to APP_ENCODERS_PATH)
    #[arg(long)]
    pub(crate) encoders: Option<PathBuf>,
}

impl AssessArgs {
    pub(crate) fn record(&self) -> ApplicantRecord {
        ApplicantRecord {
            age: self.age,
            income: self.income,
            employment_length: self.employment_length,
            home_ownership: self.home_ownership.clone(),
            loan_intent: self.loan_intent.clone(),
            loan_grade: self.loan_grade.clone(),
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            loan_percent_income: self.loan_percent_income,
            credit_history_length: self.credit_history_length,
            prior_default: self.prior_default.clone(),
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct FormArgs {
    /// Emit the schema as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let mut artifacts = AppConfig::load()?.artifacts;
    if let Some(model) = args.model.clone() {
        artifacts.model_path = model;
    }
    if let Some(encoders) = args.encoders.clone() {
        artifacts.encoders_path = encoders;
    }

    let service = load_risk_service(&artifacts)?;
    let assessment = service.assess(&args.record())?;
    print!("{}", render_assessment(&assessment));
    Ok(())
}

pub(crate) fn render_assessment(assessment: &RiskAssessment) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Default Probability: {}\n",
        assessment.probability_display
    ));
    output.push_str("Prediction Result\n");
    output.push_str(&format!("  {}\n", assessment.message));
    output
}

pub(crate) fn run_form(args: FormArgs) -> Result<(), AppError> {
    let schema = form_schema();
    if args.json {
        let rendered = serde_json::to_string_pretty(&schema)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Applicant Information");
    for field in &schema {
        let detail = match (&field.kind, &field.choices) {
            (FieldKind::Numeric { min, max, default, .. }, _) => match max {
                Some(max) => format!("{min} to {max}, default {default}"),
                None => format!("at least {min}, default {default}"),
            },
            (FieldKind::Choice { .. }, Some(choices)) => format!(
                "one of {}, default {}",
                choices.join(", "),
                field.default_choice.unwrap_or_default()
            ),
            (FieldKind::Choice { .. }, None) => String::new(),
        };
        println!("  {:<32} {}", field.label, detail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_risk_rendering_matches_form_output() {
        let assessment = RiskAssessment::from_prediction(0.1823, 0);
        let rendered = render_assessment(&assessment);
        assert_eq!(
            rendered,
            "Default Probability: 18.23%\nPrediction Result\n  Low Risk: Customer is NOT likely to default.\n"
        );
    }

    #[test]
    fn high_risk_rendering_names_the_default() {
        let rendered = render_assessment(&RiskAssessment::from_prediction(0.91, 1));
        assert!(rendered.starts_with("Default Probability: 91.00%"));
        assert!(rendered.contains("likely to DEFAULT"));
    }

    #[test]
    fn form_listing_prints_without_artifacts() {
        assert!(run_form(FormArgs::default()).is_ok());
    }
}
