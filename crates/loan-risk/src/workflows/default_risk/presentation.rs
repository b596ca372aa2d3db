use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary verdict derived from the classifier's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskVerdict {
    High,
    Low,
}

impl RiskVerdict {
    pub const fn from_label(label: u8) -> Self {
        if label == 1 {
            RiskVerdict::High
        } else {
            RiskVerdict::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskVerdict::High => "high risk",
            RiskVerdict::Low => "low risk",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            RiskVerdict::High => "High Risk: Customer is likely to DEFAULT on the loan.",
            RiskVerdict::Low => "Low Risk: Customer is NOT likely to default.",
        }
    }
}

/// User-facing result of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub probability_of_default: f64,
    pub predicted_label: u8,
    pub probability_display: String,
    pub verdict: RiskVerdict,
    pub verdict_label: &'static str,
    pub message: &'static str,
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn from_prediction(probability_of_default: f64, predicted_label: u8) -> Self {
        let verdict = RiskVerdict::from_label(predicted_label);
        Self {
            probability_of_default,
            predicted_label,
            probability_display: format_probability(probability_of_default),
            verdict,
            verdict_label: verdict.label(),
            message: verdict.message(),
            assessed_at: Utc::now(),
        }
    }
}

/// Percentage with two decimals, e.g. `0.1234` renders as `12.34%`.
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}
