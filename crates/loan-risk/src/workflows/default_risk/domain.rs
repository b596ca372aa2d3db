use serde::{Deserialize, Serialize};

/// Feature names the classifier was trained on, in form order.
pub const PERSON_AGE: &str = "person_age";
pub const PERSON_INCOME: &str = "person_income";
pub const PERSON_EMP_LENGTH: &str = "person_emp_length";
pub const PERSON_HOME_OWNERSHIP: &str = "person_home_ownership";
pub const LOAN_INTENT: &str = "loan_intent";
pub const LOAN_GRADE: &str = "loan_grade";
pub const LOAN_AMNT: &str = "loan_amnt";
pub const LOAN_INT_RATE: &str = "loan_int_rate";
pub const LOAN_PERCENT_INCOME: &str = "loan_percent_income";
pub const CB_PERSON_CRED_HIST_LENGTH: &str = "cb_person_cred_hist_length";
pub const CB_PERSON_DEFAULT_ON_FILE: &str = "cb_person_default_on_file";

/// Every feature the form produces.
pub const FORM_FEATURES: [&str; 11] = [
    PERSON_AGE,
    PERSON_INCOME,
    PERSON_EMP_LENGTH,
    PERSON_HOME_OWNERSHIP,
    LOAN_INTENT,
    LOAN_GRADE,
    LOAN_AMNT,
    LOAN_INT_RATE,
    LOAN_PERCENT_INCOME,
    CB_PERSON_CRED_HIST_LENGTH,
    CB_PERSON_DEFAULT_ON_FILE,
];

/// The four fields whose raw values must pass through a fitted encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    HomeOwnership,
    LoanIntent,
    LoanGrade,
    PriorDefault,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 4] = [
        CategoricalField::HomeOwnership,
        CategoricalField::LoanIntent,
        CategoricalField::LoanGrade,
        CategoricalField::PriorDefault,
    ];

    pub const fn feature_name(self) -> &'static str {
        match self {
            CategoricalField::HomeOwnership => PERSON_HOME_OWNERSHIP,
            CategoricalField::LoanIntent => LOAN_INTENT,
            CategoricalField::LoanGrade => LOAN_GRADE,
            CategoricalField::PriorDefault => CB_PERSON_DEFAULT_ON_FILE,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CategoricalField::HomeOwnership => "Home Ownership",
            CategoricalField::LoanIntent => "Loan Intent",
            CategoricalField::LoanGrade => "Loan Grade",
            CategoricalField::PriorDefault => "Previous Default",
        }
    }

    /// Declared choices, in the order the form offers them. The first is the default.
    pub const fn choices(self) -> &'static [&'static str] {
        match self {
            CategoricalField::HomeOwnership => &["RENT", "OWN", "MORTGAGE", "OTHER"],
            CategoricalField::LoanIntent => &[
                "EDUCATION",
                "MEDICAL",
                "PERSONAL",
                "VENTURE",
                "HOMEIMPROVEMENT",
                "DEBTCONSOLIDATION",
            ],
            CategoricalField::LoanGrade => &["A", "B", "C", "D", "E", "F", "G"],
            CategoricalField::PriorDefault => &["Y", "N"],
        }
    }

    pub const fn default_choice(self) -> &'static str {
        self.choices()[0]
    }

    pub fn from_feature_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.feature_name() == name)
    }
}

impl std::fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.feature_name())
    }
}

/// One applicant as submitted through the form. Categorical fields hold the raw
/// category text so unseen values surface as encoding errors instead of being
/// rejected by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantRecord {
    pub age: u32,
    pub income: u64,
    pub employment_length: u32,
    pub home_ownership: String,
    pub loan_intent: String,
    pub loan_grade: String,
    pub loan_amount: u64,
    pub interest_rate: f64,
    pub loan_percent_income: f64,
    pub credit_history_length: u32,
    pub prior_default: String,
}

impl Default for ApplicantRecord {
    fn default() -> Self {
        Self {
            age: 30,
            income: 50_000,
            employment_length: 5,
            home_ownership: CategoricalField::HomeOwnership.default_choice().to_string(),
            loan_intent: CategoricalField::LoanIntent.default_choice().to_string(),
            loan_grade: CategoricalField::LoanGrade.default_choice().to_string(),
            loan_amount: 10_000,
            interest_rate: 10.0,
            loan_percent_income: 0.2,
            credit_history_length: 5,
            prior_default: CategoricalField::PriorDefault.default_choice().to_string(),
        }
    }
}

impl ApplicantRecord {
    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::HomeOwnership => &self.home_ownership,
            CategoricalField::LoanIntent => &self.loan_intent,
            CategoricalField::LoanGrade => &self.loan_grade,
            CategoricalField::PriorDefault => &self.prior_default,
        }
    }

    /// Numeric fields keyed by feature name, as f64 columns.
    pub fn numeric_features(&self) -> [(&'static str, f64); 7] {
        [
            (PERSON_AGE, f64::from(self.age)),
            (PERSON_INCOME, self.income as f64),
            (PERSON_EMP_LENGTH, f64::from(self.employment_length)),
            (LOAN_AMNT, self.loan_amount as f64),
            (LOAN_INT_RATE, self.interest_rate),
            (LOAN_PERCENT_INCOME, self.loan_percent_income),
            (CB_PERSON_CRED_HIST_LENGTH, f64::from(self.credit_history_length)),
        ]
    }

    /// Apply the widget bounds from the form schema.
    pub fn validate(&self) -> Result<(), FieldRangeError> {
        for field in FORM_FIELDS.iter() {
            let FieldKind::Numeric { min, max, .. } = field.kind else {
                continue;
            };
            let value = self
                .numeric_features()
                .into_iter()
                .find(|(name, _)| *name == field.feature)
                .map(|(_, value)| value)
                .unwrap_or(f64::NAN);

            let within = value.is_finite()
                && value >= min
                && max.map_or(true, |upper| value <= upper);
            if !within {
                return Err(FieldRangeError {
                    field: field.name,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// A numeric field fell outside its declared bounds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} must be a finite number {}, found {value}", describe_bounds(.min, .max))]
pub struct FieldRangeError {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: Option<f64>,
}

fn describe_bounds(min: &f64, max: &Option<f64>) -> String {
    match max {
        Some(max) => format!("between {min} and {max}"),
        None => format!("of at least {min}"),
    }
}

/// How a form field is captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Numeric {
        integer: bool,
        min: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        default: f64,
    },
    Choice {
        field: CategoricalField,
    },
}

/// Descriptor for one input on the applicant form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub feature: &'static str,
    pub kind: FieldKind,
}

const fn integer(min: f64, max: Option<f64>, default: f64) -> FieldKind {
    FieldKind::Numeric {
        integer: true,
        min,
        max,
        default,
    }
}

const fn decimal(min: f64, default: f64) -> FieldKind {
    FieldKind::Numeric {
        integer: false,
        min,
        max: None,
        default,
    }
}

/// The applicant form, in display order.
pub const FORM_FIELDS: [FormField; 11] = [
    FormField {
        name: "age",
        label: "Age",
        feature: PERSON_AGE,
        kind: integer(18.0, Some(100.0), 30.0),
    },
    FormField {
        name: "income",
        label: "Annual Income",
        feature: PERSON_INCOME,
        kind: integer(0.0, None, 50_000.0),
    },
    FormField {
        name: "employment_length",
        label: "Employment Length (years)",
        feature: PERSON_EMP_LENGTH,
        kind: integer(0.0, Some(50.0), 5.0),
    },
    FormField {
        name: "loan_amount",
        label: "Loan Amount",
        feature: LOAN_AMNT,
        kind: integer(0.0, None, 10_000.0),
    },
    FormField {
        name: "interest_rate",
        label: "Interest Rate (%)",
        feature: LOAN_INT_RATE,
        kind: decimal(0.0, 10.0),
    },
    FormField {
        name: "loan_percent_income",
        label: "Loan % of Income",
        feature: LOAN_PERCENT_INCOME,
        kind: decimal(0.0, 0.2),
    },
    FormField {
        name: "credit_history_length",
        label: "Credit History Length (years)",
        feature: CB_PERSON_CRED_HIST_LENGTH,
        kind: integer(0.0, None, 5.0),
    },
    FormField {
        name: "home_ownership",
        label: "Home Ownership",
        feature: PERSON_HOME_OWNERSHIP,
        kind: FieldKind::Choice {
            field: CategoricalField::HomeOwnership,
        },
    },
    FormField {
        name: "loan_intent",
        label: "Loan Intent",
        feature: LOAN_INTENT,
        kind: FieldKind::Choice {
            field: CategoricalField::LoanIntent,
        },
    },
    FormField {
        name: "loan_grade",
        label: "Loan Grade",
        feature: LOAN_GRADE,
        kind: FieldKind::Choice {
            field: CategoricalField::LoanGrade,
        },
    },
    FormField {
        name: "prior_default",
        label: "Previous Default",
        feature: CB_PERSON_DEFAULT_ON_FILE,
        kind: FieldKind::Choice {
            field: CategoricalField::PriorDefault,
        },
    },
];

/// Serializable view of the form for API clients.
#[derive(Debug, Clone, Serialize)]
pub struct FormFieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub feature: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_choice: Option<&'static str>,
}

impl From<&FormField> for FormFieldView {
    fn from(field: &FormField) -> Self {
        let (choices, default_choice) = match field.kind {
            FieldKind::Choice { field } => {
                (Some(field.choices().to_vec()), Some(field.default_choice()))
            }
            FieldKind::Numeric { .. } => (None, None),
        };

        Self {
            name: field.name,
            label: field.label,
            feature: field.feature,
            kind: field.kind,
            choices,
            default_choice,
        }
    }
}

pub fn form_schema() -> Vec<FormFieldView> {
    FORM_FIELDS.iter().map(FormFieldView::from).collect()
}
