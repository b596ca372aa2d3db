pub mod default_risk;
