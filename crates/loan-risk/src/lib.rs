//! Loan default risk scoring.
//!
//! Turns a submitted applicant form into the ordered feature vector a
//! pre-trained classifier expects, runs inference, and renders a risk verdict.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
