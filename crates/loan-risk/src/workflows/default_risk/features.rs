use std::collections::{BTreeMap, BTreeSet};

use super::domain::ApplicantRecord;
use super::encoding::EncodedCategories;

/// One applicant row laid out in the classifier's declared column order.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl EncodedFeatureVector {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| self.values[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// The assembled record and the classifier disagree on which columns exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "feature schema mismatch: classifier expects [{}] not produced by the form, form produces [{}] unknown to the classifier{}",
    .missing.join(", "),
    .unexpected.join(", "),
    describe_duplicates(.duplicated)
)]
pub struct SchemaMismatch {
    /// Expected by the classifier but absent from the record.
    pub missing: Vec<String>,
    /// Present in the record but unknown to the classifier.
    pub unexpected: Vec<String>,
    /// Listed more than once in the classifier's declared order.
    pub duplicated: Vec<String>,
}

fn describe_duplicates(duplicated: &[String]) -> String {
    if duplicated.is_empty() {
        String::new()
    } else {
        format!(", duplicated [{}]", duplicated.join(", "))
    }
}

/// Every named column of one applicant after categorical encoding.
pub fn named_features(
    record: &ApplicantRecord,
    categories: &EncodedCategories,
) -> BTreeMap<&'static str, f64> {
    let mut named: BTreeMap<&'static str, f64> = record.numeric_features().into_iter().collect();
    for (field, code) in categories.iter() {
        named.insert(field.feature_name(), code as f64);
    }
    named
}

/// Compare the record's column set with a declared order without building a row.
pub fn check_schema<S: AsRef<str>>(
    available: &BTreeSet<&str>,
    expected_order: &[S],
) -> Result<(), SchemaMismatch> {
    let mut seen = BTreeSet::new();
    let mut duplicated = Vec::new();
    let mut missing = Vec::new();

    for name in expected_order.iter().map(AsRef::as_ref) {
        if !seen.insert(name) {
            if !duplicated.iter().any(|existing: &String| existing == name) {
                duplicated.push(name.to_string());
            }
            continue;
        }
        if !available.contains(name) {
            missing.push(name.to_string());
        }
    }

    let unexpected: Vec<String> = available
        .iter()
        .filter(|name| !seen.contains(*name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() && unexpected.is_empty() && duplicated.is_empty() {
        Ok(())
    } else {
        Err(SchemaMismatch {
            missing,
            unexpected,
            duplicated,
        })
    }
}

/// Project named columns into `expected_order`. The name sets must match exactly.
pub fn assemble<S: AsRef<str>>(
    named: &BTreeMap<&'static str, f64>,
    expected_order: &[S],
) -> Result<EncodedFeatureVector, SchemaMismatch> {
    let available: BTreeSet<&str> = named.keys().copied().collect();
    check_schema(&available, expected_order)?;

    let mut columns = Vec::with_capacity(expected_order.len());
    let mut values = Vec::with_capacity(expected_order.len());
    for name in expected_order.iter().map(AsRef::as_ref) {
        // check_schema guarantees presence
        let Some(value) = named.get(name) else {
            continue;
        };
        columns.push(name.to_string());
        values.push(*value);
    }

    Ok(EncodedFeatureVector { columns, values })
}
