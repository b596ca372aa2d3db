use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::domain::{ApplicantRecord, CategoricalField};

/// Capability every fitted categorical encoder exposes.
pub trait CategoryEncoder: Send + Sync + fmt::Debug {
    fn encode(&self, category: &str) -> Result<i64, UnknownCategory>;

    /// Trained vocabulary, ordered by code.
    fn categories(&self) -> Vec<&str>;
}

/// A category outside the encoder's training vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{category}'")]
pub struct UnknownCategory {
    pub category: String,
}

/// Table-driven label encoder: each trained category maps to a fixed code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    codes: BTreeMap<String, i64>,
}

impl LabelEncoder {
    /// Codes follow the position of each class, as a fitted label encoder assigns them.
    pub fn from_classes<I, S>(classes: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut codes = BTreeMap::new();
        for (position, class) in classes.into_iter().enumerate() {
            let class = class.into();
            if codes.contains_key(&class) {
                return Err(VocabularyError::DuplicateCategory { category: class });
            }
            codes.insert(class, position as i64);
        }
        Ok(Self { codes })
    }

    /// Explicit category-to-code map. Each code must belong to one category.
    pub fn from_codes(codes: BTreeMap<String, i64>) -> Result<Self, VocabularyError> {
        let mut owners: BTreeMap<i64, &str> = BTreeMap::new();
        for (category, code) in &codes {
            if let Some(first) = owners.insert(*code, category) {
                return Err(VocabularyError::SharedCode {
                    code: *code,
                    first: first.to_string(),
                    second: category.clone(),
                });
            }
        }
        Ok(Self { codes })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl CategoryEncoder for LabelEncoder {
    fn encode(&self, category: &str) -> Result<i64, UnknownCategory> {
        self.codes
            .get(category)
            .copied()
            .ok_or_else(|| UnknownCategory {
                category: category.to_string(),
            })
    }

    fn categories(&self) -> Vec<&str> {
        let mut by_code: Vec<(&str, i64)> = self
            .codes
            .iter()
            .map(|(category, code)| (category.as_str(), *code))
            .collect();
        by_code.sort_by_key(|(_, code)| *code);
        by_code.into_iter().map(|(category, _)| category).collect()
    }
}

/// Encoder vocabulary that cannot be used as a one-to-one mapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabularyError {
    #[error("class '{category}' listed more than once")]
    DuplicateCategory { category: String },
    #[error("categories '{first}' and '{second}' share code {code}")]
    SharedCode {
        code: i64,
        first: String,
        second: String,
    },
}

/// Failure translating a categorical field into its trained code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("{} value '{category}' was not seen during training", .field.label())]
    UnknownCategory {
        field: CategoricalField,
        category: String,
    },
    #[error("no encoder loaded for {field}")]
    MissingEncoder { field: CategoricalField },
    #[error("encoder for {field} lacks the form choice '{category}'")]
    UntrainedChoice {
        field: CategoricalField,
        category: String,
    },
}

/// Read-only mapping from categorical field to its fitted encoder.
#[derive(Debug, Default)]
pub struct EncoderTable {
    encoders: HashMap<CategoricalField, Box<dyn CategoryEncoder>>,
}

impl EncoderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoder<E>(mut self, field: CategoricalField, encoder: E) -> Self
    where
        E: CategoryEncoder + 'static,
    {
        self.insert(field, encoder);
        self
    }

    pub fn insert<E>(&mut self, field: CategoricalField, encoder: E)
    where
        E: CategoryEncoder + 'static,
    {
        self.encoders.insert(field, Box::new(encoder));
    }

    pub fn get(&self, field: CategoricalField) -> Option<&dyn CategoryEncoder> {
        self.encoders.get(&field).map(|encoder| encoder.as_ref())
    }

    pub fn encode(&self, field: CategoricalField, category: &str) -> Result<i64, EncodeError> {
        let encoder = self
            .get(field)
            .ok_or(EncodeError::MissingEncoder { field })?;
        encoder
            .encode(category)
            .map_err(|UnknownCategory { category }| EncodeError::UnknownCategory { field, category })
    }

    /// Categorical fields with no encoder loaded, in form order.
    pub fn missing_fields(&self) -> Vec<CategoricalField> {
        CategoricalField::ALL
            .into_iter()
            .filter(|field| !self.encoders.contains_key(field))
            .collect()
    }

    /// Every form choice must have a trained code, otherwise users picking it
    /// would be rejected for an artifact gap.
    pub fn check_vocabulary(&self) -> Result<(), EncodeError> {
        for field in CategoricalField::ALL {
            for choice in field.choices() {
                match self.encode(field, choice) {
                    Ok(_) => {}
                    Err(EncodeError::UnknownCategory { field, category }) => {
                        return Err(EncodeError::UntrainedChoice { field, category });
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(())
    }

    /// Encode every categorical field of a record; the first failure wins.
    pub fn encode_record(&self, record: &ApplicantRecord) -> Result<EncodedCategories, EncodeError> {
        let mut codes = [0_i64; 4];
        for (slot, field) in codes.iter_mut().zip(CategoricalField::ALL) {
            *slot = self.encode(field, record.category(field))?;
        }
        Ok(EncodedCategories { codes })
    }
}

/// Trained codes for the four categorical fields of one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedCategories {
    codes: [i64; 4],
}

impl EncodedCategories {
    pub fn code(&self, field: CategoricalField) -> i64 {
        self.codes[field as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoricalField, i64)> + '_ {
        CategoricalField::ALL.into_iter().zip(self.codes.iter().copied())
    }
}
