use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::domain::CategoricalField;
use super::encoding::{EncodeError, EncoderTable, LabelEncoder, VocabularyError};
use super::model::{Classifier, ClassifierArtifact, ModelValidationError, RawClassifierArtifact};

/// Failure reading the fitted model or encoder artifacts. Fatal at startup.
#[derive(Debug)]
pub enum ArtifactLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    Csv(csv::Error),
    InvalidModel(ModelValidationError),
    InvalidEncoder {
        field: CategoricalField,
        source: VocabularyError,
    },
    MissingEncoders(Vec<CategoricalField>),
    UncoveredChoice {
        field: CategoricalField,
        category: String,
    },
}

impl std::fmt::Display for ArtifactLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactLoadError::Io { path, source } => {
                write!(f, "failed to read artifact {}: {}", path.display(), source)
            }
            ArtifactLoadError::Json(err) => write!(f, "invalid artifact JSON: {}", err),
            ArtifactLoadError::Csv(err) => write!(f, "invalid encoder CSV: {}", err),
            ArtifactLoadError::InvalidModel(err) => write!(f, "invalid classifier: {}", err),
            ArtifactLoadError::InvalidEncoder { field, source } => {
                write!(f, "invalid encoder for {}: {}", field, source)
            }
            ArtifactLoadError::MissingEncoders(fields) => {
                let names: Vec<&str> = fields.iter().map(|field| field.feature_name()).collect();
                write!(f, "encoder artifact lacks encoders for {}", names.join(", "))
            }
            ArtifactLoadError::UncoveredChoice { field, category } => write!(
                f,
                "encoder for {} has no code for the form choice '{}'",
                field, category
            ),
        }
    }
}

impl std::error::Error for ArtifactLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArtifactLoadError::Io { source, .. } => Some(source),
            ArtifactLoadError::Json(err) => Some(err),
            ArtifactLoadError::Csv(err) => Some(err),
            ArtifactLoadError::InvalidModel(err) => Some(err),
            ArtifactLoadError::InvalidEncoder { source, .. } => Some(source),
            ArtifactLoadError::MissingEncoders(_) | ArtifactLoadError::UncoveredChoice { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ArtifactLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<csv::Error> for ArtifactLoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<ModelValidationError> for ArtifactLoadError {
    fn from(err: ModelValidationError) -> Self {
        Self::InvalidModel(err)
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ArtifactLoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ArtifactLoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Read and validate a classifier artifact from disk.
pub fn load_classifier(path: impl AsRef<Path>) -> Result<ClassifierArtifact, ArtifactLoadError> {
    let path = path.as_ref();
    let classifier = classifier_from_reader(open(path)?)?;
    info!(
        path = %path.display(),
        kind = classifier.kind(),
        features = classifier.feature_names().len(),
        "classifier artifact loaded"
    );
    Ok(classifier)
}

pub fn classifier_from_reader<R: Read>(reader: R) -> Result<ClassifierArtifact, ArtifactLoadError> {
    let raw: RawClassifierArtifact = serde_json::from_reader(reader)?;
    Ok(ClassifierArtifact::try_from(raw)?)
}

/// Read the encoder set from disk. `.csv` files hold `field,category,code` rows;
/// anything else is parsed as JSON.
pub fn load_encoders(path: impl AsRef<Path>) -> Result<EncoderTable, ArtifactLoadError> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let reader = open(path)?;
    let table = if is_csv {
        encoders_from_csv(reader)?
    } else {
        encoders_from_json(reader)?
    };
    info!(path = %path.display(), "encoder artifact loaded");
    Ok(table)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EncoderSpec {
    Classes(Vec<String>),
    Codes(BTreeMap<String, i64>),
}

/// JSON object keyed by feature name; each value is a class list or a
/// category-to-code map.
pub fn encoders_from_json<R: Read>(reader: R) -> Result<EncoderTable, ArtifactLoadError> {
    let specs: BTreeMap<String, EncoderSpec> = serde_json::from_reader(reader)?;
    let mut table = EncoderTable::new();

    for (name, spec) in specs {
        let Some(field) = CategoricalField::from_feature_name(&name) else {
            warn!(feature = %name, "ignoring encoder for a feature the form does not collect");
            continue;
        };
        let encoder = match spec {
            EncoderSpec::Classes(classes) => LabelEncoder::from_classes(classes),
            EncoderSpec::Codes(codes) => LabelEncoder::from_codes(codes),
        }
        .map_err(|source| ArtifactLoadError::InvalidEncoder { field, source })?;
        debug!(feature = %name, categories = encoder.len(), "encoder registered");
        table.insert(field, encoder);
    }

    ensure_complete(table)
}

#[derive(Debug, Deserialize)]
struct EncoderRow {
    field: String,
    category: String,
    code: i64,
}

pub fn encoders_from_csv<R: Read>(reader: R) -> Result<EncoderTable, ArtifactLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut codes: BTreeMap<CategoricalField, BTreeMap<String, i64>> = BTreeMap::new();

    for row in csv_reader.deserialize::<EncoderRow>() {
        let row = row?;
        let Some(field) = CategoricalField::from_feature_name(&row.field) else {
            warn!(feature = %row.field, "ignoring encoder row for a feature the form does not collect");
            continue;
        };
        let entry = codes.entry(field).or_default();
        if entry.insert(row.category.clone(), row.code).is_some() {
            return Err(ArtifactLoadError::InvalidEncoder {
                field,
                source: VocabularyError::DuplicateCategory {
                    category: row.category,
                },
            });
        }
    }

    let mut table = EncoderTable::new();
    for (field, field_codes) in codes {
        let encoder = LabelEncoder::from_codes(field_codes)
            .map_err(|source| ArtifactLoadError::InvalidEncoder { field, source })?;
        table.insert(field, encoder);
    }
    ensure_complete(table)
}

fn ensure_complete(table: EncoderTable) -> Result<EncoderTable, ArtifactLoadError> {
    let missing = table.missing_fields();
    if !missing.is_empty() {
        return Err(ArtifactLoadError::MissingEncoders(missing));
    }

    match table.check_vocabulary() {
        Ok(()) => Ok(table),
        Err(EncodeError::UntrainedChoice { field, category }) => {
            Err(ArtifactLoadError::UncoveredChoice { field, category })
        }
        Err(EncodeError::MissingEncoder { field }) => {
            Err(ArtifactLoadError::MissingEncoders(vec![field]))
        }
        Err(EncodeError::UnknownCategory { field, category }) => {
            Err(ArtifactLoadError::UncoveredChoice { field, category })
        }
    }
}
