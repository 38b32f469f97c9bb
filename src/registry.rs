//! Versioned model artifacts.
//!
//! An artifact is a fitted [`Pipeline`] plus [`Metadata`], stored under one
//! of two lineage namespaces. Identifiers sort in creation order within a
//! namespace and artifacts are never rewritten once saved.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OdsError, Result};
use crate::ml::model_selection::HyperParams;
use crate::ml::pipeline::Pipeline;

pub mod file;
pub mod format;

pub use file::FileModelStore;

/// File extension of artifact files.
pub const ARTIFACT_EXTENSION: &str = "bin";

/// Lineage bucket of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Trained from a single dataset.
    FromScratch,
    /// Trained on a base dataset plus new examples.
    Retrained,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::FromScratch, Namespace::Retrained];

    /// Sub-directory of the store root; empty for the root itself.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Namespace::FromScratch => "",
            Namespace::Retrained => "retrained",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::FromScratch => "from_scratch",
            Namespace::Retrained => "retrained",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = OdsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "from_scratch" | "scratch" => Ok(Namespace::FromScratch),
            "retrained" => Ok(Namespace::Retrained),
            other => Err(OdsError::invalid_argument(format!(
                "unknown namespace '{other}' (expected from_scratch or retrained)"
            ))),
        }
    }
}

/// Identifier of a stored artifact.
///
/// Displays as `<name>` for from-scratch artifacts and `retrained/<name>`
/// for retrained ones. Parsing accepts either form, with or without the
/// `.bin` extension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactId {
    pub namespace: Namespace,
    pub name: String,
}

impl ArtifactId {
    pub fn new<S: Into<String>>(namespace: Namespace, name: S) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(ArtifactId { namespace, name })
    }

    /// Path of the artifact file relative to the store root.
    pub fn relative_path(&self) -> PathBuf {
        let file_name = format!("{}.{ARTIFACT_EXTENSION}", self.name);
        match self.namespace.dir_name() {
            "" => PathBuf::from(file_name),
            dir => PathBuf::from(dir).join(file_name),
        }
    }

    /// The `<timestamp>_<seq>` tail of store-generated names, used to
    /// order artifacts across namespaces.
    pub fn version(&self) -> &str {
        let mut splits = self.name.rmatch_indices('_');
        match (splits.next(), splits.next()) {
            (Some(_), Some((index, _))) => &self.name[index + 1..],
            _ => &self.name,
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(OdsError::invalid_argument(format!(
            "invalid artifact name '{name}'"
        )))
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Namespace::FromScratch => f.write_str(&self.name),
            Namespace::Retrained => write!(f, "{}/{}", self.namespace.dir_name(), self.name),
        }
    }
}

impl FromStr for ArtifactId {
    type Err = OdsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s
            .strip_suffix(&format!(".{ARTIFACT_EXTENSION}"))
            .unwrap_or(s);
        match s.split_once('/') {
            Some((prefix, name)) => ArtifactId::new(prefix.parse::<Namespace>()?, name),
            None => ArtifactId::new(Namespace::FromScratch, s),
        }
    }
}

/// Where the training data came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProvenance {
    pub sources: Vec<PathBuf>,
    pub text_column: String,
    pub label_column: String,
}

/// Row counts of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCounts {
    /// Examples from the base dataset.
    pub base: usize,
    /// Examples supplied on top of the base dataset.
    pub new: usize,
    pub total: usize,
}

impl SampleCounts {
    pub fn new(base: usize, new: usize) -> Self {
        SampleCounts {
            base,
            new,
            total: base + new,
        }
    }
}

/// Provenance record saved with every artifact.
///
/// Every field is optional: artifacts in the legacy bare-pipeline format
/// load with all of them empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub dataset: Option<DatasetProvenance>,
    pub samples: Option<SampleCounts>,
    pub params: Option<HyperParams>,
    /// Mean cross-validated macro-F1 of `params`.
    pub cv_f1_macro: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Metadata synthesized for legacy artifacts.
    pub fn legacy() -> Self {
        Metadata::default()
    }

    pub fn is_legacy(&self) -> bool {
        *self == Metadata::default()
    }
}

/// A loaded artifact.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub id: ArtifactId,
    pub pipeline: Pipeline,
    pub metadata: Metadata,
}

/// Append-only store of artifacts.
pub trait ArtifactRegistry: Send + Sync {
    /// Persist a new artifact and return its identifier.
    fn save(&self, namespace: Namespace, pipeline: &Pipeline, metadata: &Metadata) -> Result<ArtifactId>;

    /// Identifiers in `namespace`, oldest first.
    fn list(&self, namespace: Namespace) -> Result<Vec<ArtifactId>>;

    /// Load an artifact; `ArtifactNotFound` if it does not exist.
    fn load(&self, id: &ArtifactId) -> Result<ModelArtifact>;

    /// Newest identifier in `namespace`.
    fn latest(&self, namespace: Namespace) -> Result<Option<ArtifactId>> {
        Ok(self.list(namespace)?.pop())
    }
}
