//! Error types for the classifier lifecycle.
//!
//! Every fallible operation in this crate returns [`Result`], whose error
//! side is the [`OdsError`] enum. Variants carry enough detail for a caller
//! to correct the input (for example the list of available columns when a
//! requested column is missing).
//!
//! # Examples
//!
//! ```
//! use ods_classifier::error::{OdsError, Result};
//!
//! fn check(texts: usize, labels: usize) -> Result<()> {
//!     if texts != labels {
//!         return Err(OdsError::shape_mismatch(texts, labels));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(5, 4).is_err());
//! ```

use std::io;

use thiserror::Error;

use crate::dataset::Label;

/// The main error type for classifier operations.
#[derive(Error, Debug)]
pub enum OdsError {
    /// I/O errors (file operations on datasets and artifacts).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Dataset file extension not recognized.
    #[error("Unsupported dataset format: {path} (supported extensions: {supported})")]
    UnsupportedFormat { path: String, supported: String },

    /// Requested text or label column is absent from the dataset.
    #[error("Column '{column}' not found. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Parallel text and label sequences differ in length.
    #[error("Shape mismatch: got {texts} texts but {labels} labels")]
    ShapeMismatch { texts: usize, labels: usize },

    /// A class has fewer examples than the cross-validation fold count.
    #[error(
        "Insufficient samples for class {label}: {count} examples, stratified {required}-fold cross-validation needs at least {required}"
    )]
    InsufficientClassSamples {
        label: Label,
        count: usize,
        required: usize,
    },

    /// Requested model identifier does not resolve to a stored artifact.
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Predict or transform was called on a component that was never fitted.
    #[error("Model not fitted: {0}")]
    UninitializedModel(String),

    /// No vocabulary term survived document-frequency pruning.
    #[error("Empty vocabulary: {0}")]
    EmptyVocabulary(String),

    /// Artifact file exists but cannot be decoded.
    #[error("Corrupt artifact {path}: {reason}")]
    CorruptArtifact { path: String, reason: String },

    /// Malformed dataset content (bad label values, unreadable sheet, ...).
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Spreadsheet decoding errors.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Text analysis errors (tokenization, filtering).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Binary serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic anyhow error
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with OdsError.
pub type Result<T> = std::result::Result<T, OdsError>;

impl OdsError {
    /// Create an unsupported format error for the given path.
    pub fn unsupported_format<S: Into<String>>(path: S, supported: &[&str]) -> Self {
        OdsError::UnsupportedFormat {
            path: path.into(),
            supported: supported.join(", "),
        }
    }

    /// Create a missing column error listing the available columns.
    pub fn missing_column<S: Into<String>>(column: S, available: &[String]) -> Self {
        OdsError::MissingColumn {
            column: column.into(),
            available: available.to_vec(),
        }
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(texts: usize, labels: usize) -> Self {
        OdsError::ShapeMismatch { texts, labels }
    }

    /// Create an artifact not found error.
    pub fn artifact_not_found<S: Into<String>>(id: S) -> Self {
        OdsError::ArtifactNotFound(id.into())
    }

    /// Create an uninitialized model error naming the unfitted component.
    pub fn uninitialized<S: Into<String>>(component: S) -> Self {
        OdsError::UninitializedModel(component.into())
    }

    /// Create a corrupt artifact error.
    pub fn corrupt_artifact<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        OdsError::CorruptArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        OdsError::Dataset(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        OdsError::Analysis(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        OdsError::Serialization(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        OdsError::InvalidArgument(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        OdsError::InvalidConfig(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        OdsError::InvalidOperation(msg.into())
    }
}
