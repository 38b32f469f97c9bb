//! # ods-classifier
//!
//! Classify short Spanish texts into Sustainable Development Goal (ODS)
//! categories, and manage the lifecycle of the models doing it.
//!
//! ## Features
//!
//! - Deterministic text normalization (accent folding, stop words, Snowball stemming)
//! - Bag-of-n-grams multinomial naive Bayes pipelines
//! - Stratified k-fold grid search on macro-F1
//! - Versioned, checksummed model artifacts with provenance metadata
//! - Retraining on a base dataset plus new examples
//! - CSV, TSV, JSON Lines and Excel datasets

pub mod analysis;
pub mod category;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod lifecycle;
pub mod ml;
pub mod registry;

pub use dataset::Label;

pub mod prelude {
    pub use crate::analysis::Normalizer;
    pub use crate::config::LifecycleConfig;
    pub use crate::dataset::{Dataset, DatasetSource, Label, TrainingExample};
    pub use crate::error::{OdsError, Result};
    pub use crate::lifecycle::{Evaluator, ModelSelector, ModelService, Prediction, Predictor, RetrainOrchestrator};
    pub use crate::ml::{HyperparameterGrid, Pipeline, PipelineFactory, Trainer};
    pub use crate::registry::{ArtifactId, ArtifactRegistry, FileModelStore, Metadata, ModelArtifact, Namespace};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
