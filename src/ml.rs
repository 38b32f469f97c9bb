//! Machine learning components of the classifier.
//!
//! The fitted unit is a [`Pipeline`](pipeline::Pipeline):
//!
//! ```text
//! Normalizer → CountVectorizer → MultinomialNb
//! ```
//!
//! Each stage implements [`Estimator`](estimator::Estimator). The
//! [`Trainer`](trainer::Trainer) picks the smoothing and vocabulary
//! thresholds by stratified cross-validated grid search on macro-F1.

pub mod estimator;
pub mod metrics;
pub mod model_selection;
pub mod naive_bayes;
pub mod pipeline;
pub mod trainer;
pub mod vectorizer;

pub use estimator::Estimator;
pub use metrics::ClassificationMetrics;
pub use model_selection::{HyperParams, HyperparameterGrid, StratifiedKFold};
pub use naive_bayes::MultinomialNb;
pub use pipeline::{Pipeline, PipelineFactory};
pub use trainer::{CandidateScore, SearchOutcome, Trainer};
pub use vectorizer::{CountVectorizer, SparseVector, VectorizerConfig};
