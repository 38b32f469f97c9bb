//! Training, retraining, prediction and evaluation over stored artifacts.
//!
//! [`ModelService`] is the entry point used by front ends; the other types
//! are the building blocks it composes.

pub mod evaluator;
pub mod predictor;
pub mod retrain;
pub mod service;

pub use evaluator::Evaluator;
pub use predictor::{NO_MODEL_LABEL, Prediction, Predictor};
pub use retrain::RetrainOrchestrator;
pub use service::{ModelSelector, ModelService};
