//! Retraining on a base dataset plus new examples.

use chrono::Utc;

use crate::dataset::{Dataset, DatasetSource, Label, TrainingExample};
use crate::error::{OdsError, Result};
use crate::ml::trainer::Trainer;
use crate::registry::{ArtifactRegistry, DatasetProvenance, Metadata, ModelArtifact, Namespace, SampleCounts};

/// Merges a base dataset with new examples, runs a fresh grid search and
/// stores the result in the [`Namespace::Retrained`] namespace.
pub struct RetrainOrchestrator<'a, R: ArtifactRegistry + ?Sized> {
    trainer: &'a Trainer,
    registry: &'a R,
}

impl<'a, R: ArtifactRegistry + ?Sized> RetrainOrchestrator<'a, R> {
    pub fn new(trainer: &'a Trainer, registry: &'a R) -> Self {
        RetrainOrchestrator { trainer, registry }
    }

    /// Read `base` from disk and retrain with the parallel `new_texts` and
    /// `new_labels` appended after it.
    ///
    /// The base file is read on every call.
    pub fn retrain(
        &self,
        base: &DatasetSource,
        new_texts: &[String],
        new_labels: &[Label],
    ) -> Result<ModelArtifact> {
        if new_texts.len() != new_labels.len() {
            return Err(OdsError::shape_mismatch(new_texts.len(), new_labels.len()));
        }
        let new_examples = new_texts
            .iter()
            .zip(new_labels)
            .map(|(text, &label)| TrainingExample::new(text.as_str(), label))
            .collect();

        let dataset = Dataset::load(base)?;
        self.retrain_dataset(dataset, new_examples)
    }

    /// Retrain on an already loaded base dataset.
    pub fn retrain_dataset(
        &self,
        base: Dataset,
        new_examples: Vec<TrainingExample>,
    ) -> Result<ModelArtifact> {
        if let Some(index) = new_examples.iter().position(|e| e.text.trim().is_empty()) {
            return Err(OdsError::invalid_argument(format!(
                "new example {index} has empty text"
            )));
        }

        let counts = SampleCounts::new(base.len(), new_examples.len());
        let provenance = DatasetProvenance {
            sources: base.source().map(|path| vec![path.to_path_buf()]).unwrap_or_default(),
            text_column: base.text_column().to_string(),
            label_column: base.label_column().to_string(),
        };

        let mut merged = base;
        merged.extend(new_examples);
        tracing::info!(
            base = counts.base,
            new = counts.new,
            total = counts.total,
            "retraining on merged dataset"
        );

        let outcome = self.trainer.train(&merged.texts(), &merged.labels())?;
        let metadata = Metadata {
            dataset: Some(provenance),
            samples: Some(counts),
            params: Some(outcome.best_params),
            cv_f1_macro: Some(outcome.best_score),
            created_at: Some(Utc::now()),
        };

        let id = self.registry.save(Namespace::Retrained, &outcome.pipeline, &metadata)?;
        Ok(ModelArtifact {
            id,
            pipeline: outcome.pipeline,
            metadata,
        })
    }
}
