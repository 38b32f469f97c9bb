//! Scoring a fitted pipeline against labeled data.

use crate::dataset::{Dataset, Label};
use crate::error::{OdsError, Result};
use crate::ml::metrics::ClassificationMetrics;
use crate::ml::pipeline::Pipeline;

/// Computes [`ClassificationMetrics`] for a fitted pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> Evaluator<'a> {
    pub fn new(pipeline: &'a Pipeline) -> Self {
        Evaluator { pipeline }
    }

    pub fn evaluate(&self, texts: &[String], labels: &[Label]) -> Result<ClassificationMetrics> {
        if texts.len() != labels.len() {
            return Err(OdsError::shape_mismatch(texts.len(), labels.len()));
        }
        if texts.is_empty() {
            return Err(OdsError::invalid_argument("cannot evaluate on zero samples"));
        }

        let predicted = self.pipeline.predict(texts)?;
        let metrics = ClassificationMetrics::compute(labels, &predicted)?;

        tracing::info!(
            n_samples = metrics.n_samples,
            accuracy = metrics.accuracy,
            f1_macro = metrics.f1_macro,
            "evaluated pipeline"
        );
        Ok(metrics)
    }

    /// Evaluate on the non-dropped rows of a dataset.
    pub fn evaluate_dataset(&self, dataset: &Dataset) -> Result<ClassificationMetrics> {
        self.evaluate(&dataset.texts(), &dataset.labels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TrainingExample;
    use crate::ml::pipeline::PipelineFactory;

    fn fitted() -> Pipeline {
        let texts: Vec<String> = [
            "becas para estudiantes",
            "escuela y estudiantes",
            "vacunas y hospital",
            "hospital con vacunas",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let mut pipeline = PipelineFactory::default().with_min_df(1).build(1.0);
        pipeline.fit(&texts, &[4, 4, 3, 3]).unwrap();
        pipeline
    }

    #[test]
    fn test_metrics_bounded() {
        let pipeline = fitted();
        let dataset = Dataset::new(
            "textos",
            "labels",
            vec![
                TrainingExample::new("estudiantes con becas", 4),
                TrainingExample::new("vacunas", 3),
                TrainingExample::new("hospital", 4),
                TrainingExample::new("", 3),
            ],
        );
        let metrics = Evaluator::new(&pipeline).evaluate_dataset(&dataset).unwrap();

        assert_eq!(metrics.n_samples, 3);
        for value in [
            metrics.accuracy,
            metrics.precision_macro,
            metrics.recall_macro,
            metrics.f1_macro,
            metrics.f1_micro,
            metrics.f1_weighted,
        ] {
            assert!((0.0..=1.0).contains(&value), "{value} out of bounds");
        }
        assert!((metrics.accuracy - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_and_empty_input() {
        let pipeline = fitted();
        let evaluator = Evaluator::new(&pipeline);
        assert!(matches!(
            evaluator.evaluate(&["a".to_string()], &[]),
            Err(OdsError::ShapeMismatch { texts: 1, labels: 0 })
        ));
        assert!(matches!(
            evaluator.evaluate(&[], &[]),
            Err(OdsError::InvalidArgument(_))
        ));
    }
}
