//! Label and confidence for new texts.

use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::error::Result;
use crate::ml::naive_bayes::argmax;
use crate::ml::pipeline::Pipeline;

/// Label reported when no model has been trained yet.
pub const NO_MODEL_LABEL: Label = -1;

/// Prediction for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub text: String,
    pub label: Label,
    /// Largest class probability.
    pub confidence: f64,
    /// Posterior per class, in ascending class order. Empty for the
    /// no-model placeholder.
    pub probabilities: Vec<f64>,
}

impl Prediction {
    /// Placeholder returned when the registry holds no artifact.
    pub fn no_model<S: Into<String>>(text: S) -> Self {
        Prediction {
            text: text.into(),
            label: NO_MODEL_LABEL,
            confidence: 0.0,
            probabilities: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.label == NO_MODEL_LABEL && self.probabilities.is_empty()
    }
}

/// Applies a fitted pipeline to raw texts.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> Predictor<'a> {
    pub fn new(pipeline: &'a Pipeline) -> Self {
        Predictor { pipeline }
    }

    /// Predict every text; the label is the class with the highest
    /// probability and `confidence` is that probability.
    pub fn predict_batch(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let classes = self.pipeline.classes()?;
        let probabilities = self.pipeline.predict_proba(texts)?;

        let predictions: Vec<Prediction> = texts
            .iter()
            .zip(probabilities)
            .map(|(text, row)| {
                let best = argmax(&row);
                Prediction {
                    text: text.clone(),
                    label: classes[best],
                    confidence: row[best],
                    probabilities: row,
                }
            })
            .collect();

        tracing::debug!(texts = texts.len(), "predicted batch");
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OdsError;
    use crate::ml::pipeline::PipelineFactory;

    fn fitted() -> Pipeline {
        let texts: Vec<String> = [
            "agua potable rural",
            "agua potable para todos",
            "agua limpia y potable",
            "salud hospital rural",
            "salud y hospital publico",
            "salud en el hospital",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let mut pipeline = PipelineFactory::default().with_min_df(1).build(0.5);
        pipeline.fit(&texts, &[6, 6, 6, 3, 3, 3]).unwrap();
        pipeline
    }

    #[test]
    fn test_confidence_is_max_probability() {
        let pipeline = fitted();
        let texts = vec![
            "agua potable".to_string(),
            "hospital de salud".to_string(),
            "texto sin relacion".to_string(),
        ];
        let predictions = Predictor::new(&pipeline).predict_batch(&texts).unwrap();

        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0].label, 6);
        assert_eq!(predictions[1].label, 3);
        for prediction in &predictions {
            let max = prediction.probabilities.iter().copied().fold(f64::MIN, f64::max);
            assert_eq!(prediction.confidence, max);
            let sum: f64 = prediction.probabilities.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        assert_eq!(predictions[2].text, "texto sin relacion");
    }

    #[test]
    fn test_unfitted_pipeline() {
        let pipeline = PipelineFactory::default().build(1.0);
        let result = Predictor::new(&pipeline).predict_batch(&["agua".to_string()]);
        assert!(matches!(result, Err(OdsError::UninitializedModel(_))));
    }

    #[test]
    fn test_placeholder() {
        let prediction = Prediction::no_model("hola");
        assert_eq!(prediction.label, -1);
        assert_eq!(prediction.confidence, 0.0);
        assert!(prediction.is_placeholder());
    }
}
