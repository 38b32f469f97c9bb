//! The fitted unit: normalizer, count vectorizer and classifier.
//!
//! # Examples
//!
//! ```
//! use ods_classifier::ml::PipelineFactory;
//!
//! let texts: Vec<String> = [
//!     "acceso al agua potable en zonas rurales",
//!     "agua potable y saneamiento rural",
//!     "red de agua potable para comunidades",
//!     "vacunas y hospitales para la salud",
//!     "salud materna en hospitales publicos",
//!     "hospitales y centros de salud rurales",
//! ]
//! .iter()
//! .map(|s| s.to_string())
//! .collect();
//! let labels = vec![6, 6, 6, 3, 3, 3];
//!
//! let factory = PipelineFactory::default().with_min_df(1);
//! let mut pipeline = factory.build(1.0);
//! pipeline.fit(&texts, &labels).unwrap();
//!
//! let predicted = pipeline.predict(&["hospitales de salud".to_string()]).unwrap();
//! assert_eq!(predicted, vec![3]);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::lexicon::LexicalResources;
use crate::analysis::normalizer::Normalizer;
use crate::dataset::Label;
use crate::error::{OdsError, Result};
use crate::ml::estimator::Estimator;
use crate::ml::model_selection::HyperParams;
use crate::ml::naive_bayes::MultinomialNb;
use crate::ml::vectorizer::{CountVectorizer, VectorizerConfig};

/// Normalizer → CountVectorizer → MultinomialNb as one fit/predict unit.
///
/// The vectorizer and classifier are always fitted on normalized text, and
/// prediction normalizes its input the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    normalizer: Normalizer,
    vectorizer: CountVectorizer,
    classifier: MultinomialNb,
}

impl Pipeline {
    pub fn new(normalizer: Normalizer, vectorizer: CountVectorizer, classifier: MultinomialNb) -> Self {
        Pipeline {
            normalizer,
            vectorizer,
            classifier,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &MultinomialNb {
        &self.classifier
    }

    /// Hyperparameters this pipeline was built with.
    pub fn params(&self) -> HyperParams {
        let config = self.vectorizer.config();
        HyperParams {
            alpha: self.classifier.alpha(),
            min_df: config.min_df,
            max_df: config.max_df,
        }
    }

    /// Classes seen during fit, ascending; the column order of
    /// [`predict_proba`](Self::predict_proba).
    pub fn classes(&self) -> Result<&[Label]> {
        self.classifier.classes()
    }

    /// Fit on raw texts.
    pub fn fit(&mut self, texts: &[String], labels: &[Label]) -> Result<()> {
        if texts.len() != labels.len() {
            return Err(OdsError::shape_mismatch(texts.len(), labels.len()));
        }
        let normalized = self.normalizer.transform(texts)?;
        self.fit_normalized(&normalized, labels)
    }

    /// Fit on texts that already went through this pipeline's normalizer.
    pub(crate) fn fit_normalized(&mut self, normalized: &[String], labels: &[Label]) -> Result<()> {
        if normalized.len() != labels.len() {
            return Err(OdsError::shape_mismatch(normalized.len(), labels.len()));
        }
        Estimator::fit(&mut self.vectorizer, normalized, None)?;
        let features = Estimator::transform(&self.vectorizer, normalized)?;
        Estimator::fit(&mut self.classifier, &features, Some(labels))
    }

    /// Predict labels for raw texts.
    pub fn predict(&self, texts: &[String]) -> Result<Vec<Label>> {
        let normalized = self.normalizer.transform(texts)?;
        self.predict_normalized(&normalized)
    }

    pub(crate) fn predict_normalized(&self, normalized: &[String]) -> Result<Vec<Label>> {
        let features = self.vectorizer.transform(normalized)?;
        self.classifier.predict(&features)
    }

    /// Class probabilities for raw texts, one row per text.
    pub fn predict_proba(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let normalized = self.normalizer.transform(texts)?;
        let features = self.vectorizer.transform(&normalized)?;
        self.classifier.predict_proba(&features)
    }
}

impl Estimator for Pipeline {
    type Input = String;
    type Output = Label;

    fn fit(&mut self, inputs: &[String], labels: Option<&[Label]>) -> Result<()> {
        let labels =
            labels.ok_or_else(|| OdsError::invalid_argument("Pipeline requires labels to fit"))?;
        Pipeline::fit(self, inputs, labels)
    }

    fn transform(&self, inputs: &[String]) -> Result<Vec<Label>> {
        self.predict(inputs)
    }

    fn is_fitted(&self) -> bool {
        self.vectorizer.is_fitted() && self.classifier.is_fitted()
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

/// Builds unfitted pipelines sharing one normalizer.
#[derive(Debug, Clone)]
pub struct PipelineFactory {
    normalizer: Normalizer,
    vectorizer: VectorizerConfig,
}

impl PipelineFactory {
    pub fn new(normalizer: Normalizer, vectorizer: VectorizerConfig) -> Self {
        PipelineFactory {
            normalizer,
            vectorizer,
        }
    }

    /// Create a factory over explicit lexical resources.
    pub fn from_resources(
        resources: Arc<LexicalResources>,
        vectorizer: VectorizerConfig,
    ) -> Result<Self> {
        Ok(Self::new(Normalizer::new(resources)?, vectorizer))
    }

    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.vectorizer.min_df = min_df;
        self
    }

    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.vectorizer.max_df = max_df;
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn vectorizer_config(&self) -> &VectorizerConfig {
        &self.vectorizer
    }

    /// Unfitted pipeline with the given smoothing and the default thresholds.
    pub fn build(&self, smoothing: f64) -> Pipeline {
        Pipeline::new(
            self.normalizer.clone(),
            CountVectorizer::new(self.vectorizer.clone()),
            MultinomialNb::new(smoothing),
        )
    }

    /// Unfitted pipeline for one grid point.
    pub fn build_with(&self, params: &HyperParams) -> Pipeline {
        let config = VectorizerConfig {
            min_df: params.min_df,
            max_df: params.max_df,
            ..self.vectorizer.clone()
        };
        Pipeline::new(
            self.normalizer.clone(),
            CountVectorizer::new(config),
            MultinomialNb::new(params.alpha),
        )
    }
}

impl Default for PipelineFactory {
    fn default() -> Self {
        Self::new(Normalizer::default(), VectorizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> (Vec<String>, Vec<Label>) {
        let texts = [
            "acceso al agua potable en zonas rurales",
            "agua potable y saneamiento rural",
            "red de agua potable para comunidades",
            "vacunas y hospitales para la salud",
            "salud materna en hospitales publicos",
            "hospitales y centros de salud rurales",
        ];
        (
            texts.iter().map(|s| s.to_string()).collect(),
            vec![6, 6, 6, 3, 3, 3],
        )
    }

    #[test]
    fn test_fit_and_predict() {
        let (texts, labels) = corpus();
        let mut pipeline = PipelineFactory::default().with_min_df(1).build(0.5);
        pipeline.fit(&texts, &labels).unwrap();

        assert_eq!(pipeline.classes().unwrap(), &[3, 6]);
        assert_eq!(pipeline.predict(&texts).unwrap(), labels);
        assert!(Estimator::is_fitted(&pipeline));
    }

    #[test]
    fn test_prediction_normalizes_input() {
        let (texts, labels) = corpus();
        let mut pipeline = PipelineFactory::default().with_min_df(1).build(1.0);
        pipeline.fit(&texts, &labels).unwrap();

        let raw = pipeline.predict_proba(&["¡AGUA POTABLE!".to_string()]).unwrap();
        let normalized = pipeline.predict_proba(&["agu potabl".to_string()]).unwrap();
        assert_eq!(raw, normalized);
    }

    #[test]
    fn test_unfitted_pipeline() {
        let pipeline = PipelineFactory::default().build(1.0);
        assert!(matches!(
            pipeline.predict(&["salud".to_string()]),
            Err(OdsError::UninitializedModel(_))
        ));
    }

    #[test]
    fn test_build_with_params() {
        let params = HyperParams {
            alpha: 0.3,
            min_df: 2,
            max_df: 0.8,
        };
        let pipeline = PipelineFactory::default().build_with(&params);
        assert_eq!(pipeline.params(), params);
        assert_eq!(pipeline.vectorizer().config().ngram_range, (1, 2));
    }

    #[test]
    fn test_shape_mismatch() {
        let (texts, _) = corpus();
        let mut pipeline = PipelineFactory::default().build(1.0);
        assert!(matches!(
            pipeline.fit(&texts, &[1, 2]),
            Err(OdsError::ShapeMismatch { .. })
        ));
    }
}
