//! The operations front ends call: list, train, retrain, predict, evaluate.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Utc;

use crate::analysis::lexicon::Language;
use crate::analysis::normalizer::Normalizer;
use crate::config::LifecycleConfig;
use crate::dataset::{Dataset, DatasetCatalog, DatasetSource, Label};
use crate::error::{OdsError, Result};
use crate::lifecycle::evaluator::Evaluator;
use crate::lifecycle::predictor::{Prediction, Predictor};
use crate::lifecycle::retrain::RetrainOrchestrator;
use crate::ml::metrics::ClassificationMetrics;
use crate::ml::pipeline::{Pipeline, PipelineFactory};
use crate::ml::trainer::Trainer;
use crate::registry::{
    ArtifactId, ArtifactRegistry, DatasetProvenance, FileModelStore, Metadata, ModelArtifact,
    Namespace, SampleCounts,
};

/// Which artifact to use for prediction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelSelector {
    /// The newest artifact across both namespaces.
    #[default]
    Latest,
    Id(ArtifactId),
}

impl FromStr for ModelSelector {
    type Err = OdsError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("latest") {
            Ok(ModelSelector::Latest)
        } else {
            Ok(ModelSelector::Id(s.parse()?))
        }
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSelector::Latest => f.write_str("latest"),
            ModelSelector::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Model lifecycle over a [`FileModelStore`] and a data directory.
#[derive(Debug, Clone)]
pub struct ModelService {
    config: LifecycleConfig,
    store: FileModelStore,
    trainer: Trainer,
}

impl ModelService {
    pub fn new(config: LifecycleConfig) -> Result<Self> {
        config.validate()?;

        let normalizer = Normalizer::for_language(Language::default())?;
        let factory = PipelineFactory::new(normalizer, config.vectorizer.clone());
        let trainer = Trainer::new(factory)
            .with_grid(config.search.grid.clone())
            .with_folds(config.search.folds)
            .with_seed(config.search.seed)
            .with_parallel(config.search.parallel);
        let store = FileModelStore::new(&config.models_dir).with_family(config.family.clone());

        Ok(ModelService {
            config,
            store,
            trainer,
        })
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn store(&self) -> &FileModelStore {
        &self.store
    }

    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    pub fn datasets(&self) -> DatasetCatalog {
        DatasetCatalog::new(&self.config.data_dir)
    }

    /// Artifact ids in `namespace`, oldest first.
    pub fn list_models(&self, namespace: Namespace) -> Result<Vec<ArtifactId>> {
        self.store.list(namespace)
    }

    /// Newest artifact in `namespace`, or across both namespaces by
    /// creation time when `None`.
    pub fn latest(&self, namespace: Option<Namespace>) -> Result<Option<ArtifactId>> {
        match namespace {
            Some(namespace) => self.store.latest(namespace),
            None => {
                let mut newest: Option<ArtifactId> = None;
                for namespace in Namespace::ALL {
                    if let Some(id) = self.store.latest(namespace)? {
                        if newest.as_ref().is_none_or(|best| id.version() >= best.version()) {
                            newest = Some(id);
                        }
                    }
                }
                Ok(newest)
            }
        }
    }

    /// Grid-search a pipeline on a dataset file and store it.
    pub fn train_from_dataset(&self, source: &DatasetSource) -> Result<ModelArtifact> {
        let dataset = Dataset::load(&self.locate(source))?;
        let outcome = self.trainer.train(&dataset.texts(), &dataset.labels())?;

        let metadata = Metadata {
            dataset: Some(provenance(&dataset)),
            samples: Some(SampleCounts::new(dataset.len(), 0)),
            params: Some(outcome.best_params),
            cv_f1_macro: Some(outcome.best_score),
            created_at: Some(Utc::now()),
        };
        self.persist(Namespace::FromScratch, outcome.pipeline, metadata)
    }

    /// Fit a single smoothing value on a dataset file, without search.
    pub fn train_fixed(&self, source: &DatasetSource, alpha: f64) -> Result<ModelArtifact> {
        let dataset = Dataset::load(&self.locate(source))?;
        let pipeline = self
            .trainer
            .fit_fixed(&dataset.texts(), &dataset.labels(), alpha)?;

        let metadata = Metadata {
            dataset: Some(provenance(&dataset)),
            samples: Some(SampleCounts::new(dataset.len(), 0)),
            params: Some(pipeline.params()),
            cv_f1_macro: None,
            created_at: Some(Utc::now()),
        };
        self.persist(Namespace::FromScratch, pipeline, metadata)
    }

    /// Retrain on a base dataset file plus new labeled texts.
    pub fn retrain(
        &self,
        base: &DatasetSource,
        new_texts: &[String],
        new_labels: &[Label],
    ) -> Result<ModelArtifact> {
        RetrainOrchestrator::new(&self.trainer, &self.store).retrain(
            &self.locate(base),
            new_texts,
            new_labels,
        )
    }

    /// Predict with the selected artifact.
    ///
    /// With [`ModelSelector::Latest`] and an empty registry every text gets
    /// the [`Prediction::no_model`] placeholder.
    pub fn predict(&self, selector: &ModelSelector, texts: &[String]) -> Result<Vec<Prediction>> {
        let id = match selector {
            ModelSelector::Id(id) => id.clone(),
            ModelSelector::Latest => match self.latest(None)? {
                Some(id) => id,
                None => {
                    tracing::info!(texts = texts.len(), "no trained model, returning placeholders");
                    return Ok(texts.iter().map(Prediction::no_model).collect());
                }
            },
        };

        let artifact = self.store.load(&id)?;
        tracing::debug!(id = %id, "predicting");
        Predictor::new(&artifact.pipeline).predict_batch(texts)
    }

    /// Evaluate an artifact on a labeled dataset file.
    pub fn evaluate(&self, id: &ArtifactId, source: &DatasetSource) -> Result<ClassificationMetrics> {
        let artifact = self.store.load(id)?;
        let dataset = Dataset::load(&self.locate(source))?;
        Evaluator::new(&artifact.pipeline).evaluate_dataset(&dataset)
    }

    /// Metadata of an artifact.
    pub fn describe(&self, id: &ArtifactId) -> Result<Metadata> {
        Ok(self.store.load(id)?.metadata)
    }

    fn persist(&self, namespace: Namespace, pipeline: Pipeline, metadata: Metadata) -> Result<ModelArtifact> {
        let id = self.store.save(namespace, &pipeline, &metadata)?;
        Ok(ModelArtifact {
            id,
            pipeline,
            metadata,
        })
    }

    /// Resolve a relative dataset path against the data directory when it
    /// does not exist as given.
    fn locate(&self, source: &DatasetSource) -> DatasetSource {
        let path = &source.path;
        if path.is_relative() && !path.exists() {
            let candidate: PathBuf = self.config.data_dir.join(path);
            if candidate.exists() {
                return DatasetSource {
                    path: candidate,
                    ..source.clone()
                };
            }
        }
        source.clone()
    }
}

fn provenance(dataset: &Dataset) -> DatasetProvenance {
    DatasetProvenance {
        sources: dataset.source().map(|path| vec![path.to_path_buf()]).unwrap_or_default(),
        text_column: dataset.text_column().to_string(),
        label_column: dataset.label_column().to_string(),
    }
}
