//! Cross-validated grid search.
//!
//! For every grid point and every stratified fold a fresh pipeline is fitted
//! on the training part and scored by macro-F1 on the held-out part. The
//! grid point with the highest mean score wins (the earliest one in grid
//! order on exact ties) and is refitted on the whole input.
//!
//! Texts are normalized once up front; normalization is stateless so this
//! is equivalent to normalizing inside every fold.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::error::{OdsError, Result};
use crate::ml::metrics::f1_macro;
use crate::ml::model_selection::{Fold, HyperParams, HyperparameterGrid, StratifiedKFold};
use crate::ml::pipeline::{Pipeline, PipelineFactory};

/// Default number of folds.
pub const DEFAULT_FOLDS: usize = 5;

/// Default shuffling seed.
pub const DEFAULT_SEED: u64 = 42;

/// Cross-validation result of one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: HyperParams,
    /// Mean macro-F1 over folds, `None` if fitting failed on some fold.
    pub mean_score: Option<f64>,
    pub fold_scores: Vec<f64>,
}

/// Outcome of [`Trainer::train`].
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best configuration refitted on all samples.
    pub pipeline: Pipeline,
    pub best_params: HyperParams,
    /// Mean cross-validated macro-F1 of `best_params`.
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
}

/// Fits pipelines by stratified k-fold grid search on macro-F1.
#[derive(Debug, Clone)]
pub struct Trainer {
    factory: PipelineFactory,
    grid: HyperparameterGrid,
    folds: usize,
    seed: u64,
    parallel: bool,
}

impl Trainer {
    pub fn new(factory: PipelineFactory) -> Self {
        Trainer {
            factory,
            grid: HyperparameterGrid::default(),
            folds: DEFAULT_FOLDS,
            seed: DEFAULT_SEED,
            parallel: true,
        }
    }

    pub fn with_grid(mut self, grid: HyperparameterGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit folds on the rayon thread pool (`true`) or sequentially.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn factory(&self) -> &PipelineFactory {
        &self.factory
    }

    pub fn grid(&self) -> &HyperparameterGrid {
        &self.grid
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    /// Run the grid search and refit the best configuration on all samples.
    pub fn train(&self, texts: &[String], labels: &[Label]) -> Result<SearchOutcome> {
        if texts.len() != labels.len() {
            return Err(OdsError::shape_mismatch(texts.len(), labels.len()));
        }
        if texts.is_empty() {
            return Err(OdsError::invalid_argument("cannot train on zero samples"));
        }
        self.grid.validate()?;

        let folds = StratifiedKFold::new(self.folds, self.seed).split(labels)?;
        let normalized = self.factory.normalizer().normalize_batch(texts)?;
        let candidates = self.grid.candidates();

        tracing::info!(
            samples = texts.len(),
            candidates = candidates.len(),
            folds = folds.len(),
            parallel = self.parallel,
            "starting grid search"
        );

        let tasks: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();
        let score = |&(c, f): &(usize, usize)| {
            self.score_fold(&candidates[c], &folds[f], &normalized, labels)
        };
        let results: Vec<Result<f64>> = if self.parallel {
            tasks.par_iter().map(score).collect()
        } else {
            tasks.iter().map(score).collect()
        };

        let mut scores = Vec::with_capacity(candidates.len());
        let mut first_error = None;
        for (params, fold_results) in candidates.into_iter().zip(results.chunks(folds.len())) {
            let mut fold_scores = Vec::with_capacity(fold_results.len());
            let mut failed = false;
            for result in fold_results {
                match result {
                    Ok(score) => fold_scores.push(*score),
                    Err(e) => {
                        tracing::warn!(%params, error = %e, "candidate failed on a fold");
                        failed = true;
                        if first_error.is_none() {
                            first_error = Some(e.to_string());
                        }
                    }
                }
            }

            let mean_score = (!failed)
                .then(|| fold_scores.iter().sum::<f64>() / fold_scores.len() as f64);
            tracing::debug!(%params, mean_score = ?mean_score, "scored candidate");
            scores.push(CandidateScore {
                params,
                mean_score,
                fold_scores,
            });
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in scores.iter().enumerate() {
            if let Some(score) = candidate.mean_score {
                if best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((index, score));
                }
            }
        }

        let Some((best_index, best_score)) = best else {
            return Err(OdsError::invalid_operation(format!(
                "every hyperparameter candidate failed: {}",
                first_error.unwrap_or_default()
            )));
        };
        let best_params = scores[best_index].params.clone();

        tracing::info!(%best_params, best_score, "selected hyperparameters");

        let mut pipeline = self.factory.build_with(&best_params);
        pipeline.fit_normalized(&normalized, labels)?;

        Ok(SearchOutcome {
            pipeline,
            best_params,
            best_score,
            candidates: scores,
        })
    }

    fn score_fold(
        &self,
        params: &HyperParams,
        fold: &Fold,
        normalized: &[String],
        labels: &[Label],
    ) -> Result<f64> {
        let pick_texts = |indices: &[usize]| -> Vec<String> {
            indices.iter().map(|&i| normalized[i].clone()).collect()
        };
        let pick_labels =
            |indices: &[usize]| -> Vec<Label> { indices.iter().map(|&i| labels[i]).collect() };

        let mut pipeline = self.factory.build_with(params);
        pipeline.fit_normalized(&pick_texts(&fold.train), &pick_labels(&fold.train))?;

        let predicted = pipeline.predict_normalized(&pick_texts(&fold.test))?;
        f1_macro(&pick_labels(&fold.test), &predicted)
    }

    /// Fit a single configuration on all samples without searching.
    pub fn fit_fixed(&self, texts: &[String], labels: &[Label], alpha: f64) -> Result<Pipeline> {
        if texts.is_empty() {
            return Err(OdsError::invalid_argument("cannot train on zero samples"));
        }
        if !(alpha.is_finite() && alpha >= 0.0) {
            return Err(OdsError::invalid_argument(format!(
                "alpha must be finite and non-negative, got {alpha}"
            )));
        }

        let mut pipeline = self.factory.build(alpha);
        pipeline.fit(texts, labels)?;

        tracing::info!(samples = texts.len(), alpha, "fitted fixed configuration");
        Ok(pipeline)
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(PipelineFactory::default())
    }
}
