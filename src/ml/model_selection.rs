//! Hyperparameter grids and stratified fold splitting.

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::error::{OdsError, Result};

/// One point of the search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Additive smoothing of the classifier.
    pub alpha: f64,
    /// Minimum document frequency of a vocabulary term.
    pub min_df: usize,
    /// Maximum document fraction of a vocabulary term.
    pub max_df: f64,
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "alpha={}, min_df={}, max_df={}",
            self.alpha, self.min_df, self.max_df
        )
    }
}

/// Finite candidate values per hyperparameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperparameterGrid {
    pub alpha: Vec<f64>,
    pub min_df: Vec<usize>,
    pub max_df: Vec<f64>,
}

impl Default for HyperparameterGrid {
    fn default() -> Self {
        Self {
            alpha: vec![0.05, 0.1, 0.3, 0.5, 1.0],
            min_df: vec![3],
            max_df: vec![0.9],
        }
    }
}

impl HyperparameterGrid {
    /// A grid over smoothing values only, with fixed vocabulary thresholds.
    pub fn alpha_only(alpha: Vec<f64>, min_df: usize, max_df: f64) -> Self {
        Self {
            alpha,
            min_df: vec![min_df],
            max_df: vec![max_df],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.alpha.is_empty() || self.min_df.is_empty() || self.max_df.is_empty() {
            return Err(OdsError::invalid_config(
                "every hyperparameter needs at least one candidate value",
            ));
        }
        if let Some(alpha) = self.alpha.iter().find(|a| !(a.is_finite() && **a >= 0.0)) {
            return Err(OdsError::invalid_config(format!(
                "alpha must be finite and non-negative, got {alpha}"
            )));
        }
        if self.min_df.contains(&0) {
            return Err(OdsError::invalid_config("min_df must be at least 1"));
        }
        if let Some(max_df) = self.max_df.iter().find(|m| !(**m > 0.0 && **m <= 1.0)) {
            return Err(OdsError::invalid_config(format!(
                "max_df must be in (0, 1], got {max_df}"
            )));
        }
        Ok(())
    }

    /// Number of candidate configurations.
    pub fn len(&self) -> usize {
        self.alpha.len() * self.min_df.len() * self.max_df.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All configurations in canonical order: `alpha` varies slowest,
    /// then `max_df`, then `min_df`.
    pub fn candidates(&self) -> Vec<HyperParams> {
        let mut candidates = Vec::with_capacity(self.len());
        for &alpha in &self.alpha {
            for &max_df in &self.max_df {
                for &min_df in &self.min_df {
                    candidates.push(HyperParams {
                        alpha,
                        min_df,
                        max_df,
                    });
                }
            }
        }
        candidates
    }

    pub fn contains(&self, params: &HyperParams) -> bool {
        self.alpha.contains(&params.alpha)
            && self.min_df.contains(&params.min_df)
            && self.max_df.contains(&params.max_df)
    }
}

/// Train/test index sets of one fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffled stratified k-fold splitter.
///
/// Each class's indices are shuffled with a seeded generator and dealt
/// round-robin across folds, so every fold holds roughly `1/k` of every
/// class. The same seed always produces the same folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedKFold {
    n_splits: usize,
    seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        StratifiedKFold { n_splits, seed }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Split sample indices into folds.
    ///
    /// Fails with `InsufficientClassSamples` when a class has fewer samples
    /// than folds.
    pub fn split(&self, labels: &[Label]) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            return Err(OdsError::invalid_argument(format!(
                "at least 2 folds are required, got {}",
                self.n_splits
            )));
        }

        let mut by_class: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
        for (index, &label) in labels.iter().enumerate() {
            by_class.entry(label).or_default().push(index);
        }

        if let Some((&label, members)) = by_class
            .iter()
            .find(|(_, members)| members.len() < self.n_splits)
        {
            return Err(OdsError::InsufficientClassSamples {
                label,
                count: members.len(),
                required: self.n_splits,
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut assignment = vec![0usize; labels.len()];
        let mut offset = 0;
        for members in by_class.values_mut() {
            members.shuffle(&mut rng);
            for (i, &index) in members.iter().enumerate() {
                assignment[index] = (offset + i) % self.n_splits;
            }
            offset += members.len();
        }

        Ok((0..self.n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|&index| assignment[index] == fold);
                Fold { train, test }
            })
            .collect())
    }
}
