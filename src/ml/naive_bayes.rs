//! Multinomial naive Bayes over count features.
//!
//! Class priors are the empirical class frequencies. Per-class feature
//! probabilities use additive smoothing:
//!
//! ```text
//! P(j | c) = (count(c, j) + alpha) / (sum_j count(c, j) + alpha * n_features)
//! ```
//!
//! Posteriors are normalized with log-sum-exp so every probability row sums
//! to one over the classes seen during fit, in ascending label order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::error::{OdsError, Result};
use crate::ml::estimator::Estimator;
use crate::ml::vectorizer::SparseVector;

/// Smallest smoothing value used; lower values are clamped to it.
pub const MIN_ALPHA: f64 = 1e-10;

/// Learned statistics of a fitted classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NbModel {
    classes: Vec<Label>,
    class_log_prior: Vec<f64>,
    /// `feature_log_prob[c][j]` = log P(feature j | class c).
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
}

/// Multinomial naive Bayes classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    model: Option<NbModel>,
}

impl MultinomialNb {
    /// Create an unfitted classifier with smoothing `alpha`.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha < MIN_ALPHA {
            tracing::warn!(alpha, min = MIN_ALPHA, "smoothing too small, clamping");
            MIN_ALPHA
        } else {
            alpha
        };
        MultinomialNb { alpha, model: None }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Classes seen during fit, ascending.
    pub fn classes(&self) -> Result<&[Label]> {
        Ok(&self.model()?.classes)
    }

    fn model(&self) -> Result<&NbModel> {
        self.model
            .as_ref()
            .ok_or_else(|| OdsError::uninitialized("MultinomialNb"))
    }

    /// Estimate class priors and class-conditional feature probabilities.
    pub fn fit(&mut self, x: &[SparseVector], y: &[Label]) -> Result<()> {
        if x.len() != y.len() {
            return Err(OdsError::shape_mismatch(x.len(), y.len()));
        }
        let Some(first) = x.first() else {
            return Err(OdsError::invalid_argument("cannot fit on zero samples"));
        };
        let n_features = first.dim();
        if x.iter().any(|row| row.dim() != n_features) {
            return Err(OdsError::invalid_argument(
                "all feature rows must have the same dimension",
            ));
        }

        let classes: Vec<Label> = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let mut class_count = vec![0usize; classes.len()];
        let mut feature_count = vec![vec![0.0f64; n_features]; classes.len()];

        for (row, label) in x.iter().zip(y) {
            // Classes are sorted and every label came from them.
            let c = classes.binary_search(label).unwrap_or_default();
            class_count[c] += 1;
            for (j, value) in row.iter() {
                feature_count[c][j] += value;
            }
        }

        let n_samples = y.len() as f64;
        let class_log_prior = class_count
            .iter()
            .map(|&count| (count as f64 / n_samples).ln())
            .collect();

        let feature_log_prob = feature_count
            .iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum::<f64>() + self.alpha * n_features as f64;
                let log_total = total.ln();
                counts
                    .iter()
                    .map(|&count| (count + self.alpha).ln() - log_total)
                    .collect()
            })
            .collect();

        self.model = Some(NbModel {
            classes,
            class_log_prior,
            feature_log_prob,
            n_features,
        });
        Ok(())
    }

    fn joint_log_likelihood(model: &NbModel, row: &SparseVector) -> Result<Vec<f64>> {
        if row.dim() != model.n_features {
            return Err(OdsError::invalid_argument(format!(
                "expected {} features, got {}",
                model.n_features,
                row.dim()
            )));
        }

        Ok(model
            .class_log_prior
            .iter()
            .zip(&model.feature_log_prob)
            .map(|(prior, log_probs)| {
                prior + row.iter().map(|(j, value)| value * log_probs[j]).sum::<f64>()
            })
            .collect())
    }

    /// Posterior probabilities, one row per sample, columns in class order.
    pub fn predict_proba(&self, x: &[SparseVector]) -> Result<Vec<Vec<f64>>> {
        let model = self.model()?;
        x.iter()
            .map(|row| {
                let jll = Self::joint_log_likelihood(model, row)?;
                let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let log_norm = max + jll.iter().map(|v| (v - max).exp()).sum::<f64>().ln();
                Ok(jll.iter().map(|v| (v - log_norm).exp()).collect())
            })
            .collect()
    }

    /// Most probable class per sample; ties resolve to the smaller label.
    pub fn predict(&self, x: &[SparseVector]) -> Result<Vec<Label>> {
        let model = self.model()?;
        x.iter()
            .map(|row| {
                let jll = Self::joint_log_likelihood(model, row)?;
                Ok(model.classes[argmax(&jll)])
            })
            .collect()
    }
}

impl Default for MultinomialNb {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Index of the first maximum.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

impl Estimator for MultinomialNb {
    type Input = SparseVector;
    type Output = Label;

    fn fit(&mut self, inputs: &[SparseVector], labels: Option<&[Label]>) -> Result<()> {
        let labels = labels
            .ok_or_else(|| OdsError::invalid_argument("MultinomialNb requires labels to fit"))?;
        MultinomialNb::fit(self, inputs, labels)
    }

    fn transform(&self, inputs: &[SparseVector]) -> Result<Vec<Label>> {
        self.predict(inputs)
    }

    fn is_fitted(&self) -> bool {
        MultinomialNb::is_fitted(self)
    }

    fn name(&self) -> &'static str {
        "multinomial_nb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(dim: usize, entries: &[(usize, f64)]) -> SparseVector {
        SparseVector::new(dim, entries.to_vec()).unwrap()
    }

    fn toy() -> (Vec<SparseVector>, Vec<Label>) {
        let x = vec![
            row(3, &[(0, 3.0)]),
            row(3, &[(0, 2.0), (1, 1.0)]),
            row(3, &[(2, 4.0)]),
            row(3, &[(1, 1.0), (2, 2.0)]),
        ];
        (x, vec![1, 1, 3, 3])
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = toy();
        let mut nb = MultinomialNb::new(1.0);
        nb.fit(&x, &y).unwrap();

        assert_eq!(nb.classes().unwrap(), &[1, 3]);
        assert_eq!(nb.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = toy();
        let mut nb = MultinomialNb::new(0.5);
        nb.fit(&x, &y).unwrap();

        for probs in nb.predict_proba(&x).unwrap() {
            let total: f64 = probs.iter().sum();
            assert!((total - 1.0).abs() < 1e-9);
            assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn test_known_probability() {
        // Two balanced classes, one feature each, alpha = 1:
        // P(f0|a) = (2+1)/(2+2) = 0.75, P(f0|b) = (0+1)/(2+2) = 0.25.
        let x = vec![row(2, &[(0, 2.0)]), row(2, &[(1, 2.0)])];
        let mut nb = MultinomialNb::new(1.0);
        nb.fit(&x, &[10, 20]).unwrap();

        let probs = nb.predict_proba(&[row(2, &[(0, 1.0)])]).unwrap();
        assert!((probs[0][0] - 0.75).abs() < 1e-12);
        assert!((probs[0][1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_empty_row_predicts_prior() {
        let x = vec![row(2, &[(0, 1.0)]), row(2, &[(0, 1.0)]), row(2, &[(1, 1.0)])];
        let mut nb = MultinomialNb::new(1.0);
        nb.fit(&x, &[5, 5, 7]).unwrap();

        let probs = nb.predict_proba(&[row(2, &[])]).unwrap();
        assert!((probs[0][0] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(nb.predict(&[row(2, &[])]).unwrap(), vec![5]);
    }

    #[test]
    fn test_ties_go_to_smaller_label() {
        let x = vec![row(1, &[(0, 1.0)]), row(1, &[(0, 1.0)])];
        let mut nb = MultinomialNb::new(1.0);
        nb.fit(&x, &[9, 4]).unwrap();
        assert_eq!(nb.predict(&[row(1, &[(0, 1.0)])]).unwrap(), vec![4]);
    }

    #[test]
    fn test_unfitted_errors() {
        let nb = MultinomialNb::default();
        assert!(matches!(
            nb.predict(&[row(1, &[])]),
            Err(OdsError::UninitializedModel(_))
        ));
        assert!(matches!(
            nb.predict_proba(&[row(1, &[])]),
            Err(OdsError::UninitializedModel(_))
        ));
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(MultinomialNb::new(0.0).alpha(), MIN_ALPHA);
        assert_eq!(MultinomialNb::new(0.3).alpha(), 0.3);
    }

    #[test]
    fn test_shape_mismatch() {
        let (x, _) = toy();
        let mut nb = MultinomialNb::default();
        assert!(matches!(
            nb.fit(&x, &[1, 2]),
            Err(OdsError::ShapeMismatch { .. })
        ));
    }
}
