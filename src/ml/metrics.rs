//! Classification metrics.
//!
//! Per-class precision, recall and F1 are computed over the union of labels
//! present in the true and predicted sequences. A ratio with a zero
//! denominator counts as 0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::error::{OdsError, Result};

/// Summary metrics of a labeled evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub n_samples: usize,
    pub accuracy: f64,
    pub precision_macro: f64,
    pub recall_macro: f64,
    pub f1_macro: f64,
    pub f1_micro: f64,
    pub f1_weighted: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl Counts {
    fn support(&self) -> usize {
        self.tp + self.fn_
    }

    fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn per_class(y_true: &[Label], y_pred: &[Label]) -> BTreeMap<Label, Counts> {
    let mut counts: BTreeMap<Label, Counts> = BTreeMap::new();
    for (&truth, &pred) in y_true.iter().zip(y_pred) {
        if truth == pred {
            counts.entry(truth).or_default().tp += 1;
        } else {
            counts.entry(truth).or_default().fn_ += 1;
            counts.entry(pred).or_default().fp += 1;
        }
    }
    counts
}

fn check_lengths(y_true: &[Label], y_pred: &[Label]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(OdsError::shape_mismatch(y_true.len(), y_pred.len()));
    }
    if y_true.is_empty() {
        return Err(OdsError::invalid_argument("cannot score zero samples"));
    }
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Unweighted mean of per-class F1.
pub fn f1_macro(y_true: &[Label], y_pred: &[Label]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    Ok(mean(per_class(y_true, y_pred).values().map(Counts::f1)))
}

impl ClassificationMetrics {
    pub fn compute(y_true: &[Label], y_pred: &[Label]) -> Result<Self> {
        check_lengths(y_true, y_pred)?;
        let counts = per_class(y_true, y_pred);

        let n_samples = y_true.len();
        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();

        let totals = counts.values().fold(Counts::default(), |acc, c| Counts {
            tp: acc.tp + c.tp,
            fp: acc.fp + c.fp,
            fn_: acc.fn_ + c.fn_,
        });

        let support: usize = counts.values().map(Counts::support).sum();
        let f1_weighted = if support == 0 {
            0.0
        } else {
            counts
                .values()
                .map(|c| c.f1() * c.support() as f64)
                .sum::<f64>()
                / support as f64
        };

        Ok(ClassificationMetrics {
            n_samples,
            accuracy: ratio(correct, n_samples),
            precision_macro: mean(counts.values().map(Counts::precision)),
            recall_macro: mean(counts.values().map(Counts::recall)),
            f1_macro: mean(counts.values().map(Counts::f1)),
            f1_micro: totals.f1(),
            f1_weighted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_perfect_predictions() {
        let y = vec![1, 3, 4, 1];
        let metrics = ClassificationMetrics::compute(&y, &y).unwrap();
        assert_eq!(metrics.n_samples, 4);
        assert!(close(metrics.accuracy, 1.0));
        assert!(close(metrics.f1_macro, 1.0));
        assert!(close(metrics.f1_weighted, 1.0));
    }

    #[test]
    fn test_mixed_predictions() {
        // class 1: tp 1, fn 1 ; class 3: tp 1, fp 1
        let y_true = vec![1, 1, 3];
        let y_pred = vec![1, 3, 3];
        let metrics = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();

        assert!(close(metrics.accuracy, 2.0 / 3.0));
        // P1 = 1, R1 = 0.5, F1_1 = 2/3 ; P3 = 0.5, R3 = 1, F1_3 = 2/3
        assert!(close(metrics.precision_macro, 0.75));
        assert!(close(metrics.recall_macro, 0.75));
        assert!(close(metrics.f1_macro, 2.0 / 3.0));
        assert!(close(metrics.f1_micro, 2.0 / 3.0));
        assert!(close(metrics.f1_weighted, 2.0 / 3.0));
    }

    #[test]
    fn test_predicted_only_label_counts_in_macro() {
        let y_true = vec![1, 1];
        let y_pred = vec![1, 4];
        // class 1: F1 = 2/3 ; class 4: F1 = 0
        assert!(close(f1_macro(&y_true, &y_pred).unwrap(), 1.0 / 3.0));
    }

    #[test]
    fn test_bounds() {
        let y_true = vec![1, 3, 4, 4, 3, 1, 1];
        let y_pred = vec![3, 3, 1, 4, 4, 1, 4];
        let m = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();
        for value in [
            m.accuracy,
            m.precision_macro,
            m.recall_macro,
            m.f1_macro,
            m.f1_micro,
            m.f1_weighted,
        ] {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            f1_macro(&[1, 2], &[1]),
            Err(OdsError::ShapeMismatch { .. })
        ));
        assert!(f1_macro(&[], &[]).is_err());
    }
}
