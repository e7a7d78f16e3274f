//! Classification metrics used to compare pool members.
//!
//! Follows scikit-learn conventions: the label set is the sorted union of
//! true and predicted labels, and precision/recall/F1 are 0 when undefined.
use std::fmt;

use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;

/// Per-class scores of a classification report.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Confusion matrix; rows are true labels, columns predicted labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    pub labels: Vec<Label>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Fails with `DimensionMismatch` unless both label slices have the same length.
    pub fn new(expected: &[Label], predicted: &[Label]) -> Result<Self> {
        if expected.len() != predicted.len() {
            return Err(ClassifierError::DimensionMismatch {
                what: "predicted labels",
                expected: expected.len(),
                actual: predicted.len(),
            });
        }

        let mut labels: Vec<Label> = expected.iter().chain(predicted).copied().collect();
        labels.sort_unstable();
        labels.dedup();

        let n = labels.len();
        let mut counts = vec![vec![0usize; n]; n];
        for (t, p) in expected.iter().zip(predicted) {
            // both labels are in `labels` by construction
            let (Ok(i), Ok(j)) = (labels.binary_search(t), labels.binary_search(p)) else {
                continue;
            };
            counts[i][j] += 1;
        }

        Ok(ConfusionMatrix { labels, counts })
    }

    /// Precision, recall, F1 and support for every label.
    pub fn class_scores(&self) -> Vec<ClassScore> {
        let n = self.labels.len();
        (0..n)
            .map(|k| {
                let tp = self.counts[k][k] as f64;
                let support: usize = self.counts[k].iter().sum();
                let predicted: usize = (0..n).map(|i| self.counts[i][k]).sum();

                let precision = ratio(tp, predicted as f64);
                let recall = ratio(tp, support as f64);
                let f1 = ratio(2.0 * precision * recall, precision + recall);

                ClassScore {
                    label: self.labels[k],
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Unweighted mean of the per-class F1 scores.
    pub fn f1_macro(&self) -> f64 {
        let scores = self.class_scores();
        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().map(|s| s.f1).sum::<f64>() / scores.len() as f64
    }

    pub fn accuracy(&self) -> f64 {
        let total: usize = self.counts.iter().flatten().sum();
        let correct: usize = (0..self.labels.len()).map(|k| self.counts[k][k]).sum();
        ratio(correct as f64, total as f64)
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Macro-averaged F1 of `predicted` against `expected`.
pub fn f1_macro(expected: &[Label], predicted: &[Label]) -> Result<f64> {
    Ok(ConfusionMatrix::new(expected, predicted)?.f1_macro())
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for label in &self.labels {
            write!(f, "{:>8}", label)?;
        }
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "\n{:>8}", label)?;
            for count in row {
                write!(f, "{:>8}", count)?;
            }
        }
        Ok(())
    }
}

/// Formats per-class scores the way a classification report is usually laid out.
pub struct ClassificationReport<'a>(pub &'a [ClassScore]);

impl fmt::Display for ClassificationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>8} {:>10} {:>10} {:>10} {:>10}",
            "class", "precision", "recall", "f1-score", "support"
        )?;
        for s in self.0 {
            write!(
                f,
                "\n{:>8} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                s.label, s.precision, s.recall, s.f1, s.support
            )?;
        }
        Ok(())
    }
}
