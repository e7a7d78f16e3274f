//! Label encoding and weighting helpers shared by the learned models.
use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::data_handling::count_classes;
use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;

/// Maps class codes to contiguous indices `0..n_classes` (sorted by code),
/// the label type expected by the linfa estimators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<Label>,
}

impl LabelEncoder {
    pub fn fit(y: &Array1<Label>) -> Self {
        let mut classes: Vec<Label> = y.iter().copied().collect();
        classes.sort_unstable();
        classes.dedup();
        LabelEncoder { classes }
    }

    pub fn encode(&self, y: &Array1<Label>) -> Result<Array1<usize>> {
        y.iter()
            .map(|label| {
                self.classes.binary_search(label).map_err(|_| {
                    ClassifierError::InvalidData(format!("label {} was not seen during fit", label))
                })
            })
            .collect()
    }

    pub fn decode(&self, idx: usize) -> Result<Label> {
        self.classes.get(idx).copied().ok_or_else(|| {
            ClassifierError::InvalidData(format!("class index {} out of range", idx))
        })
    }

    pub fn decode_all(&self, indices: &Array1<usize>) -> Result<Array1<Label>> {
        indices.iter().map(|&idx| self.decode(idx)).collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Per-row weights `n_samples / (n_classes * count(class))`, so every class
/// contributes the same total weight.
pub fn balanced_sample_weights(y: &Array1<Label>) -> Array1<f32> {
    let counts = count_classes(y.iter().copied());
    let n_samples = y.len() as f64;
    let n_classes = counts.len() as f64;
    let class_weight: BTreeMap<Label, f64> = counts
        .iter()
        .map(|(&label, &count)| (label, n_samples / (n_classes * count as f64)))
        .collect();
    y.mapv(|label| class_weight[&label] as f32)
}

/// One-hot probability rows for hard predictions, columns in `classes` order.
pub fn one_hot(predictions: &Array1<usize>, n_classes: usize) -> Array2<f64> {
    let mut proba = Array2::zeros((predictions.len(), n_classes));
    for (row, &class_idx) in predictions.iter().enumerate() {
        if class_idx < n_classes {
            proba[(row, class_idx)] = 1.0;
        }
    }
    proba
}

/// Index of the largest value in each row.
pub fn argmax_rows(proba: &Array2<f64>) -> Array1<usize> {
    proba
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (i, &p)| {
                    if p > best.1 {
                        (i, p)
                    } else {
                        best
                    }
                })
                .0
        })
        .collect()
}

/// Error unless `x` has the number of columns seen during fit.
pub fn check_columns(model: &str, x: &Array2<f64>, expected: usize) -> Result<()> {
    if x.ncols() != expected {
        log::warn!(
            "Model '{}' was fitted on {} features but received {}",
            model,
            expected,
            x.ncols()
        );
        return Err(ClassifierError::DimensionMismatch {
            what: "feature columns",
            expected,
            actual: x.ncols(),
        });
    }
    Ok(())
}

pub fn not_fitted(model: &str) -> ClassifierError {
    ClassifierError::InvalidData(format!("model '{}' has not been fitted", model))
}
