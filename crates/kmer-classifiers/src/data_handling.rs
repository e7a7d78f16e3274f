//! Labeled k-mer datasets and the helpers used to split and filter them.
//!
//! A `KmerDataset` keeps the feature matrix and the label vector row-aligned;
//! every helper that drops or duplicates rows does so on both at once.
use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;

/// Occurrences of each label in a dataset.
pub type ClassCounts = BTreeMap<Label, usize>;

#[derive(Debug, Clone)]
pub struct KmerDataset {
    pub x: Array2<f64>,
    pub y: Array1<Label>,
    pub feature_names: Vec<String>,
}

impl KmerDataset {
    /// Create a dataset, checking that rows, labels and feature names agree.
    pub fn new(x: Array2<f64>, y: Array1<Label>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(ClassifierError::DimensionMismatch {
                what: "labels",
                expected: x.nrows(),
                actual: y.len(),
            });
        }
        if x.ncols() != feature_names.len() {
            return Err(ClassifierError::DimensionMismatch {
                what: "feature columns",
                expected: feature_names.len(),
                actual: x.ncols(),
            });
        }
        Ok(KmerDataset {
            x,
            y,
            feature_names,
        })
    }

    /// Build a dataset from row vectors. Every row must have one value per feature name.
    pub fn from_rows(
        rows: &[Vec<f64>],
        labels: &[Label],
        feature_names: Vec<String>,
    ) -> Result<Self> {
        let n_features = feature_names.len();
        let mut data = Vec::with_capacity(rows.len() * n_features);
        for row in rows {
            if row.len() != n_features {
                return Err(ClassifierError::DimensionMismatch {
                    what: "feature values per row",
                    expected: n_features,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        let x = Array2::from_shape_vec((rows.len(), n_features), data)
            .map_err(|e| ClassifierError::InvalidData(e.to_string()))?;
        KmerDataset::new(x, Array1::from_vec(labels.to_vec()), feature_names)
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    pub fn class_counts(&self) -> ClassCounts {
        count_classes(self.y.iter().copied())
    }

    pub fn log_input_data_summary(&self, title: &str) {
        log::info!(
            "{}: {} rows, {} feature columns, class counts {:?}",
            title,
            self.nrows(),
            self.x.ncols(),
            self.class_counts()
        );
    }

    /// Return a new dataset made of the given rows, in the given order.
    /// Indices may repeat, which duplicates the row.
    pub fn select_rows(&self, indices: &[usize]) -> KmerDataset {
        KmerDataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Keep only rows whose label is one of `classes`.
    pub fn retain_classes(&self, classes: &[Label]) -> KmerDataset {
        let keep: Vec<usize> = self
            .y
            .iter()
            .enumerate()
            .filter_map(|(i, label)| classes.contains(label).then_some(i))
            .collect();
        self.select_rows(&keep)
    }

    /// Row indices grouped by label.
    pub fn indices_by_class(&self) -> BTreeMap<Label, Vec<usize>> {
        let mut groups: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
        for (i, &label) in self.y.iter().enumerate() {
            groups.entry(label).or_default().push(i);
        }
        groups
    }

    /// Randomly partition the rows into a training and a test set.
    ///
    /// The test set receives `ceil(test_fraction * n)` rows. Both partitions
    /// must end up non-empty.
    pub fn train_test_split<R: Rng + ?Sized>(
        &self,
        test_fraction: f64,
        rng: &mut R,
    ) -> Result<(KmerDataset, KmerDataset)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(ClassifierError::Misconfigured(format!(
                "test fraction must lie strictly between 0 and 1, got {}",
                test_fraction
            )));
        }

        let n_samples = self.nrows();
        let n_test = (n_samples as f64 * test_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(ClassifierError::InvalidData(format!(
                "cannot split {} rows with test fraction {}",
                n_samples, test_fraction
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(rng);
        let (test_idx, train_idx) = indices.split_at(n_test);

        Ok((self.select_rows(train_idx), self.select_rows(test_idx)))
    }
}

pub fn count_classes<I: IntoIterator<Item = Label>>(labels: I) -> ClassCounts {
    let mut counts = ClassCounts::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}
