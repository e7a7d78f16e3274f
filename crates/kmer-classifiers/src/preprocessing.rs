//! Preprocessing shared by the selection pipeline and the models.
//!
//! Provides the class balancer (random under- then over-sampling toward the
//! average class size) and a simple mean/std scaler used by models that are
//! sensitive to feature magnitudes.

use std::collections::BTreeSet;

use ndarray::{Array1, Array2, Axis};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data_handling::KmerDataset;
use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;

/// Shrink every class to `floor(rate * count)` rows, drawn without
/// replacement. A class never drops below one row.
pub fn random_under_sample<R: Rng + ?Sized>(
    data: &KmerDataset,
    rate: f64,
    rng: &mut R,
) -> KmerDataset {
    let mut keep = Vec::with_capacity(data.nrows());
    for (_, rows) in data.indices_by_class() {
        // the epsilon keeps e.g. (33 / 60) * 60 from flooring to 32
        let target =
            ((rate * rows.len() as f64 + 1e-9).floor() as usize).clamp(1, rows.len());
        keep.extend(index::sample(rng, rows.len(), target).into_iter().map(|i| rows[i]));
    }
    keep.sort_unstable();
    data.select_rows(&keep)
}

/// Grow every class to the size of the largest one by duplicating randomly
/// chosen rows of that class (with replacement).
pub fn random_over_sample<R: Rng + ?Sized>(data: &KmerDataset, rng: &mut R) -> KmerDataset {
    let groups = data.indices_by_class();
    let max_count = groups.values().map(Vec::len).max().unwrap_or(0);

    let mut rows: Vec<usize> = (0..data.nrows()).collect();
    for class_rows in groups.values() {
        for _ in class_rows.len()..max_count {
            if let Some(&row) = class_rows.choose(rng) {
                rows.push(row);
            }
        }
    }
    data.select_rows(&rows)
}

/// Rebalance `data` across `classes`.
///
/// Rows with labels outside `classes` are dropped. Every class is first
/// undersampled by `avg / max_count` (with `avg` the rounded-down mean class
/// count), then every class is oversampled to the largest remaining class.
/// Feature rows are only ever kept, dropped or duplicated.
pub fn balance_classes<R: Rng + ?Sized>(
    data: &KmerDataset,
    classes: &[Label],
    rng: &mut R,
) -> Result<KmerDataset> {
    if classes.is_empty() {
        return Err(ClassifierError::Misconfigured(
            "no classes configured for balancing".to_string(),
        ));
    }

    let classes: BTreeSet<Label> = classes.iter().copied().collect();
    let class_list: Vec<Label> = classes.iter().copied().collect();
    let data = data.retain_classes(&class_list);
    let counts = data.class_counts();
    log::info!("Original training dataset shape {:?}", counts);

    let mut total = 0usize;
    let mut max_count = 0usize;
    let mut min_count = usize::MAX;
    for class in &classes {
        let count = counts.get(class).copied().unwrap_or(0);
        if count == 0 {
            return Err(ClassifierError::EmptyClass(*class));
        }
        total += count;
        max_count = max_count.max(count);
        min_count = min_count.min(count);
    }

    let avg = total / classes.len();
    let rate = avg as f64 / max_count as f64;
    log::debug!(
        "Rounded-down average class count: {}, minCount: {}, maxCount: {}, rate: {}",
        avg,
        min_count,
        max_count,
        rate
    );

    let under = random_under_sample(&data, rate, rng);
    log::info!("Class counts after undersampling {:?}", under.class_counts());

    let balanced = random_over_sample(&under, rng);
    log::info!("Class counts after oversampling {:?}", balanced.class_counts());

    Ok(balanced)
}

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;

    /// Fit from a matrix where rows are samples and columns are features.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let mean = x.mean_axis(Axis(0)).ok_or_else(|| {
            ClassifierError::InvalidData("cannot fit a scaler on an empty matrix".to_string())
        })?;
        let std = x.std_axis(Axis(0), 0.0).mapv(|s| s.max(Self::MIN_STD));
        Ok(Scaler { mean, std })
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean) / &self.std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn skewed() -> KmerDataset {
        // 60 x class 1, 25 x class 2, 15 x class 0, plus 5 rows of an unconfigured class 7
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (label, n) in [(1, 60), (2, 25), (0, 15), (7, 5)] {
            for i in 0..n {
                rows.push(vec![label as f64, i as f64]);
                labels.push(label);
            }
        }
        KmerDataset::from_rows(&rows, &labels, vec!["a".into(), "b".into()]).unwrap()
    }

    #[test]
    fn balanced_counts_are_equal() {
        let mut rng = StdRng::seed_from_u64(11);
        let balanced = balance_classes(&skewed(), &[0, 1, 2], &mut rng).unwrap();
        let counts = balanced.class_counts();
        assert_eq!(counts.len(), 3);
        // avg = 100 / 3 = 33, rate = 33 / 60; the largest class shrinks to 33
        assert!(counts.values().all(|&c| c == 33), "{:?}", counts);
    }

    #[test]
    fn balancing_never_synthesizes_rows() {
        let original = skewed();
        let mut rng = StdRng::seed_from_u64(3);
        let balanced = balance_classes(&original, &[0, 1, 2], &mut rng).unwrap();
        for (row, label) in balanced.x.rows().into_iter().zip(balanced.y.iter()) {
            assert_eq!(row[0] as Label, *label);
            let exists = original.x.rows().into_iter().any(|orig| orig == row);
            assert!(exists, "row {:?} not present in input", row);
        }
    }

    #[test]
    fn balancing_balanced_data_keeps_counts() {
        let mut rng = StdRng::seed_from_u64(5);
        let once = balance_classes(&skewed(), &[0, 1, 2], &mut rng).unwrap();
        let twice = balance_classes(&once, &[0, 1, 2], &mut rng).unwrap();
        assert_eq!(once.class_counts(), twice.class_counts());
    }

    #[test]
    fn duplicated_class_codes_count_once() {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (label, n) in [(0, 20), (1, 10)] {
            for i in 0..n {
                rows.push(vec![label as f64, i as f64]);
                labels.push(label);
            }
        }
        let data = KmerDataset::from_rows(&rows, &labels, vec!["a".into(), "b".into()]).unwrap();

        let mut rng = StdRng::seed_from_u64(2);
        let plain = balance_classes(&data, &[0, 1], &mut rng).unwrap();
        let repeated = balance_classes(&data, &[0, 0, 1], &mut rng).unwrap();
        // avg = 30 / 2 = 15, so class 0 shrinks from 20 to 15 either way
        assert_eq!(plain.class_counts(), repeated.class_counts());
        assert!(repeated.class_counts().values().all(|&c| c == 15));
    }

    #[test]
    fn empty_configured_class_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let result = balance_classes(&skewed(), &[0, 1, 3], &mut rng);
        assert!(matches!(result, Err(ClassifierError::EmptyClass(3))));
    }

    #[test]
    fn empty_class_list_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let result = balance_classes(&skewed(), &[], &mut rng);
        assert!(matches!(result, Err(ClassifierError::Misconfigured(_))));
    }

    #[test]
    fn under_sampling_keeps_at_least_one_row() {
        let mut rng = StdRng::seed_from_u64(9);
        let under = random_under_sample(&skewed(), 0.01, &mut rng);
        assert!(under.class_counts().values().all(|&c| c == 1));
    }

    #[test]
    fn scaler_centers_and_scales() {
        let x = Array2::from_shape_vec((4, 2), vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0])
            .unwrap();
        let scaler = Scaler::fit(&x).unwrap();
        assert!((scaler.mean[0] - 2.5).abs() < 1e-12);
        assert!((scaler.mean[1] - 25.0).abs() < 1e-12);
        let t = scaler.transform(&x);
        let col_mean = t.column(1).sum() / 4.0;
        assert!(col_mean.abs() < 1e-12);
        let col_var = t.column(0).iter().map(|v| v * v).sum::<f64>() / 4.0;
        assert!((col_var - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scaler_on_constant_column_is_finite() {
        let x = Array2::from_elem((3, 1), 5.0);
        let t = Scaler::fit(&x).unwrap().transform(&x);
        assert!(t.iter().all(|v| v.is_finite()));
    }
}
