use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};

use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;
use crate::models::classifier_trait::{ClassifierModel, ModelKind};
use crate::models::utils::{argmax_rows, check_columns, not_fitted, LabelEncoder};

/// Gaussian naive Bayes: one independent normal per class and feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNbClassifier {
    name: String,
    var_smoothing: f64,
    encoder: LabelEncoder,
    /// (n_classes, n_features)
    means: Option<Array2<f64>>,
    variances: Option<Array2<f64>>,
    log_priors: Vec<f64>,
}

impl GaussianNbClassifier {
    pub fn new(name: impl Into<String>, var_smoothing: f64) -> Self {
        GaussianNbClassifier {
            name: name.into(),
            var_smoothing,
            encoder: LabelEncoder::default(),
            means: None,
            variances: None,
            log_priors: Vec::new(),
        }
    }

    /// Log joint likelihood `log P(class) + sum_j log N(x_j | mean, var)`,
    /// one column per class.
    fn joint_log_likelihood(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (Some(means), Some(variances)) = (&self.means, &self.variances) else {
            return Err(not_fitted(&self.name));
        };
        check_columns(&self.name, x, means.ncols())?;

        let n_classes = means.nrows();
        let mut jll = Array2::zeros((x.nrows(), n_classes));
        for class_idx in 0..n_classes {
            let normals = means
                .row(class_idx)
                .iter()
                .zip(variances.row(class_idx))
                .map(|(&mean, &var)| {
                    Normal::new(mean, var.sqrt())
                        .map_err(|e| ClassifierError::InvalidData(e.to_string()))
                })
                .collect::<Result<Vec<Normal>>>()?;

            for (row_idx, row) in x.rows().into_iter().enumerate() {
                let log_likelihood: f64 = row
                    .iter()
                    .zip(&normals)
                    .map(|(&value, normal)| normal.ln_pdf(value))
                    .sum();
                jll[(row_idx, class_idx)] = self.log_priors[class_idx] + log_likelihood;
            }
        }
        Ok(jll)
    }
}

impl ClassifierModel for GaussianNbClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<Label>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(ClassifierError::fit_failed(&self.name, "empty training set"));
        }
        let encoder = LabelEncoder::fit(y);
        let encoded = encoder.encode(y)?;
        let n_classes = encoder.len();
        let n_features = x.ncols();

        // sklearn-style smoothing relative to the largest feature variance
        let max_var = x
            .var_axis(Axis(0), 0.0)
            .iter()
            .copied()
            .fold(0.0f64, f64::max);
        let epsilon = (self.var_smoothing * max_var).max(f64::EPSILON);

        let mut means = Array2::zeros((n_classes, n_features));
        let mut variances = Array2::zeros((n_classes, n_features));
        let mut log_priors = Vec::with_capacity(n_classes);

        for class_idx in 0..n_classes {
            let rows: Vec<usize> = encoded
                .iter()
                .enumerate()
                .filter_map(|(i, &c)| (c == class_idx).then_some(i))
                .collect();
            let class_x = x.select(Axis(0), &rows);
            let class_mean = class_x
                .mean_axis(Axis(0))
                .ok_or_else(|| ClassifierError::fit_failed(&self.name, "class without rows"))?;
            let class_var = class_x.var_axis(Axis(0), 0.0) + epsilon;

            means.row_mut(class_idx).assign(&class_mean);
            variances.row_mut(class_idx).assign(&class_var);
            log_priors.push((rows.len() as f64 / x.nrows() as f64).ln());
        }

        self.encoder = encoder;
        self.means = Some(means);
        self.variances = Some(variances);
        self.log_priors = log_priors;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>> {
        let jll = self.joint_log_likelihood(x)?;
        self.encoder.decode_all(&argmax_rows(&jll))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut jll = self.joint_log_likelihood(x)?;
        for mut row in jll.rows_mut() {
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            row.mapv_inplace(|v| (v - max).exp());
            let total = row.sum();
            row.mapv_inplace(|v| v / total);
        }
        Ok(jll)
    }

    fn classes(&self) -> &[Label] {
        &self.encoder.classes
    }

    fn kind(&self) -> ModelKind {
        ModelKind::GaussianNb
    }

    fn state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> (Array2<f64>, Array1<Label>) {
        let x = Array2::from_shape_vec(
            (6, 2),
            vec![0.0, 0.1, 0.2, -0.1, -0.1, 0.0, 5.0, 5.1, 5.2, 4.9, 4.8, 5.0],
        )
        .unwrap();
        (x, Array1::from_vec(vec![2, 2, 2, 0, 0, 0]))
    }

    #[test]
    fn separates_two_blobs() {
        let (x, y) = two_blobs();
        let mut model = GaussianNbClassifier::new("GaussianNB", 1e-9);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
        assert_eq!(model.classes(), &[0, 2]);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (x, y) = two_blobs();
        let mut model = GaussianNbClassifier::new("GaussianNB", 1e-9);
        model.fit(&x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.shape(), &[6, 2]);
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
        // first row belongs to class 2, the second column
        assert!(proba[(0, 1)] > 0.99);
    }

    #[test]
    fn predict_before_fit_fails() {
        let (x, _) = two_blobs();
        let model = GaussianNbClassifier::new("GaussianNB", 1e-9);
        assert!(model.predict(&x).is_err());
    }

    #[test]
    fn constant_features_stay_finite() {
        let x = Array2::from_elem((4, 2), 1.0);
        let y = Array1::from_vec(vec![0, 0, 1, 1]);
        let mut model = GaussianNbClassifier::new("GaussianNB", 1e-9);
        model.fit(&x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|p| p.is_finite()));
    }
}
