use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;
use crate::models::classifier_trait::{ClassifierModel, ModelKind};
use crate::models::utils::{
    argmax_rows, balanced_sample_weights, check_columns, not_fitted, LabelEncoder,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbdtParams {
    pub max_depth: u32,
    pub num_boost_round: u32,
    pub learning_rate: f32,
    pub balanced: bool,
}

/// Gradient boosted trees, one log-likelihood booster per class
/// (one-vs-rest). Per-class scores are normalized into a distribution.
#[derive(Serialize, Deserialize)]
pub struct GBDTClassifier {
    name: String,
    params: GbdtParams,
    encoder: LabelEncoder,
    n_features: usize,
    boosters: Vec<GBDT>,
}

impl GBDTClassifier {
    pub fn new(name: impl Into<String>, params: GbdtParams) -> Self {
        GBDTClassifier {
            name: name.into(),
            params,
            encoder: LabelEncoder::default(),
            n_features: 0,
            boosters: Vec::new(),
        }
    }

    fn config(&self, feature_size: usize) -> Config {
        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_shrinkage(self.params.learning_rate);
        config.set_max_depth(self.params.max_depth);
        config.set_iterations(self.params.num_boost_round as usize);
        config.set_debug(false);
        config.set_training_optimization_level(2);
        config.set_loss("LogLikelyhood");
        config
    }

    fn to_data(x: &Array2<f64>) -> DataVec {
        x.rows()
            .into_iter()
            .map(|row| {
                let features = row.iter().map(|&v| v as f32).collect();
                Data::new_training_data(features, 1.0, 0.0, None)
            })
            .collect()
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<Label>) -> Result<()> {
        let encoder = LabelEncoder::fit(y);
        if encoder.len() < 2 {
            return Err(ClassifierError::fit_failed(
                &self.name,
                "at least two classes are required",
            ));
        }
        let weights = if self.params.balanced {
            balanced_sample_weights(y)
        } else {
            Array1::from_elem(y.len(), 1.0)
        };
        let config = self.config(x.ncols());

        let boosters = encoder
            .classes
            .par_iter()
            .map(|&class| {
                let mut train: DataVec = x
                    .rows()
                    .into_iter()
                    .zip(y.iter().zip(weights.iter()))
                    .map(|(row, (&label, &weight))| {
                        let features = row.iter().map(|&v| v as f32).collect();
                        let target = if label == class { 1.0 } else { -1.0 };
                        Data::new_training_data(features, weight, target, None)
                    })
                    .collect();
                let mut booster = GBDT::new(&config);
                booster.fit(&mut train);
                booster
            })
            .collect();

        log::trace!(
            "{}: fitted {} one-vs-rest boosters",
            self.name,
            encoder.len()
        );
        self.encoder = encoder;
        self.n_features = x.ncols();
        self.boosters = boosters;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>> {
        let proba = self.predict_proba(x)?;
        self.encoder.decode_all(&argmax_rows(&proba))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.boosters.is_empty() {
            return Err(not_fitted(&self.name));
        }
        check_columns(&self.name, x, self.n_features)?;

        let data = Self::to_data(x);
        let mut proba = Array2::zeros((x.nrows(), self.boosters.len()));
        for (class_idx, booster) in self.boosters.iter().enumerate() {
            for (row, score) in booster.predict(&data).into_iter().enumerate() {
                proba[(row, class_idx)] = score as f64;
            }
        }
        let n_classes = self.boosters.len() as f64;
        for mut row in proba.rows_mut() {
            let total = row.sum();
            if total > 0.0 {
                row /= total;
            } else {
                row.fill(1.0 / n_classes);
            }
        }
        Ok(proba)
    }

    fn classes(&self) -> &[Label] {
        &self.encoder.classes
    }

    fn kind(&self) -> ModelKind {
        ModelKind::GradientBoosting
    }

    fn state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
