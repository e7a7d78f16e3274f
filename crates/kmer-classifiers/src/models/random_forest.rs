use linfa::prelude::*;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;
use crate::models::classifier_trait::{ClassifierModel, ModelKind};
use crate::models::decision_tree::{fit_tree, TreeParams};
use crate::models::utils::{argmax_rows, check_columns, not_fitted, LabelEncoder};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub bootstrap_fraction: f64,
    pub seed: Option<u64>,
    pub tree: TreeParams,
}

/// One forest member and the feature columns it was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ForestTree {
    features: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

/// Random forest of `linfa-trees` decision trees. Every tree sees a bootstrap
/// sample of the rows and a random subset of `ceil(sqrt(n_features))`
/// feature columns. Trees are fitted in parallel; probabilities are vote
/// fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    name: String,
    params: ForestParams,
    encoder: LabelEncoder,
    n_features: usize,
    trees: Vec<ForestTree>,
}

/// Number of feature columns drawn for each tree.
fn features_per_tree(n_features: usize) -> usize {
    ((n_features as f64).sqrt().ceil() as usize).clamp(1, n_features.max(1))
}

impl RandomForestClassifier {
    pub fn new(name: impl Into<String>, params: ForestParams) -> Self {
        RandomForestClassifier {
            name: name.into(),
            params,
            encoder: LabelEncoder::default(),
            n_features: 0,
            trees: Vec::new(),
        }
    }

    fn votes(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(not_fitted(&self.name));
        }
        check_columns(&self.name, x, self.n_features)?;

        let mut votes = Array2::zeros((x.nrows(), self.encoder.len()));
        for member in &self.trees {
            let columns = x.select(Axis(1), &member.features);
            let predictions: Array1<usize> = member.tree.predict(&columns);
            for (row, &class_idx) in predictions.iter().enumerate() {
                votes[(row, class_idx)] += 1.0;
            }
        }
        votes /= self.trees.len() as f64;
        Ok(votes)
    }
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<Label>) -> Result<()> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(ClassifierError::fit_failed(&self.name, "empty training set"));
        }
        if self.params.n_trees == 0 {
            return Err(ClassifierError::fit_failed(&self.name, "n_trees must be positive"));
        }
        let encoder = LabelEncoder::fit(y);
        let encoded = encoder.encode(y)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let bag_size = ((self.params.bootstrap_fraction * n_samples as f64).ceil() as usize)
            .clamp(1, n_samples);
        let subset_size = features_per_tree(n_features);
        let base_seed = self
            .params
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen());
        log::debug!(
            "{}: fitting {} trees on bags of {} rows and {} of {} features (seed {})",
            self.name,
            self.params.n_trees,
            bag_size,
            subset_size,
            n_features,
            base_seed
        );

        let trees = (0..self.params.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(t as u64));
                let bag: Vec<usize> = (0..bag_size).map(|_| rng.gen_range(0..n_samples)).collect();
                let mut features = index::sample(&mut rng, n_features, subset_size).into_vec();
                features.sort_unstable();
                let tree = fit_tree(
                    &self.name,
                    &self.params.tree,
                    x.select(Axis(0), &bag).select(Axis(1), &features),
                    &y.select(Axis(0), &bag),
                    encoded.select(Axis(0), &bag),
                )?;
                Ok(ForestTree { features, tree })
            })
            .collect::<Result<Vec<_>>>()?;

        self.encoder = encoder;
        self.n_features = n_features;
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>> {
        let votes = self.votes(x)?;
        self.encoder.decode_all(&argmax_rows(&votes))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.votes(x)
    }

    fn classes(&self) -> &[Label] {
        &self.encoder.classes
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
