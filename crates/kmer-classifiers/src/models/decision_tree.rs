use linfa::prelude::*;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;
use crate::models::classifier_trait::{ClassifierModel, ModelKind};
use crate::models::utils::{
    balanced_sample_weights, check_columns, not_fitted, one_hot, LabelEncoder,
};

/// Hyper-parameters shared by the single tree and the forest members.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_weight_split: f32,
    pub balanced: bool,
}

/// Fit one CART tree on class indices, optionally with balanced sample weights.
pub(crate) fn fit_tree(
    name: &str,
    params: &TreeParams,
    x: Array2<f64>,
    y: &Array1<Label>,
    encoded: Array1<usize>,
) -> Result<DecisionTree<f64, usize>> {
    let mut dataset = Dataset::new(x, encoded);
    if params.balanced {
        dataset = dataset.with_weights(balanced_sample_weights(y));
    }
    DecisionTree::params()
        .max_depth(params.max_depth)
        .min_weight_split(params.min_weight_split)
        .fit(&dataset)
        .map_err(|e| ClassifierError::fit_failed(name, e))
}

/// Single CART decision tree backed by `linfa-trees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    name: String,
    params: TreeParams,
    encoder: LabelEncoder,
    n_features: usize,
    tree: Option<DecisionTree<f64, usize>>,
}

impl DecisionTreeClassifier {
    pub fn new(name: impl Into<String>, params: TreeParams) -> Self {
        DecisionTreeClassifier {
            name: name.into(),
            params,
            encoder: LabelEncoder::default(),
            n_features: 0,
            tree: None,
        }
    }

    fn predict_indices(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let tree = self.tree.as_ref().ok_or_else(|| not_fitted(&self.name))?;
        check_columns(&self.name, x, self.n_features)?;
        Ok(tree.predict(x))
    }
}

impl ClassifierModel for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<Label>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(ClassifierError::fit_failed(&self.name, "empty training set"));
        }
        let encoder = LabelEncoder::fit(y);
        let encoded = encoder.encode(y)?;
        let tree = fit_tree(&self.name, &self.params, x.clone(), y, encoded)?;
        log::trace!("{} fitted with depth {}", self.name, tree.max_depth());

        self.encoder = encoder;
        self.n_features = x.ncols();
        self.tree = Some(tree);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>> {
        let indices = self.predict_indices(x)?;
        self.encoder.decode_all(&indices)
    }

    /// Leaf majority as a one-hot distribution.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let indices = self.predict_indices(x)?;
        Ok(one_hot(&indices, self.encoder.len()))
    }

    fn classes(&self) -> &[Label] {
        &self.encoder.classes
    }

    fn kind(&self) -> ModelKind {
        ModelKind::DecisionTree
    }

    fn state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
