use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;

/// Identifies the concrete model behind a `Box<dyn ClassifierModel>` so its
/// fitted state can be restored from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    Naive,
    Statistical,
    GaussianNb,
    DecisionTree,
    RandomForest,
    LogisticRegression,
    GradientBoosting,
}

/// The capability shared by every pool member.
///
/// Labels are the integer class codes of the training data. Implementations
/// without probability estimates keep the default `predict_proba`, which
/// reports `UnsupportedOperation`.
pub trait ClassifierModel: Send + Sync {
    /// Fit the model on rows of `x` labeled by `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<Label>) -> Result<()>;

    /// One label per row of `x`, in row order.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>>;

    /// Per-row probability distribution; columns follow [`ClassifierModel::classes`].
    fn predict_proba(&self, _x: &Array2<f64>) -> Result<Array2<f64>> {
        Err(ClassifierError::unsupported(self.name(), "predict_proba"))
    }

    /// Labels known to the model, in the column order of `predict_proba`.
    fn classes(&self) -> &[Label];

    fn kind(&self) -> ModelKind;

    /// Serializable fitted state, restored by [`crate::persistence`].
    fn state(&self) -> Result<serde_json::Value>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
