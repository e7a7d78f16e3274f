use linfa::prelude::*;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::kmer_type::Label;
use crate::models::classifier_trait::{ClassifierModel, ModelKind};
use crate::models::utils::{argmax_rows, check_columns, not_fitted, LabelEncoder};
use crate::preprocessing::Scaler;

/// Multinomial logistic regression on standardized features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionClassifier {
    name: String,
    max_iterations: u64,
    alpha: f64,
    encoder: LabelEncoder,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fitted {
    scaler: Scaler,
    model: MultiFittedLogisticRegression<f64, usize>,
}

impl LogisticRegressionClassifier {
    pub fn new(name: impl Into<String>, max_iterations: u64, alpha: f64) -> Self {
        LogisticRegressionClassifier {
            name: name.into(),
            max_iterations,
            alpha,
            encoder: LabelEncoder::default(),
            fitted: None,
        }
    }
}

impl ClassifierModel for LogisticRegressionClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<Label>) -> Result<()> {
        let encoder = LabelEncoder::fit(y);
        if encoder.len() < 2 {
            return Err(ClassifierError::fit_failed(
                &self.name,
                "at least two classes are required",
            ));
        }
        let encoded = encoder.encode(y)?;
        let scaler = Scaler::fit(x)?;
        let dataset = Dataset::new(scaler.transform(x), encoded);

        let model = MultiLogisticRegression::default()
            .max_iterations(self.max_iterations)
            .alpha(self.alpha)
            .fit(&dataset)
            .map_err(|e| ClassifierError::fit_failed(&self.name, e))?;

        self.encoder = encoder;
        self.fitted = Some(Fitted { scaler, model });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>> {
        let proba = self.predict_proba(x)?;
        self.encoder.decode_all(&argmax_rows(&proba))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(&self.name))?;
        check_columns(&self.name, x, fitted.scaler.mean.len())?;

        let raw = fitted
            .model
            .predict_probabilities(&fitted.scaler.transform(x));
        // reorder the fitted class columns into encoder order
        let mut proba = Array2::zeros((x.nrows(), self.encoder.len()));
        for (col, &class_idx) in fitted.model.classes().iter().enumerate() {
            proba.column_mut(class_idx).assign(&raw.column(col));
        }
        Ok(proba)
    }

    fn classes(&self) -> &[Label] {
        &self.encoder.classes
    }

    fn kind(&self) -> ModelKind {
        ModelKind::LogisticRegression
    }

    fn state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
