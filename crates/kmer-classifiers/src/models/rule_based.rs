//! Fixed-threshold baselines. Neither model has trainable parameters, so
//! `fit` is a no-op and the models double as the default before selection.
use ndarray::{Array1, Array2};

use crate::error::{ClassifierError, Result};
use crate::features::{
    BIAS_CORRECTED_OBSERVED_SLOT, EXPECTED_PUSM_SLOT, KMER_FEATURE_COUNT, Z_SCORE_SLOT,
};
use crate::kmer_type::{KmerType, Label};
use crate::models::classifier_trait::{ClassifierModel, ModelKind};

/// Compares the bias-corrected observed count with the expected count.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveClassifier;

/// Thresholds the z-score at +/-2.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticalClassifier;

impl NaiveClassifier {
    pub fn classify_counts(observed: f64, expected: f64) -> KmerType {
        if observed < 0.5 * expected {
            KmerType::Untrusted
        } else if observed > 1.5 * expected {
            KmerType::Repeat
        } else {
            KmerType::Trusted
        }
    }
}

impl StatisticalClassifier {
    pub fn classify_z_score(z_score: f64) -> KmerType {
        if z_score < -2.0 {
            KmerType::Untrusted
        } else if z_score > 2.0 {
            KmerType::Repeat
        } else {
            KmerType::Trusted
        }
    }
}

fn check_kmer_columns(x: &Array2<f64>) -> Result<()> {
    if x.ncols() != KMER_FEATURE_COUNT {
        return Err(ClassifierError::DimensionMismatch {
            what: "feature columns",
            expected: KMER_FEATURE_COUNT,
            actual: x.ncols(),
        });
    }
    Ok(())
}

impl ClassifierModel for NaiveClassifier {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<Label>) -> Result<()> {
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>> {
        check_kmer_columns(x)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let observed = row[BIAS_CORRECTED_OBSERVED_SLOT];
                Self::classify_counts(observed, row[EXPECTED_PUSM_SLOT]).code()
            })
            .collect())
    }

    fn classes(&self) -> &[Label] {
        &KmerType::CODES
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Naive
    }

    fn state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    fn name(&self) -> &str {
        "naive"
    }
}

impl ClassifierModel for StatisticalClassifier {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<Label>) -> Result<()> {
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<Label>> {
        check_kmer_columns(x)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| Self::classify_z_score(row[Z_SCORE_SLOT]).code())
            .collect())
    }

    fn classes(&self) -> &[Label] {
        &KmerType::CODES
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Statistical
    }

    fn state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    fn name(&self) -> &str {
        "statistical"
    }
}
