use thiserror::Error;

use crate::kmer_type::Label;

/// Errors surfaced by dataset handling, model selection and serving.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier is misconfigured: {0}")]
    Misconfigured(String),

    #[error("Dimension mismatch: expected {expected} {what}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Class {0} has no training examples")]
    EmptyClass(Label),

    #[error("No model has been selected or loaded yet")]
    Unselected,

    #[error("Model '{model}' does not support {operation}")]
    UnsupportedOperation {
        model: String,
        operation: &'static str,
    },

    #[error("Failed to fit model '{model}': {reason}")]
    Fit { model: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input data: {0}")]
    InvalidData(String),
}

impl ClassifierError {
    pub(crate) fn fit_failed(model: &str, reason: impl std::fmt::Display) -> Self {
        ClassifierError::Fit {
            model: model.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn unsupported(model: &str, operation: &'static str) -> Self {
        ClassifierError::UnsupportedOperation {
            model: model.to_string(),
            operation,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
