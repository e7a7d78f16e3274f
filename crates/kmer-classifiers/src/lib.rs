//! kmer-classifiers: model selection for REPEAT/TRUSTED/UNTRUSTED k-mer labels.
//!
//! A [`KmerClassifier`] reads labeled k-mer features, optionally rebalances the
//! training split, fits a pool of candidate models (two fixed-threshold
//! baselines plus tree, linear and boosted learners), scores each by macro-F1
//! on a held-out split and keeps the best one for classification and storage.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod features;
pub mod io;
pub mod kmer_classifier;
pub mod kmer_type;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod pool;
pub mod preprocessing;
pub mod selection;

pub use config::{ClassifierConfig, ModelConfig, ModelType};
pub use data_handling::KmerDataset;
pub use error::{ClassifierError, Result};
pub use kmer_classifier::{KmerClassifier, ModelState};
pub use kmer_type::{KmerType, Label};
