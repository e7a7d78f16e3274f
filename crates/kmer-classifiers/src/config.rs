use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::KMER_FEATURE_NAMES;
use crate::kmer_type::{KmerType, Label};

/// Fraction of rows held out for benchmarking the pool.
pub const DEFAULT_TEST_FRACTION: f64 = 0.34;

/// One pool member: a display name plus the model type and its hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub name: String,

    #[serde(rename = "model")]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    Naive,
    Statistical,
    GaussianNb {
        var_smoothing: f64,
    },
    DecisionTree {
        max_depth: Option<usize>,
        min_weight_split: f32,
        balanced: bool,
    },
    RandomForest {
        n_trees: usize,
        max_depth: Option<usize>,
        bootstrap_fraction: f64,
        balanced: bool,
        seed: Option<u64>,
    },
    LogisticRegression {
        max_iterations: u64,
        alpha: f64,
    },
    GBDT {
        max_depth: u32,
        num_boost_round: u32,
        learning_rate: f32,
        balanced: bool,
    },
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "naive" => Ok(ModelType::Naive),
            "statistical" => Ok(ModelType::Statistical),
            "gaussiannb" | "gaussian_nb" => Ok(ModelType::GaussianNb {
                var_smoothing: 1e-9,
            }),
            "decisiontree" | "decision_tree" => Ok(ModelType::DecisionTree {
                max_depth: None,
                min_weight_split: 2.0,
                balanced: true,
            }),
            "randomforest" | "random_forest" => Ok(ModelType::RandomForest {
                n_trees: 10,
                max_depth: None,
                bootstrap_fraction: 1.0,
                balanced: true,
                seed: None,
            }),
            "logisticregression" | "logistic_regression" => Ok(ModelType::LogisticRegression {
                max_iterations: 100,
                alpha: 1.0,
            }),
            "gbdt" => Ok(ModelType::GBDT {
                max_depth: 3,
                num_boost_round: 50,
                learning_rate: 0.1,
                balanced: true,
            }),
            _ => Err(format!("Unknown model type: {}", s)),
        }
    }
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            model_type,
        }
    }

    pub fn naive() -> Self {
        Self::new("naive", ModelType::Naive)
    }

    pub fn statistical() -> Self {
        Self::new("statistical", ModelType::Statistical)
    }

    /// The two rule-based baselines followed by the learned models, in
    /// evaluation order.
    pub fn default_pool() -> Vec<ModelConfig> {
        let learned = [
            ("GaussianNB", "gaussiannb"),
            ("DecisionTreeClassifier", "decisiontree"),
            ("RandomForestClassifier", "randomforest"),
            ("LogisticRegression", "logisticregression"),
            ("GradientBoosting(balanced)", "gbdt"),
        ];
        let mut pool = vec![Self::naive(), Self::statistical()];
        for (name, kind) in learned {
            // every key above is handled by ModelType::from_str
            if let Ok(model_type) = kind.parse() {
                pool.push(Self::new(name, model_type));
            }
        }
        pool
    }
}

/// Settings of a [`crate::kmer_classifier::KmerClassifier`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Feature column names, in feature-vector slot order.
    pub features: Vec<String>,
    /// Class codes; `proba` columns follow this order.
    pub classes: Vec<Label>,
    pub test_fraction: f64,
    /// Rebalance the training split before fitting the pool.
    pub use_balancing: bool,
    /// Seed for the split and the balancer; entropy-seeded when absent.
    pub seed: Option<u64>,
    pub pool: Vec<ModelConfig>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            classes: Vec::new(),
            test_fraction: DEFAULT_TEST_FRACTION,
            use_balancing: false,
            seed: None,
            pool: ModelConfig::default_pool(),
        }
    }
}

impl ClassifierConfig {
    /// Configuration matching the k-mer training file layout: the six
    /// standard features and the REPEAT/TRUSTED/UNTRUSTED codes.
    pub fn kmer_default() -> Self {
        Self {
            features: KMER_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            classes: KmerType::CODES.to_vec(),
            ..Self::default()
        }
    }
}

/// Load a classifier configuration from a JSON file. Missing fields fall back
/// to their defaults.
pub fn load_classifier_config<P: AsRef<Path>>(path: P) -> Result<ClassifierConfig> {
    let content = std::fs::read_to_string(&path)?;
    let config: ClassifierConfig = serde_json::from_str(&content)?;
    log::debug!("Loaded classifier config from {}", path.as_ref().display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_starts_with_rule_based_baselines() {
        let pool = ModelConfig::default_pool();
        assert_eq!(pool.len(), 7);
        assert_eq!(pool[0].model_type, ModelType::Naive);
        assert_eq!(pool[1].model_type, ModelType::Statistical);
        assert_eq!(pool[2].name, "GaussianNB");
    }

    #[test]
    fn model_type_from_str_is_case_insensitive() {
        let mt: ModelType = "GBDT".parse().unwrap();
        assert!(matches!(mt, ModelType::GBDT { balanced: true, .. }));
        assert!("svm".parse::<ModelType>().is_err());
    }

    #[test]
    fn kmer_default_sets_contract() {
        let config = ClassifierConfig::kmer_default();
        assert_eq!(config.features.len(), 6);
        assert_eq!(config.classes, vec![0, 1, 2]);
        assert!(!config.use_balancing);
        assert_eq!(config.test_fraction, 0.34);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: ClassifierConfig =
            serde_json::from_str(r#"{"classes": [0, 2], "seed": 4}"#).unwrap();
        assert_eq!(config.classes, vec![0, 2]);
        assert_eq!(config.seed, Some(4));
        assert!(config.features.is_empty());
        assert_eq!(config.pool.len(), 7);
    }

    #[test]
    fn model_config_round_trips_json() {
        let config = ModelConfig::new(
            "forest",
            ModelType::RandomForest {
                n_trees: 3,
                max_depth: Some(4),
                bootstrap_fraction: 0.5,
                balanced: false,
                seed: Some(1),
            },
        );
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("RandomForest"));
        let back: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn loads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"use_balancing": true}"#).unwrap();
        let config = load_classifier_config(&path).unwrap();
        assert!(config.use_balancing);
    }
}
