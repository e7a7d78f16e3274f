//! The public entry point: configure, train, serve and persist a k-mer classifier.
use std::path::Path;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ClassifierConfig;
use crate::data_handling::KmerDataset;
use crate::error::{ClassifierError, Result};
use crate::io::read_kmer_csv;
use crate::kmer_type::Label;
use crate::models::rule_based::NaiveClassifier;
use crate::models::ClassifierModel;
use crate::persistence::{load_model, store_model};
use crate::pool::ModelPool;
use crate::selection::{choose_best_classifier, ModelScore};

/// Where the model used for serving came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Nothing selected or loaded; only `classify_or_default` answers, using
    /// the naive rule.
    Default,
    Trained,
    Loaded,
}

struct BestModel {
    name: String,
    model: Box<dyn ClassifierModel>,
}

/// Trains a pool of candidate models on labeled k-mer features and serves
/// predictions from the best one.
///
/// Training takes `&mut self` and serving `&self`; wrap the classifier in a
/// `RwLock` to share it between threads.
pub struct KmerClassifier {
    config: ClassifierConfig,
    pool: ModelPool,
    best: Option<BestModel>,
    best_score: Option<f64>,
    state: ModelState,
    last_scores: Vec<ModelScore>,
}

impl KmerClassifier {
    /// A classifier with the default pool and no features or classes set.
    pub fn new() -> Self {
        KmerClassifier::from_parts(ClassifierConfig::default(), ModelPool::default())
    }

    pub fn with_config(config: ClassifierConfig) -> Result<Self> {
        let pool = ModelPool::from_configs(&config.pool)?;
        Ok(KmerClassifier::from_parts(config, pool))
    }

    fn from_parts(config: ClassifierConfig, pool: ModelPool) -> Self {
        KmerClassifier {
            config,
            pool,
            best: None,
            best_score: None,
            state: ModelState::Default,
            last_scores: Vec::new(),
        }
    }

    pub fn set_features(&mut self, features: Vec<String>) {
        self.config.features = features;
    }

    pub fn set_classes(&mut self, classes: Vec<Label>) {
        self.config.classes = classes;
    }

    pub fn features(&self) -> &[String] {
        &self.config.features
    }

    pub fn classes(&self) -> &[Label] {
        &self.config.classes
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn pool(&self) -> &ModelPool {
        &self.pool
    }

    pub fn model_state(&self) -> ModelState {
        self.state
    }

    pub fn best_model_name(&self) -> Option<&str> {
        self.best.as_ref().map(|b| b.name.as_str())
    }

    /// Macro-F1 of the retained model; `None` unless it came from training.
    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    /// Per-model scores of the most recent training run.
    pub fn last_scores(&self) -> &[ModelScore] {
        &self.last_scores
    }

    fn check_configured(&self) -> Result<()> {
        if self.config.features.is_empty() {
            return Err(ClassifierError::Misconfigured(
                "feature names have not been set".to_string(),
            ));
        }
        if self.config.classes.is_empty() {
            return Err(ClassifierError::Misconfigured(
                "class codes have not been set".to_string(),
            ));
        }
        Ok(())
    }

    fn as_row(&self, features: &[f64]) -> Result<Array2<f64>> {
        let expected = self.config.features.len();
        if features.len() != expected {
            return Err(ClassifierError::DimensionMismatch {
                what: "feature values",
                expected,
                actual: features.len(),
            });
        }
        Array2::from_shape_vec((1, expected), features.to_vec())
            .map_err(|e| ClassifierError::InvalidData(e.to_string()))
    }

    fn best(&self) -> Result<&BestModel> {
        self.best.as_ref().ok_or(ClassifierError::Unselected)
    }

    /// Load the training file at `path` and run model selection on it.
    /// Returns the best macro-F1 of the run.
    pub fn train_from_csv<P: AsRef<Path>>(&mut self, path: P) -> Result<f64> {
        self.check_configured()?;
        log::info!("Reading training data from {}", path.as_ref().display());
        let dataset = read_kmer_csv(path, &self.config.features)?;
        self.train(&dataset)
    }

    /// Split `dataset`, fit every pool member and keep the best one if it
    /// scores above zero.
    pub fn train(&mut self, dataset: &KmerDataset) -> Result<f64> {
        self.check_configured()?;
        if dataset.x.ncols() != self.config.features.len() {
            return Err(ClassifierError::DimensionMismatch {
                what: "feature columns",
                expected: self.config.features.len(),
                actual: dataset.x.ncols(),
            });
        }
        dataset.log_input_data_summary("Input data");

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (train, test) = dataset.train_test_split(self.config.test_fraction, &mut rng)?;

        let outcome = choose_best_classifier(
            &mut self.pool,
            &train,
            &test,
            0.0,
            self.config.use_balancing,
            &self.config.classes,
            &mut rng,
        )?;
        self.last_scores = outcome.scores;

        if let Some(winner) = outcome.winner {
            self.best = Some(BestModel {
                name: winner.name,
                model: winner.model,
            });
            self.best_score = Some(winner.score);
            self.state = ModelState::Trained;
        }
        Ok(outcome.best_score)
    }

    /// Class code predicted by the retained model.
    pub fn classify(&self, features: &[f64]) -> Result<Label> {
        let best = self.best()?;
        self.check_configured()?;
        let row = self.as_row(features)?;
        first_label(best.model.predict(&row)?)
    }

    /// Like [`KmerClassifier::classify`], but answers with the naive rule
    /// while no model has been selected or loaded.
    pub fn classify_or_default(&self, features: &[f64]) -> Result<Label> {
        if self.best.is_some() {
            return self.classify(features);
        }
        self.check_configured()?;
        let row = self.as_row(features)?;
        first_label(NaiveClassifier.predict(&row)?)
    }

    /// Class probabilities in the order of the configured class codes.
    /// Classes the model never saw get probability 0.
    pub fn proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        let best = self.best()?;
        self.check_configured()?;
        let row = self.as_row(features)?;
        let raw = best.model.predict_proba(&row)?;
        let model_classes = best.model.classes();

        Ok(self
            .config
            .classes
            .iter()
            .map(|class| {
                model_classes
                    .iter()
                    .position(|c| c == class)
                    .map_or(0.0, |col| raw[(0, col)])
            })
            .collect())
    }

    /// Write the retained model to `path`.
    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let best = self.best()?;
        store_model(path, &best.name, best.model.as_ref())
    }

    /// Replace the retained model with the one stored at `path`.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let (name, model) = load_model(path)?;
        self.best = Some(BestModel { name, model });
        self.best_score = None;
        self.state = ModelState::Loaded;
        Ok(())
    }
}

impl Default for KmerClassifier {
    fn default() -> Self {
        KmerClassifier::new()
    }
}

fn first_label(predictions: ndarray::Array1<Label>) -> Result<Label> {
    predictions
        .first()
        .copied()
        .ok_or_else(|| ClassifierError::InvalidData("model returned no prediction".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::features::KMER_FEATURE_NAMES;
    use crate::kmer_type::KmerType;

    fn feature_names() -> Vec<String> {
        KMER_FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn z_score_dataset(n: usize) -> KmerDataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let (z, label) = match i % 3 {
                0 => (-4.0 - (i % 5) as f64 * 0.1, 2),
                1 => ((i % 5) as f64 * 0.1, 1),
                _ => (4.0 + (i % 5) as f64 * 0.1, 0),
            };
            rows.push(vec![z, 0.4, 21.0, 10.0, 10.0, 10.0]);
            labels.push(label);
        }
        KmerDataset::from_rows(&rows, &labels, feature_names()).unwrap()
    }

    fn rule_based_classifier() -> KmerClassifier {
        let config = ClassifierConfig {
            seed: Some(7),
            pool: vec![ModelConfig::naive(), ModelConfig::statistical()],
            ..ClassifierConfig::kmer_default()
        };
        KmerClassifier::with_config(config).unwrap()
    }

    const ROW: [f64; 6] = [3.5, 0.4, 21.0, 10.0, 10.0, 10.0];

    #[test]
    fn serving_before_training_is_unselected() {
        let classifier = KmerClassifier::new();
        assert_eq!(classifier.model_state(), ModelState::Default);
        assert!(matches!(classifier.classify(&ROW), Err(ClassifierError::Unselected)));
        assert!(matches!(classifier.proba(&ROW), Err(ClassifierError::Unselected)));
        assert!(matches!(
            classifier.store("unused.json"),
            Err(ClassifierError::Unselected)
        ));
    }

    #[test]
    fn training_requires_configuration() {
        let mut classifier = KmerClassifier::new();
        let result = classifier.train(&z_score_dataset(9));
        assert!(matches!(result, Err(ClassifierError::Misconfigured(_))));
        assert!(matches!(
            classifier.classify_or_default(&ROW),
            Err(ClassifierError::Misconfigured(_))
        ));
    }

    #[test]
    fn default_state_falls_back_to_naive_rule() {
        let classifier = rule_based_classifier();
        let repeat = [0.0, 0.4, 21.0, 10.0, 20.0, 10.0];
        assert_eq!(
            classifier.classify_or_default(&repeat).unwrap(),
            KmerType::Repeat.code()
        );
    }

    #[test]
    fn trains_and_serves_the_statistical_baseline() {
        let mut classifier = rule_based_classifier();
        let score = classifier.train(&z_score_dataset(30)).unwrap();

        assert_eq!(score, 1.0);
        assert_eq!(classifier.model_state(), ModelState::Trained);
        assert_eq!(classifier.best_model_name(), Some("statistical"));
        assert_eq!(classifier.best_score(), Some(1.0));
        assert_eq!(classifier.last_scores().len(), 2);
        assert_eq!(classifier.classify(&ROW).unwrap(), KmerType::Repeat.code());
        assert!(matches!(
            classifier.proba(&ROW),
            Err(ClassifierError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn wrong_vector_length_is_rejected() {
        let mut classifier = rule_based_classifier();
        classifier.train(&z_score_dataset(30)).unwrap();
        assert!(matches!(
            classifier.classify(&[1.0, 2.0]),
            Err(ClassifierError::DimensionMismatch { expected: 6, actual: 2, .. })
        ));
    }

    #[test]
    fn proba_follows_configured_class_order() {
        let config = ClassifierConfig {
            seed: Some(3),
            // class 5 never occurs in the data
            classes: vec![2, 5, 1, 0],
            pool: vec![ModelConfig::new("nb", "gaussiannb".parse().unwrap())],
            ..ClassifierConfig::kmer_default()
        };
        let mut classifier = KmerClassifier::with_config(config).unwrap();
        classifier.train(&z_score_dataset(60)).unwrap();

        let proba = classifier.proba(&ROW).unwrap();
        assert_eq!(proba.len(), 4);
        assert_eq!(proba[1], 0.0);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        // ROW has a large positive z-score: REPEAT, the last configured class
        assert!(proba[3] > 0.5);
    }

    #[test]
    fn store_and_load_round_trip() {
        let mut classifier = rule_based_classifier();
        classifier.train(&z_score_dataset(30)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        classifier.store(&path).unwrap();

        let mut restored = rule_based_classifier();
        restored.load(&path).unwrap();
        assert_eq!(restored.model_state(), ModelState::Loaded);
        assert_eq!(restored.best_model_name(), Some("statistical"));
        assert_eq!(restored.best_score(), None);
        assert_eq!(restored.classify(&ROW).unwrap(), classifier.classify(&ROW).unwrap());
    }
}
