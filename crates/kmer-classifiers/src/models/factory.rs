use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::decision_tree::{DecisionTreeClassifier, TreeParams};
use crate::models::gaussian_nb::GaussianNbClassifier;
use crate::models::gbdt::{GBDTClassifier, GbdtParams};
use crate::models::logistic::LogisticRegressionClassifier;
use crate::models::random_forest::{ForestParams, RandomForestClassifier};
use crate::models::rule_based::{NaiveClassifier, StatisticalClassifier};

/// Build an unfitted boxed classifier from a `ModelConfig`.
pub fn build_model(params: &ModelConfig) -> Box<dyn ClassifierModel> {
    let name = params.name.clone();
    match params.model_type {
        ModelType::Naive => Box::new(NaiveClassifier),
        ModelType::Statistical => Box::new(StatisticalClassifier),
        ModelType::GaussianNb { var_smoothing } => {
            Box::new(GaussianNbClassifier::new(name, var_smoothing))
        }
        ModelType::DecisionTree {
            max_depth,
            min_weight_split,
            balanced,
        } => Box::new(DecisionTreeClassifier::new(
            name,
            TreeParams {
                max_depth,
                min_weight_split,
                balanced,
            },
        )),
        ModelType::RandomForest {
            n_trees,
            max_depth,
            bootstrap_fraction,
            balanced,
            seed,
        } => Box::new(RandomForestClassifier::new(
            name,
            ForestParams {
                n_trees,
                bootstrap_fraction,
                seed,
                tree: TreeParams {
                    max_depth,
                    min_weight_split: 2.0,
                    balanced,
                },
            },
        )),
        ModelType::LogisticRegression {
            max_iterations,
            alpha,
        } => Box::new(LogisticRegressionClassifier::new(name, max_iterations, alpha)),
        ModelType::GBDT {
            max_depth,
            num_boost_round,
            learning_rate,
            balanced,
        } => Box::new(GBDTClassifier::new(
            name,
            GbdtParams {
                max_depth,
                num_boost_round,
                learning_rate,
                balanced,
            },
        )),
    }
}
