pub mod classifier_trait;
pub mod decision_tree;
pub mod factory;
pub mod gaussian_nb;
pub mod gbdt;
pub mod logistic;
pub mod random_forest;
pub mod rule_based;
pub mod utils;

pub use classifier_trait::{ClassifierModel, ModelKind};
pub use factory::build_model;
