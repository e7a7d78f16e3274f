//! JSON storage of a single fitted model.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::decision_tree::DecisionTreeClassifier;
use crate::models::gaussian_nb::GaussianNbClassifier;
use crate::models::gbdt::GBDTClassifier;
use crate::models::logistic::LogisticRegressionClassifier;
use crate::models::random_forest::RandomForestClassifier;
use crate::models::rule_based::{NaiveClassifier, StatisticalClassifier};
use crate::models::{ClassifierModel, ModelKind};

/// On-disk envelope: the pool entry name, the concrete model kind and its
/// serde state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredModel {
    pub name: String,
    pub kind: ModelKind,
    pub state: serde_json::Value,
}

impl StoredModel {
    pub fn capture(name: &str, model: &dyn ClassifierModel) -> Result<Self> {
        Ok(StoredModel {
            name: name.to_string(),
            kind: model.kind(),
            state: model.state()?,
        })
    }

    /// Rebuild the boxed model described by this envelope.
    pub fn restore(self) -> Result<Box<dyn ClassifierModel>> {
        let model: Box<dyn ClassifierModel> = match self.kind {
            ModelKind::Naive => Box::new(NaiveClassifier),
            ModelKind::Statistical => Box::new(StatisticalClassifier),
            ModelKind::GaussianNb => {
                Box::new(serde_json::from_value::<GaussianNbClassifier>(self.state)?)
            }
            ModelKind::DecisionTree => {
                Box::new(serde_json::from_value::<DecisionTreeClassifier>(self.state)?)
            }
            ModelKind::RandomForest => {
                Box::new(serde_json::from_value::<RandomForestClassifier>(self.state)?)
            }
            ModelKind::LogisticRegression => {
                Box::new(serde_json::from_value::<LogisticRegressionClassifier>(self.state)?)
            }
            ModelKind::GradientBoosting => {
                Box::new(serde_json::from_value::<GBDTClassifier>(self.state)?)
            }
        };
        Ok(model)
    }
}

pub fn store_model<P: AsRef<Path>>(path: P, name: &str, model: &dyn ClassifierModel) -> Result<()> {
    let stored = StoredModel::capture(name, model)?;
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut writer, &stored)?;
    writer.flush()?;
    log::info!(
        "Stored model '{}' ({:?}) to {}",
        name,
        stored.kind,
        path.as_ref().display()
    );
    Ok(())
}

/// Read a stored model, returning its name and the restored instance.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<(String, Box<dyn ClassifierModel>)> {
    let reader = BufReader::new(File::open(&path)?);
    let stored: StoredModel = serde_json::from_reader(reader)?;
    log::info!(
        "Loaded model '{}' ({:?}) from {}",
        stored.name,
        stored.kind,
        path.as_ref().display()
    );
    let name = stored.name.clone();
    Ok((name, stored.restore()?))
}
