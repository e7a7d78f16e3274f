//! The ordered set of candidate classifiers evaluated during selection.
use crate::config::ModelConfig;
use crate::error::{ClassifierError, Result};
use crate::models::{build_model, ClassifierModel};

/// A named pool member. The config is kept so the slot can be refilled with
/// a fresh model once its fitted instance is handed out.
pub struct ModelEntry {
    pub name: String,
    pub config: ModelConfig,
    pub model: Box<dyn ClassifierModel>,
}

impl ModelEntry {
    pub fn new(config: ModelConfig) -> Self {
        ModelEntry {
            name: config.name.clone(),
            model: build_model(&config),
            config,
        }
    }
}

pub struct ModelPool {
    entries: Vec<ModelEntry>,
}

impl ModelPool {
    pub fn from_configs(configs: &[ModelConfig]) -> Result<Self> {
        if configs.is_empty() {
            return Err(ClassifierError::Misconfigured(
                "the model pool needs at least one entry".to_string(),
            ));
        }
        let entries: Vec<ModelEntry> = configs.iter().cloned().map(ModelEntry::new).collect();
        log::debug!(
            "Model pool: {:?}",
            entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>()
        );
        Ok(ModelPool { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [ModelEntry] {
        &mut self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Move the model at `index` out of the pool, leaving an unfitted model
    /// built from the same config in its place.
    pub fn take_model(&mut self, index: usize) -> Option<Box<dyn ClassifierModel>> {
        let entry = self.entries.get_mut(index)?;
        let fresh = build_model(&entry.config);
        Some(std::mem::replace(&mut entry.model, fresh))
    }
}

impl Default for ModelPool {
    fn default() -> Self {
        ModelPool {
            entries: ModelConfig::default_pool()
                .into_iter()
                .map(ModelEntry::new)
                .collect(),
        }
    }
}
