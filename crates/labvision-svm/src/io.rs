//! JSON persistence for trained models.

use std::{fs, path::Path};

use crate::{ModelIoError, TrainedModel};

impl TrainedModel {
    /// Parse a model from JSON and check that its shapes agree.
    pub fn from_json_str(raw: &str) -> Result<Self, ModelIoError> {
        let model: TrainedModel = serde_json::from_str(raw)?;
        model.validate()?;
        Ok(model)
    }

    /// Check a deserialized model: class count, weight rows and intercepts
    /// must agree with `n_features`.
    pub fn validate(&self) -> Result<(), ModelIoError> {
        self.check_consistency().map_err(ModelIoError::Inconsistent)
    }

    /// Load a model from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ModelIoError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Write this model to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ModelIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
