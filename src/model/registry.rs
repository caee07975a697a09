//! Model architecture registry
//!
//! Loaded once from a versioned JSON document and read-only afterwards.

use super::architecture::ModelArchitecture;
use crate::error::{CapError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const MODELS_SCHEMA_VERSION: u32 = 1;

static BUILTIN_MODELS: Lazy<ModelArchitectureRegistry> = Lazy::new(|| {
    ModelArchitectureRegistry::from_json_str(include_str!("../../data/models.json"))
        .expect("bundled data/models.json must be valid")
});

#[derive(Debug, Serialize, Deserialize)]
struct ModelsFile {
    schema_version: u32,
    models: Vec<ModelArchitecture>,
}

#[derive(Debug, Clone)]
pub struct ModelArchitectureRegistry {
    models: Vec<ModelArchitecture>,
    /// Lowercased id and display name -> position in `models`
    index: HashMap<String, usize>,
}

impl ModelArchitectureRegistry {
    /// Registry of the models shipped with the crate
    pub fn builtin() -> &'static Self {
        &BUILTIN_MODELS
    }

    pub fn new(models: Vec<ModelArchitecture>) -> Result<Self> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, model) in models.iter().enumerate() {
            model.validate()?;
            for key in [model.id.to_lowercase(), model.name.to_lowercase()] {
                if let Some(&other) = index.get(&key) {
                    if other != i {
                        return Err(CapError::invalid_data(
                            model.id.as_str(),
                            "id",
                            format!("duplicates key '{}' of {}", key, models[other].id),
                        ));
                    }
                }
                index.insert(key, i);
            }
        }
        Ok(Self { models, index })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ModelsFile = serde_json::from_str(json)?;
        if file.schema_version != MODELS_SCHEMA_VERSION {
            return Err(CapError::SchemaVersion {
                kind: "models",
                found: file.schema_version,
                expected: MODELS_SCHEMA_VERSION,
            });
        }
        Self::new(file.models)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let registry = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.as_ref().display(),
            models = registry.len(),
            "loaded model registry"
        );
        Ok(registry)
    }

    /// Look up by id or display name, case-insensitively
    pub fn get(&self, key: &str) -> Result<&ModelArchitecture> {
        self.index
            .get(&key.trim().to_lowercase())
            .map(|&i| &self.models[i])
            .ok_or_else(|| CapError::UnknownArchitecture {
                id: key.to_string(),
                available: self.ids(),
            })
    }

    pub fn ids(&self) -> Vec<String> {
        self.models.iter().map(|m| m.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelArchitecture> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
