use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Data file locations. `None` selects the tables compiled into the crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    pub models_file: Option<String>,
    pub hardware_file: Option<String>,
}

impl PathConfig {
    pub fn models_path(&self) -> Option<PathBuf> {
        self.models_file.as_ref().map(PathBuf::from)
    }

    pub fn hardware_path(&self) -> Option<PathBuf> {
        self.hardware_file.as_ref().map(PathBuf::from)
    }
}
