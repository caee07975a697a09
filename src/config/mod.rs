pub mod paths;
pub mod query;
pub mod supply;

use crate::model::ModelArchitectureRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub use paths::PathConfig;
pub use query::{
    ContextScenario, QueryConfig, QueryContext, BATCH_SIZE_PRESETS, REFERENCE_TPOT_MS,
    SLO_PRESETS_MS,
};
pub use supply::{SupplyConfig, DEFAULT_SMBU_PERCENT};

/// Main configuration for a MoE-CAP evaluation session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub query: QueryConfig,
    pub supply: SupplyConfig,
    pub paths: PathConfig,
}

impl Config {
    /// Defaults with the query pointed at a registered architecture
    pub fn for_model(model_id: &str) -> crate::Result<Self> {
        let architecture = ModelArchitectureRegistry::builtin().get(model_id)?;
        Ok(Self {
            query: QueryConfig {
                model: architecture.id.clone(),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded config");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }

    pub fn from_dict(data: HashMap<String, serde_json::Value>) -> crate::Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = data.into_iter().collect();
        Ok(serde_json::from_value(serde_json::Value::Object(map))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.query.model, "deepseek-r1");
        assert_eq!(config.query.slo_ms, 100.0);
        assert_eq!(config.supply.device_count, 1);
        assert!((config.supply.smbu_percent - 16.33).abs() < 1e-9);
        assert!(config.paths.models_file.is_none());
    }

    #[test]
    fn test_config_for_model_resolves_display_name() {
        let config = Config::for_model("Mixtral-8x7B").unwrap();
        assert_eq!(config.query.model, "mixtral-8x7b");
        assert!(Config::for_model("llama-8b").is_err());
    }

    #[test]
    fn test_config_dict_round_trip() {
        let mut config = Config::default();
        config.query.scenario = ContextScenario::FourteenK;
        config.supply.device_count = 8;

        let dict = config.to_dict();
        assert!(dict.contains_key("query"));
        assert!(dict.contains_key("supply"));

        let restored = Config::from_dict(dict).unwrap();
        assert_eq!(restored.query.scenario, ContextScenario::FourteenK);
        assert_eq!(restored.supply.device_count, 8);
    }
}
