use serde::{Deserialize, Serialize};

/// Bandwidth-utilization fraction (percent) observed across the MoE-CAP runs
pub const DEFAULT_SMBU_PERCENT: f64 = 16.33;

/// Supply-side settings: how many devices serve the model and how much of
/// their raw peak bandwidth is realistically achievable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyConfig {
    pub device_count: u32,
    pub smbu_percent: f64,
    /// Per-device bandwidth when no catalog device is selected (A6000 default)
    pub device_bandwidth_gbs: f64,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            device_count: 1,
            smbu_percent: DEFAULT_SMBU_PERCENT,
            device_bandwidth_gbs: 768.0,
        }
    }
}
