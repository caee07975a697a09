//! Supply-side bandwidth: what a deployment can realistically deliver

use crate::config::SupplyConfig;
use crate::error::{CapError, Result};

/// `peak x device_count x S-MBU`, in GB/s
pub fn achievable_bandwidth(peak_bandwidth_gbs: f64, device_count: u32, smbu_percent: f64) -> Result<f64> {
    if device_count == 0 {
        return Err(CapError::InvalidSupply("device_count must be >= 1".to_string()));
    }
    if !smbu_percent.is_finite() || smbu_percent <= 0.0 || smbu_percent > 100.0 {
        return Err(CapError::InvalidSupply(format!(
            "smbu_percent must be in (0, 100], got {}",
            smbu_percent
        )));
    }
    if !peak_bandwidth_gbs.is_finite() || peak_bandwidth_gbs <= 0.0 {
        return Err(CapError::InvalidSupply(format!(
            "peak bandwidth must be positive, got {}",
            peak_bandwidth_gbs
        )));
    }
    Ok(peak_bandwidth_gbs * device_count as f64 * smbu_percent / 100.0)
}

impl SupplyConfig {
    /// Achievable bandwidth of the configured deployment
    pub fn achievable_bandwidth(&self) -> Result<f64> {
        achievable_bandwidth(self.device_bandwidth_gbs, self.device_count, self.smbu_percent)
    }

    /// Same supply settings applied to a different per-device peak
    pub fn achievable_for(&self, peak_bandwidth_gbs: f64) -> Result<f64> {
        achievable_bandwidth(peak_bandwidth_gbs, self.device_count, self.smbu_percent)
    }
}
