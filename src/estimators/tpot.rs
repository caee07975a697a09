//! Projected time per output token on a given bandwidth

use super::demand;
use crate::config::{QueryContext, REFERENCE_TPOT_MS};
use crate::error::{CapError, Result};
use crate::hardware::DeviceProfile;
use crate::model::ModelArchitecture;

/// `100 * (required_at_100ms / device_bandwidth) / calibration`
pub fn project_tpot_ms(arch: &ModelArchitecture, required_at_reference_gbs: f64, device_bandwidth_gbs: f64) -> Result<f64> {
    if !device_bandwidth_gbs.is_finite() || device_bandwidth_gbs <= 0.0 {
        return Err(CapError::InvalidSupply(format!(
            "device bandwidth must be positive, got {}",
            device_bandwidth_gbs
        )));
    }
    Ok(REFERENCE_TPOT_MS * (required_at_reference_gbs / device_bandwidth_gbs) / arch.tpot_calibration)
}

/// TPOT on `device` for the batch and scenario of `ctx`; the SLO in `ctx` is ignored
pub fn tpot_on_device(arch: &ModelArchitecture, device: &DeviceProfile, ctx: &QueryContext) -> Result<f64> {
    let reference = demand::required_bandwidth(arch, &ctx.with_slo_ms(REFERENCE_TPOT_MS))?;
    project_tpot_ms(arch, reference, device.peak_bandwidth_gbs)
}
