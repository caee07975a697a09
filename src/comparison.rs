//! Device classification against a demand estimate

use crate::config::QueryContext;
use crate::error::Result;
use crate::estimators::{demand, tpot, ttft, TtftEstimate};
use crate::hardware::{BandwidthKind, DeviceCategory, DeviceProfile, HardwareCatalog};
use crate::model::ModelArchitecture;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sufficiency {
    Sufficient,
    Insufficient,
}

impl Sufficiency {
    pub fn is_sufficient(self) -> bool {
        self == Sufficiency::Sufficient
    }

    fn from_bandwidth(available: f64, required: f64) -> Self {
        if available >= required {
            Sufficiency::Sufficient
        } else {
            Sufficiency::Insufficient
        }
    }
}

impl fmt::Display for Sufficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sufficiency::Sufficient => f.write_str("sufficient"),
            Sufficiency::Insufficient => f.write_str("insufficient"),
        }
    }
}

/// Peak memory bandwidth against the requirement
pub fn classify(device: &DeviceProfile, required_gbs: f64) -> Sufficiency {
    Sufficiency::from_bandwidth(device.peak_bandwidth_gbs, required_gbs)
}

/// Offload link bandwidth against the requirement, if the device has one
pub fn classify_offload(device: &DeviceProfile, required_gbs: f64) -> Option<Sufficiency> {
    device
        .bandwidth(BandwidthKind::Offload)
        .map(|pcie| Sufficiency::from_bandwidth(pcie, required_gbs))
}

/// Devices matching `predicate`, in catalog order
pub fn filter_devices<'a, F>(catalog: &'a HardwareCatalog, mut predicate: F) -> Vec<&'a DeviceProfile>
where
    F: FnMut(&DeviceProfile) -> bool,
{
    catalog.iter().filter(|d| predicate(d)).collect()
}

/// One row of a per-device comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAssessment {
    pub device: String,
    pub category: DeviceCategory,
    pub peak_bandwidth_gbs: f64,
    pub required_bandwidth_gbs: f64,
    pub sufficiency: Sufficiency,
    pub offload_sufficiency: Option<Sufficiency>,
    /// Projected TPOT at the query's batch size, in ms
    pub tpot_ms: f64,
    pub ttft: Option<TtftEstimate>,
    /// Whether weights plus KV cache fit in device memory; `None` when memory is unknown
    pub weights_fit: Option<bool>,
}

impl DeviceAssessment {
    pub fn ttft_ms(&self) -> Option<f64> {
        self.ttft.map(|t| t.ttft_ms)
    }
}

/// Assess every catalog device for `arch` under `ctx`
pub fn assess(catalog: &HardwareCatalog, arch: &ModelArchitecture, ctx: &QueryContext) -> Result<Vec<DeviceAssessment>> {
    let estimate = demand::estimate(arch, ctx)?;
    let required = estimate.required_bandwidth_gbs;
    let footprint_gb = arch.total_param_gb() + estimate.kv_cache_gb;

    let mut rows = Vec::with_capacity(catalog.len());
    for device in catalog.iter() {
        let row = DeviceAssessment {
            device: device.name.clone(),
            category: device.category,
            peak_bandwidth_gbs: device.peak_bandwidth_gbs,
            required_bandwidth_gbs: required,
            sufficiency: classify(device, required),
            offload_sufficiency: classify_offload(device, required),
            tpot_ms: tpot::tpot_on_device(arch, device, ctx)?,
            ttft: ttft::ttft(device, arch, ctx.batch_size, ctx.input_len)?,
            weights_fit: device.memory_gb.map(|memory| footprint_gb <= memory),
        };
        rows.push(row);
    }

    debug!(
        model = %arch.id,
        devices = rows.len(),
        sufficient = rows.iter().filter(|r| r.sufficiency.is_sufficient()).count(),
        "device assessment"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextScenario;
    use crate::model::ModelArchitectureRegistry;

    #[test]
    fn test_classify_boundary_is_sufficient() {
        let device = HardwareCatalog::builtin().get("A6000").unwrap();
        assert_eq!(classify(device, 768.0), Sufficiency::Sufficient);
        assert_eq!(classify(device, 768.1), Sufficiency::Insufficient);
    }

    #[test]
    fn test_offload_absent_without_pcie() {
        let catalog = HardwareCatalog::builtin();
        assert_eq!(classify_offload(catalog.get("Apple M4 Max").unwrap(), 10.0), None);
        assert_eq!(
            classify_offload(catalog.get("A6000").unwrap(), 10.0),
            Some(Sufficiency::Sufficient)
        );
    }

    #[test]
    fn test_filter_by_category() {
        let soc = filter_devices(HardwareCatalog::builtin(), |d| d.category == DeviceCategory::Soc);
        assert_eq!(soc.len(), 4);
    }

    #[test]
    fn test_assess_covers_catalog() {
        let catalog = HardwareCatalog::builtin();
        let arch = ModelArchitectureRegistry::builtin().get("deepseek-r1").unwrap();
        let ctx = QueryContext::new(32, ContextScenario::FiveK, 100.0);
        let rows = assess(catalog, arch, &ctx).unwrap();
        assert_eq!(rows.len(), catalog.len());

        let dgx = rows.iter().find(|r| r.device == "DGX-H100").unwrap();
        assert!(dgx.sufficiency.is_sufficient());
        assert!(dgx.ttft.is_some());

        let mi300x = rows.iter().find(|r| r.device == "AMD MI300X").unwrap();
        assert!(mi300x.ttft_ms().is_none());

        let a6000 = rows.iter().find(|r| r.device == "A6000").unwrap();
        assert_eq!(a6000.sufficiency, Sufficiency::Insufficient);
        assert_eq!(a6000.weights_fit, Some(false));
    }
}
