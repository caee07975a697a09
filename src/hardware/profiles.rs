//! Device profiles: bandwidth, power, memory and compute specs

use crate::error::{CapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceCategory {
    DataCenterCard,
    DataCenterSystem,
    Personal,
    Autonomous,
    Soc,
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeviceCategory::DataCenterCard => "Data Center Cards",
            DeviceCategory::DataCenterSystem => "Data Center Systems",
            DeviceCategory::Personal => "Personal",
            DeviceCategory::Autonomous => "Autonomous",
            DeviceCategory::Soc => "SoC",
        };
        f.write_str(label)
    }
}

/// Which link a workload is streamed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandwidthKind {
    /// HBM/GDDR/unified memory: weights fit on the device
    Peak,
    /// PCIe/NVLink: weights are offloaded and streamed in
    Offload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub name: String,
    pub category: DeviceCategory,
    pub peak_bandwidth_gbs: f64,
    #[serde(default)]
    pub pcie_bandwidth_gbs: Option<f64>,
    pub power_watts: f64,
    #[serde(default)]
    pub memory_gb: Option<f64>,
    /// Absent for devices without published compute throughput
    #[serde(default)]
    pub peak_gflops: Option<f64>,
}

impl DeviceProfile {
    pub fn bandwidth(&self, kind: BandwidthKind) -> Option<f64> {
        match kind {
            BandwidthKind::Peak => Some(self.peak_bandwidth_gbs),
            BandwidthKind::Offload => self.pcie_bandwidth_gbs,
        }
    }

    pub fn has_compute_data(&self) -> bool {
        self.peak_gflops.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        let entry = self.name.as_str();
        if self.name.trim().is_empty() {
            return Err(CapError::invalid_data("<unnamed device>", "name", "must not be empty"));
        }
        let required = [
            ("peak_bandwidth_gbs", Some(self.peak_bandwidth_gbs)),
            ("power_watts", Some(self.power_watts)),
            ("pcie_bandwidth_gbs", self.pcie_bandwidth_gbs),
            ("memory_gb", self.memory_gb),
            ("peak_gflops", self.peak_gflops),
        ];
        for (field, value) in required {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(CapError::invalid_data(
                        entry,
                        field,
                        format!("must be positive and finite, got {}", value),
                    ));
                }
            }
        }
        Ok(())
    }
}
