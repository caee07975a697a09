//! Batch-size and input-length sweeps

use crate::config::{QueryContext, SupplyConfig};
use crate::error::Result;
use crate::estimators::{demand, sweep_batch_sizes, ttft, TtftEstimate};
use crate::hardware::{DeviceProfile, HardwareCatalog};
use crate::model::{ModelArchitecture, ModelArchitectureRegistry};
use serde::{Deserialize, Serialize};

/// Input lengths used for TTFT sweeps when none are given
pub const DEFAULT_TTFT_INPUT_LENS: [u32; 6] = [512, 1000, 2000, 4000, 8000, 13000];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandSweepRow {
    pub batch_size: u32,
    pub required_bandwidth_gbs: f64,
    pub unique_experts: f64,
    pub achievable_bandwidth_gbs: f64,
}

impl DemandSweepRow {
    pub fn meets_demand(&self) -> bool {
        self.achievable_bandwidth_gbs >= self.required_bandwidth_gbs
    }
}

/// Demand at every batch size of the sweep lattice, next to the supply
pub fn demand_sweep(
    arch: &ModelArchitecture,
    ctx: &QueryContext,
    supply: &SupplyConfig,
) -> Result<Vec<DemandSweepRow>> {
    let achievable = supply.achievable_bandwidth()?;
    sweep_batch_sizes()
        .into_iter()
        .map(|batch_size| {
            let estimate = demand::estimate(arch, &ctx.with_batch_size(batch_size))?;
            Ok(DemandSweepRow {
                batch_size,
                required_bandwidth_gbs: estimate.required_bandwidth_gbs,
                unique_experts: estimate.unique_experts,
                achievable_bandwidth_gbs: achievable,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TtftSweepPoint {
    pub input_len: u32,
    pub estimate: Option<TtftEstimate>,
}

pub fn ttft_sweep(
    device: &DeviceProfile,
    arch: &ModelArchitecture,
    input_lens: &[u32],
    batch_size: u32,
) -> Result<Vec<TtftSweepPoint>> {
    input_lens
        .iter()
        .map(|&input_len| {
            Ok(TtftSweepPoint {
                input_len,
                estimate: ttft::ttft(device, arch, batch_size, input_len)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtftTableRow {
    pub device: String,
    pub model: String,
    pub estimate: Option<TtftEstimate>,
}

/// Every (device, model) pair; rows for devices without compute data stay
/// in the table with no estimate
pub fn ttft_table(
    catalog: &HardwareCatalog,
    registry: &ModelArchitectureRegistry,
    input_len: u32,
    batch_size: u32,
) -> Result<Vec<TtftTableRow>> {
    let mut rows = Vec::with_capacity(catalog.len() * registry.len());
    for device in catalog.iter() {
        for arch in registry.iter() {
            rows.push(TtftTableRow {
                device: device.name.clone(),
                model: arch.id.clone(),
                estimate: ttft::ttft(device, arch, batch_size, input_len)?,
            });
        }
    }
    Ok(rows)
}
