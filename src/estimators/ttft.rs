//! Time to first token: prefill bounded by compute or by KV writes

use crate::error::{CapError, Result};
use crate::hardware::DeviceProfile;
use crate::model::ModelArchitecture;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bottleneck {
    Compute,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TtftEstimate {
    pub ttft_ms: f64,
    pub compute_time_s: f64,
    pub memory_time_s: f64,
    pub total_compute_gflops: f64,
    pub total_kv_gib: f64,
    pub bottleneck: Bottleneck,
}

/// Prefill latency for `batch_size` prompts of `input_len` tokens.
///
/// `Ok(None)` when the device has no published peak GFLOPS. Empty batches
/// and empty prompts are rejected before any computation.
pub fn ttft(
    device: &DeviceProfile,
    arch: &ModelArchitecture,
    batch_size: u32,
    input_len: u32,
) -> Result<Option<TtftEstimate>> {
    if batch_size < 1 {
        return Err(CapError::InvalidBatchSize(batch_size));
    }
    if input_len < 1 {
        return Err(CapError::InvalidInputLen(input_len));
    }
    let Some(peak_gflops) = device.peak_gflops else {
        return Ok(None);
    };
    let tokens = batch_size as f64 * input_len as f64;

    let total_compute_gflops = tokens * arch.per_token_gflops;
    let total_kv_gib = tokens * arch.per_token_kv_gib();
    let compute_time_s = total_compute_gflops / peak_gflops;
    let memory_time_s = total_kv_gib / device.peak_bandwidth_gbs;

    let bottleneck = if compute_time_s > memory_time_s {
        Bottleneck::Compute
    } else {
        Bottleneck::Memory
    };

    Ok(Some(TtftEstimate {
        ttft_ms: 1000.0 * compute_time_s.max(memory_time_s),
        compute_time_s,
        memory_time_s,
        total_compute_gflops,
        total_kv_gib,
        bottleneck,
    }))
}

pub fn ttft_ms(
    device: &DeviceProfile,
    arch: &ModelArchitecture,
    batch_size: u32,
    input_len: u32,
) -> Result<Option<f64>> {
    Ok(ttft(device, arch, batch_size, input_len)?.map(|e| e.ttft_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::HardwareCatalog;
    use crate::model::ModelArchitectureRegistry;

    #[test]
    fn test_compute_bound_on_h100() {
        let device = HardwareCatalog::builtin().get("H100-SXM").unwrap();
        let arch = ModelArchitectureRegistry::builtin().get("deepseek-r1").unwrap();
        let est = ttft(device, arch, 1, 4000).unwrap().unwrap();

        // 4000 tokens x 74 GFLOPs / 990 TFLOPS
        let compute = 4000.0 * 74.0 / 9.9e5;
        assert!((est.compute_time_s - compute).abs() < 1e-12);
        assert_eq!(est.bottleneck, Bottleneck::Compute);
        assert!((est.ttft_ms - 1000.0 * compute).abs() < 1e-9);
    }

    #[test]
    fn test_absent_without_compute_data() {
        let device = HardwareCatalog::builtin().get("AMD MI300X").unwrap();
        let arch = ModelArchitectureRegistry::builtin().get("mixtral-8x7b").unwrap();
        assert!(ttft(device, arch, 1, 4000).unwrap().is_none());
        assert!(ttft_ms(device, arch, 1, 4000).unwrap().is_none());
    }

    #[test]
    fn test_scales_linearly_with_batch() {
        let device = HardwareCatalog::builtin().get("A6000").unwrap();
        let arch = ModelArchitectureRegistry::builtin().get("mixtral-8x22b").unwrap();
        let one = ttft_ms(device, arch, 1, 2000).unwrap().unwrap();
        let four = ttft_ms(device, arch, 4, 2000).unwrap().unwrap();
        assert!((four - 4.0 * one).abs() < 1e-9);
    }

    #[test]
    fn test_empty_batch_or_prompt_rejected() {
        let device = HardwareCatalog::builtin().get("H100-SXM").unwrap();
        let arch = ModelArchitectureRegistry::builtin().get("deepseek-r1").unwrap();

        let err = ttft_ms(device, arch, 0, 4000).unwrap_err();
        assert!(matches!(err, CapError::InvalidBatchSize(0)));
        assert!(err.is_invalid_input());

        let err = ttft_ms(device, arch, 1, 0).unwrap_err();
        assert!(matches!(err, CapError::InvalidInputLen(0)));
        assert!(err.is_invalid_input());

        // Rejected even where the estimate would be absent anyway
        let mi300x = HardwareCatalog::builtin().get("AMD MI300X").unwrap();
        assert!(ttft(mi300x, arch, 0, 4000).is_err());
    }
}
