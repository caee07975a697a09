//! Dense (all experts active) bandwidth baseline

use super::demand;
use crate::config::QueryContext;
use crate::error::Result;
use crate::model::ModelArchitecture;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_SWEEP_BATCH_SIZE: u32 = 256;

/// Batch sizes scanned by sweeps: every size below 32, every second size
/// below 64, then every fourth up to 256.
pub fn sweep_batch_sizes() -> Vec<u32> {
    let mut sizes = Vec::new();
    let mut batch = 1;
    while batch <= MAX_SWEEP_BATCH_SIZE {
        sizes.push(batch);
        batch += match batch {
            b if b < 32 => 1,
            b if b < 64 => 2,
            _ => 4,
        };
    }
    sizes
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DenseBaseline {
    pub dense_bandwidth_gbs: f64,
    /// Batch size whose MoE demand is nearest the dense bandwidth
    pub closest_batch_size: u32,
}

/// Bandwidth a dense model of the same total size would need at `ctx.slo_ms`
pub fn dense_bandwidth(arch: &ModelArchitecture, ctx: &QueryContext) -> Result<f64> {
    ctx.validate()?;
    let reference = arch
        .curve(ctx.scenario)
        .and_then(|curve| curve.dense_bandwidth_gbs);
    let dense = match reference {
        Some(reference) => reference * ctx.slo_scale(),
        None => {
            let kv_gb = arch.kv_cache_gb(arch.ref_seq_len as u64, 1);
            (arch.total_param_gb() + kv_gb) / ctx.slo_seconds()
        }
    };
    Ok(dense)
}

/// Scan the sweep lattice for the batch size whose demand is closest to the
/// dense bandwidth. Ties keep the smaller batch size.
pub fn closest_batch_size_to_dense(arch: &ModelArchitecture, ctx: &QueryContext) -> Result<DenseBaseline> {
    let dense = dense_bandwidth(arch, ctx)?;

    let mut best: Option<(u32, f64)> = None;
    for batch in sweep_batch_sizes() {
        let required = demand::required_bandwidth(arch, &ctx.with_batch_size(batch))?;
        let gap = (required - dense).abs();
        match best {
            Some((_, best_gap)) if gap >= best_gap => {}
            _ => best = Some((batch, gap)),
        }
    }
    let closest_batch_size = best.map(|(batch, _)| batch).unwrap_or(1);

    debug!(
        model = %arch.id,
        scenario = %ctx.scenario,
        dense_gbs = dense,
        closest_batch_size,
        "dense baseline"
    );

    Ok(DenseBaseline {
        dense_bandwidth_gbs: dense,
        closest_batch_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextScenario;
    use crate::model::ModelArchitectureRegistry;

    #[test]
    fn test_sweep_lattice() {
        let sizes = sweep_batch_sizes();
        assert_eq!(sizes[0], 1);
        assert_eq!(&sizes[30..34], &[31, 32, 34, 36]);
        assert!(sizes.contains(&64));
        assert!(sizes.contains(&128));
        assert_eq!(*sizes.last().unwrap(), 256);
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_dense_scales_with_slo() {
        let arch = ModelArchitectureRegistry::builtin().get("mixtral-8x7b").unwrap();
        let at_100 = dense_bandwidth(arch, &QueryContext::new(1, ContextScenario::FiveK, 100.0)).unwrap();
        let at_200 = dense_bandwidth(arch, &QueryContext::new(1, ContextScenario::FiveK, 200.0)).unwrap();
        assert!((at_100 - 946.5536).abs() < 1e-9);
        assert!((at_100 - 2.0 * at_200).abs() < 1e-9);
    }

    #[test]
    fn test_dense_fallback_without_curve() {
        let arch = ModelArchitectureRegistry::builtin().get("qwen3-30b-a3b").unwrap();
        let dense = dense_bandwidth(arch, &QueryContext::default()).unwrap();
        let expected = (30.0 * 2.0 + 98304.0 / 1e9 * 5000.0) / 0.1;
        assert!((dense - expected).abs() < 1e-9);
    }

    #[test]
    fn test_closest_batch_matches_dense() {
        let arch = ModelArchitectureRegistry::builtin().get("mixtral-8x7b").unwrap();
        let ctx = QueryContext::default();
        let baseline = closest_batch_size_to_dense(arch, &ctx).unwrap();
        let at_closest = demand::required_bandwidth(arch, &ctx.with_batch_size(baseline.closest_batch_size)).unwrap();
        let rel = (at_closest - baseline.dense_bandwidth_gbs).abs() / baseline.dense_bandwidth_gbs;
        assert!(rel <= 0.05, "relative gap {}", rel);
        assert!((32..=36).contains(&baseline.closest_batch_size));
    }
}
