//! Required memory bandwidth for a decode workload

use super::experts::expected_unique_experts;
use super::interpolation::CurvePoint;
use crate::config::QueryContext;
use crate::error::Result;
use crate::model::{ModelArchitecture, ModelArchitectureRegistry};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where a demand value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandSource {
    /// Benchmarked batch size
    Knot,
    /// Between two benchmarked batch sizes
    Interpolated,
    /// Outside the benchmarked range, nearest end value reused
    HeldFlat,
    /// No reference curve for the scenario
    ClosedForm,
}

impl From<CurvePoint> for DemandSource {
    fn from(point: CurvePoint) -> Self {
        match point {
            CurvePoint::Knot => DemandSource::Knot,
            CurvePoint::Interpolated => DemandSource::Interpolated,
            CurvePoint::HeldFlat => DemandSource::HeldFlat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandEstimate {
    pub required_bandwidth_gbs: f64,
    pub active_param_gb: f64,
    pub kv_cache_gb: f64,
    pub unique_experts: f64,
    pub source: DemandSource,
}

/// Bandwidth needed to meet `ctx.slo_ms` per output token.
///
/// Reference curves are measured at 100 ms TPOT, so curve values are scaled
/// by `100 / slo_ms`. Without a curve for the scenario the closed form
/// `(active weights + KV cache) / slo` is used.
pub fn estimate(arch: &ModelArchitecture, ctx: &QueryContext) -> Result<DemandEstimate> {
    ctx.validate()?;

    let active_param_gb = arch.active_param_gb();
    let kv_cache_gb = arch.kv_cache_gb(ctx.seq_len(), ctx.batch_size);
    let unique_experts = expected_unique_experts(arch.num_experts, arch.top_k, ctx.batch_size);

    let (required_bandwidth_gbs, source) = match arch.curve(ctx.scenario) {
        Some(curve) => {
            let (reference, point) = curve.knots.evaluate(ctx.batch_size);
            (reference * ctx.slo_scale(), DemandSource::from(point))
        }
        None => {
            warn!(
                model = %arch.id,
                scenario = %ctx.scenario,
                "no reference curve, using closed-form demand"
            );
            (
                (active_param_gb + kv_cache_gb) / ctx.slo_seconds(),
                DemandSource::ClosedForm,
            )
        }
    };

    debug!(
        model = %arch.id,
        batch_size = ctx.batch_size,
        slo_ms = ctx.slo_ms,
        scenario = %ctx.scenario,
        required_gbs = required_bandwidth_gbs,
        ?source,
        "demand estimate"
    );

    Ok(DemandEstimate {
        required_bandwidth_gbs,
        active_param_gb,
        kv_cache_gb,
        unique_experts,
        source,
    })
}

/// [`estimate`] for a registry key (id or display name)
pub fn estimate_for(
    registry: &ModelArchitectureRegistry,
    model: &str,
    ctx: &QueryContext,
) -> Result<DemandEstimate> {
    estimate(registry.get(model)?, ctx)
}

/// Required bandwidth alone
pub fn required_bandwidth(arch: &ModelArchitecture, ctx: &QueryContext) -> Result<f64> {
    estimate(arch, ctx).map(|e| e.required_bandwidth_gbs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextScenario;
    use crate::error::CapError;

    fn registry() -> &'static ModelArchitectureRegistry {
        ModelArchitectureRegistry::builtin()
    }

    #[test]
    fn test_knot_value_at_reference_slo() {
        let ctx = QueryContext::new(32, ContextScenario::FiveK, 100.0);
        let est = estimate_for(registry(), "deepseek-r1", &ctx).unwrap();
        assert!((est.required_bandwidth_gbs - 6249.4272).abs() < 1e-6);
        assert_eq!(est.source, DemandSource::Knot);
    }

    #[test]
    fn test_halving_slo_doubles_demand() {
        let ctx = QueryContext::new(32, ContextScenario::FiveK, 50.0);
        let est = estimate_for(registry(), "deepseek-r1", &ctx).unwrap();
        assert!((est.required_bandwidth_gbs - 12498.8544).abs() < 1e-6);
    }

    #[test]
    fn test_interpolated_between_knots() {
        let arch = registry().get("deepseek-r1").unwrap();
        let ctx = QueryContext::new(48, ContextScenario::FiveK, 100.0);
        let est = estimate(arch, &ctx).unwrap();
        let expected = (6249.4272 + 7137.446935356214) / 2.0;
        assert!((est.required_bandwidth_gbs - expected).abs() < 1e-6);
        assert_eq!(est.source, DemandSource::Interpolated);
    }

    #[test]
    fn test_held_flat_past_last_knot() {
        let arch = registry().get("deepseek-r1").unwrap();
        let at_128 = estimate(arch, &QueryContext::new(128, ContextScenario::FiveK, 100.0)).unwrap();
        let at_200 = estimate(arch, &QueryContext::new(200, ContextScenario::FiveK, 100.0)).unwrap();
        assert_eq!(at_128.required_bandwidth_gbs, at_200.required_bandwidth_gbs);
        assert_eq!(at_200.source, DemandSource::HeldFlat);
    }

    #[test]
    fn test_closed_form_without_curve() {
        let arch = registry().get("qwen3-30b-a3b").unwrap();
        let ctx = QueryContext::new(4, ContextScenario::FiveK, 100.0);
        let est = estimate(arch, &ctx).unwrap();
        let kv = arch.kv_bytes_per_token / 1e9 * 5000.0 * 4.0;
        let expected = (arch.activated_params_b * arch.bytes_per_param + kv) / 0.1;
        assert!((est.required_bandwidth_gbs - expected).abs() < 1e-9);
        assert_eq!(est.source, DemandSource::ClosedForm);
    }

    #[test]
    fn test_missing_scenario_is_not_borrowed() {
        let arch = registry().get("deepseek-v2-lite").unwrap();
        let five = estimate(arch, &QueryContext::new(32, ContextScenario::FiveK, 100.0)).unwrap();
        let fourteen = estimate(arch, &QueryContext::new(32, ContextScenario::FourteenK, 100.0)).unwrap();
        assert_eq!(five.source, DemandSource::Knot);
        assert_eq!(fourteen.source, DemandSource::ClosedForm);
    }

    #[test]
    fn test_invalid_queries() {
        let arch = registry().get("mixtral-8x7b").unwrap();
        let err = estimate(arch, &QueryContext::new(0, ContextScenario::FiveK, 100.0)).unwrap_err();
        assert!(matches!(err, CapError::InvalidBatchSize(0)));

        let err = estimate(arch, &QueryContext::new(1, ContextScenario::FiveK, 0.0)).unwrap_err();
        assert!(err.is_invalid_input());

        let err = estimate_for(registry(), "nope", &QueryContext::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_side_quantities() {
        let arch = registry().get("deepseek-r1").unwrap();
        let est = estimate(arch, &QueryContext::new(1, ContextScenario::FiveK, 100.0)).unwrap();
        assert_eq!(est.unique_experts, 8.0);
        assert!((est.active_param_gb - arch.activated_params_b * arch.bytes_per_param).abs() < 1e-9);
        assert!(est.kv_cache_gb > 0.0);
    }
}
