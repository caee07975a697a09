use moe_cap::config::{ContextScenario, QueryContext};
use moe_cap::estimators::{self, expected_unique_experts};
use moe_cap::ModelArchitectureRegistry;
use proptest::prelude::*;

fn model_ids() -> impl Strategy<Value = String> {
    prop::sample::select(ModelArchitectureRegistry::builtin().ids())
}

fn scenarios() -> impl Strategy<Value = ContextScenario> {
    prop::sample::select(ContextScenario::ALL.to_vec())
}

proptest! {
    /// Property: demand never decreases as the batch grows
    #[test]
    fn prop_demand_monotonic_in_batch(
        model in model_ids(),
        scenario in scenarios(),
        batch in 1u32..512,
        step in 1u32..64,
    ) {
        let arch = ModelArchitectureRegistry::builtin().get(&model).unwrap();
        let small = estimators::required_bandwidth(arch, &QueryContext::new(batch, scenario, 100.0)).unwrap();
        let large = estimators::required_bandwidth(arch, &QueryContext::new(batch + step, scenario, 100.0)).unwrap();
        prop_assert!(small <= large, "{} {}: {} > {}", model, scenario, small, large);
    }

    /// Property: demand x SLO is invariant
    #[test]
    fn prop_demand_inverse_in_slo(
        model in model_ids(),
        scenario in scenarios(),
        batch in 1u32..256,
        slo in 1.0f64..1000.0,
    ) {
        let arch = ModelArchitectureRegistry::builtin().get(&model).unwrap();
        let ctx = QueryContext::new(batch, scenario, 100.0);
        let reference = estimators::required_bandwidth(arch, &ctx).unwrap();
        let scaled = estimators::required_bandwidth(arch, &ctx.with_slo_ms(slo)).unwrap();
        prop_assert!((scaled * slo - reference * 100.0).abs() <= 1e-9 * reference * 100.0);
    }

    /// Property: unique experts stay within [min(k, E), E]
    #[test]
    fn prop_unique_experts_bounded(
        num_experts in 1u32..512,
        top_k in 1u32..16,
        batch in 1u32..1024,
    ) {
        let top_k = top_k.min(num_experts);
        let value = expected_unique_experts(num_experts, top_k, batch);
        prop_assert!(value >= top_k as f64 - 1e-12);
        prop_assert!(value <= num_experts as f64 + 1e-12);
    }

    /// Property: identical queries give identical estimates
    #[test]
    fn prop_estimate_deterministic(model in model_ids(), batch in 1u32..300, slo in 5.0f64..300.0) {
        let arch = ModelArchitectureRegistry::builtin().get(&model).unwrap();
        let ctx = QueryContext::new(batch, ContextScenario::FiveK, slo);
        prop_assert_eq!(estimators::estimate(arch, &ctx).unwrap(), estimators::estimate(arch, &ctx).unwrap());
    }
}
