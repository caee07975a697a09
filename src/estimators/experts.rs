//! Expected number of distinct experts touched by a decode batch

/// Expected distinct experts under independent draws with replacement:
/// `E * (1 - (1 - 1/E)^(b * k))`.
pub fn independent_draw_estimate(num_experts: u32, top_k: u32, batch_size: u32) -> f64 {
    if num_experts == 0 || top_k == 0 || batch_size == 0 {
        return 0.0;
    }
    let e = num_experts as f64;
    let draws = batch_size as f64 * top_k as f64;
    e * (1.0 - (1.0 - 1.0 / e).powf(draws))
}

/// Expected distinct experts when `batch_size` tokens each route to `top_k`
/// of `num_experts` experts.
///
/// This is [`independent_draw_estimate`] floored at `min(top_k, num_experts)`.
/// The bare formula undercounts small batches because one token never picks
/// the same expert twice: Mixtral (E=8, k=2) at batch 1 gives 1.875 from the
/// formula and 2.0 here. Once `b * k` is large enough for the formula to clear
/// the floor, the two agree exactly.
pub fn expected_unique_experts(num_experts: u32, top_k: u32, batch_size: u32) -> f64 {
    let expected = independent_draw_estimate(num_experts, top_k, batch_size);
    if expected == 0.0 {
        return 0.0;
    }
    expected
        .max(top_k.min(num_experts) as f64)
        .min(num_experts as f64)
}
