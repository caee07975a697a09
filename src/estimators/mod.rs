//! Analytical estimators over a model architecture and a query context

pub mod demand;
pub mod dense;
pub mod experts;
pub mod interpolation;
pub mod tpot;
pub mod ttft;

pub use demand::{estimate, estimate_for, required_bandwidth, DemandEstimate, DemandSource};
pub use dense::{closest_batch_size_to_dense, dense_bandwidth, sweep_batch_sizes, DenseBaseline};
pub use experts::{expected_unique_experts, independent_draw_estimate};
pub use interpolation::{CurvePoint, Knot, KnotCurve};
pub use tpot::{project_tpot_ms, tpot_on_device};
pub use ttft::{ttft, ttft_ms, Bottleneck, TtftEstimate};
