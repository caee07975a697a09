//! Analytical deployment model for Mixture-of-Experts inference
//!
//! Estimates how much memory bandwidth an MoE model needs to meet a
//! time-per-output-token target, and compares that demand against a
//! catalog of accelerators.
//!
//! ## Overview
//!
//! Demand comes from benchmarked reference curves, measured at a 100 ms
//! TPOT and rescaled to the requested SLO. Models or scenarios without a
//! curve fall back to a closed form over activated weights and KV cache.
//!
//! ## Main Components
//!
//! - `model`: Architecture constants and the model registry
//! - `hardware`: Device catalog and achievable-bandwidth supply
//! - `estimators`: Demand, dense baseline, unique experts, TTFT and TPOT
//! - `comparison`: Per-device sufficiency and assessment rows
//! - `sweep`: Batch-size and input-length sweeps
//! - `config`: Query defaults, supply settings and data-file paths

pub mod comparison;
pub mod config;
pub mod error;
pub mod estimators;
pub mod hardware;
pub mod model;
pub mod sweep;

pub use config::{Config, ContextScenario, QueryContext};
pub use error::CapError;
pub use estimators::{DemandEstimate, DemandSource};
pub use hardware::{DeviceProfile, HardwareCatalog};
pub use model::{ModelArchitecture, ModelArchitectureRegistry};

/// Library errors
pub use error::Result;
