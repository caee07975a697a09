pub mod architecture;
pub mod registry;

pub use architecture::{ModelArchitecture, ReferenceCurve};
pub use registry::{ModelArchitectureRegistry, MODELS_SCHEMA_VERSION};
