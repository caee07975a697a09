pub mod catalog;
pub mod profiles;
pub mod supply;

pub use catalog::{HardwareCatalog, HARDWARE_SCHEMA_VERSION};
pub use profiles::{BandwidthKind, DeviceCategory, DeviceProfile};
pub use supply::achievable_bandwidth;
