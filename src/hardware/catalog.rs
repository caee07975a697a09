//! Hardware catalog
//!
//! Device order follows the data file so listings stay stable.

use super::profiles::{DeviceCategory, DeviceProfile};
use crate::error::{CapError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const HARDWARE_SCHEMA_VERSION: u32 = 1;

static BUILTIN_HARDWARE: Lazy<HardwareCatalog> = Lazy::new(|| {
    HardwareCatalog::from_json_str(include_str!("../../data/hardware.json"))
        .expect("bundled data/hardware.json must be valid")
});

#[derive(Debug, Serialize, Deserialize)]
struct HardwareFile {
    schema_version: u32,
    devices: Vec<DeviceProfile>,
}

#[derive(Debug, Clone)]
pub struct HardwareCatalog {
    devices: Vec<DeviceProfile>,
    index: HashMap<String, usize>,
}

impl HardwareCatalog {
    pub fn builtin() -> &'static Self {
        &BUILTIN_HARDWARE
    }

    pub fn new(devices: Vec<DeviceProfile>) -> Result<Self> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, device) in devices.iter().enumerate() {
            device.validate()?;
            if index.insert(device.name.to_lowercase(), i).is_some() {
                return Err(CapError::invalid_data(
                    device.name.as_str(),
                    "name",
                    "appears more than once",
                ));
            }
        }
        Ok(Self { devices, index })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: HardwareFile = serde_json::from_str(json)?;
        if file.schema_version != HARDWARE_SCHEMA_VERSION {
            return Err(CapError::SchemaVersion {
                kind: "hardware",
                found: file.schema_version,
                expected: HARDWARE_SCHEMA_VERSION,
            });
        }
        Self::new(file.devices)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.as_ref().display(),
            devices = catalog.len(),
            "loaded hardware catalog"
        );
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Result<&DeviceProfile> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.devices[i])
            .ok_or_else(|| CapError::UnknownDevice {
                name: name.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceProfile> {
        self.devices.iter()
    }

    pub fn in_category(&self, category: DeviceCategory) -> impl Iterator<Item = &DeviceProfile> {
        self.devices.iter().filter(move |d| d.category == category)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
