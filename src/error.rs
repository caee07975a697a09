//! Error taxonomy for the analytical model
//!
//! Configuration errors are data or programmer errors (unknown keys, broken
//! data files) and fail fast. Invalid-input errors reject a query before any
//! computation. A device that lacks compute data is not an error at all: it
//! surfaces as `None` from the TTFT estimator.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CapError>;

#[derive(Error, Debug)]
pub enum CapError {
    #[error("unknown model architecture: {id}. Available: {available:?}")]
    UnknownArchitecture { id: String, available: Vec<String> },

    #[error("unknown device: {name}")]
    UnknownDevice { name: String },

    #[error("invalid data for {entry}: {field} {reason}")]
    InvalidData {
        entry: String,
        field: String,
        reason: String,
    },

    #[error("unsupported {kind} schema version {found}, expected {expected}")]
    SchemaVersion {
        kind: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse data file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("batch_size must be >= 1, got {0}")]
    InvalidBatchSize(u32),

    #[error("input_len must be >= 1, got {0}")]
    InvalidInputLen(u32),

    #[error("slo_ms must be a positive finite number, got {0}")]
    InvalidSlo(f64),

    #[error("invalid supply setting: {0}")]
    InvalidSupply(String),
}

impl CapError {
    pub(crate) fn invalid_data(
        entry: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CapError::InvalidData {
            entry: entry.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for unknown keys and broken data files.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CapError::UnknownArchitecture { .. }
                | CapError::UnknownDevice { .. }
                | CapError::InvalidData { .. }
                | CapError::SchemaVersion { .. }
                | CapError::Io(_)
                | CapError::Json(_)
        )
    }

    /// True for query values rejected before computation.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CapError::InvalidBatchSize(_)
                | CapError::InvalidInputLen(_)
                | CapError::InvalidSlo(_)
                | CapError::InvalidSupply(_)
        )
    }
}
