//! Registry error types

use thiserror::Error;

/// Capability registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Capability already registered: {0}")]
    DuplicateCapability(String),

    #[error("Capability '{name}' declares overlapping required/optional parameters: {overlap:?}")]
    OverlappingParameters { name: String, overlap: Vec<String> },

    #[error("Invalid parameters for '{capability}': {}", violations.join("; "))]
    InvalidParameters {
        capability: String,
        violations: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
