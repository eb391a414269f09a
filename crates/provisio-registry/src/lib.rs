//! Capability registry
//!
//! The registry is the source of truth for which capabilities exist and what
//! parameters they accept. It is populated once at process start and
//! read-only during request handling; the engine consults it for discovery
//! and for pre-flight parameter validation before any plugin code runs.

pub mod entry;
pub mod error;
pub mod registry;

pub use entry::CapabilityEntry;
pub use error::{RegistryError, Result};
pub use registry::CapabilityRegistry;
