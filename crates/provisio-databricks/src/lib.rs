//! Azure Databricks provisioning capability
//!
//! Implements the Provisio [`Capability`](provisio_core::Capability)
//! contract for Azure Databricks: a plan covers a resource group, a
//! workspace and a compute cluster, sized and priced from the team's
//! environment and workload type.
//!
//! Actual resource creation goes through the [`CloudBackend`] seam. The
//! in-memory backend in this crate tracks resource existence for local use
//! and tests; a real Azure implementation plugs in behind the same trait.

pub mod backend;
pub mod capability;
pub mod decision;

pub use backend::{BackendError, CloudBackend, InMemoryBackend};
pub use capability::DatabricksCapability;
pub use decision::{ClusterDecision, Decision};
