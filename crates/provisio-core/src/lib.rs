//! Provisio capability contract
//!
//! This crate defines the plugin interface between the Provisio lifecycle
//! engine and independently developed infrastructure capabilities, plus the
//! data model that flows through a run: context in, plan out, result back.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 Provisio CLI                     │
//! │            (provisio plan/deploy)                │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │              provisio-engine                     │
//! │   validate → plan → approve → execute → rollback │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │  databricks   │ │    (other)    │
//! │  capability   │ │  capabilities │
//! └───────────────┘ └───────────────┘
//! ```
//!
//! Capabilities implement [`Capability`] and are otherwise opaque to the
//! engine: parameter semantics, cost models and the actual provisioning
//! backend all live on the plugin side.

pub mod cancel;
pub mod capability;
pub mod context;
pub mod plan;
pub mod result;

// Re-exports
pub use cancel::CancelToken;
pub use capability::{Capability, Validation};
pub use context::CapabilityContext;
pub use plan::{CapabilityPlan, PlanSummary, ResourceSpec};
pub use result::CapabilityResult;
