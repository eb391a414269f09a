//! Lifecycle engine error types

use crate::run::RunState;
use provisio_registry::RegistryError;
use thiserror::Error;

/// Lifecycle engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Unknown capability, duplicate registration or parameter-shape
    /// violations, all detected before any plugin code runs
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Capability entry '{entry}' registered with instance named '{instance}'")]
    NameMismatch { entry: String, instance: String },

    /// Capability-specific validation reported problems; every problem is
    /// carried, not just the first
    #[error("Validation failed for '{capability}': {}", problems.join("; "))]
    ValidationFailed {
        capability: String,
        problems: Vec<String>,
    },

    #[error("Planning failed for '{capability}': {source}")]
    PlanningFailed {
        capability: String,
        #[source]
        source: anyhow::Error,
    },

    /// Execution reported `success = false`; carries the result's error
    /// verbatim. Produced only by [`RunOutcome::into_result`] — the run
    /// itself always yields the full structured outcome.
    #[error("Execution failed for '{capability}': {error}")]
    ExecutionFailed { capability: String, error: String },

    #[error("Plan for '{capability}' requires approval")]
    ApprovalRequired { capability: String },

    #[error("Run cancelled before execution started")]
    Cancelled,

    #[error("Operation '{operation}' is not valid in state {state}")]
    InvalidTransition {
        operation: &'static str,
        state: RunState,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
