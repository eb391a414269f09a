//! Execution result types

use crate::plan::ResourceSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terminal, immutable record of one execution attempt.
///
/// Invariants, enforced by the [`ok`](CapabilityResult::ok) and
/// [`failed`](CapabilityResult::failed) constructors:
///
/// - `success == true` implies `error` is `None` and `resources_created`
///   covers every resource of the originating plan
/// - `success == false` implies `error` is `Some`, while
///   `resources_created` may be a partial prefix of the plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityResult {
    /// Capability that executed
    pub capability_name: String,

    /// Whether the deployment completed
    pub success: bool,

    /// Human-readable outcome summary
    pub message: String,

    /// Resources actually realized, in plan order
    pub resources_created: Vec<ResourceSpec>,

    /// Named artifacts of the deployment (URLs, IDs, connection strings)
    pub outputs: HashMap<String, String>,

    /// Error description, present iff `success` is false
    pub error: Option<String>,

    /// Wall-clock execution time in seconds
    pub duration_seconds: f64,
}

impl CapabilityResult {
    /// Successful result covering all planned resources
    pub fn ok(
        capability_name: impl Into<String>,
        message: impl Into<String>,
        resources_created: Vec<ResourceSpec>,
        duration_seconds: f64,
    ) -> Self {
        Self {
            capability_name: capability_name.into(),
            success: true,
            message: message.into(),
            resources_created,
            outputs: HashMap::new(),
            error: None,
            duration_seconds,
        }
    }

    /// Failed result; `resources_created` holds whatever was realized before
    /// the failure so callers can diagnose and roll back
    pub fn failed(
        capability_name: impl Into<String>,
        message: impl Into<String>,
        error: impl Into<String>,
        resources_created: Vec<ResourceSpec>,
        duration_seconds: f64,
    ) -> Self {
        Self {
            capability_name: capability_name.into(),
            success: false,
            message: message.into(),
            resources_created,
            outputs: HashMap::new(),
            error: Some(error.into()),
            duration_seconds,
        }
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for CapabilityResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.success {
            write!(
                f,
                "{}: ok, {} resource(s) created in {:.1}s",
                self.capability_name,
                self.resources_created.len(),
                self.duration_seconds
            )
        } else {
            write!(
                f,
                "{}: failed after {:.1}s: {}",
                self.capability_name,
                self.duration_seconds,
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
