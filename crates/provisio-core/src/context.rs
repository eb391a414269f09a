//! Capability run input

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Input to a single capability run.
///
/// Constructed once by the caller, then borrowed immutably by the engine and
/// the capability for the duration of the run. The engine only interprets
/// `capability_name`; everything else is passed through to the plugin
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityContext {
    /// Original free-text request from the user
    pub user_request: String,

    /// Capability to run; key into the registry and instance map
    pub capability_name: String,

    /// Capability-specific parameters, validated against the registry's
    /// required/optional sets before any plugin code runs
    pub parameters: HashMap<String, serde_json::Value>,

    /// Auxiliary data, engine-opaque
    pub metadata: HashMap<String, serde_json::Value>,
}

impl CapabilityContext {
    pub fn new(capability_name: impl Into<String>, user_request: impl Into<String>) -> Self {
        Self {
            user_request: user_request.into(),
            capability_name: capability_name.into(),
            parameters: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get a parameter deserialized as a specific type
    pub fn parameter<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.parameters
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get a parameter as a plain string, accepting only JSON strings
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_typed_access() {
        let ctx = CapabilityContext::new("provision_databricks", "need a workspace")
            .with_parameter("team", serde_json::json!("ml"))
            .with_parameter("enable_gpu", serde_json::json!(true));

        assert_eq!(ctx.parameter_str("team"), Some("ml"));
        assert_eq!(ctx.parameter::<bool>("enable_gpu"), Some(true));
        assert_eq!(ctx.parameter::<String>("missing"), None);
    }

    #[test]
    fn test_metadata_is_separate_from_parameters() {
        let ctx = CapabilityContext::new("cap", "req")
            .with_metadata("caller", serde_json::json!("cli"));

        assert!(ctx.parameters.is_empty());
        assert_eq!(ctx.metadata.len(), 1);
    }
}
