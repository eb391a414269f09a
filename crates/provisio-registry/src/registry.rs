//! Capability catalogue

use crate::entry::CapabilityEntry;
use crate::error::{RegistryError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;

/// Catalogue of all registered capabilities.
///
/// Registration happens at startup, before any run begins; afterwards the
/// registry is read-only. `list` iterates in registration order, which is
/// why the entries live in an [`IndexMap`] rather than a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    entries: IndexMap<String, CapabilityEntry>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability descriptor. Fails on duplicate name.
    pub fn register(&mut self, entry: CapabilityEntry) -> Result<()> {
        if self.entries.contains_key(&entry.name) {
            return Err(RegistryError::DuplicateCapability(entry.name.clone()));
        }
        tracing::debug!("Registered capability: {}", entry.name);
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Look up a capability descriptor by name
    pub fn lookup(&self, name: &str) -> Result<&CapabilityEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| RegistryError::UnknownCapability(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All entries in registration order, optionally filtered by tag
    pub fn list(&self, tag: Option<&str>) -> Vec<&CapabilityEntry> {
        self.entries
            .values()
            .filter(|e| tag.map_or(true, |t| e.has_tag(t)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check a parameter mapping against a capability's declared sets.
    ///
    /// A mapping is well-formed iff every required name is present and no
    /// name outside required ∪ optional is present. All violations are
    /// reported in one combined failure, sorted for stable output.
    pub fn validate_parameters(
        &self,
        name: &str,
        parameters: &HashMap<String, Value>,
    ) -> Result<()> {
        let entry = self.lookup(name)?;

        let mut violations: Vec<String> = Vec::new();

        for required in &entry.required_parameters {
            if !parameters.contains_key(required) {
                violations.push(format!("missing required parameter '{required}'"));
            }
        }
        for supplied in parameters.keys() {
            if !entry.accepts_parameter(supplied) {
                violations.push(format!("unexpected parameter '{supplied}'"));
            }
        }

        if violations.is_empty() {
            return Ok(());
        }

        violations.sort();
        Err(RegistryError::InvalidParameters {
            capability: name.to_string(),
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(
                CapabilityEntry::new(
                    "provision_databricks",
                    "Azure Databricks workspace with compute",
                    ["compute", "analytics"],
                    ["team", "environment", "region"],
                    ["workspace_name", "enable_gpu"],
                )
                .unwrap(),
            )
            .unwrap();
        registry
            .register(
                CapabilityEntry::new(
                    "provision_openai",
                    "Azure OpenAI service with model deployment",
                    ["ai"],
                    ["deployment_name", "region", "sku"],
                    ["capacity"],
                )
                .unwrap(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let mut registry = sample_registry();
        let entry = CapabilityEntry::new(
            "provision_databricks",
            "again",
            Vec::<String>::new(),
            Vec::<String>::new(),
            Vec::<String>::new(),
        )
        .unwrap();

        let err = registry.register(entry).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCapability(name) if name == "provision_databricks"));
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = sample_registry();
        assert!(matches!(
            registry.lookup("provision_quantum"),
            Err(RegistryError::UnknownCapability(_))
        ));
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let registry = sample_registry();
        let names: Vec<&str> = registry.list(None).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["provision_databricks", "provision_openai"]);
    }

    #[test]
    fn test_list_filters_by_tag() {
        let registry = sample_registry();
        let compute = registry.list(Some("compute"));
        assert_eq!(compute.len(), 1);
        assert_eq!(compute[0].name, "provision_databricks");
        assert!(registry.list(Some("storage")).is_empty());
    }

    #[test]
    fn test_validate_parameters_reports_all_violations() {
        let registry = sample_registry();
        let params: HashMap<String, Value> = [
            ("team".to_string(), serde_json::json!("ml")),
            ("budget".to_string(), serde_json::json!(500)),
        ]
        .into_iter()
        .collect();

        let err = registry
            .validate_parameters("provision_databricks", &params)
            .unwrap_err();

        match err {
            RegistryError::InvalidParameters { violations, .. } => {
                // Both missing requireds and the unexpected name, in one failure
                assert_eq!(violations.len(), 3);
                assert!(violations.iter().any(|v| v.contains("'environment'")));
                assert!(violations.iter().any(|v| v.contains("'region'")));
                assert!(violations.iter().any(|v| v.contains("unexpected parameter 'budget'")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_parameters_accepts_optional() {
        let registry = sample_registry();
        let params: HashMap<String, Value> = [
            ("team".to_string(), serde_json::json!("ml")),
            ("environment".to_string(), serde_json::json!("dev")),
            ("region".to_string(), serde_json::json!("eastus")),
            ("enable_gpu".to_string(), serde_json::json!(false)),
        ]
        .into_iter()
        .collect();

        registry
            .validate_parameters("provision_databricks", &params)
            .unwrap();
    }
}
