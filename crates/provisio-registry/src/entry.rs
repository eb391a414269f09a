//! Capability catalogue entry

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Static descriptor for one capability.
///
/// Describes the capability independently of any live plugin instance, so
/// discovery and parameter validation work without touching plugin code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityEntry {
    /// Unique capability identifier (e.g., "provision_databricks")
    pub name: String,

    /// Human-readable description for display and discovery
    pub description: String,

    /// Discovery tags (e.g., "compute", "analytics")
    pub tags: BTreeSet<String>,

    /// Parameters that must be present in a run context
    pub required_parameters: BTreeSet<String>,

    /// Parameters that may be present in a run context
    pub optional_parameters: BTreeSet<String>,
}

impl CapabilityEntry {
    /// Create an entry, rejecting required/optional overlap.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
        required_parameters: impl IntoIterator<Item = impl Into<String>>,
        optional_parameters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let name = name.into();
        let required: BTreeSet<String> = required_parameters.into_iter().map(Into::into).collect();
        let optional: BTreeSet<String> = optional_parameters.into_iter().map(Into::into).collect();

        let overlap: Vec<String> = required.intersection(&optional).cloned().collect();
        if !overlap.is_empty() {
            return Err(RegistryError::OverlappingParameters { name, overlap });
        }

        Ok(Self {
            name,
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            required_parameters: required,
            optional_parameters: optional,
        })
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether a parameter name is known to this capability at all
    pub fn accepts_parameter(&self, name: &str) -> bool {
        self.required_parameters.contains(name) || self.optional_parameters.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_rejects_overlap() {
        let err = CapabilityEntry::new(
            "cap",
            "desc",
            ["compute"],
            ["team", "region"],
            ["region", "sku"],
        )
        .unwrap_err();

        match err {
            RegistryError::OverlappingParameters { overlap, .. } => {
                assert_eq!(overlap, vec!["region".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_accepts_parameter() {
        let entry = CapabilityEntry::new(
            "cap",
            "desc",
            Vec::<String>::new(),
            ["team"],
            ["workspace_name"],
        )
        .unwrap();

        assert!(entry.accepts_parameter("team"));
        assert!(entry.accepts_parameter("workspace_name"));
        assert!(!entry.accepts_parameter("budget"));
    }
}
