//! Deployment plan types

use serde::{Deserialize, Serialize};

/// Descriptor for a single cloud resource in a plan.
///
/// Order matters: the engine and capabilities preserve the plan's resource
/// order all the way into execution reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Resource kind (e.g., "resource-group", "databricks-workspace")
    pub kind: String,

    /// Resource name
    pub name: String,

    /// Resource-specific configuration
    pub config: serde_json::Value,
}

impl ResourceSpec {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            config,
        }
    }

    /// Get the full resource key (kind:name)
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Reviewable, side-effect-free description of a deployment.
///
/// Produced by [`Capability::plan`](crate::Capability::plan) and never
/// mutated afterwards; the approval gate and `execute` both receive it by
/// shared reference. Re-planning with an unchanged context and unchanged
/// external state must describe the same resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityPlan {
    /// Capability that produced this plan
    pub capability_name: String,

    /// Human-readable summary of what will be deployed
    pub description: String,

    /// Resources to create, in deployment order
    pub resources: Vec<ResourceSpec>,

    /// Estimated monthly cost in USD, >= 0. Capability-computed; the engine
    /// treats it as opaque and never recomputes it from `resources`.
    pub estimated_cost: f64,

    /// Estimated deployment duration in minutes, >= 0
    pub estimated_duration_minutes: f64,

    /// Whether the plan must pass the approval gate before execution
    pub requires_approval: bool,

    /// Capability-specific structured data, engine-opaque
    pub details: serde_json::Value,
}

impl CapabilityPlan {
    /// Summary of the plan for display
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            capability_name: self.capability_name.clone(),
            description: self.description.clone(),
            resource_count: self.resources.len(),
            estimated_cost: self.estimated_cost,
            estimated_duration_minutes: self.estimated_duration_minutes,
            requires_approval: self.requires_approval,
        }
    }
}

/// Display summary of a plan
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub capability_name: String,
    pub description: String,
    pub resource_count: usize,
    pub estimated_cost: f64,
    pub estimated_duration_minutes: f64,
    pub requires_approval: bool,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} resource(s), ~${:.2}/month, ~{:.0} min{}",
            self.capability_name,
            self.resource_count,
            self.estimated_cost,
            self.estimated_duration_minutes,
            if self.requires_approval {
                ", approval required"
            } else {
                ""
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> CapabilityPlan {
        CapabilityPlan {
            capability_name: "provision_databricks".to_string(),
            description: "Databricks workspace for ml (dev)".to_string(),
            resources: vec![
                ResourceSpec::new("resource-group", "rg-ml-dev", serde_json::json!({})),
                ResourceSpec::new(
                    "databricks-workspace",
                    "ml-dev",
                    serde_json::json!({"sku": "standard"}),
                ),
            ],
            estimated_cost: 125.5,
            estimated_duration_minutes: 15.0,
            requires_approval: true,
            details: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_resource_key() {
        let spec = ResourceSpec::new("resource-group", "rg-ml-dev", serde_json::json!({}));
        assert_eq!(spec.key(), "resource-group:rg-ml-dev");
    }

    #[test]
    fn test_resource_config_access() {
        let plan = sample_plan();
        let sku: Option<String> = plan.resources[1].get_config("sku");
        assert_eq!(sku.as_deref(), Some("standard"));
    }

    #[test]
    fn test_plan_summary() {
        let summary = sample_plan().summary();
        assert_eq!(summary.resource_count, 2);
        let text = summary.to_string();
        assert!(text.contains("approval required"));
        assert!(text.contains("$125.50"));
    }
}
