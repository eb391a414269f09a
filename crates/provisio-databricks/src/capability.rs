//! Databricks capability implementation

use crate::backend::CloudBackend;
use crate::decision::{Decision, VALID_ENVIRONMENTS, VALID_REGIONS, VALID_WORKLOAD_TYPES};
use async_trait::async_trait;
use provisio_core::{
    CancelToken, Capability, CapabilityContext, CapabilityPlan, CapabilityResult, ResourceSpec,
    Validation,
};
use provisio_registry::CapabilityEntry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

pub const CAPABILITY_NAME: &str = "provision_databricks";

/// Provision an Azure Databricks workspace with compute.
///
/// A plan always describes three resources in deployment order: the
/// resource group, the workspace, the cluster. Execution drives them
/// through the [`CloudBackend`], converting already-existing resources into
/// no-ops so re-invocation never duplicates infrastructure.
pub struct DatabricksCapability {
    backend: Arc<dyn CloudBackend>,
}

impl DatabricksCapability {
    pub fn new(backend: Arc<dyn CloudBackend>) -> Self {
        Self { backend }
    }

    /// Registry descriptor matching this capability
    pub fn registry_entry() -> CapabilityEntry {
        CapabilityEntry::new(
            CAPABILITY_NAME,
            "Provision Azure Databricks workspace with compute infrastructure",
            ["compute", "analytics", "databricks"],
            ["team", "environment", "region"],
            ["workspace_name", "enable_gpu", "workload_type", "cost_limit"],
        )
        .expect("static entry is well-formed")
    }

    fn resources_for(decision: &Decision) -> Vec<ResourceSpec> {
        vec![
            ResourceSpec::new(
                "resource-group",
                &decision.resource_group_name,
                serde_json::json!({ "region": decision.region }),
            ),
            ResourceSpec::new(
                "databricks-workspace",
                &decision.workspace_name,
                serde_json::json!({
                    "sku": decision.sku,
                    "region": decision.region,
                    "resource_group": decision.resource_group_name,
                }),
            ),
            ResourceSpec::new(
                "databricks-cluster",
                &decision.cluster_name,
                serde_json::json!({
                    "workspace": decision.workspace_name,
                    "driver_instance_type": decision.cluster.driver_instance_type,
                    "worker_instance_type": decision.cluster.worker_instance_type,
                    "min_workers": decision.cluster.min_workers,
                    "max_workers": decision.cluster.max_workers,
                    "spark_version": decision.cluster.spark_version,
                    "autotermination_minutes": decision.cluster.autotermination_minutes,
                }),
            ),
        ]
    }
}

#[async_trait]
impl Capability for DatabricksCapability {
    fn name(&self) -> &str {
        CAPABILITY_NAME
    }

    fn description(&self) -> &str {
        "Provision Azure Databricks workspace with compute infrastructure"
    }

    async fn validate(&self, context: &CapabilityContext) -> Validation {
        let mut validation = Validation::ok();

        match context.parameter_str("team") {
            None => validation = validation.problem("parameter 'team' must be a non-empty string"),
            Some(team) if team.trim().is_empty() => {
                validation = validation.problem("parameter 'team' must be a non-empty string");
            }
            Some(_) => {}
        }

        // Present-but-not-a-string is flagged here; otherwise the decision
        // layer would silently fall back to its defaults
        match context.parameter_str("environment") {
            None if context.parameters.contains_key("environment") => {
                validation = validation.problem("parameter 'environment' must be a string");
            }
            Some(environment) if !VALID_ENVIRONMENTS.contains(&environment) => {
                validation = validation.problem(format!(
                    "environment '{environment}' is not one of {VALID_ENVIRONMENTS:?}"
                ));
            }
            _ => {}
        }

        match context.parameter_str("region") {
            None if context.parameters.contains_key("region") => {
                validation = validation.problem("parameter 'region' must be a string");
            }
            Some(region) if !VALID_REGIONS.contains(&region) => {
                validation =
                    validation.problem(format!("region '{region}' is not a known Azure region"));
            }
            _ => {}
        }

        match context.parameter_str("workload_type") {
            None if context.parameters.contains_key("workload_type") => {
                validation = validation.problem("parameter 'workload_type' must be a string");
            }
            Some(workload) if !VALID_WORKLOAD_TYPES.contains(&workload) => {
                validation = validation.problem(format!(
                    "workload_type '{workload}' is not one of {VALID_WORKLOAD_TYPES:?}"
                ));
            }
            _ => {}
        }

        if context.parameters.contains_key("enable_gpu")
            && context.parameter::<bool>("enable_gpu").is_none()
        {
            validation = validation.problem("parameter 'enable_gpu' must be a boolean");
        }

        validation
    }

    async fn plan(&self, context: &CapabilityContext) -> anyhow::Result<CapabilityPlan> {
        let decision = Decision::from_context(context);

        if let Some(limit) = context.parameter::<f64>("cost_limit") {
            if decision.estimated_monthly_cost > limit {
                anyhow::bail!(
                    "estimated cost ${:.2}/month exceeds cost limit ${:.2}/month",
                    decision.estimated_monthly_cost,
                    limit
                );
            }
        }

        let resources = Self::resources_for(&decision);
        tracing::debug!(
            "Planned {} resource(s) for workspace {}",
            resources.len(),
            decision.workspace_name
        );

        Ok(CapabilityPlan {
            capability_name: CAPABILITY_NAME.to_string(),
            description: format!(
                "Provision Databricks workspace for {} team ({} environment)",
                decision.team, decision.environment
            ),
            resources,
            estimated_cost: decision.estimated_monthly_cost,
            estimated_duration_minutes: 15.0,
            requires_approval: true,
            details: serde_json::to_value(&decision)?,
        })
    }

    async fn execute(&self, plan: &CapabilityPlan, cancel: &CancelToken) -> CapabilityResult {
        let started = Instant::now();
        let mut created: Vec<ResourceSpec> = Vec::new();
        let mut outputs: HashMap<String, String> = HashMap::new();

        for resource in &plan.resources {
            if cancel.is_cancelled() {
                tracing::warn!("Cancelled after {} of {} resource(s)", created.len(), plan.resources.len());
                return CapabilityResult::failed(
                    CAPABILITY_NAME,
                    "Deployment cancelled",
                    format!("cancelled before creating {}", resource.key()),
                    created,
                    started.elapsed().as_secs_f64(),
                );
            }

            let step = match self.backend.exists(resource).await {
                Ok(true) => {
                    tracing::info!("{} already exists, skipping create", resource.key());
                    self.backend.describe(resource).await
                }
                Ok(false) => {
                    tracing::info!("Creating {}", resource.key());
                    self.backend.create(resource).await
                }
                Err(e) => Err(e),
            };

            match step {
                Ok(resource_outputs) => {
                    outputs.extend(resource_outputs);
                    created.push(resource.clone());
                }
                Err(e) => {
                    return CapabilityResult::failed(
                        CAPABILITY_NAME,
                        "Failed to deploy Databricks workspace",
                        e.to_string(),
                        created,
                        started.elapsed().as_secs_f64(),
                    );
                }
            }
        }

        let mut result = CapabilityResult::ok(
            CAPABILITY_NAME,
            "Successfully deployed Databricks workspace",
            created,
            started.elapsed().as_secs_f64(),
        );
        result.outputs = outputs;
        result
    }

    fn supports_rollback(&self) -> bool {
        true
    }

    /// Delete partially created resources in reverse order. Best-effort: a
    /// delete failure is logged and reported, remaining deletes still run.
    async fn rollback(&self, result: &CapabilityResult) -> bool {
        let mut all_deleted = true;
        for resource in result.resources_created.iter().rev() {
            match self.backend.delete(resource).await {
                Ok(()) => tracing::info!("Rolled back {}", resource.key()),
                Err(e) => {
                    tracing::warn!("Rollback of {} failed: {e}", resource.key());
                    all_deleted = false;
                }
            }
        }
        all_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    fn capability() -> (Arc<InMemoryBackend>, DatabricksCapability) {
        let backend = Arc::new(InMemoryBackend::new());
        let capability = DatabricksCapability::new(Arc::clone(&backend) as Arc<dyn CloudBackend>);
        (backend, capability)
    }

    fn context() -> CapabilityContext {
        CapabilityContext::new(CAPABILITY_NAME, "I need Databricks for the X team")
            .with_parameter("team", serde_json::json!("X"))
            .with_parameter("environment", serde_json::json!("dev"))
            .with_parameter("region", serde_json::json!("eastus"))
    }

    #[tokio::test]
    async fn test_validate_collects_every_problem() {
        let (_, capability) = capability();
        let ctx = CapabilityContext::new(CAPABILITY_NAME, "req")
            .with_parameter("team", serde_json::json!("  "))
            .with_parameter("environment", serde_json::json!("qa"))
            .with_parameter("region", serde_json::json!("moonbase"));

        let validation = capability.validate(&ctx).await;
        assert_eq!(validation.problems().len(), 3);
    }

    #[tokio::test]
    async fn test_validate_rejects_wrongly_typed_values() {
        let (_, capability) = capability();
        // Right names, wrong JSON types; none of these may fall through to
        // the decision defaults
        let ctx = CapabilityContext::new(CAPABILITY_NAME, "req")
            .with_parameter("team", serde_json::json!("ml"))
            .with_parameter("environment", serde_json::json!(true))
            .with_parameter("region", serde_json::json!(123))
            .with_parameter("workload_type", serde_json::json!(["ml"]));

        let validation = capability.validate(&ctx).await;
        let problems = validation.problems();
        assert_eq!(problems.len(), 3);
        assert!(problems.iter().any(|p| p.contains("'environment' must be a string")));
        assert!(problems.iter().any(|p| p.contains("'region' must be a string")));
        assert!(problems.iter().any(|p| p.contains("'workload_type' must be a string")));
    }

    #[tokio::test]
    async fn test_plan_is_three_ordered_resources() {
        let (_, capability) = capability();
        let plan = capability.plan(&context()).await.unwrap();

        let kinds: Vec<&str> = plan.resources.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["resource-group", "databricks-workspace", "databricks-cluster"]
        );
        assert!(plan.requires_approval);
        assert!(plan.estimated_cost > 0.0);
        assert_eq!(plan.resources[0].name, "rg-x-dev");
        assert_eq!(plan.resources[1].name, "x-dev");
    }

    #[tokio::test]
    async fn test_plan_respects_cost_limit() {
        let (_, capability) = capability();
        let ctx = context().with_parameter("cost_limit", serde_json::json!(10.0));
        let err = capability.plan(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("cost limit"));
    }

    #[tokio::test]
    async fn test_execute_creates_all_resources_with_outputs() {
        let (backend, capability) = capability();
        let plan = capability.plan(&context()).await.unwrap();
        let result = capability.execute(&plan, &CancelToken::new()).await;

        assert!(result.success);
        assert_eq!(result.resources_created, plan.resources);
        assert!(result.outputs.contains_key("workspace_url"));
        assert!(result.outputs.contains_key("workspace_id"));
        assert_eq!(result.outputs.get("resource_group").map(String::as_str), Some("rg-x-dev"));
        assert_eq!(backend.create_count(), 3);
    }

    #[tokio::test]
    async fn test_execute_with_cancelled_token_is_structured() {
        let (backend, capability) = capability();
        let plan = capability.plan(&context()).await.unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = capability.execute(&plan, &cancel).await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("cancelled"));
        assert!(result.resources_created.is_empty());
        assert_eq!(backend.create_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_preserves_created_prefix() {
        let (backend, capability) = capability();
        let plan = capability.plan(&context()).await.unwrap();
        backend.fail_on_create(plan.resources[2].key()).await;

        let result = capability.execute(&plan, &CancelToken::new()).await;

        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(result.resources_created, plan.resources[..2].to_vec());

        // Rollback removes exactly the partial prefix, in reverse order
        assert!(capability.rollback(&result).await);
        assert_eq!(backend.resource_count().await, 0);
        assert_eq!(backend.delete_count(), 2);
    }
}
