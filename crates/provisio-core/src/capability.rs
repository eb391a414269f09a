//! Capability plugin trait definition

use crate::cancel::CancelToken;
use crate::context::CapabilityContext;
use crate::plan::CapabilityPlan;
use crate::result::CapabilityResult;
use async_trait::async_trait;

/// Outcome of capability-specific validation.
///
/// A failing validation carries every problem found, not just the first.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    problems: Vec<String>,
}

impl Validation {
    /// Validation with no problems
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn fail(problems: Vec<String>) -> Self {
        Self { problems }
    }

    pub fn problem(mut self, description: impl Into<String>) -> Self {
        self.problems.push(description.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn into_problems(self) -> Vec<String> {
        self.problems
    }
}

/// Infrastructure capability abstraction trait
///
/// Each capability provisions one category of infrastructure (Databricks
/// workspaces, OpenAI deployments, firewall rules, ...) behind the uniform
/// validate → plan → execute → rollback contract. Capabilities are stateless
/// between invocations except for what they persist externally.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Returns the capability identifier (e.g., "provision_databricks")
    fn name(&self) -> &str;

    /// Returns the human-readable description for display
    fn description(&self) -> &str;

    /// Capability-specific pre-flight checks beyond the registry's
    /// parameter-shape validation. The default is always-valid, which is the
    /// contract for capabilities that omit validation.
    async fn validate(&self, _context: &CapabilityContext) -> Validation {
        Validation::ok()
    }

    /// Produce a deployment plan for the context.
    ///
    /// Must not mutate external state: planning is a read-only/dry-run
    /// operation, and a plan for an unchanged context against unchanged
    /// external state must describe the same resources.
    async fn plan(&self, context: &CapabilityContext) -> anyhow::Result<CapabilityPlan>;

    /// Perform the deployment described by an approved plan.
    ///
    /// This is the only long-running operation and the sole cancellation
    /// point; implementations check `cancel` between resource operations.
    /// Always returns a [`CapabilityResult`] — internal failures are
    /// reported with `success = false` and `error` populated, never as an
    /// unstructured fault. Resources that already exist must be detected and
    /// treated as no-ops rather than duplicated.
    async fn execute(&self, plan: &CapabilityPlan, cancel: &CancelToken) -> CapabilityResult;

    /// Whether this capability can undo a failed execution. Capabilities
    /// that leave this at the default are reported as "rollback not
    /// supported", distinct from an attempted-and-failed rollback.
    fn supports_rollback(&self) -> bool {
        false
    }

    /// Best-effort reversal of a failed execution's partial side effects.
    /// Returns whether the rollback succeeded.
    async fn rollback(&self, _result: &CapabilityResult) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ResourceSpec;

    struct MinimalCapability;

    #[async_trait]
    impl Capability for MinimalCapability {
        fn name(&self) -> &str {
            "minimal"
        }

        fn description(&self) -> &str {
            "Capability with every optional method left at its default"
        }

        async fn plan(&self, _context: &CapabilityContext) -> anyhow::Result<CapabilityPlan> {
            Ok(CapabilityPlan {
                capability_name: "minimal".to_string(),
                description: "nothing".to_string(),
                resources: vec![],
                estimated_cost: 0.0,
                estimated_duration_minutes: 0.0,
                requires_approval: false,
                details: serde_json::Value::Null,
            })
        }

        async fn execute(&self, plan: &CapabilityPlan, _cancel: &CancelToken) -> CapabilityResult {
            CapabilityResult::ok(&plan.capability_name, "done", plan.resources.clone(), 0.0)
        }
    }

    #[tokio::test]
    async fn test_optional_methods_default_behaviour() {
        let cap = MinimalCapability;
        let ctx = CapabilityContext::new("minimal", "do nothing");

        // Omitted validate is treated as always-valid
        assert!(cap.validate(&ctx).await.is_ok());

        // Omitted rollback is unsupported and reports failure if forced
        assert!(!cap.supports_rollback());
        let result = CapabilityResult::failed(
            "minimal",
            "failed",
            "err",
            vec![ResourceSpec::new("kind", "name", serde_json::json!({}))],
            0.0,
        );
        assert!(!cap.rollback(&result).await);
    }

    #[test]
    fn test_validation_accumulates_problems() {
        let validation = Validation::ok()
            .problem("team name is empty")
            .problem("unknown region");
        assert!(!validation.is_ok());
        assert_eq!(validation.problems().len(), 2);
    }
}
