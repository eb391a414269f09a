//! Engine construction and run startup

use crate::error::{EngineError, Result};
use crate::run::Run;
use provisio_core::{CancelToken, Capability, CapabilityContext};
use provisio_registry::{CapabilityEntry, CapabilityRegistry, RegistryError};
use std::collections::HashMap;
use std::sync::Arc;

/// Engine policy knobs
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Force the approval gate for any plan whose estimated monthly cost
    /// exceeds this threshold, regardless of what the plan itself says.
    /// The cost is capability-computed; the engine never recomputes it.
    pub approval_cost_threshold: Option<f64>,

    /// Invoke the capability's rollback after a failed execution
    pub rollback_on_failure: bool,
}

/// Builder for the startup phase: capabilities are registered here, then
/// [`build`](EngineBuilder::build) freezes the registry and instance map
/// into a read-only [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    registry: CapabilityRegistry,
    capabilities: HashMap<String, Arc<dyn Capability>>,
    config: EngineConfig,
}

impl std::fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("registry", &self.registry)
            .field("capabilities", &self.capabilities.keys())
            .field("config", &self.config)
            .finish()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a capability descriptor together with its live instance.
    /// Fails on duplicate name or on an entry/instance name mismatch.
    pub fn register(
        mut self,
        entry: CapabilityEntry,
        capability: Arc<dyn Capability>,
    ) -> Result<Self> {
        if entry.name != capability.name() {
            return Err(EngineError::NameMismatch {
                entry: entry.name,
                instance: capability.name().to_string(),
            });
        }
        let name = entry.name.clone();
        self.registry.register(entry)?;
        self.capabilities.insert(name, capability);
        Ok(self)
    }

    pub fn build(self) -> Engine {
        tracing::debug!("Engine built with {} capability(ies)", self.registry.len());
        Engine {
            registry: Arc::new(self.registry),
            capabilities: self.capabilities,
            config: self.config,
        }
    }
}

/// The lifecycle engine.
///
/// Holds the read-only registry, the name-keyed instance map and the policy
/// config. One engine serves any number of concurrent runs; it never
/// serializes across runs, so capabilities with physically shared external
/// resources carry their own idempotency or locking.
pub struct Engine {
    registry: Arc<CapabilityRegistry>,
    capabilities: HashMap<String, Arc<dyn Capability>>,
    config: EngineConfig,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The capability catalogue, for discovery
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Start a run: resolve the capability, validate the context, produce a
    /// plan, and hand back a [`Run`] suspended at the approval gate (or
    /// ready to execute when no approval is required).
    ///
    /// Structural failures — unknown capability, parameter-shape violations
    /// — are returned before any plugin code runs.
    pub async fn start(&self, context: CapabilityContext) -> Result<Run> {
        let name = context.capability_name.clone();

        // Initiated → Validated: instance map, registry shape check, then
        // the capability's own validation
        let capability = self
            .capabilities
            .get(&name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCapability(name.clone()))?;
        self.registry.validate_parameters(&name, &context.parameters)?;

        let validation = capability.validate(&context).await;
        if !validation.is_ok() {
            return Err(EngineError::ValidationFailed {
                capability: name,
                problems: validation.into_problems(),
            });
        }

        // Validated → Planned
        tracing::info!("Planning {}", name);
        let plan = capability
            .plan(&context)
            .await
            .map_err(|source| EngineError::PlanningFailed {
                capability: name.clone(),
                source,
            })?;

        let over_threshold = self
            .config
            .approval_cost_threshold
            .map_or(false, |t| plan.estimated_cost > t);
        let needs_approval = plan.requires_approval || over_threshold;
        if over_threshold && !plan.requires_approval {
            tracing::info!(
                "Plan for {} (${:.2}/month) exceeds approval threshold",
                name,
                plan.estimated_cost
            );
        }

        Ok(Run::new(
            context,
            capability,
            plan,
            needs_approval,
            self.config.rollback_on_failure,
        ))
    }

    /// One-shot convenience: start, approve (only when `auto_approve`),
    /// execute. Refuses to execute a plan that requires approval unless
    /// `auto_approve` is set.
    pub async fn provision(
        &self,
        context: CapabilityContext,
        auto_approve: bool,
    ) -> Result<crate::run::RunOutcome> {
        let mut run = self.start(context).await?;
        if run.needs_approval() {
            if !auto_approve {
                return Err(EngineError::ApprovalRequired {
                    capability: run.plan().capability_name.clone(),
                });
            }
            run.approve()?;
        }
        run.execute(&CancelToken::new()).await
    }
}
