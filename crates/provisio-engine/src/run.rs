//! Run state machine

use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use provisio_core::{CancelToken, Capability, CapabilityContext, CapabilityPlan, CapabilityResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// State of a single lifecycle run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Request received, nothing checked yet
    Initiated,
    /// Capability resolved and all validation passed
    Validated,
    /// Plan produced, no approval needed
    Planned,
    /// Plan produced, suspended until the caller decides. No timeout at
    /// this layer; approval is an external, possibly human, event.
    AwaitingApproval,
    /// Caller approved the plan
    Approved,
    /// Execute call outstanding
    Executing,
    /// Execution finished successfully
    Completed,
    /// Terminal without a completed deployment: validation or execution
    /// failure, rejection, or cancellation
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Initiated => write!(f, "initiated"),
            RunState::Validated => write!(f, "validated"),
            RunState::Planned => write!(f, "planned"),
            RunState::AwaitingApproval => write!(f, "awaiting-approval"),
            RunState::Approved => write!(f, "approved"),
            RunState::Executing => write!(f, "executing"),
            RunState::Completed => write!(f, "completed"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Secondary outcome of a rollback attempt after a failed execution.
///
/// Never overrides the primary execution result; a failed run stays failed
/// whatever the rollback reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// Execution succeeded, or rollback-on-failure is disabled
    NotAttempted,
    /// The capability does not implement rollback
    Unsupported,
    /// Rollback ran and reported success
    Succeeded,
    /// Rollback ran and reported failure
    Failed,
}

impl std::fmt::Display for RollbackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollbackOutcome::NotAttempted => write!(f, "not attempted"),
            RollbackOutcome::Unsupported => write!(f, "not supported"),
            RollbackOutcome::Succeeded => write!(f, "succeeded"),
            RollbackOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Terminal outcome of an executed run: the capability's structured result
/// plus the independent rollback outcome.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: CapabilityResult,
    pub rollback: RollbackOutcome,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.result.success
    }

    /// Collapse the outcome into a plain `Result`, mapping a failed
    /// execution to [`EngineError::ExecutionFailed`]. The partial resource
    /// list is lost in the error path; callers that need it keep the
    /// outcome instead.
    pub fn into_result(self) -> Result<CapabilityResult> {
        if self.result.success {
            Ok(self.result)
        } else {
            Err(EngineError::ExecutionFailed {
                capability: self.result.capability_name.clone(),
                error: self
                    .result
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

/// One provisioning request moving through the lifecycle.
///
/// Created by [`Engine::start`](crate::Engine::start) in the `Planned` or
/// `AwaitingApproval` state and owned by the caller from then on. A run in
/// `AwaitingApproval` can be held indefinitely and resumed by
/// [`approve`](Run::approve) or [`reject`](Run::reject) without re-running
/// validation or planning.
pub struct Run {
    context: CapabilityContext,
    capability: Arc<dyn Capability>,
    plan: CapabilityPlan,
    state: RunState,
    rejected: bool,
    rollback_on_failure: bool,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Run {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Run")
            .field("context", &self.context)
            .field("capability", &self.capability.name())
            .field("plan", &self.plan)
            .field("state", &self.state)
            .field("rejected", &self.rejected)
            .field("rollback_on_failure", &self.rollback_on_failure)
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .finish()
    }
}

impl Run {
    pub(crate) fn new(
        context: CapabilityContext,
        capability: Arc<dyn Capability>,
        plan: CapabilityPlan,
        needs_approval: bool,
        rollback_on_failure: bool,
    ) -> Self {
        Self {
            context,
            capability,
            plan,
            state: if needs_approval {
                RunState::AwaitingApproval
            } else {
                RunState::Planned
            },
            rejected: false,
            rollback_on_failure,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn context(&self) -> &CapabilityContext {
        &self.context
    }

    pub fn plan(&self) -> &CapabilityPlan {
        &self.plan
    }

    pub fn needs_approval(&self) -> bool {
        self.state == RunState::AwaitingApproval
    }

    /// Whether the run ended by the caller rejecting the plan. Rejection is
    /// a normal terminal outcome, not an error, and carries no result.
    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Approve a suspended plan, making the run executable.
    pub fn approve(&mut self) -> Result<()> {
        if self.state != RunState::AwaitingApproval {
            return Err(EngineError::InvalidTransition {
                operation: "approve",
                state: self.state,
            });
        }
        tracing::info!("Plan approved for {}", self.plan.capability_name);
        self.state = RunState::Approved;
        Ok(())
    }

    /// Reject a suspended plan, ending the run without executing.
    pub fn reject(&mut self) -> Result<()> {
        if self.state != RunState::AwaitingApproval {
            return Err(EngineError::InvalidTransition {
                operation: "reject",
                state: self.state,
            });
        }
        tracing::info!("Plan rejected for {}", self.plan.capability_name);
        self.state = RunState::Failed;
        self.rejected = true;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Execute the approved plan.
    ///
    /// Legal exactly once, from `Approved` or from `Planned` when the plan
    /// never needed approval — which is how the engine guarantees at most
    /// one in-flight execute per run. Cancellation observed before the
    /// capability is invoked aborts the run with no external effect; once
    /// the capability is running, the token is advisory and checked by the
    /// plugin between resource operations.
    pub async fn execute(&mut self, cancel: &CancelToken) -> Result<RunOutcome> {
        match self.state {
            RunState::Planned | RunState::Approved => {}
            state => {
                return Err(EngineError::InvalidTransition {
                    operation: "execute",
                    state,
                });
            }
        }

        if cancel.is_cancelled() {
            tracing::info!(
                "Run for {} cancelled before execution",
                self.plan.capability_name
            );
            self.state = RunState::Failed;
            self.finished_at = Some(Utc::now());
            return Err(EngineError::Cancelled);
        }

        self.state = RunState::Executing;
        tracing::info!(
            "Executing {}: {} resource(s)",
            self.plan.capability_name,
            self.plan.resources.len()
        );

        let result = self.capability.execute(&self.plan, cancel).await;
        self.finished_at = Some(Utc::now());

        if result.success {
            tracing::info!(
                "Execution of {} completed in {:.1}s",
                self.plan.capability_name,
                result.duration_seconds
            );
            self.state = RunState::Completed;
            return Ok(RunOutcome {
                result,
                rollback: RollbackOutcome::NotAttempted,
            });
        }

        tracing::warn!(
            "Execution of {} failed: {}",
            self.plan.capability_name,
            result.error.as_deref().unwrap_or("unknown error")
        );
        self.state = RunState::Failed;

        let rollback = if !self.rollback_on_failure {
            RollbackOutcome::NotAttempted
        } else if !self.capability.supports_rollback() {
            tracing::warn!("{} does not support rollback", self.plan.capability_name);
            RollbackOutcome::Unsupported
        } else {
            tracing::info!(
                "Rolling back {} partially created resource(s)",
                result.resources_created.len()
            );
            if self.capability.rollback(&result).await {
                RollbackOutcome::Succeeded
            } else {
                tracing::warn!("Rollback of {} failed", self.plan.capability_name);
                RollbackOutcome::Failed
            }
        };

        Ok(RunOutcome { result, rollback })
    }
}
