//! Plan Task use case: the coordinator.
//!
//! Asks the planner for a plan, checks every node names a registered
//! capability and validates the DAG. Any failure along the way fails open to
//! a single-node plan routed to the pool's generalist.

use crate::ports::capability::CapabilityPool;
use crate::ports::execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger};
use crate::ports::planner::{Planner, PlanningRequest};
use crate::use_cases::shared::{LlmConcurrencyLimiter, limited_call};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use workforce_domain::{
    ExecutionWaves, Plan, PlanningError, RequirementAnalysis, ScoredEpisode, fallback_plan,
    validate,
};

/// Input for the PlanTask use case
#[derive(Debug, Clone)]
pub struct PlanTaskInput {
    pub task_description: String,
    pub precedents: Vec<ScoredEpisode>,
    pub requirement: Option<RequirementAnalysis>,
}

impl PlanTaskInput {
    pub fn new(task_description: impl Into<String>) -> Self {
        Self {
            task_description: task_description.into(),
            precedents: Vec::new(),
            requirement: None,
        }
    }

    pub fn with_precedents(mut self, precedents: Vec<ScoredEpisode>) -> Self {
        self.precedents = precedents;
        self
    }

    pub fn with_requirement(mut self, requirement: Option<RequirementAnalysis>) -> Self {
        self.requirement = requirement;
        self
    }
}

/// A validated plan ready for the scheduler
#[derive(Debug, Clone)]
pub struct PlanTaskOutput {
    pub plan: Plan,
    pub waves: ExecutionWaves,
    /// Why the fallback plan was used, if it was
    pub fallback_reason: Option<String>,
}

impl PlanTaskOutput {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

pub struct PlanTaskUseCase {
    planner: Option<Arc<dyn Planner>>,
    pool: Arc<CapabilityPool>,
    limiter: LlmConcurrencyLimiter,
    timeout: Duration,
    logger: Arc<dyn ExecutionLogger>,
}

impl PlanTaskUseCase {
    pub fn new(
        planner: Option<Arc<dyn Planner>>,
        pool: Arc<CapabilityPool>,
        limiter: LlmConcurrencyLimiter,
        timeout: Duration,
    ) -> Self {
        Self {
            planner,
            pool,
            limiter,
            timeout,
            logger: Arc::new(NoExecutionLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ExecutionLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Produce a validated plan. Never fails.
    pub async fn execute(&self, input: PlanTaskInput) -> PlanTaskOutput {
        let output = match self.propose(&input).await {
            Ok(plan) => match validate(&plan) {
                Ok(waves) => PlanTaskOutput {
                    plan,
                    waves,
                    fallback_reason: None,
                },
                Err(e) => {
                    warn!("Planner produced an invalid plan: {}", e);
                    self.fallback(&input.task_description, &e.to_string())
                }
            },
            Err(e) => {
                warn!("Planning failed: {}", e);
                self.fallback(&input.task_description, &e.to_string())
            }
        };

        info!(
            "Plan ready: {} nodes in {} waves{}",
            output.plan.nodes.len(),
            output.waves.len(),
            if output.is_fallback() { " (fallback)" } else { "" }
        );
        self.logger.log(ExecutionEvent::new(
            "plan_created",
            serde_json::json!({
                "analysis": output.plan.analysis,
                "priority": output.plan.priority.as_str(),
                "nodes": output.plan.nodes.iter().map(|n| serde_json::json!({
                    "id": n.id.as_str(),
                    "capability": n.capability,
                    "depends_on": n.depends_on.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                })).collect::<Vec<_>>(),
                "waves": output.waves.len(),
                "fallback_reason": output.fallback_reason,
            }),
        ));
        output
    }

    async fn propose(&self, input: &PlanTaskInput) -> Result<Plan, PlanningError> {
        let planner = self
            .planner
            .as_ref()
            .ok_or_else(|| PlanningError::Planner("no planner configured".to_string()))?;

        let request = PlanningRequest::new(&input.task_description, self.pool.descriptors())
            .with_precedents(input.precedents.clone())
            .with_requirement(input.requirement.clone());

        let plan = limited_call(&self.limiter, self.timeout, planner.plan(&request))
            .await
            .ok_or_else(|| {
                PlanningError::Planner(format!("planner timed out after {:?}", self.timeout))
            })??;

        if let Some(node) = plan.nodes.iter().find(|n| !self.pool.contains(&n.capability)) {
            return Err(PlanningError::UnknownCapability {
                task: node.id.clone(),
                capability: node.capability.clone(),
            });
        }
        Ok(plan)
    }

    /// Single-node plan for the generalist
    pub(crate) fn fallback(&self, task_description: &str, reason: &str) -> PlanTaskOutput {
        let plan = fallback_plan(task_description, self.pool.generalist(), reason);
        // A single node without dependencies always validates
        let waves = validate(&plan).unwrap_or_default();
        PlanTaskOutput {
            plan,
            waves,
            fallback_reason: Some(reason.to_string()),
        }
    }
}
