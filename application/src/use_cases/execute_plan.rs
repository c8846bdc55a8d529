//! Execute Plan use case: the wave scheduler.
//!
//! Drives a validated plan wave by wave:
//!
//! ```text
//! validate ─► wave 0 ─► wave 1 ─► ... ─► wave k (≤ max_waves)
//!               │
//!               ├─ up to max_parallel_nodes nodes running (JoinSet)
//!               └─ each capability attempt holds an LlmConcurrencyLimiter permit
//! ```
//!
//! Every node of wave N is terminal before wave N+1 is dispatched. A node's
//! failure never prunes other nodes: dependents still run and see an
//! `omitted` placeholder for the failed dependency.
//!
//! Per attempt, the capability call is bounded by `task_timeout`. Transient
//! failures (and per-attempt timeouts) are retried up to `max_retries` times;
//! permanent failures and empty responses are not retried. The global
//! deadline (or the cancellation token) aborts every in-flight node and skips
//! every node not yet dispatched.

use crate::config::SchedulerParams;
use crate::ports::capability::{Capability, CapabilityPool};
use crate::ports::execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger};
use crate::ports::progress::{NoProgress, WorkforceProgress};
use crate::use_cases::shared::LlmConcurrencyLimiter;
use futures::FutureExt;
use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use workforce_domain::{
    AgentResponse, DependentResult, ExecutionContext, ExecutionWaves, FailureKind, LlmConfig,
    NodeFailure, NodeStatus, Plan, TaskId, ValidationError, validate,
};

/// Input for the ExecutePlan use case
#[derive(Debug, Clone)]
pub struct ExecutePlanInput {
    pub plan: Plan,
    /// Original request, passed to every node
    pub task_description: String,
    /// Plan-wide LLM settings
    pub llm_config: Option<LlmConfig>,
    pub cancellation: Option<CancellationToken>,
}

impl ExecutePlanInput {
    pub fn new(plan: Plan, task_description: impl Into<String>) -> Self {
        Self {
            plan,
            task_description: task_description.into(),
            llm_config: None,
            cancellation: None,
        }
    }

    pub fn with_llm_config(mut self, config: Option<LlmConfig>) -> Self {
        self.llm_config = config;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// How execution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStop {
    /// Every dispatched wave ran to completion
    Completed,
    GlobalTimeout,
    Cancelled,
}

impl ExecutionStop {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStop::Completed => "completed",
            ExecutionStop::GlobalTimeout => "global_timeout",
            ExecutionStop::Cancelled => "cancelled",
        }
    }
}

/// Output of the ExecutePlan use case
#[derive(Debug, Clone)]
pub struct ExecutePlanOutput {
    /// Plan with every node in a terminal state
    pub plan: Plan,
    pub waves: ExecutionWaves,
    pub stop: ExecutionStop,
}

/// Terminal result of one node's retry loop
enum NodeRun {
    Succeeded {
        response: AgentResponse,
        attempts: u32,
    },
    Failed {
        failure: NodeFailure,
        attempts: u32,
    },
}

/// Sent from a running node to the control loop before a retry
struct RetryNotice {
    task_id: TaskId,
    attempt: u32,
    reason: String,
}

/// Use case for executing a plan with bounded parallelism, timeouts and retries
pub struct ExecutePlanUseCase {
    pool: Arc<CapabilityPool>,
    limiter: LlmConcurrencyLimiter,
    params: SchedulerParams,
    logger: Arc<dyn ExecutionLogger>,
}

impl ExecutePlanUseCase {
    pub fn new(
        pool: Arc<CapabilityPool>,
        limiter: LlmConcurrencyLimiter,
        params: SchedulerParams,
    ) -> Self {
        Self {
            pool,
            limiter,
            params,
            logger: Arc::new(NoExecutionLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ExecutionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &SchedulerParams {
        &self.params
    }

    /// Execute the plan with default (no-op) progress
    pub async fn execute(
        &self,
        input: ExecutePlanInput,
    ) -> Result<ExecutePlanOutput, ValidationError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the plan with progress callbacks.
    ///
    /// Fails only if the plan is not a valid DAG; every runtime failure is
    /// recorded on the nodes instead.
    pub async fn execute_with_progress(
        &self,
        input: ExecutePlanInput,
        progress: &dyn WorkforceProgress,
    ) -> Result<ExecutePlanOutput, ValidationError> {
        let ExecutePlanInput {
            mut plan,
            task_description,
            llm_config,
            cancellation,
        } = input;

        let waves = validate(&plan)?;
        let deadline = Instant::now() + self.params.global_timeout;
        let cancel = cancellation.unwrap_or_default();

        info!(
            "Executing plan: {} nodes in {} waves (parallel={}, llm={})",
            plan.nodes.len(),
            waves.len(),
            self.params.max_parallel_nodes,
            self.limiter.limit()
        );
        progress.on_plan_ready(&plan, waves.len());

        for wave in waves.iter().skip(self.params.max_waves) {
            for id in wave {
                self.finish_skipped(
                    &mut plan,
                    id,
                    NodeFailure::new(
                        FailureKind::WaveCapExceeded,
                        format!("beyond the cap of {} waves", self.params.max_waves),
                    ),
                    progress,
                );
            }
        }

        let total_waves = waves.len().min(self.params.max_waves);
        let mut stop = ExecutionStop::Completed;

        for (index, wave) in waves.iter().take(self.params.max_waves).enumerate() {
            if cancel.is_cancelled() {
                stop = ExecutionStop::Cancelled;
                break;
            }
            if Instant::now() >= deadline {
                stop = ExecutionStop::GlobalTimeout;
                break;
            }

            debug!("Wave {}/{}: {} nodes", index + 1, total_waves, wave.len());
            progress.on_wave_start(index, total_waves, wave.len());
            self.logger.log(ExecutionEvent::new(
                "wave_started",
                serde_json::json!({
                    "wave": index,
                    "total_waves": total_waves,
                    "nodes": wave.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                }),
            ));

            stop = self
                .run_wave(
                    &mut plan,
                    wave,
                    &task_description,
                    llm_config.as_ref(),
                    deadline,
                    &cancel,
                    progress,
                )
                .await;

            progress.on_wave_complete(index);
            if stop != ExecutionStop::Completed {
                break;
            }
        }

        if let Some(kind) = stop_failure_kind(stop) {
            warn!("Plan execution stopped early: {}", kind);
            let remaining: Vec<TaskId> = plan
                .nodes
                .iter()
                .filter(|n| !n.status.is_terminal())
                .map(|n| n.id.clone())
                .collect();
            for id in remaining {
                self.finish_skipped(
                    &mut plan,
                    &id,
                    NodeFailure::new(kind, "never dispatched"),
                    progress,
                );
            }
        }

        info!(
            "Plan finished: {} succeeded, {} failed, {} skipped",
            plan.count(NodeStatus::Succeeded),
            plan.count(NodeStatus::Failed),
            plan.count(NodeStatus::Skipped)
        );

        Ok(ExecutePlanOutput { plan, waves, stop })
    }

    /// Run one wave to completion, deadline or cancellation.
    #[allow(clippy::too_many_arguments)]
    async fn run_wave(
        &self,
        plan: &mut Plan,
        wave: &[TaskId],
        task_description: &str,
        llm_config: Option<&LlmConfig>,
        deadline: Instant,
        cancel: &CancellationToken,
        progress: &dyn WorkforceProgress,
    ) -> ExecutionStop {
        let mut queue: VecDeque<TaskId> = wave.iter().cloned().collect();
        let mut join_set: JoinSet<(TaskId, NodeRun)> = JoinSet::new();
        let mut in_flight: HashMap<TaskId, Arc<AtomicU32>> = HashMap::new();
        let (retry_tx, mut retry_rx) = mpsc::unbounded_channel::<RetryNotice>();
        let fan_out = self.params.max_parallel_nodes.max(1);

        loop {
            while join_set.len() < fan_out
                && let Some(id) = queue.pop_front()
            {
                let Some(capability) = plan.node(&id).and_then(|n| self.pool.get(&n.capability))
                else {
                    let name = plan.node(&id).map(|n| n.capability.clone()).unwrap_or_default();
                    warn!("Node {} names unregistered capability '{}'", id, name);
                    self.finish_failed(
                        plan,
                        &id,
                        NodeFailure::new(
                            FailureKind::UnknownCapability,
                            format!("capability '{}' is not registered", name),
                        ),
                        0,
                        progress,
                    );
                    continue;
                };

                let context = build_context(plan, &id, task_description, llm_config);
                if let Some(node) = plan.node_mut(&id) {
                    node.mark_ready();
                    node.mark_running();
                }
                progress.on_node_start(&id, capability.name());

                let attempts = Arc::new(AtomicU32::new(0));
                in_flight.insert(id.clone(), Arc::clone(&attempts));

                let task = run_node(
                    capability,
                    context,
                    self.limiter.clone(),
                    self.params.clone(),
                    Arc::clone(&attempts),
                    retry_tx.clone(),
                );
                let task_id = id.clone();
                join_set.spawn(async move {
                    let run = match AssertUnwindSafe(task).catch_unwind().await {
                        Ok(run) => run,
                        Err(_) => NodeRun::Failed {
                            failure: NodeFailure::new(FailureKind::Panicked, "capability panicked"),
                            attempts: attempts.load(Ordering::SeqCst),
                        },
                    };
                    (task_id, run)
                });
            }

            if join_set.is_empty() {
                return ExecutionStop::Completed;
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    join_set.abort_all();
                    self.fail_in_flight(plan, &in_flight, FailureKind::Cancelled, progress);
                    return ExecutionStop::Cancelled;
                }

                _ = tokio::time::sleep_until(deadline) => {
                    join_set.abort_all();
                    self.fail_in_flight(plan, &in_flight, FailureKind::GlobalTimeout, progress);
                    return ExecutionStop::GlobalTimeout;
                }

                Some(notice) = retry_rx.recv() => {
                    debug!(
                        "Retrying {} (attempt {}): {}",
                        notice.task_id, notice.attempt, notice.reason
                    );
                    progress.on_node_retry(&notice.task_id, notice.attempt, &notice.reason);
                }

                joined = join_set.join_next() => match joined {
                    Some(Ok((id, run))) => {
                        in_flight.remove(&id);
                        match run {
                            NodeRun::Succeeded { response, attempts } => {
                                self.finish_succeeded(plan, &id, response, attempts, progress);
                            }
                            NodeRun::Failed { failure, attempts } => {
                                self.finish_failed(plan, &id, failure, attempts, progress);
                            }
                        }
                    }
                    Some(Err(e)) => {
                        // Only reachable if the task was aborted externally
                        warn!("Node task join error: {}", e);
                    }
                    None => return ExecutionStop::Completed,
                },
            }
        }
    }

    fn fail_in_flight(
        &self,
        plan: &mut Plan,
        in_flight: &HashMap<TaskId, Arc<AtomicU32>>,
        kind: FailureKind,
        progress: &dyn WorkforceProgress,
    ) {
        let mut ids: Vec<&TaskId> = in_flight.keys().collect();
        ids.sort();
        for id in ids {
            let attempts = in_flight
                .get(id)
                .map(|a| a.load(Ordering::SeqCst))
                .unwrap_or_default();
            self.finish_failed(
                plan,
                id,
                NodeFailure::new(kind, "aborted while running"),
                attempts,
                progress,
            );
        }
    }

    fn finish_succeeded(
        &self,
        plan: &mut Plan,
        id: &TaskId,
        response: AgentResponse,
        attempts: u32,
        progress: &dyn WorkforceProgress,
    ) {
        if let Some(node) = plan.node_mut(id) {
            node.mark_succeeded(response, attempts);
        }
        debug!("Node {} succeeded after {} attempt(s)", id, attempts);
        self.report_finished(plan, id, progress);
    }

    fn finish_failed(
        &self,
        plan: &mut Plan,
        id: &TaskId,
        failure: NodeFailure,
        attempts: u32,
        progress: &dyn WorkforceProgress,
    ) {
        warn!(
            "Node {} failed after {} attempt(s): {} ({})",
            id, attempts, failure.kind, failure.message
        );
        if let Some(node) = plan.node_mut(id) {
            node.mark_failed(failure, attempts);
        }
        self.report_finished(plan, id, progress);
    }

    fn finish_skipped(
        &self,
        plan: &mut Plan,
        id: &TaskId,
        failure: NodeFailure,
        progress: &dyn WorkforceProgress,
    ) {
        debug!("Node {} skipped: {}", id, failure.kind);
        if let Some(node) = plan.node_mut(id) {
            node.mark_skipped(failure);
        }
        self.report_finished(plan, id, progress);
    }

    fn report_finished(&self, plan: &Plan, id: &TaskId, progress: &dyn WorkforceProgress) {
        let Some(node) = plan.node(id) else {
            return;
        };
        progress.on_node_finished(id, node.status, node.failure_kind());
        self.logger.log(ExecutionEvent::new(
            "node_finished",
            serde_json::json!({
                "task_id": id.as_str(),
                "capability": node.capability,
                "status": node.status.as_str(),
                "failure_kind": node.failure_kind().map(|k| k.as_str().to_string()),
                "attempts": node.attempts,
            }),
        ));
    }
}

fn stop_failure_kind(stop: ExecutionStop) -> Option<FailureKind> {
    match stop {
        ExecutionStop::Completed => None,
        ExecutionStop::GlobalTimeout => Some(FailureKind::GlobalTimeout),
        ExecutionStop::Cancelled => Some(FailureKind::Cancelled),
    }
}

/// Build a node's context from its terminal dependencies.
///
/// Succeeded dependencies contribute their response; any other outcome
/// becomes an explicit `omitted` entry.
fn build_context(
    plan: &Plan,
    id: &TaskId,
    task_description: &str,
    llm_config: Option<&LlmConfig>,
) -> ExecutionContext {
    let Some(node) = plan.node(id) else {
        return ExecutionContext::new(task_description, id.clone(), "");
    };

    let mut context = ExecutionContext::new(task_description, id.clone(), node.instruction.clone())
        .with_llm_config(llm_config.cloned());

    for dep_id in &node.depends_on {
        let entry = match plan.node(dep_id) {
            Some(dep) => match dep.usable_response() {
                Some(response) => DependentResult::Completed {
                    response: response.clone(),
                },
                None => DependentResult::Omitted {
                    reason: dep.failure_kind().unwrap_or(FailureKind::EmptyResponse),
                },
            },
            None => DependentResult::Omitted {
                reason: FailureKind::Permanent,
            },
        };
        context = context.with_dependent(dep_id.clone(), entry);
    }
    context
}

/// One node's attempt loop. Each attempt holds an LLM permit and is bounded
/// by the per-task timeout; the permit is released during backoff.
async fn run_node(
    capability: Arc<dyn Capability>,
    context: ExecutionContext,
    limiter: LlmConcurrencyLimiter,
    params: SchedulerParams,
    attempts: Arc<AtomicU32>,
    retry_tx: mpsc::UnboundedSender<RetryNotice>,
) -> NodeRun {
    let max_attempts = params.max_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        attempts.store(attempt, Ordering::SeqCst);

        let result = {
            let _permit = limiter.acquire().await;
            tokio::time::timeout(params.task_timeout, capability.process(&context)).await
        };

        let (kind, message) = match result {
            Ok(Ok(response)) if response.is_substantive() => {
                return NodeRun::Succeeded {
                    response,
                    attempts: attempt,
                };
            }
            Ok(Ok(response)) => {
                let message = response
                    .error_message()
                    .unwrap_or("capability returned empty content")
                    .to_string();
                return NodeRun::Failed {
                    failure: NodeFailure::new(FailureKind::EmptyResponse, message),
                    attempts: attempt,
                };
            }
            Ok(Err(e)) if e.is_transient() => (FailureKind::Transient, e.to_string()),
            Ok(Err(e)) => {
                return NodeRun::Failed {
                    failure: NodeFailure::new(FailureKind::Permanent, e.to_string()),
                    attempts: attempt,
                };
            }
            Err(_) => (
                FailureKind::Timeout,
                format!("attempt exceeded {}s", params.task_timeout.as_secs_f64()),
            ),
        };

        if attempt >= max_attempts {
            return NodeRun::Failed {
                failure: NodeFailure::new(kind, message),
                attempts: attempt,
            };
        }

        let _ = retry_tx.send(RetryNotice {
            task_id: context.task_id.clone(),
            attempt: attempt + 1,
            reason: message,
        });
        if !params.retry_backoff.is_zero() {
            tokio::time::sleep(params.retry_backoff).await;
        }
    }
}
