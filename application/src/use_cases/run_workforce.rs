//! Run Workforce use case: the submit entrypoint.
//!
//! ```text
//! requirement gate ─► recall precedents ─► plan ─► execute waves
//!        │                                              │
//!        └─ NeedsClarification               arbitrate ◄┘
//!                                                 │
//!                                   aggregate ─► record episode
//! ```
//!
//! Every step degrades instead of failing. The only hard failure surfaced to
//! the caller is a run in which no node produced a usable result.

use crate::ports::progress::{NoProgress, WorkforceProgress};
use crate::use_cases::analyze_requirements::AnalyzeRequirementsUseCase;
use crate::use_cases::arbitrate::ArbitrateUseCase;
use crate::use_cases::execute_plan::{
    ExecutePlanInput, ExecutePlanOutput, ExecutePlanUseCase, ExecutionStop,
};
use crate::use_cases::plan_task::{PlanTaskInput, PlanTaskUseCase};
use crate::use_cases::record_episode::RecordEpisodeUseCase;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use workforce_domain::{
    AggregationError, DomainError, EpisodeId, Feedback, FinalResult, LlmConfig, NodeOutcome,
    Plan, RequirementAnalysis, TaskDescription, ValidationError, aggregate,
};

/// Errors surfaced by [`RunWorkforceUseCase::submit`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunWorkforceError {
    #[error("Task description cannot be empty")]
    EmptyTask,

    #[error("Invalid request: {0}")]
    InvalidRequest(DomainError),

    /// Every node failed or was skipped; the message names each node's failure kind
    #[error("No task produced a usable result: {0}")]
    NoSuccessfulNodes(String),

    /// The scheduler rejected even the single-node fallback plan
    #[error("Plan rejected: {0}")]
    InvalidPlan(ValidationError),
}

impl From<DomainError> for RunWorkforceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::EmptyTask => RunWorkforceError::EmptyTask,
            other => RunWorkforceError::InvalidRequest(other),
        }
    }
}

impl From<AggregationError> for RunWorkforceError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::NoSuccessfulNodes(explanation) => {
                RunWorkforceError::NoSuccessfulNodes(explanation)
            }
        }
    }
}

/// A request submitted to the workforce
#[derive(Debug, Clone, Default)]
pub struct WorkforceRequest {
    pub task: String,
    pub has_attachments: bool,
    pub llm_config: Option<LlmConfig>,
    /// Caller metadata, stored with the episode
    pub metadata: Map<String, Value>,
    /// Plan even if the requirement gate finds the request incomplete
    pub skip_requirement_check: bool,
    /// Feedback known at submission time
    pub feedback: Option<Feedback>,
    pub cancellation: Option<CancellationToken>,
}

impl WorkforceRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Default::default()
        }
    }

    pub fn with_attachments(mut self, has_attachments: bool) -> Self {
        self.has_attachments = has_attachments;
        self
    }

    pub fn with_llm_config(mut self, config: LlmConfig) -> Self {
        self.llm_config = Some(config);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn skip_requirement_check(mut self) -> Self {
        self.skip_requirement_check = true;
        self
    }

    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct WorkforceReport {
    /// Plan rationale
    pub analysis: String,
    /// Plan with every node terminal
    pub plan: Plan,
    pub node_results: Vec<NodeOutcome>,
    pub final_result: FinalResult,
    pub episode_id: Option<EpisodeId>,
    /// Gate output, when the gate ran
    pub requirement: Option<RequirementAnalysis>,
    pub precedents_used: usize,
    pub fallback_reason: Option<String>,
    pub stop: ExecutionStop,
}

/// Result of a submission
#[derive(Debug, Clone)]
pub enum WorkforceOutcome {
    Completed(Box<WorkforceReport>),
    /// The request lacks information; ask the user these questions first
    NeedsClarification(RequirementAnalysis),
}

impl WorkforceOutcome {
    pub fn report(&self) -> Option<&WorkforceReport> {
        match self {
            WorkforceOutcome::Completed(report) => Some(report),
            WorkforceOutcome::NeedsClarification(_) => None,
        }
    }
}

pub struct RunWorkforceUseCase {
    gate: AnalyzeRequirementsUseCase,
    planner: PlanTaskUseCase,
    executor: ExecutePlanUseCase,
    arbiter: ArbitrateUseCase,
    recorder: RecordEpisodeUseCase,
}

impl RunWorkforceUseCase {
    pub fn new(
        gate: AnalyzeRequirementsUseCase,
        planner: PlanTaskUseCase,
        executor: ExecutePlanUseCase,
        arbiter: ArbitrateUseCase,
        recorder: RecordEpisodeUseCase,
    ) -> Self {
        Self {
            gate,
            planner,
            executor,
            arbiter,
            recorder,
        }
    }

    pub fn recorder(&self) -> &RecordEpisodeUseCase {
        &self.recorder
    }

    pub async fn submit(
        &self,
        request: WorkforceRequest,
    ) -> Result<WorkforceOutcome, RunWorkforceError> {
        self.submit_with_progress(request, &NoProgress).await
    }

    pub async fn submit_with_progress(
        &self,
        request: WorkforceRequest,
        progress: &dyn WorkforceProgress,
    ) -> Result<WorkforceOutcome, RunWorkforceError> {
        let submitted_at = chrono::Utc::now().to_rfc3339();
        let task = TaskDescription::try_new(request.task.clone())?;

        let requirement = if request.skip_requirement_check {
            None
        } else {
            let analysis = self
                .gate
                .execute(task.content(), request.has_attachments)
                .await;
            if !analysis.is_complete {
                info!(
                    "Request incomplete (score {:.2}); asking {} question(s)",
                    analysis.completeness_score,
                    analysis.guidance_questions.len()
                );
                return Ok(WorkforceOutcome::NeedsClarification(analysis));
            }
            Some(analysis)
        };

        let precedents = self.recorder.recall(task.content()).await;
        let precedents_used = precedents.len();

        let planned = self
            .planner
            .execute(
                PlanTaskInput::new(task.content())
                    .with_precedents(precedents)
                    .with_requirement(requirement.clone()),
            )
            .await;
        let mut fallback_reason = planned.fallback_reason.clone();

        let executed = self
            .execute_or_fallback(
                planned.plan,
                task.content(),
                &request,
                &mut fallback_reason,
                progress,
            )
            .await?;
        let plan = executed.plan;

        let arbitration = self
            .arbiter
            .execute_with_progress(task.content(), &plan.usable_responses(), progress)
            .await;
        let final_result = aggregate(&plan, arbitration)?;

        let mut metadata = request.metadata;
        metadata.insert("submitted_at".into(), Value::from(submitted_at));
        metadata.insert("priority".into(), Value::from(plan.priority.as_str()));
        metadata.insert("waves".into(), Value::from(executed.waves.len()));
        metadata.insert("stop".into(), Value::from(executed.stop.as_str()));
        metadata.insert(
            "capabilities".into(),
            Value::from(
                plan.nodes
                    .iter()
                    .map(|n| n.capability.clone())
                    .collect::<Vec<_>>(),
            ),
        );
        if let Some(reason) = &fallback_reason {
            metadata.insert("fallback_reason".into(), Value::from(reason.as_str()));
        }

        let episode_id = self
            .recorder
            .persist(
                task.content(),
                &plan,
                &final_result,
                request.feedback,
                metadata,
            )
            .await;

        info!(
            "Run finished: {} succeeded, {} failed, {} skipped",
            final_result.succeeded, final_result.failed, final_result.skipped
        );

        Ok(WorkforceOutcome::Completed(Box::new(WorkforceReport {
            analysis: plan.analysis.clone(),
            node_results: final_result.nodes.clone(),
            plan,
            final_result,
            episode_id,
            requirement,
            precedents_used,
            fallback_reason,
            stop: executed.stop,
        })))
    }

    /// Run `plan`; if the scheduler rejects it, run the generalist fallback instead.
    async fn execute_or_fallback(
        &self,
        plan: Plan,
        task: &str,
        request: &WorkforceRequest,
        fallback_reason: &mut Option<String>,
        progress: &dyn WorkforceProgress,
    ) -> Result<ExecutePlanOutput, RunWorkforceError> {
        let input = |plan: Plan| {
            let mut input =
                ExecutePlanInput::new(plan, task).with_llm_config(request.llm_config.clone());
            input.cancellation = request.cancellation.clone();
            input
        };

        match self.executor.execute_with_progress(input(plan), progress).await {
            Ok(out) => Ok(out),
            Err(e) => {
                warn!("Plan rejected by scheduler: {}; using fallback plan", e);
                let reason = e.to_string();
                let fallback = self.planner.fallback(task, &reason);
                *fallback_reason = Some(reason);
                self.executor
                    .execute_with_progress(input(fallback.plan), progress)
                    .await
                    .map_err(RunWorkforceError::InvalidPlan)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryParams, SchedulerParams};
    use crate::ports::arbiter::{ArbitrationError, Arbiter};
    use crate::ports::capability::{Capability, CapabilityError, CapabilityPool, PermanentKind};
    use crate::ports::experience_store::{ExperienceStore, SearchQuery, StorageError};
    use crate::ports::planner::{Planner, PlanningRequest};
    use crate::ports::requirement_analyzer::{AnalyzerError, RequirementAnalyzer};
    use crate::use_cases::shared::LlmConcurrencyLimiter;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use workforce_domain::{
        AgentResponse, Episode, ExecutionContext, PlanningError, ScoredEpisode, TaskNode,
    };

    struct Specialist {
        name: &'static str,
        fails: bool,
    }

    #[async_trait]
    impl Capability for Specialist {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "specialist"
        }

        async fn process(
            &self,
            context: &ExecutionContext,
        ) -> Result<AgentResponse, CapabilityError> {
            if self.fails {
                return Err(CapabilityError::permanent(PermanentKind::Validation, "bad input"));
            }
            Ok(AgentResponse::new(self.name, format!("{}: {}", self.name, context.instruction)))
        }
    }

    struct FixedPlanner(Plan);

    #[async_trait]
    impl Planner for FixedPlanner {
        async fn plan(&self, _request: &PlanningRequest) -> Result<Plan, PlanningError> {
            Ok(self.0.clone())
        }
    }

    struct CountingArbiter(AtomicUsize);

    #[async_trait]
    impl Arbiter for CountingArbiter {
        async fn arbitrate(
            &self,
            _task_description: &str,
            _responses: &[(String, String)],
        ) -> Result<String, ArbitrationError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"final_decision": "Combined advice", "risk_level": "medium"}"#.to_string())
        }
    }

    struct ScoreAnalyzer(f64);

    #[async_trait]
    impl RequirementAnalyzer for ScoreAnalyzer {
        async fn analyze(
            &self,
            _input: &str,
            _has_attachments: bool,
        ) -> Result<RequirementAnalysis, AnalyzerError> {
            let mut analysis = RequirementAnalysis::complete(self.0);
            analysis.missing_elements = vec!["contract date".into(), "counterparty".into()];
            Ok(analysis)
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        episodes: Mutex<Vec<Episode>>,
    }

    #[async_trait]
    impl ExperienceStore for MemoryStore {
        async fn add(&self, episode: Episode) -> Result<EpisodeId, StorageError> {
            self.episodes.lock().unwrap().push(episode);
            Ok(EpisodeId::new("ep-1"))
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<ScoredEpisode>, StorageError> {
            Ok(Vec::new())
        }

        async fn attach_feedback(
            &self,
            _id: &EpisodeId,
            _feedback: Feedback,
        ) -> Result<(), StorageError> {
            Ok(())
        }
    }

    struct Harness {
        arbiter: Arc<CountingArbiter>,
        store: Arc<MemoryStore>,
        use_case: RunWorkforceUseCase,
    }

    fn harness(plan: Plan, score: f64, failing: &[&'static str]) -> Harness {
        let pool = ["legal_advisor", "contract_reviewer", "risk_assessor"]
            .into_iter()
            .fold(CapabilityPool::new("legal_advisor"), |p, name| {
                p.register(Arc::new(Specialist {
                    name,
                    fails: failing.contains(&name),
                }))
            });
        let pool = Arc::new(pool);
        let limiter = LlmConcurrencyLimiter::new(4);
        let arbiter = Arc::new(CountingArbiter(AtomicUsize::new(0)));
        let store = Arc::new(MemoryStore::default());
        let timeout = Duration::from_secs(30);

        let use_case = RunWorkforceUseCase::new(
            AnalyzeRequirementsUseCase::new(
                Some(Arc::new(ScoreAnalyzer(score))),
                limiter.clone(),
                timeout,
            ),
            PlanTaskUseCase::new(
                Some(Arc::new(FixedPlanner(plan))),
                Arc::clone(&pool),
                limiter.clone(),
                timeout,
            ),
            ExecutePlanUseCase::new(
                pool,
                limiter.clone(),
                SchedulerParams::default().with_retry_backoff(Duration::ZERO),
            ),
            ArbitrateUseCase::new(
                Some(arbiter.clone() as Arc<dyn Arbiter>),
                limiter,
                timeout,
            ),
            RecordEpisodeUseCase::new(
                Some(store.clone() as Arc<dyn ExperienceStore>),
                MemoryParams::default(),
            ),
        );
        Harness {
            arbiter,
            store,
            use_case,
        }
    }

    fn single_plan() -> Plan {
        Plan::new("Contract review only")
            .with_node(TaskNode::new("T1", "contract_reviewer", "Review the lease"))
    }

    fn fan_in_plan() -> Plan {
        Plan::new("Review then assess")
            .with_node(TaskNode::new("T1", "contract_reviewer", "Review"))
            .with_node(TaskNode::new("T2", "risk_assessor", "Assess"))
            .with_node(
                TaskNode::new("T3", "legal_advisor", "Advise")
                    .with_dependency("T1")
                    .with_dependency("T2"),
            )
    }

    #[tokio::test]
    async fn test_single_node_run_skips_arbiter() {
        let h = harness(single_plan(), 0.9, &[]);
        let outcome = h.use_case.submit(WorkforceRequest::new("Review my lease")).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.node_results.len(), 1);
        assert!(report.final_result.arbitration.is_none());
        assert_eq!(report.final_result.answer, "contract_reviewer: Review the lease");
        assert_eq!(h.arbiter.0.load(Ordering::SeqCst), 0);
        assert_eq!(report.episode_id, Some(EpisodeId::new("ep-1")));
    }

    #[tokio::test]
    async fn test_multi_node_run_arbitrates_and_records() {
        let h = harness(fan_in_plan(), 0.9, &[]);
        let request =
            WorkforceRequest::new("Review and assess my lease").with_metadata("user", "u-42");
        let outcome = h.use_case.submit(request).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(h.arbiter.0.load(Ordering::SeqCst), 1);
        assert_eq!(report.final_result.answer, "Combined advice");
        assert_eq!(report.final_result.succeeded, 3);

        let episodes = h.store.episodes.lock().unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].metadata["user"], "u-42");
        assert_eq!(episodes[0].metadata["waves"], 2);
        assert!(episodes[0].metadata.contains_key("submitted_at"));
    }

    #[tokio::test]
    async fn test_incomplete_request_needs_clarification() {
        let h = harness(single_plan(), 0.2, &[]);
        let outcome = h.use_case.submit(WorkforceRequest::new("help")).await.unwrap();

        match outcome {
            WorkforceOutcome::NeedsClarification(analysis) => {
                assert!(!analysis.is_complete);
                assert!(analysis.guidance_questions.len() >= 2);
            }
            other => panic!("expected clarification, got {:?}", other),
        }
        assert!(h.store.episodes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_skip_requirement_check() {
        let h = harness(single_plan(), 0.2, &[]);
        let outcome = h
            .use_case
            .submit(WorkforceRequest::new("help").skip_requirement_check())
            .await
            .unwrap();
        let report = outcome.report().unwrap();
        assert!(report.requirement.is_none());
    }

    #[tokio::test]
    async fn test_all_nodes_failing_is_a_hard_error() {
        let h = harness(single_plan(), 0.9, &["contract_reviewer"]);
        let err = h
            .use_case
            .submit(WorkforceRequest::new("Review my lease"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RunWorkforceError::NoSuccessfulNodes("T1 (contract_reviewer): PermanentError".into())
        );
    }

    #[tokio::test]
    async fn test_partial_failure_still_answers() {
        let h = harness(fan_in_plan(), 0.9, &["risk_assessor"]);
        let outcome = h.use_case.submit(WorkforceRequest::new("Review and assess")).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.final_result.failed, 1);
        assert_eq!(report.final_result.succeeded, 2);
    }

    #[tokio::test]
    async fn test_rejected_plan_runs_fallback() {
        let h = harness(single_plan(), 0.9, &[]);
        let cyclic = Plan::new("loop")
            .with_node(TaskNode::new("T1", "contract_reviewer", "a").with_dependency("T2"))
            .with_node(TaskNode::new("T2", "risk_assessor", "b").with_dependency("T1"));
        let request = WorkforceRequest::new("Review my lease");
        let mut fallback_reason = None;

        let executed = h
            .use_case
            .execute_or_fallback(
                cyclic,
                "Review my lease",
                &request,
                &mut fallback_reason,
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(executed.plan.nodes.len(), 1);
        assert_eq!(executed.plan.nodes[0].capability, "legal_advisor");
        assert_eq!(executed.plan.count(workforce_domain::NodeStatus::Succeeded), 1);
        assert!(fallback_reason.unwrap().contains("T1"));
    }

    #[test]
    fn test_domain_errors_keep_their_cause() {
        assert_eq!(
            RunWorkforceError::from(DomainError::EmptyTask),
            RunWorkforceError::EmptyTask
        );
        assert_eq!(
            RunWorkforceError::from(DomainError::InvalidRating(9)),
            RunWorkforceError::InvalidRequest(DomainError::InvalidRating(9))
        );
    }

    #[tokio::test]
    async fn test_empty_task_rejected() {
        let h = harness(single_plan(), 0.9, &[]);
        let err = h.use_case.submit(WorkforceRequest::new("   ")).await.unwrap_err();
        assert_eq!(err, RunWorkforceError::EmptyTask);
    }
}
