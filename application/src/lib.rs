//! Application layer for legal-workforce
//!
//! This crate contains use cases, port definitions, LLM-backed role adapters
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod roles;
pub mod use_cases;

// Re-export commonly used types
pub use config::{MemoryParams, SchedulerParams};
pub use ports::{
    arbiter::{ArbitrationError, Arbiter},
    capability::{Capability, CapabilityError, CapabilityPool, PermanentKind, TransientKind},
    execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger},
    experience_store::{ExperienceStore, SearchQuery, StorageError},
    llm_gateway::{GatewayError, LlmGateway, LlmPrompt},
    planner::{Planner, PlanningRequest},
    progress::{NoProgress, WorkforceProgress},
    requirement_analyzer::{AnalyzerError, RequirementAnalyzer},
};
pub use roles::{LlmArbiter, LlmPlanner, LlmRequirementAnalyzer, LlmSpecialist};
pub use use_cases::analyze_requirements::AnalyzeRequirementsUseCase;
pub use use_cases::arbitrate::ArbitrateUseCase;
pub use use_cases::execute_plan::{
    ExecutePlanInput, ExecutePlanOutput, ExecutePlanUseCase, ExecutionStop,
};
pub use use_cases::plan_task::{PlanTaskInput, PlanTaskOutput, PlanTaskUseCase};
pub use use_cases::record_episode::RecordEpisodeUseCase;
pub use use_cases::run_workforce::{
    RunWorkforceError, RunWorkforceUseCase, WorkforceOutcome, WorkforceReport, WorkforceRequest,
};
pub use use_cases::shared::LlmConcurrencyLimiter;
