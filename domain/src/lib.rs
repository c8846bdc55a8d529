//! Domain layer for legal-workforce
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns, and no
//! async code: every algorithm here is synchronous and pure.
//!
//! # Core Concepts
//!
//! ## Plan
//!
//! A request is decomposed into a [`Plan`]: a DAG of [`TaskNode`]s, each
//! routed to a named specialist capability. [`validate`] checks the DAG and
//! partitions it into [`ExecutionWaves`].
//!
//! ## Consensus
//!
//! When several specialists answer, their conclusions are reconciled into a
//! [`Verdict`] of explicit [`Conflict`] records scored on a weighted rubric.
//!
//! ## Memory
//!
//! Finished runs become [`Episode`]s. User ratings re-weight future search
//! results through [`rank`].
//!
//! ```text
//! RequirementAnalysis → Plan → ExecutionWaves → AgentResponse*
//!                                   → ArbitrationOutcome → FinalResult → Episode
//! ```

pub mod agent;
pub mod consensus;
pub mod core;
pub mod memory;
pub mod outcome;
pub mod plan;
pub mod prompt;
pub mod requirement;

// Re-export commonly used types
pub use agent::{
    context::{DependentResult, ExecutionContext, LlmConfig},
    response::AgentResponse,
};
pub use consensus::{
    ArbitrationOutcome, Conflict, Position, RiskLevel, RubricScores, Verdict,
    interpret_arbiter_output,
};
pub use core::{error::DomainError, task::TaskDescription};
pub use memory::{Episode, EpisodeId, Feedback, RatingWeighting, ScoredEpisode, rank};
pub use outcome::{AggregationError, FinalResult, NodeOutcome, aggregate};
pub use plan::{
    ExecutionWaves, FailureKind, NodeFailure, NodeStatus, Plan, PlanningError, Priority, TaskId,
    TaskNode, ValidationError, fallback_plan, parse_plan, validate,
};
pub use prompt::PromptTemplate;
pub use requirement::{
    COMPLETENESS_THRESHOLD, Complexity, GuidanceQuestion, RequirementAnalysis,
    classify_by_keywords, parse_requirement_analysis,
};
