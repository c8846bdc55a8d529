//! Planner port
//!
//! Turns a task description into a plan. How the rationale is produced is
//! opaque to the application; only the typed result matters.

use async_trait::async_trait;
use workforce_domain::{Plan, PlanningError, RequirementAnalysis, ScoredEpisode};

/// Everything the planner may use to build a plan
#[derive(Debug, Clone)]
pub struct PlanningRequest {
    pub task_description: String,
    /// `(name, description)` of every registered capability
    pub capabilities: Vec<(String, String)>,
    /// Similar past episodes, best first
    pub precedents: Vec<ScoredEpisode>,
    /// Output of the requirement gate, if it ran
    pub requirement: Option<RequirementAnalysis>,
}

impl PlanningRequest {
    pub fn new(task_description: impl Into<String>, capabilities: Vec<(String, String)>) -> Self {
        Self {
            task_description: task_description.into(),
            capabilities,
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

/// Produces a plan for a request
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, request: &PlanningRequest) -> Result<Plan, PlanningError>;
}
