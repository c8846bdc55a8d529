//! Per-dispatch execution context handed to a capability.

use super::response::AgentResponse;
use crate::plan::entities::FailureKind;
use crate::plan::value_objects::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// LLM settings shared by every node of a plan.
///
/// All fields are optional; unset fields fall back to the gateway defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LlmConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Overlay `other` on top of `self`: fields set in `other` win.
    pub fn merged_with(&self, other: &LlmConfig) -> LlmConfig {
        LlmConfig {
            model: other.model.clone().or_else(|| self.model.clone()),
            temperature: other.temperature.or(self.temperature),
            max_tokens: other.max_tokens.or(self.max_tokens),
        }
    }
}

/// What a dependent node sees for one of its declared dependencies.
///
/// Failed or timed-out dependencies are never missing from the map; they
/// appear as an explicit `omitted` entry so the dependent can proceed with
/// partial context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DependentResult {
    Completed { response: AgentResponse },
    Omitted { reason: FailureKind },
}

impl DependentResult {
    pub fn is_omitted(&self) -> bool {
        matches!(self, DependentResult::Omitted { .. })
    }

    pub fn response(&self) -> Option<&AgentResponse> {
        match self {
            DependentResult::Completed { response } => Some(response),
            DependentResult::Omitted { .. } => None,
        }
    }
}

/// Input for one capability dispatch.
///
/// Built by the scheduler immediately before dispatch and never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The original request the plan was built for
    pub task_description: String,
    /// Node this context was built for
    pub task_id: TaskId,
    /// The node's own instruction
    pub instruction: String,
    /// Plan-wide LLM configuration
    pub llm_config: Option<LlmConfig>,
    /// One entry per declared dependency
    pub dependent_results: BTreeMap<TaskId, DependentResult>,
}

impl ExecutionContext {
    pub fn new(
        task_description: impl Into<String>,
        task_id: impl Into<TaskId>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            task_description: task_description.into(),
            task_id: task_id.into(),
            instruction: instruction.into(),
            llm_config: None,
            dependent_results: BTreeMap::new(),
        }
    }

    pub fn with_llm_config(mut self, config: Option<LlmConfig>) -> Self {
        self.llm_config = config;
        self
    }

    pub fn with_dependent(mut self, task_id: impl Into<TaskId>, result: DependentResult) -> Self {
        self.dependent_results.insert(task_id.into(), result);
        self
    }

    /// Render upstream results as a prompt section.
    pub fn dependents_prompt_section(&self) -> String {
        if self.dependent_results.is_empty() {
            return String::new();
        }

        let mut section = String::from("Results from prerequisite tasks:\n");
        for (id, result) in &self.dependent_results {
            match result {
                DependentResult::Completed { response } => {
                    section.push_str(&format!(
                        "\n--- {} ({}) ---\n{}\n",
                        id, response.agent_name, response.content
                    ));
                }
                DependentResult::Omitted { reason } => {
                    section.push_str(&format!(
                        "\n--- {} ---\n[omitted: prerequisite did not complete ({})]\n",
                        id, reason
                    ));
                }
            }
        }
        section
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_merge() {
        let base = LlmConfig::default()
            .with_model("base-model")
            .with_temperature(0.2);
        let overlay = LlmConfig::default().with_model("override").with_max_tokens(512);

        let merged = base.merged_with(&overlay);
        assert_eq!(merged.model.as_deref(), Some("override"));
        assert_eq!(merged.temperature, Some(0.2));
        assert_eq!(merged.max_tokens, Some(512));
    }

    #[test]
    fn test_omitted_serializes_with_status_tag() {
        let omitted = DependentResult::Omitted {
            reason: FailureKind::Timeout,
        };
        let json = serde_json::to_value(&omitted).unwrap();
        assert_eq!(json["status"], "omitted");
    }

    #[test]
    fn test_dependents_prompt_section() {
        let ctx = ExecutionContext::new("Assess the lease", "T3", "Summarize")
            .with_dependent(
                "T1",
                DependentResult::Completed {
                    response: AgentResponse::new("contract_reviewer", "Clause 7 is one-sided."),
                },
            )
            .with_dependent(
                "T2",
                DependentResult::Omitted {
                    reason: FailureKind::Permanent,
                },
            );

        let section = ctx.dependents_prompt_section();
        assert!(section.contains("Clause 7 is one-sided."));
        assert!(section.contains("[omitted: prerequisite did not complete"));
    }

    #[test]
    fn test_empty_dependents_section() {
        let ctx = ExecutionContext::new("task", "T1", "do it");
        assert!(ctx.dependents_prompt_section().is_empty());
    }
}
