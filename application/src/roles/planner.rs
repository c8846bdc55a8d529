//! Planner backed by an LLM

use crate::ports::llm_gateway::{LlmGateway, LlmPrompt};
use crate::ports::planner::{Planner, PlanningRequest};
use async_trait::async_trait;
use std::sync::Arc;
use workforce_domain::{LlmConfig, Plan, PlanningError, PromptTemplate, parse_plan};

pub struct LlmPlanner {
    gateway: Arc<dyn LlmGateway>,
    config: LlmConfig,
}

impl LlmPlanner {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            config: LlmConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LlmConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, request: &PlanningRequest) -> Result<Plan, PlanningError> {
        let prompt = LlmPrompt::new(
            PromptTemplate::planner_system(),
            PromptTemplate::planner_prompt(
                &request.task_description,
                &request.capabilities,
                &request.precedents,
                request.requirement.as_ref(),
            ),
        );
        let output = self
            .gateway
            .complete(&prompt, &self.config)
            .await
            .map_err(|e| PlanningError::Planner(e.to_string()))?;
        parse_plan(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::roles::testing::CannedGateway;

    fn request() -> PlanningRequest {
        PlanningRequest::new(
            "Review my lease",
            vec![("contract_reviewer".into(), "Reviews contracts".into())],
        )
    }

    #[tokio::test]
    async fn test_plan_block_parsed() {
        let gateway = Arc::new(CannedGateway::ok(
            r#"```plan
{"analysis": "one reviewer", "tasks": [{"id": "T1", "capability": "contract_reviewer", "instruction": "Review", "depends_on": []}]}
```"#,
        ));
        let plan = LlmPlanner::new(gateway.clone()).plan(&request()).await.unwrap();
        assert_eq!(plan.nodes.len(), 1);

        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[0].0.user.contains("contract_reviewer: Reviews contracts"));
    }

    #[tokio::test]
    async fn test_gateway_failure_is_planning_error() {
        let gateway = Arc::new(CannedGateway::err(GatewayError::Timeout));
        let err = LlmPlanner::new(gateway).plan(&request()).await.unwrap_err();
        assert!(matches!(err, PlanningError::Planner(_)));
    }
}
