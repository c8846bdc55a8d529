//! Consensus arbiter backed by an LLM

use crate::ports::arbiter::{ArbitrationError, Arbiter};
use crate::ports::llm_gateway::{LlmGateway, LlmPrompt};
use async_trait::async_trait;
use std::sync::Arc;
use workforce_domain::{LlmConfig, PromptTemplate};

pub struct LlmArbiter {
    gateway: Arc<dyn LlmGateway>,
    config: LlmConfig,
}

impl LlmArbiter {
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
impl Arbiter for LlmArbiter {
    async fn arbitrate(
        &self,
        task_description: &str,
        responses: &[(String, String)],
    ) -> Result<String, ArbitrationError> {
        let prompt = LlmPrompt::new(
            PromptTemplate::arbiter_system(),
            PromptTemplate::arbiter_prompt(task_description, responses),
        );
        self.gateway
            .complete(&prompt, &self.config)
            .await
            .map_err(|e| ArbitrationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::roles::testing::CannedGateway;

    #[tokio::test]
    async fn test_responses_reach_prompt() {
        let gateway = Arc::new(CannedGateway::ok(r#"{"final_decision": "Sign"}"#));
        let arbiter = LlmArbiter::new(gateway.clone());
        let output = arbiter
            .arbitrate(
                "task",
                &[
                    ("contract_reviewer".into(), "Void".into()),
                    ("risk_assessor".into(), "Valid".into()),
                ],
            )
            .await
            .unwrap();

        assert!(output.contains("Sign"));
        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[0].0.user.contains("--- risk_assessor ---"));
    }

    #[tokio::test]
    async fn test_failure_mapped() {
        let gateway = Arc::new(CannedGateway::err(GatewayError::AuthError("bad key".into())));
        let err = LlmArbiter::new(gateway).arbitrate("task", &[]).await.unwrap_err();
        assert!(err.0.contains("bad key"));
    }
}
