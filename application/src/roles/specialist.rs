//! Specialist capability backed by an LLM

use crate::ports::capability::{Capability, CapabilityError};
use crate::ports::llm_gateway::{LlmGateway, LlmPrompt};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use workforce_domain::{AgentResponse, ExecutionContext, LlmConfig, PromptTemplate};

/// A named legal specialist (contract reviewer, risk assessor, ...)
pub struct LlmSpecialist {
    name: String,
    description: String,
    gateway: Arc<dyn LlmGateway>,
    /// Role defaults; the plan-wide config overrides them
    config: LlmConfig,
}

impl LlmSpecialist {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        gateway: Arc<dyn LlmGateway>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
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
impl Capability for LlmSpecialist {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn process(&self, context: &ExecutionContext) -> Result<AgentResponse, CapabilityError> {
        let prompt = LlmPrompt::new(
            PromptTemplate::specialist_system(&self.name, &self.description),
            PromptTemplate::specialist_prompt(context),
        );
        let config = match &context.llm_config {
            Some(overlay) => self.config.merged_with(overlay),
            None => self.config.clone(),
        };

        debug!("{} working on {}", self.name, context.task_id);
        let output = self.gateway.complete(&prompt, &config).await?;
        Ok(AgentResponse::from_llm_output(&self.name, &output))
    }
}
