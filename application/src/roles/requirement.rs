//! Requirement analyzer backed by an LLM

use crate::ports::llm_gateway::{LlmGateway, LlmPrompt};
use crate::ports::requirement_analyzer::{AnalyzerError, RequirementAnalyzer};
use async_trait::async_trait;
use std::sync::Arc;
use workforce_domain::{LlmConfig, PromptTemplate, RequirementAnalysis, parse_requirement_analysis};

pub struct LlmRequirementAnalyzer {
    gateway: Arc<dyn LlmGateway>,
    config: LlmConfig,
}

impl LlmRequirementAnalyzer {
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
impl RequirementAnalyzer for LlmRequirementAnalyzer {
    async fn analyze(
        &self,
        input: &str,
        has_attachments: bool,
    ) -> Result<RequirementAnalysis, AnalyzerError> {
        let prompt = LlmPrompt::new(
            PromptTemplate::requirement_system(),
            PromptTemplate::requirement_prompt(input, has_attachments),
        );
        let output = self
            .gateway
            .complete(&prompt, &self.config)
            .await
            .map_err(|e| AnalyzerError::Unavailable(e.to_string()))?;
        parse_requirement_analysis(&output).ok_or(AnalyzerError::Unparseable)
    }
}
