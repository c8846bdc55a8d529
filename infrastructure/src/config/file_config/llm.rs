//! LLM provider configuration from TOML (`[llm]` section)
//!
//! Any OpenAI-compatible chat-completions endpoint works.
//!
//! ```toml
//! [llm]
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! model = "gpt-4o-mini"
//! planner_model = "gpt-4o"
//! temperature = 0.2
//! request_timeout_secs = 110
//! ```

use serde::{Deserialize, Serialize};
use workforce_domain::LlmConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Base URL up to (not including) `/chat/completions`
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (not recommended; use the env var instead)
    pub api_key: Option<String>,
    /// Default model for every role
    pub model: String,
    /// Model override for the planner
    pub planner_model: Option<String>,
    /// Model override for the consensus arbiter
    pub arbiter_model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// HTTP client timeout per request
    pub request_timeout_secs: u64,
    /// Idle connections kept per host; `None` sizes it to `llm_concurrency`
    pub pool_size: Option<usize>,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            planner_model: None,
            arbiter_model: None,
            temperature: Some(0.2),
            max_tokens: None,
            request_timeout_secs: 110,
            pool_size: None,
        }
    }
}

impl FileLlmConfig {
    /// The configured key, falling back to the named environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Default LLM settings shared by every role
    pub fn to_llm_config(&self) -> LlmConfig {
        LlmConfig {
            model: Some(self.model.clone()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn planner_config(&self) -> LlmConfig {
        let base = self.to_llm_config();
        match &self.planner_model {
            Some(model) => base.with_model(model.clone()),
            None => base,
        }
    }

    pub fn arbiter_config(&self) -> LlmConfig {
        let base = self.to_llm_config();
        match &self.arbiter_model {
            Some(model) => base.with_model(model.clone()),
            None => base,
        }
    }

    /// Connection pool size, never below `llm_concurrency`
    pub fn effective_pool_size(&self, llm_concurrency: usize) -> usize {
        self.pool_size.unwrap_or(llm_concurrency).max(llm_concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_overrides() {
        let config: FileLlmConfig = toml::from_str(
            r#"
model = "small"
arbiter_model = "large"
"#,
        )
        .unwrap();

        assert_eq!(config.planner_config().model.as_deref(), Some("small"));
        assert_eq!(config.arbiter_config().model.as_deref(), Some("large"));
    }

    #[test]
    fn test_pool_never_below_concurrency() {
        let mut config = FileLlmConfig::default();
        assert_eq!(config.effective_pool_size(15), 15);
        config.pool_size = Some(4);
        assert_eq!(config.effective_pool_size(15), 15);
        config.pool_size = Some(64);
        assert_eq!(config.effective_pool_size(15), 64);
    }

    #[test]
    fn test_inline_key_wins() {
        let config = FileLlmConfig {
            api_key: Some("sk-inline".into()),
            api_key_env: "WORKFORCE_TEST_UNSET_KEY_VAR".into(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-inline"));
    }
}
