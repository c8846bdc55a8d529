//! LLM Gateway port
//!
//! Defines the interface for single-shot completions against an LLM provider.
//! Capabilities, the planner, the arbiter and the requirement analyzer all
//! reach the model through this port.

use async_trait::async_trait;
use thiserror::Error;
use workforce_domain::LlmConfig;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Timeout")]
    Timeout,

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Provider error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    ProviderError {
        status: Option<u16>,
        message: String,
    },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Content rejected by provider policy: {0}")]
    ContentPolicy(String),
}

impl GatewayError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::RateLimited
            | GatewayError::Timeout
            | GatewayError::ConnectionError(_) => true,
            GatewayError::ProviderError { status, .. } => status.is_none_or(|s| s >= 500),
            GatewayError::AuthError(_) | GatewayError::ContentPolicy(_) => false,
        }
    }
}

/// System + user prompt pair for one completion
#[derive(Debug, Clone, PartialEq)]
pub struct LlmPrompt {
    pub system: String,
    pub user: String,
}

impl LlmPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to LLM providers.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Run one completion and return the raw text
    async fn complete(
        &self,
        prompt: &LlmPrompt,
        config: &LlmConfig,
    ) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::RateLimited.is_transient());
        assert!(GatewayError::Timeout.is_transient());
        assert!(GatewayError::ConnectionError("reset".into()).is_transient());
        assert!(
            GatewayError::ProviderError {
                status: Some(503),
                message: "unavailable".into()
            }
            .is_transient()
        );
        assert!(
            !GatewayError::ProviderError {
                status: Some(400),
                message: "bad request".into()
            }
            .is_transient()
        );
        assert!(!GatewayError::AuthError("bad key".into()).is_transient());
        assert!(!GatewayError::ContentPolicy("refused".into()).is_transient());
    }

    #[test]
    fn test_provider_error_display() {
        let err = GatewayError::ProviderError {
            status: Some(502),
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "Provider error (HTTP 502): bad gateway");
    }
}
