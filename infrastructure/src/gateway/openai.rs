//! OpenAI-compatible chat-completions gateway.
//!
//! Works with any endpoint speaking the `/chat/completions` protocol
//! (OpenAI, Azure OpenAI, vLLM, LM Studio, ...). The HTTP connection pool is
//! sized to at least the scheduler's LLM concurrency so capability calls
//! never queue behind each other for a socket.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use workforce_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmPrompt};
use workforce_domain::LlmConfig;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiGateway {
    /// Build a gateway whose connection pool holds `pool_size` idle
    /// connections per host.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
        pool_size: usize,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .pool_max_idle_per_host(pool_size.max(1))
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(
        &self,
        prompt: &LlmPrompt,
        config: &LlmConfig,
    ) -> Result<String, GatewayError> {
        let request = build_request(prompt, config);
        debug!("POST {} (model {})", self.endpoint(), request.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }
        extract_text(&body)
    }
}

fn build_request<'a>(prompt: &'a LlmPrompt, config: &'a LlmConfig) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if !prompt.system.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: &prompt.system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &prompt.user,
    });

    ChatRequest {
        model: config.model.as_deref().unwrap_or(DEFAULT_MODEL),
        messages,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

fn classify_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else if err.is_connect() || err.is_request() {
        GatewayError::ConnectionError(err.to_string())
    } else {
        GatewayError::ProviderError {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

fn classify_status(status: StatusCode, body: &str) -> GatewayError {
    let message = body.trim().to_string();
    match status {
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::AuthError(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        s if s == StatusCode::BAD_REQUEST && body.contains("content_policy") => {
            GatewayError::ContentPolicy(message)
        }
        s => GatewayError::ProviderError {
            status: Some(s.as_u16()),
            message,
        },
    }
}

fn extract_text(body: &str) -> Result<String, GatewayError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::ProviderError {
            status: None,
            message: format!("unreadable response: {}", e),
        })?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::ProviderError {
            status: None,
            message: "response contained no choices".to_string(),
        })?;

    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(GatewayError::ContentPolicy(
            "completion stopped by content filter".to_string(),
        ));
    }
    Ok(choice.message.content.unwrap_or_default())
}
