//! Normalized specialist response.
//!
//! Every capability answers with an [`AgentResponse`]. Boundary adapters
//! normalize provider output exactly once (see [`AgentResponse::from_llm_output`]);
//! everything downstream relies on the required fields being present.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output of a single capability execution.
///
/// Invariant: a response whose `content` is blank always has `error == true`.
/// The invariant is enforced by every constructor and on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAgentResponse")]
pub struct AgentResponse {
    /// Name of the capability (specialist) that produced this response
    pub agent_name: String,
    /// Main answer text
    pub content: String,
    /// Optional chain of reasoning shown alongside the answer
    pub reasoning: Option<String>,
    /// Statutes, cases or documents cited
    pub citations: Vec<String>,
    /// Recommended follow-up actions
    pub actions: Vec<String>,
    /// Free-form metadata
    pub metadata: Map<String, Value>,
    /// Whether this response represents a failure
    pub error: bool,
}

impl AgentResponse {
    /// Create a response with the given content.
    ///
    /// Blank content marks the response as an error.
    pub fn new(agent_name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            agent_name: agent_name.into(),
            error: content.trim().is_empty(),
            content,
            reasoning: None,
            citations: Vec::new(),
            actions: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Create an error response carrying a message in its metadata.
    pub fn failure(agent_name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut response = Self::new(agent_name, "");
        response
            .metadata
            .insert("error_message".to_string(), Value::String(message.into()));
        response.error = true;
        response
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        let reasoning = reasoning.into();
        if !reasoning.trim().is_empty() {
            self.reasoning = Some(reasoning);
        }
        self
    }

    pub fn with_citation(mut self, citation: impl Into<String>) -> Self {
        self.citations.push(citation.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether this response can feed consensus and aggregation
    pub fn is_substantive(&self) -> bool {
        !self.error && !self.content.trim().is_empty()
    }

    /// Error message recorded by [`AgentResponse::failure`], if any
    pub fn error_message(&self) -> Option<&str> {
        self.metadata.get("error_message").and_then(|v| v.as_str())
    }

    /// Normalize raw LLM output into a response.
    ///
    /// Accepts either a JSON object (optionally inside a ` ```json ` fence)
    /// with `content`/`reasoning`/`citations`/`actions` fields, or plain text
    /// which becomes the content verbatim.
    pub fn from_llm_output(agent_name: impl Into<String>, output: &str) -> Self {
        let agent_name = agent_name.into();

        if let Some(json) = extract_json_object(output)
            && let Ok(mut raw) = serde_json::from_str::<RawAgentResponse>(json)
            && raw.content.as_deref().is_some_and(|c| !c.trim().is_empty())
        {
            raw.agent_name = Some(agent_name);
            return raw.into();
        }

        Self::new(agent_name, output.trim())
    }
}

/// Wire shape accepted at the boundary; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAgentResponse {
    #[serde(alias = "agent")]
    agent_name: Option<String>,
    #[serde(alias = "answer", alias = "analysis")]
    content: Option<String>,
    reasoning: Option<String>,
    #[serde(alias = "references", alias = "legal_basis")]
    citations: Vec<String>,
    #[serde(alias = "recommendations")]
    actions: Vec<String>,
    metadata: Map<String, Value>,
    error: bool,
}

impl From<RawAgentResponse> for AgentResponse {
    fn from(raw: RawAgentResponse) -> Self {
        let content = raw.content.unwrap_or_default();
        let error = raw.error || content.trim().is_empty();
        Self {
            agent_name: raw.agent_name.unwrap_or_default(),
            content,
            reasoning: raw.reasoning.filter(|r| !r.trim().is_empty()),
            citations: raw.citations,
            actions: raw.actions,
            metadata: raw.metadata,
            error,
        }
    }
}

/// Find the outermost JSON object in free-form text.
///
/// Prefers a fenced ` ```json ` block; otherwise spans the first `{` to the
/// last `}`.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let body = &text[start + "```json".len()..];
        if let Some(end) = body.find("```") {
            let inner = body[..end].trim();
            if inner.starts_with('{') {
                return Some(inner);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content_is_error() {
        let response = AgentResponse::new("contract_reviewer", "   ");
        assert!(response.error);
        assert!(!response.is_substantive());

        let response = AgentResponse::new("contract_reviewer", "Clause 4 is void.");
        assert!(!response.error);
        assert!(response.is_substantive());
    }

    #[test]
    fn test_failure_carries_message() {
        let response = AgentResponse::failure("risk_assessor", "provider down");
        assert!(response.error);
        assert_eq!(response.error_message(), Some("provider down"));
    }

    #[test]
    fn test_deserialize_enforces_invariant() {
        let response: AgentResponse =
            serde_json::from_str(r#"{"agent_name": "x", "content": "", "error": false}"#).unwrap();
        assert!(response.error);
    }

    #[test]
    fn test_from_llm_output_json() {
        let output = r#"Here is my review:
```json
{"content": "The non-compete is unenforceable.", "reasoning": "Too broad", "citations": ["Labor Contract Law Art. 24"], "actions": ["Narrow scope"]}
```"#;
        let response = AgentResponse::from_llm_output("contract_reviewer", output);
        assert_eq!(response.agent_name, "contract_reviewer");
        assert_eq!(response.content, "The non-compete is unenforceable.");
        assert_eq!(response.reasoning.as_deref(), Some("Too broad"));
        assert_eq!(response.citations, vec!["Labor Contract Law Art. 24"]);
        assert_eq!(response.actions, vec!["Narrow scope"]);
        assert!(!response.error);
    }

    #[test]
    fn test_from_llm_output_plain_text() {
        let response = AgentResponse::from_llm_output("legal_advisor", "  File within 30 days.  ");
        assert_eq!(response.content, "File within 30 days.");
        assert!(response.citations.is_empty());
    }

    #[test]
    fn test_from_llm_output_json_without_content_falls_back_to_text() {
        let output = r#"{"reasoning": "only reasoning"}"#;
        let response = AgentResponse::from_llm_output("legal_advisor", output);
        assert_eq!(response.content, output);
        assert!(!response.error);
    }

    #[test]
    fn test_from_llm_output_empty_is_error() {
        let response = AgentResponse::from_llm_output("legal_advisor", "");
        assert!(response.error);
    }
}
