//! Specialist roster from TOML (`[[capabilities]]` tables)
//!
//! ```toml
//! generalist = "legal_advisor"
//!
//! [[capabilities]]
//! name = "contract_reviewer"
//! description = "Reviews contract clauses for validity, ambiguity and unfair terms"
//! model = "gpt-4o"
//! ```
//!
//! When no `[[capabilities]]` table is given the built-in legal team is used.

use serde::{Deserialize, Serialize};
use workforce_domain::LlmConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCapabilityConfig {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl FileCapabilityConfig {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            model: None,
            temperature: None,
        }
    }

    /// Role settings overlaid on the shared defaults
    pub fn llm_config(&self, defaults: &LlmConfig) -> LlmConfig {
        defaults.merged_with(&LlmConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: None,
        })
    }
}

pub(super) fn default_generalist() -> String {
    "legal_advisor".to_string()
}

pub(super) fn default_capabilities() -> Vec<FileCapabilityConfig> {
    vec![
        FileCapabilityConfig::new(
            "legal_advisor",
            "General legal counsel; answers questions no other specialist covers",
        ),
        FileCapabilityConfig::new(
            "contract_reviewer",
            "Reviews contract clauses for validity, ambiguity and unfair terms",
        ),
        FileCapabilityConfig::new(
            "risk_assessor",
            "Assesses legal, compliance and financial exposure and rates its severity",
        ),
        FileCapabilityConfig::new(
            "litigation_strategist",
            "Plans dispute resolution: negotiation, arbitration or litigation",
        ),
        FileCapabilityConfig::new(
            "document_drafter",
            "Drafts letters, notices and agreements from the team's conclusions",
        ),
        FileCapabilityConfig::new(
            "legal_researcher",
            "Finds statutes, regulations and precedent relevant to the question",
        ),
    ]
}
