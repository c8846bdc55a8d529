//! Requirement gate configuration from TOML (`[requirements]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRequirementsConfig {
    /// Ask the LLM analyzer; when false only the keyword rules run
    pub use_llm: bool,
    /// Never stop for clarification questions
    pub skip_check: bool,
    pub timeout_secs: u64,
}

impl Default for FileRequirementsConfig {
    fn default() -> Self {
        Self {
            use_llm: true,
            skip_check: false,
            timeout_secs: 30,
        }
    }
}
