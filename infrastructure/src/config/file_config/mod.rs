//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application parameters
//! with the `to_params` helpers.

mod capabilities;
mod llm;
mod logging;
mod memory;
mod output;
mod requirements;
mod scheduler;

pub use capabilities::FileCapabilityConfig;
pub use llm::FileLlmConfig;
pub use logging::FileLoggingConfig;
pub use memory::FileMemoryConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use requirements::FileRequirementsConfig;
pub use scheduler::FileSchedulerConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroValue(&'static str),

    #[error("llm.pool_size ({pool}) must be at least scheduler.llm_concurrency ({concurrency})")]
    PoolTooSmall { pool: usize, concurrency: usize },

    #[error("memory.score_threshold must be between 0 and 1, got {0}")]
    InvalidScoreThreshold(f64),

    #[error("capability name cannot be empty")]
    EmptyCapabilityName,

    #[error("capability '{0}' is defined more than once")]
    DuplicateCapability(String),

    #[error("generalist capability '{0}' is not defined")]
    MissingGeneralist(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Capability used for fallback single-node plans
    pub generalist: String,
    pub scheduler: FileSchedulerConfig,
    pub llm: FileLlmConfig,
    pub memory: FileMemoryConfig,
    pub requirements: FileRequirementsConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
    pub capabilities: Vec<FileCapabilityConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            generalist: capabilities::default_generalist(),
            scheduler: FileSchedulerConfig::default(),
            llm: FileLlmConfig::default(),
            memory: FileMemoryConfig::default(),
            requirements: FileRequirementsConfig::default(),
            logging: FileLoggingConfig::default(),
            output: FileOutputConfig::default(),
            capabilities: capabilities::default_capabilities(),
        }
    }
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let s = &self.scheduler;
        for (field, value) in [
            ("scheduler.max_parallel_nodes", s.max_parallel_nodes as u64),
            ("scheduler.llm_concurrency", s.llm_concurrency as u64),
            ("scheduler.task_timeout_secs", s.task_timeout_secs),
            ("scheduler.global_timeout_secs", s.global_timeout_secs),
            ("scheduler.max_waves", s.max_waves as u64),
            ("llm.request_timeout_secs", self.llm.request_timeout_secs),
            ("memory.storage_timeout_secs", self.memory.storage_timeout_secs),
            ("requirements.timeout_secs", self.requirements.timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroValue(field));
            }
        }

        if let Some(pool) = self.llm.pool_size
            && pool < s.llm_concurrency
        {
            return Err(ConfigValidationError::PoolTooSmall {
                pool,
                concurrency: s.llm_concurrency,
            });
        }

        if !(0.0..=1.0).contains(&self.memory.score_threshold) {
            return Err(ConfigValidationError::InvalidScoreThreshold(
                self.memory.score_threshold,
            ));
        }

        let mut seen = HashSet::new();
        for capability in &self.capabilities {
            let name = capability.name.trim();
            if name.is_empty() {
                return Err(ConfigValidationError::EmptyCapabilityName);
            }
            if !seen.insert(name) {
                return Err(ConfigValidationError::DuplicateCapability(name.to_string()));
            }
        }

        if !seen.contains(self.generalist.trim()) {
            return Err(ConfigValidationError::MissingGeneralist(
                self.generalist.clone(),
            ));
        }

        Ok(())
    }
}
