//! Infrastructure layer for legal-workforce
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod gateway;
pub mod logging;
pub mod memory;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileCapabilityConfig, FileConfig, FileLlmConfig,
    FileLoggingConfig, FileMemoryConfig, FileOutputConfig, FileOutputFormat,
    FileRequirementsConfig, FileSchedulerConfig,
};
pub use gateway::OpenAiGateway;
pub use logging::JsonlExecutionLogger;
pub use memory::InMemoryExperienceStore;
