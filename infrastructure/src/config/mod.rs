//! Configuration file loading for legal-workforce
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `WORKFORCE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./workforce.toml` or `./.workforce.toml`
//! 4. Global: `$XDG_CONFIG_HOME/legal-workforce/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileCapabilityConfig, FileConfig, FileLlmConfig, FileLoggingConfig,
    FileMemoryConfig, FileOutputConfig, FileOutputFormat, FileRequirementsConfig,
    FileSchedulerConfig,
};
pub use loader::ConfigLoader;
