//! Logging configuration from TOML (`[logging]` section)
//!
//! ```toml
//! [logging]
//! level = "info"
//! file = "~/.local/state/legal-workforce/workforce.log"
//! event_log = "runs/events.jsonl"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Default filter when neither `-v` nor `RUST_LOG` is given
    pub level: Option<String>,
    /// Diagnostic log file (tracing output)
    pub file: Option<PathBuf>,
    /// JSONL execution transcript
    pub event_log: Option<PathBuf>,
}
