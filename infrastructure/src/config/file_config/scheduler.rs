//! Scheduler configuration from TOML (`[scheduler]` section)
//!
//! ```toml
//! [scheduler]
//! max_parallel_nodes = 30
//! llm_concurrency = 15
//! task_timeout_secs = 120
//! global_timeout_secs = 600
//! max_retries = 2
//! max_waves = 30
//! retry_backoff_ms = 500
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use workforce_application::SchedulerParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSchedulerConfig {
    /// Nodes running at once within a wave
    pub max_parallel_nodes: usize,
    /// LLM calls in flight at once, across every plan
    pub llm_concurrency: usize,
    pub task_timeout_secs: u64,
    pub global_timeout_secs: u64,
    pub max_retries: u32,
    pub max_waves: usize,
    pub retry_backoff_ms: u64,
}

impl Default for FileSchedulerConfig {
    fn default() -> Self {
        let params = SchedulerParams::default();
        Self {
            max_parallel_nodes: params.max_parallel_nodes,
            llm_concurrency: params.llm_concurrency,
            task_timeout_secs: params.task_timeout.as_secs(),
            global_timeout_secs: params.global_timeout.as_secs(),
            max_retries: params.max_retries,
            max_waves: params.max_waves,
            retry_backoff_ms: params.retry_backoff.as_millis() as u64,
        }
    }
}

impl FileSchedulerConfig {
    pub fn to_params(&self) -> SchedulerParams {
        SchedulerParams::default()
            .with_max_parallel_nodes(self.max_parallel_nodes)
            .with_llm_concurrency(self.llm_concurrency)
            .with_task_timeout(Duration::from_secs(self.task_timeout_secs))
            .with_global_timeout(Duration::from_secs(self.global_timeout_secs))
            .with_max_retries(self.max_retries)
            .with_max_waves(self.max_waves)
            .with_retry_backoff(Duration::from_millis(self.retry_backoff_ms))
    }
}
