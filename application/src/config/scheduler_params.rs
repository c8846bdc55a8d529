//! Scheduler parameters: plan execution control.
//!
//! [`SchedulerParams`] groups the static limits that control how
//! [`ExecutePlanUseCase`](crate::use_cases::execute_plan::ExecutePlanUseCase)
//! drives a plan: fan-out, LLM concurrency, timeouts, retries and the wave cap.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Plan execution control parameters.
///
/// The two concurrency limits are independent:
///
/// | Limit | Scope | Default |
/// |-------|-------|---------|
/// | `max_parallel_nodes` | nodes running at once within one plan | 30 |
/// | `llm_concurrency` | capability calls in flight, shared across plans | 15 |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerParams {
    /// Maximum number of nodes running simultaneously.
    pub max_parallel_nodes: usize,
    /// Maximum number of in-flight LLM calls (shared semaphore size).
    pub llm_concurrency: usize,
    /// Timeout applied to each attempt of a node.
    pub task_timeout: Duration,
    /// Deadline for the whole multi-wave run.
    pub global_timeout: Duration,
    /// Retries after the first attempt, for transient failures only.
    pub max_retries: u32,
    /// Waves beyond this cap are skipped.
    pub max_waves: usize,
    /// Pause before each retry.
    pub retry_backoff: Duration,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            max_parallel_nodes: 30,
            llm_concurrency: 15,
            task_timeout: Duration::from_secs(120),
            global_timeout: Duration::from_secs(600),
            max_retries: 2,
            max_waves: 30,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl SchedulerParams {
    // ==================== Builder Methods ====================

    pub fn with_max_parallel_nodes(mut self, max: usize) -> Self {
        self.max_parallel_nodes = max;
        self
    }

    pub fn with_llm_concurrency(mut self, max: usize) -> Self {
        self.llm_concurrency = max;
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_global_timeout(mut self, timeout: Duration) -> Self {
        self.global_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_max_waves(mut self, max: usize) -> Self {
        self.max_waves = max;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Total attempts a node may make (first try plus retries)
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = SchedulerParams::default();
        assert_eq!(params.max_parallel_nodes, 30);
        assert_eq!(params.llm_concurrency, 15);
        assert_eq!(params.task_timeout, Duration::from_secs(120));
        assert_eq!(params.global_timeout, Duration::from_secs(600));
        assert_eq!(params.max_retries, 2);
        assert_eq!(params.max_waves, 30);
        assert_eq!(params.max_attempts(), 3);
    }

    #[test]
    fn test_builder() {
        let params = SchedulerParams::default()
            .with_max_parallel_nodes(4)
            .with_llm_concurrency(2)
            .with_global_timeout(Duration::from_secs(1))
            .with_max_retries(0);

        assert_eq!(params.max_parallel_nodes, 4);
        assert_eq!(params.llm_concurrency, 2);
        assert_eq!(params.global_timeout, Duration::from_secs(1));
        assert_eq!(params.max_attempts(), 1);
    }
}
