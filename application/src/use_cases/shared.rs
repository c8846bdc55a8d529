//! Shared utilities for use cases.
//!
//! Contains the process-wide LLM concurrency limiter and the cancellation
//! check used by every use case that reaches the model.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Counting semaphore bounding in-flight LLM calls.
///
/// Cloning shares the same permits, so one limiter built at process start
/// bounds every wave of every concurrently running plan.
#[derive(Debug, Clone)]
pub struct LlmConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl LlmConcurrencyLimiter {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Wait for a permit. Returns `None` only if the semaphore was closed.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.semaphore).acquire_owned().await.ok()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Whether the optional token has been cancelled.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(|t| t.is_cancelled())
}

/// Run `fut` under a permit from `limiter`, bounded by `limit`.
///
/// Returns `None` on timeout.
pub(crate) async fn limited_call<F, T>(
    limiter: &LlmConcurrencyLimiter,
    limit: Duration,
    fut: F,
) -> Option<T>
where
    F: std::future::Future<Output = T>,
{
    let _permit = limiter.acquire().await;
    tokio::time::timeout(limit, fut).await.ok()
}
