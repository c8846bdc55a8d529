//! Record Episode use case: the episode recorder.
//!
//! Sole writer to the experience store. Every call is bounded by the
//! storage timeout and never fails the caller: errors are logged and
//! swallowed, and a missing store turns every operation into a no-op.

use crate::config::MemoryParams;
use crate::ports::execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger};
use crate::ports::experience_store::{ExperienceStore, SearchQuery, StorageError};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use workforce_domain::{Episode, EpisodeId, Feedback, FinalResult, Plan, ScoredEpisode};

pub struct RecordEpisodeUseCase {
    store: Option<Arc<dyn ExperienceStore>>,
    params: MemoryParams,
    logger: Arc<dyn ExecutionLogger>,
}

impl RecordEpisodeUseCase {
    pub fn new(store: Option<Arc<dyn ExperienceStore>>, params: MemoryParams) -> Self {
        Self {
            store,
            params,
            logger: Arc::new(NoExecutionLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ExecutionLogger>) -> Self {
        self.logger = logger;
        self
    }

    fn store(&self) -> Option<&Arc<dyn ExperienceStore>> {
        self.store.as_ref().filter(|_| self.params.enabled)
    }

    /// Persist a finished run. Returns the new id, or `None` if nothing was stored.
    pub async fn persist(
        &self,
        task_description: &str,
        plan: &Plan,
        final_result: &FinalResult,
        feedback: Option<Feedback>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Option<EpisodeId> {
        let store = self.store()?;
        let episode = Episode::new(task_description, plan.clone(), final_result.clone())
            .with_feedback(feedback)
            .with_metadata(metadata);

        let id = self.bounded("add", store.add(episode)).await?;
        debug!("Recorded episode {}", id);
        self.logger.log(ExecutionEvent::new(
            "episode_recorded",
            serde_json::json!({ "episode_id": id.as_str() }),
        ));
        Some(id)
    }

    /// Attach user feedback to a stored episode. Returns whether it was stored.
    pub async fn attach_feedback(&self, id: &EpisodeId, feedback: Feedback) -> bool {
        let Some(store) = self.store() else {
            return false;
        };
        self.bounded("attach_feedback", store.attach_feedback(id, feedback))
            .await
            .is_some()
    }

    /// Ranked precedents for a new task; empty on any failure.
    pub async fn recall(&self, task_description: &str) -> Vec<ScoredEpisode> {
        let Some(store) = self.store() else {
            return Vec::new();
        };
        let query = SearchQuery::new(
            task_description,
            self.params.top_k,
            self.params.score_threshold,
        );
        let hits = self
            .bounded("search", store.search(&query))
            .await
            .unwrap_or_default();
        debug!("Recalled {} precedent(s)", hits.len());
        hits
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = Result<T, StorageError>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.params.storage_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("Experience store {} failed: {}", operation, e);
                None
            }
            Err(_) => {
                warn!("Experience store {} failed: {}", operation, StorageError::Timeout);
                None
            }
        }
    }
}
