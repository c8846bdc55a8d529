//! Experience store port
//!
//! Long-term memory of finished episodes. The episode recorder is the only
//! writer; the planner reads through `search`.

use async_trait::async_trait;
use thiserror::Error;
use workforce_domain::{Episode, EpisodeId, Feedback, ScoredEpisode};

/// Storage failures. Callers log and swallow these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Episode not found: {0}")]
    NotFound(EpisodeId),

    #[error("Storage operation timed out")]
    Timeout,

    #[error("Storage error: {0}")]
    Other(String),
}

/// Similarity search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub top_k: usize,
    /// Minimum raw similarity in `0.0..=1.0`
    pub score_threshold: f64,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, top_k: usize, score_threshold: f64) -> Self {
        Self {
            text: text.into(),
            top_k,
            score_threshold,
        }
    }
}

/// Episodic memory collaborator
#[async_trait]
pub trait ExperienceStore: Send + Sync {
    /// Store an episode and return its id
    async fn add(&self, episode: Episode) -> Result<EpisodeId, StorageError>;

    /// Ranked search: raw similarity re-weighted by rating, poor ratings excluded
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ScoredEpisode>, StorageError>;

    /// Attach (or replace) user feedback on a stored episode
    async fn attach_feedback(&self, id: &EpisodeId, feedback: Feedback)
    -> Result<(), StorageError>;
}
