//! Experience memory parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use workforce_domain::RatingWeighting;

/// Controls precedent recall before planning and episode persistence after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryParams {
    /// Recall precedents and record episodes at all.
    pub enabled: bool,
    /// Precedents handed to the planner.
    pub top_k: usize,
    /// Minimum raw similarity for a precedent.
    pub score_threshold: f64,
    /// Upper bound on any single store call; the caller never waits longer.
    pub storage_timeout: Duration,
    /// Rating re-weighting applied to search hits.
    pub weighting: RatingWeighting,
}

impl Default for MemoryParams {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 3,
            score_threshold: 0.3,
            storage_timeout: Duration::from_secs(5),
            weighting: RatingWeighting::default(),
        }
    }
}

impl MemoryParams {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }
}
