//! Experience memory configuration from TOML (`[memory]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use workforce_application::MemoryParams;
use workforce_domain::RatingWeighting;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    pub enabled: bool,
    /// Precedents handed to the planner
    pub top_k: usize,
    /// Minimum raw similarity for a precedent
    pub score_threshold: f64,
    pub storage_timeout_secs: u64,
    /// Score change per rating point away from neutral
    pub rating_boost_per_point: f64,
    /// Ratings at or below this are never recalled
    pub exclude_rating_at_or_below: u8,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        let params = MemoryParams::default();
        Self {
            enabled: params.enabled,
            top_k: params.top_k,
            score_threshold: params.score_threshold,
            storage_timeout_secs: params.storage_timeout.as_secs(),
            rating_boost_per_point: params.weighting.per_point,
            exclude_rating_at_or_below: params.weighting.exclude_at_or_below,
        }
    }
}

impl FileMemoryConfig {
    pub fn to_params(&self) -> MemoryParams {
        let weighting = RatingWeighting {
            per_point: self.rating_boost_per_point,
            exclude_at_or_below: self.exclude_rating_at_or_below,
            ..RatingWeighting::default()
        };
        let params = MemoryParams {
            weighting,
            ..MemoryParams::default()
        }
        .with_top_k(self.top_k)
        .with_score_threshold(self.score_threshold)
        .with_storage_timeout(Duration::from_secs(self.storage_timeout_secs));

        if self.enabled {
            params
        } else {
            MemoryParams {
                enabled: false,
                ..params
            }
        }
    }
}
