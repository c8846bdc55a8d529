//! Rating-aware ranking of episode search hits.

use super::episode::{Episode, EpisodeId};
use serde::{Deserialize, Serialize};

/// How user ratings re-weight raw similarity.
///
/// `score = similarity * (1 + (rating - neutral) * per_point)`; unrated
/// episodes count as neutral, and ratings at or below `exclude_at_or_below`
/// are removed from results entirely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingWeighting {
    pub per_point: f64,
    pub neutral: u8,
    pub exclude_at_or_below: u8,
}

impl Default for RatingWeighting {
    fn default() -> Self {
        Self {
            per_point: 0.1,
            neutral: 3,
            exclude_at_or_below: 2,
        }
    }
}

impl RatingWeighting {
    /// Multiplier for a rating, or `None` if the episode must be excluded
    pub fn factor(&self, rating: Option<u8>) -> Option<f64> {
        match rating {
            None => Some(1.0),
            Some(r) if r <= self.exclude_at_or_below => None,
            Some(r) => Some(1.0 + (f64::from(r) - f64::from(self.neutral)) * self.per_point),
        }
    }
}

/// An episode returned from search together with its scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEpisode {
    pub id: EpisodeId,
    pub episode: Episode,
    /// Raw similarity in `0.0..=1.0`
    pub similarity: f64,
    /// Similarity after rating re-weighting
    pub score: f64,
}

/// Rank similarity hits.
///
/// Hits below `score_threshold` (on raw similarity) and hits with a poor
/// rating are dropped; the rest are sorted by weighted score (ties broken by
/// raw similarity) and truncated to `top_k`.
pub fn rank(
    hits: Vec<(EpisodeId, Episode, f64)>,
    top_k: usize,
    score_threshold: f64,
    weighting: &RatingWeighting,
) -> Vec<ScoredEpisode> {
    let mut scored: Vec<ScoredEpisode> = hits
        .into_iter()
        .filter(|(_, _, similarity)| *similarity >= score_threshold)
        .filter_map(|(id, episode, similarity)| {
            let factor = weighting.factor(episode.rating())?;
            Some(ScoredEpisode {
                id,
                score: similarity * factor,
                similarity,
                episode,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.similarity.total_cmp(&a.similarity))
    });
    scored.truncate(top_k);
    scored
}
