//! Process-local experience store.
//!
//! Episodes live in memory for the lifetime of the process. Similarity is
//! cosine over bag-of-token vectors of the task descriptions: ASCII and
//! Latin text splits on non-alphanumeric characters, CJK ideographs count as
//! one token each so Chinese or Japanese requests still match.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use workforce_application::ports::experience_store::{
    ExperienceStore, SearchQuery, StorageError,
};
use workforce_domain::{Episode, EpisodeId, Feedback, RatingWeighting, ScoredEpisode, rank};

struct StoredEpisode {
    id: EpisodeId,
    episode: Episode,
    tokens: HashMap<String, u32>,
}

pub struct InMemoryExperienceStore {
    episodes: RwLock<Vec<StoredEpisode>>,
    weighting: RatingWeighting,
}

impl InMemoryExperienceStore {
    pub fn new(weighting: RatingWeighting) -> Self {
        Self {
            episodes: RwLock::new(Vec::new()),
            weighting,
        }
    }

    pub async fn len(&self) -> usize {
        self.episodes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.episodes.read().await.is_empty()
    }
}

impl Default for InMemoryExperienceStore {
    fn default() -> Self {
        Self::new(RatingWeighting::default())
    }
}

#[async_trait]
impl ExperienceStore for InMemoryExperienceStore {
    async fn add(&self, episode: Episode) -> Result<EpisodeId, StorageError> {
        let id = EpisodeId::generate();
        let tokens = token_counts(&episode.task_description);
        self.episodes.write().await.push(StoredEpisode {
            id: id.clone(),
            episode,
            tokens,
        });
        debug!("Stored episode {}", id);
        Ok(id)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<ScoredEpisode>, StorageError> {
        let needle = token_counts(&query.text);
        if needle.is_empty() || query.top_k == 0 {
            return Ok(Vec::new());
        }

        let hits = self
            .episodes
            .read()
            .await
            .iter()
            .map(|stored| {
                (
                    stored.id.clone(),
                    stored.episode.clone(),
                    cosine(&needle, &stored.tokens),
                )
            })
            .filter(|(_, _, similarity)| *similarity > 0.0)
            .collect();

        Ok(rank(hits, query.top_k, query.score_threshold, &self.weighting))
    }

    async fn attach_feedback(
        &self,
        id: &EpisodeId,
        feedback: Feedback,
    ) -> Result<(), StorageError> {
        let mut episodes = self.episodes.write().await;
        let stored = episodes
            .iter_mut()
            .find(|stored| &stored.id == id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        stored.episode.feedback = Some(feedback);
        Ok(())
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}')
}

fn token_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    let mut word = String::new();

    for c in text.chars() {
        if is_cjk(c) {
            flush(&mut word, &mut counts);
            *counts.entry(c.to_string()).or_insert(0) += 1;
        } else if c.is_alphanumeric() {
            word.extend(c.to_lowercase());
        } else {
            flush(&mut word, &mut counts);
        }
    }
    flush(&mut word, &mut counts);
    counts
}

fn flush(word: &mut String, counts: &mut HashMap<String, u32>) {
    if !word.is_empty() {
        *counts.entry(std::mem::take(word)).or_insert(0) += 1;
    }
}

fn cosine(a: &HashMap<String, u32>, b: &HashMap<String, u32>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(token, x)| b.get(token).map(|y| f64::from(*x) * f64::from(*y)))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }
    let norm = |v: &HashMap<String, u32>| {
        v.values()
            .map(|x| f64::from(*x).powi(2))
            .sum::<f64>()
            .sqrt()
    };
    (dot / (norm(a) * norm(b))).clamp(0.0, 1.0)
}
