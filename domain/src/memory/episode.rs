//! Episode entities for the experience store.

use crate::core::error::DomainError;
use crate::core::time::now_millis;
use crate::outcome::FinalResult;
use crate::plan::entities::Plan;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier for a stored episode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(String);

impl EpisodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new unique id in a UUID-like format.
    pub fn generate() -> Self {
        Self(uuid_v4())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for EpisodeId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time-based pseudo-random UUID v4; a process-wide counter keeps ids
/// generated within the same nanosecond distinct.
fn uuid_v4() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (nanos >> 32) as u32,
        (nanos >> 16) as u16,
        seq as u16 & 0x0fff,
        ((nanos >> 4) as u16 & 0x3fff) | 0x8000,
        ((nanos as u64) ^ seq.rotate_left(40)) & 0xffff_ffff_ffff
    )
}

/// User rating attached to an episode after the fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    rating: u8,
    pub comment: Option<String>,
}

impl Feedback {
    /// Create feedback; `rating` must be within 1..=5.
    pub fn new(rating: u8, comment: Option<String>) -> Result<Self, DomainError> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::InvalidRating(rating));
        }
        Ok(Self {
            rating,
            comment: comment.filter(|c| !c.trim().is_empty()),
        })
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }
}

/// One completed plan execution plus eventual user feedback.
///
/// Immutable after creation except for `feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub task_description: String,
    pub plan: Plan,
    pub final_result: FinalResult,
    pub feedback: Option<Feedback>,
    pub metadata: Map<String, Value>,
    pub created_at: u64,
}

impl Episode {
    pub fn new(task_description: impl Into<String>, plan: Plan, final_result: FinalResult) -> Self {
        Self {
            task_description: task_description.into(),
            plan,
            final_result,
            feedback: None,
            metadata: Map::new(),
            created_at: now_millis(),
        }
    }

    pub fn with_feedback(mut self, feedback: Option<Feedback>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn rating(&self) -> Option<u8> {
        self.feedback.as_ref().map(|f| f.rating())
    }
}
