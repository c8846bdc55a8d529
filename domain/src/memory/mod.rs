//! Experience memory domain
//!
//! An [`Episode`] is one finished plan execution, optionally rated by the
//! user later. Search hits are re-ranked with [`rank`] so highly rated
//! precedent surfaces first and poorly rated precedent never resurfaces.

pub mod episode;
pub mod ranking;

pub use episode::{Episode, EpisodeId, Feedback};
pub use ranking::{RatingWeighting, ScoredEpisode, rank};
