//! Consensus arbitration domain
//!
//! When more than one specialist produced a substantive answer, an arbiter
//! reconciles them into a [`Verdict`]: explicit [`Conflict`] records, each
//! position scored on a fixed weighted rubric, and a declared winner.
//!
//! ```text
//! specialist responses ──► arbiter (LLM) ──► interpret_arbiter_output
//!                                               ├─ Verdict   (structured)
//!                                               └─ RawText   (malformed output)
//! ```

pub mod parsing;
pub mod rubric;
pub mod verdict;

pub use parsing::{interpret_arbiter_output, parse_verdict};
pub use rubric::RubricScores;
pub use verdict::{ArbitrationOutcome, Conflict, Position, RiskLevel, Verdict};
