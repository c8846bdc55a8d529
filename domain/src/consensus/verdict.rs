//! Arbitration verdict types.

use super::rubric::RubricScores;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Overall legal risk the arbiter assigns to the final decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "minor" => Ok(RiskLevel::Low),
            "medium" | "moderate" | "normal" => Ok(RiskLevel::Medium),
            "high" | "severe" => Ok(RiskLevel::High),
            "critical" | "extreme" => Ok(RiskLevel::Critical),
            other => Err(format!("unknown risk level: {}", other)),
        }
    }
}

/// One specialist's stance on a disputed point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub agent: String,
    pub stance: String,
    pub scores: RubricScores,
}

impl Position {
    pub fn new(agent: impl Into<String>, stance: impl Into<String>, scores: RubricScores) -> Self {
        Self {
            agent: agent.into(),
            stance: stance.into(),
            scores: scores.clamped(),
        }
    }

    pub fn weighted_score(&self) -> f64 {
        self.scores.weighted_total()
    }
}

/// A point on which specialists disagreed, with the declared winner.
///
/// `winner` always names the `agent` of one of `positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub point: String,
    pub positions: Vec<Position>,
    pub winner: String,
}

impl Conflict {
    /// Build a conflict record.
    ///
    /// If `declared_winner` does not match any position, the position with the
    /// highest weighted rubric score wins (earliest on ties). Returns `None`
    /// when there are no positions.
    pub fn resolve(
        point: impl Into<String>,
        positions: Vec<Position>,
        declared_winner: Option<&str>,
    ) -> Option<Self> {
        let declared = declared_winner
            .map(str::trim)
            .and_then(|w| positions.iter().find(|p| p.agent == w))
            .map(|p| p.agent.clone());

        let winner = match declared {
            Some(w) => w,
            None => Self::top_scored(&positions)?.agent.clone(),
        };

        Some(Self {
            point: point.into(),
            positions,
            winner,
        })
    }

    fn top_scored(positions: &[Position]) -> Option<&Position> {
        positions.iter().fold(None, |best: Option<&Position>, p| match best {
            Some(b) if b.weighted_score() >= p.weighted_score() => Some(b),
            _ => Some(p),
        })
    }

    pub fn winning_position(&self) -> Option<&Position> {
        self.positions.iter().find(|p| p.agent == self.winner)
    }
}

/// Structured arbitration result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub conflicts: Vec<Conflict>,
    pub debate_summary: String,
    pub final_decision: String,
    pub risk_level: RiskLevel,
    pub is_consensus_reached: bool,
}

/// What the consensus step produced for a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArbitrationOutcome {
    /// Arbiter output parsed into a structured verdict
    Verdict(Verdict),
    /// Arbiter answered but its output was not a valid verdict
    RawText { final_decision: String },
    /// Arbiter unavailable or failed; the best single response stands in
    Degraded {
        agent_name: String,
        content: String,
        reason: String,
    },
    /// Nothing substantive to arbitrate
    NoUsableInput,
}

impl ArbitrationOutcome {
    /// The decision text, if any
    pub fn final_decision(&self) -> Option<&str> {
        match self {
            ArbitrationOutcome::Verdict(v) => Some(&v.final_decision),
            ArbitrationOutcome::RawText { final_decision } => Some(final_decision),
            ArbitrationOutcome::Degraded { content, .. } => Some(content),
            ArbitrationOutcome::NoUsableInput => None,
        }
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            ArbitrationOutcome::Verdict(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ArbitrationOutcome::Verdict(_) => "verdict",
            ArbitrationOutcome::RawText { .. } => "raw_text",
            ArbitrationOutcome::Degraded { .. } => "degraded",
            ArbitrationOutcome::NoUsableInput => "no_usable_input",
        }
    }
}
