//! Arbiter output parsing.
//!
//! The arbiter is asked for a JSON verdict. [`interpret_arbiter_output`]
//! never fails: anything that does not parse into a usable [`Verdict`]
//! becomes [`ArbitrationOutcome::RawText`] carrying the raw answer.

use super::rubric::RubricScores;
use super::verdict::{ArbitrationOutcome, Conflict, Position, RiskLevel, Verdict};
use crate::agent::response::extract_json_object;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    conflicts: Vec<RawConflict>,
    #[serde(default, alias = "summary")]
    debate_summary: String,
    #[serde(alias = "decision", alias = "conclusion")]
    final_decision: String,
    #[serde(default)]
    risk_level: Option<String>,
    #[serde(default, alias = "consensus_reached")]
    is_consensus_reached: bool,
}

#[derive(Debug, Deserialize)]
struct RawConflict {
    #[serde(alias = "issue", alias = "disputed_point")]
    point: String,
    #[serde(default)]
    positions: Vec<RawPosition>,
    #[serde(default)]
    winner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    #[serde(alias = "agent_name", alias = "specialist")]
    agent: String,
    #[serde(default, alias = "position", alias = "view")]
    stance: String,
    #[serde(default)]
    scores: RubricScores,
}

/// Parse a structured verdict, or `None` if the output is not one.
pub fn parse_verdict(output: &str) -> Option<Verdict> {
    let json = extract_json_object(output)?;
    let raw: RawVerdict = serde_json::from_str(json).ok()?;
    if raw.final_decision.trim().is_empty() {
        return None;
    }

    let conflicts = raw
        .conflicts
        .into_iter()
        .filter_map(|c| {
            let positions = c
                .positions
                .into_iter()
                .map(|p| Position::new(p.agent, p.stance, p.scores))
                .collect();
            Conflict::resolve(c.point, positions, c.winner.as_deref())
        })
        .collect();

    Some(Verdict {
        conflicts,
        debate_summary: raw.debate_summary,
        final_decision: raw.final_decision,
        risk_level: raw
            .risk_level
            .and_then(|r| r.parse().ok())
            .unwrap_or_default(),
        is_consensus_reached: raw.is_consensus_reached,
    })
}

/// Turn arbiter output into an outcome; malformed output keeps the raw text.
pub fn interpret_arbiter_output(output: &str) -> ArbitrationOutcome {
    match parse_verdict(output) {
        Some(verdict) => ArbitrationOutcome::Verdict(verdict),
        None => ArbitrationOutcome::RawText {
            final_decision: output.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"After weighing both opinions:
```json
{
  "conflicts": [
    {
      "point": "Whether the termination notice was valid",
      "positions": [
        {"agent": "contract_reviewer", "stance": "Valid under clause 12", "scores": {"legal_basis": 8, "evidentiary_rigor": 7, "risk_mitigation": 6}},
        {"agent": "litigation_strategist", "stance": "Defective service", "scores": {"legal_basis": 6, "evidentiary_rigor": 5, "risk_mitigation": 7}}
      ],
      "winner": "contract_reviewer"
    }
  ],
  "debate_summary": "Reviewer relies on the contract text; strategist on service rules.",
  "final_decision": "Treat the notice as valid but re-serve to remove doubt.",
  "risk_level": "high",
  "is_consensus_reached": true
}
```"#;

    #[test]
    fn test_parse_well_formed_verdict() {
        let verdict = parse_verdict(WELL_FORMED).unwrap();
        assert_eq!(verdict.conflicts.len(), 1);
        assert_eq!(verdict.conflicts[0].winner, "contract_reviewer");
        assert_eq!(verdict.conflicts[0].positions.len(), 2);
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert!(verdict.is_consensus_reached);
        assert!(verdict.final_decision.starts_with("Treat the notice"));
    }

    #[test]
    fn test_invalid_winner_is_recomputed() {
        let output = r#"{"conflicts": [{"point": "p", "positions": [
            {"agent": "a", "scores": {"legal_basis": 2, "evidentiary_rigor": 2, "risk_mitigation": 2}},
            {"agent": "b", "scores": {"legal_basis": 9, "evidentiary_rigor": 9, "risk_mitigation": 9}}
        ], "winner": "z"}], "final_decision": "go with b"}"#;
        let verdict = parse_verdict(output).unwrap();
        assert_eq!(verdict.conflicts[0].winner, "b");
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_malformed_output_falls_back_to_raw_text() {
        let output = "Both specialists agree: settle before trial.";
        assert_eq!(
            interpret_arbiter_output(output),
            ArbitrationOutcome::RawText {
                final_decision: output.to_string()
            }
        );
    }

    #[test]
    fn test_missing_decision_falls_back_to_raw_text() {
        let output = r#"{"debate_summary": "inconclusive", "final_decision": "  "}"#;
        assert!(matches!(
            interpret_arbiter_output(output),
            ArbitrationOutcome::RawText { .. }
        ));
    }

    #[test]
    fn test_conflict_without_positions_is_dropped() {
        let output = r#"{"conflicts": [{"point": "p", "positions": []}], "final_decision": "ok"}"#;
        let verdict = parse_verdict(output).unwrap();
        assert!(verdict.conflicts.is_empty());
    }
}
