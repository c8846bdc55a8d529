//! Weighted scoring rubric used to judge specialist positions.

use serde::{Deserialize, Serialize};

/// Rubric weights. They sum to 1.0.
pub mod weights {
    /// Sufficiency of the legal basis (statutes, case law, contract terms)
    pub const LEGAL_BASIS: f64 = 0.4;
    /// Rigor of the evidence relied on
    pub const EVIDENTIARY_RIGOR: f64 = 0.3;
    /// Effectiveness of the proposed risk mitigation
    pub const RISK_MITIGATION: f64 = 0.3;
}

/// Highest score a single rubric dimension can take
pub const MAX_SCORE: f64 = 10.0;

/// Per-dimension scores for one specialist position, each in `0.0..=10.0`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RubricScores {
    #[serde(alias = "legal_basis_sufficiency")]
    pub legal_basis: f64,
    pub evidentiary_rigor: f64,
    #[serde(alias = "risk_mitigation_effectiveness")]
    pub risk_mitigation: f64,
}

impl RubricScores {
    /// Create scores, clamping each dimension into range.
    pub fn new(legal_basis: f64, evidentiary_rigor: f64, risk_mitigation: f64) -> Self {
        Self {
            legal_basis,
            evidentiary_rigor,
            risk_mitigation,
        }
        .clamped()
    }

    /// Copy with every dimension clamped to `0.0..=10.0`; NaN becomes 0.
    pub fn clamped(self) -> Self {
        fn clamp(v: f64) -> f64 {
            if v.is_nan() { 0.0 } else { v.clamp(0.0, MAX_SCORE) }
        }
        Self {
            legal_basis: clamp(self.legal_basis),
            evidentiary_rigor: clamp(self.evidentiary_rigor),
            risk_mitigation: clamp(self.risk_mitigation),
        }
    }

    /// Weighted total in `0.0..=10.0`
    pub fn weighted_total(&self) -> f64 {
        let s = self.clamped();
        s.legal_basis * weights::LEGAL_BASIS
            + s.evidentiary_rigor * weights::EVIDENTIARY_RIGOR
            + s.risk_mitigation * weights::RISK_MITIGATION
    }
}
