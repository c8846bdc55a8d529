//! Deterministic keyword classifier.
//!
//! Used when the LLM analyzer is unavailable or returns garbage. It always
//! reports the request as complete so a broken analyzer can never trap the
//! user in a clarification loop.

use super::analysis::{COMPLETENESS_THRESHOLD, Complexity, RequirementAnalysis};

/// Keyword → capability routing table (English and Chinese legal terms)
const RULES: &[(&[&str], &str)] = &[
    (
        &["contract", "agreement", "clause", "nda", "lease", "合同", "协议", "条款"],
        "contract_reviewer",
    ),
    (
        &["risk", "liability", "compliance", "exposure", "风险", "合规", "责任"],
        "risk_assessor",
    ),
    (
        &[
            "lawsuit",
            "litigation",
            "court",
            "sue",
            "dispute",
            "arbitration",
            "诉讼",
            "起诉",
            "仲裁",
            "纠纷",
        ],
        "litigation_strategist",
    ),
    (
        &["draft", "letter", "notice", "template", "起草", "律师函", "通知"],
        "document_drafter",
    ),
    (
        &["precedent", "case law", "statute", "regulation", "判例", "法规", "法条"],
        "legal_researcher",
    ),
];

/// Classify a request by keyword. The result is always complete.
pub fn classify_by_keywords(input: &str, has_attachments: bool) -> RequirementAnalysis {
    let lowered = input.to_lowercase();

    let mut analysis = RequirementAnalysis::complete(COMPLETENESS_THRESHOLD);
    for (keywords, capability) in RULES {
        if keywords.iter().any(|k| lowered.contains(k)) {
            analysis = analysis.with_suggested_capability(*capability);
        }
    }

    let char_count = input.chars().count();
    let complexity = match analysis.suggested_capabilities.len() {
        n if n >= 3 || (has_attachments && n >= 2) => Complexity::Complex,
        0 | 1 if char_count < 200 && !has_attachments => Complexity::Simple,
        _ => Complexity::Moderate,
    };

    analysis.with_complexity(complexity)
}
