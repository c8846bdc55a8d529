//! Requirement gate domain
//!
//! Pre-flight completeness check for an incoming request. An incomplete
//! request yields closed-ended guidance questions instead of a plan.

pub mod analysis;
pub mod keyword;

pub use analysis::{
    COMPLETENESS_THRESHOLD, Complexity, GuidanceQuestion, RequirementAnalysis,
    parse_requirement_analysis,
};
pub use keyword::classify_by_keywords;
