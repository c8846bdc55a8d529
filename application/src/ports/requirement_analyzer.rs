//! Requirement analyzer port

use async_trait::async_trait;
use thiserror::Error;
use workforce_domain::RequirementAnalysis;

/// Analyzer failures; callers degrade to the keyword classifier
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    #[error("Analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("Unparseable analyzer output")]
    Unparseable,
}

/// Judges whether a request carries enough information to plan
#[async_trait]
pub trait RequirementAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        input: &str,
        has_attachments: bool,
    ) -> Result<RequirementAnalysis, AnalyzerError>;
}
