//! Analyze Requirements use case: the requirement gate.
//!
//! Asks the analyzer whether a request carries enough information to plan.
//! The gate never fails: an unavailable, slow or unparseable analyzer
//! degrades to the keyword classifier, which always reports complete.

use crate::ports::requirement_analyzer::RequirementAnalyzer;
use crate::use_cases::shared::{LlmConcurrencyLimiter, limited_call};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use workforce_domain::{RequirementAnalysis, classify_by_keywords};

pub struct AnalyzeRequirementsUseCase {
    analyzer: Option<Arc<dyn RequirementAnalyzer>>,
    limiter: LlmConcurrencyLimiter,
    timeout: Duration,
}

impl AnalyzeRequirementsUseCase {
    pub fn new(
        analyzer: Option<Arc<dyn RequirementAnalyzer>>,
        limiter: LlmConcurrencyLimiter,
        timeout: Duration,
    ) -> Self {
        Self {
            analyzer,
            limiter,
            timeout,
        }
    }

    pub async fn execute(&self, input: &str, has_attachments: bool) -> RequirementAnalysis {
        let Some(analyzer) = &self.analyzer else {
            return classify_by_keywords(input, has_attachments);
        };

        let analysis = match limited_call(
            &self.limiter,
            self.timeout,
            analyzer.analyze(input, has_attachments),
        )
        .await
        {
            Some(Ok(analysis)) => analysis.normalize(),
            Some(Err(e)) => {
                warn!("Requirement analyzer failed, using keyword rules: {}", e);
                return classify_by_keywords(input, has_attachments);
            }
            None => {
                warn!(
                    "Requirement analyzer timed out after {:?}, using keyword rules",
                    self.timeout
                );
                return classify_by_keywords(input, has_attachments);
            }
        };

        debug!(
            "Requirement analysis: score={:.2} complete={}",
            analysis.completeness_score, analysis.is_complete
        );
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::requirement_analyzer::AnalyzerError;
    use async_trait::async_trait;
    use workforce_domain::GuidanceQuestion;

    enum Mode {
        Reply(RequirementAnalysis),
        Fail,
        Hang,
    }

    struct FakeAnalyzer(Mode);

    #[async_trait]
    impl RequirementAnalyzer for FakeAnalyzer {
        async fn analyze(
            &self,
            _input: &str,
            _has_attachments: bool,
        ) -> Result<RequirementAnalysis, AnalyzerError> {
            match &self.0 {
                Mode::Reply(a) => Ok(a.clone()),
                Mode::Fail => Err(AnalyzerError::Unparseable),
                Mode::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(AnalyzerError::Unavailable("never".into()))
                }
            }
        }
    }

    fn use_case(mode: Mode) -> AnalyzeRequirementsUseCase {
        AnalyzeRequirementsUseCase::new(
            Some(Arc::new(FakeAnalyzer(mode))),
            LlmConcurrencyLimiter::new(1),
            Duration::from_secs(10),
        )
    }

    #[tokio::test]
    async fn test_incomplete_analysis_keeps_questions() {
        let mut analysis = RequirementAnalysis::complete(0.3);
        analysis.missing_elements = vec!["contract date".into()];
        analysis.guidance_questions = vec![
            GuidanceQuestion::new("Is the contract signed?", vec!["Yes".into(), "No".into()]),
            GuidanceQuestion::new(
                "Which jurisdiction?",
                vec!["Mainland".into(), "Hong Kong".into(), "Other".into()],
            ),
        ];

        let result = use_case(Mode::Reply(analysis))
            .execute("Is my contract valid?", false)
            .await;

        assert!(!result.is_complete);
        assert!((2..=3).contains(&result.guidance_questions.len()));
    }

    #[tokio::test]
    async fn test_score_above_threshold_is_complete() {
        let mut analysis = RequirementAnalysis::complete(0.85);
        analysis.is_complete = false;

        let result = use_case(Mode::Reply(analysis)).execute("details", true).await;
        assert!(result.is_complete);
        assert!(result.guidance_questions.is_empty());
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_keywords() {
        let result = use_case(Mode::Fail)
            .execute("Please review this lease contract", false)
            .await;
        assert!(result.is_complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_to_keywords() {
        let result = use_case(Mode::Hang).execute("divorce question", false).await;
        assert!(result.is_complete);
    }

    #[tokio::test]
    async fn test_without_analyzer() {
        let uc = AnalyzeRequirementsUseCase::new(
            None,
            LlmConcurrencyLimiter::new(1),
            Duration::from_secs(1),
        );
        assert!(uc.execute("anything", false).await.is_complete);
    }
}
