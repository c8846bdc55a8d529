//! Arbitrate use case: consensus over specialist conclusions.
//!
//! - no usable response → [`ArbitrationOutcome::NoUsableInput`]
//! - exactly one → no arbitration (`None`)
//! - several → the arbiter is asked for a [`Verdict`](workforce_domain::Verdict);
//!   if it fails, times out, answers blank or is absent, the best single
//!   response is used and the outcome is marked degraded

use crate::ports::arbiter::Arbiter;
use crate::ports::execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger};
use crate::ports::progress::{NoProgress, WorkforceProgress};
use crate::use_cases::shared::{LlmConcurrencyLimiter, limited_call};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use workforce_domain::{AgentResponse, ArbitrationOutcome, interpret_arbiter_output};

pub struct ArbitrateUseCase {
    arbiter: Option<Arc<dyn Arbiter>>,
    limiter: LlmConcurrencyLimiter,
    timeout: Duration,
    logger: Arc<dyn ExecutionLogger>,
}

impl ArbitrateUseCase {
    pub fn new(
        arbiter: Option<Arc<dyn Arbiter>>,
        limiter: LlmConcurrencyLimiter,
        timeout: Duration,
    ) -> Self {
        Self {
            arbiter,
            limiter,
            timeout,
            logger: Arc::new(NoExecutionLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ExecutionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub async fn execute(
        &self,
        task_description: &str,
        responses: &[&AgentResponse],
    ) -> Option<ArbitrationOutcome> {
        self.execute_with_progress(task_description, responses, &NoProgress)
            .await
    }

    /// Arbitrate among the usable responses. Never fails.
    pub async fn execute_with_progress(
        &self,
        task_description: &str,
        responses: &[&AgentResponse],
        progress: &dyn WorkforceProgress,
    ) -> Option<ArbitrationOutcome> {
        let usable: Vec<&AgentResponse> = responses
            .iter()
            .copied()
            .filter(|r| r.is_substantive())
            .collect();

        let outcome = match usable.len() {
            0 => ArbitrationOutcome::NoUsableInput,
            1 => return None,
            n => {
                progress.on_arbitration_start(n);
                self.consult(task_description, &usable).await
            }
        };

        self.logger.log(ExecutionEvent::new(
            "arbitration_finished",
            serde_json::json!({
                "kind": outcome.as_str(),
                "responses": usable.len(),
                "conflicts": outcome.verdict().map(|v| v.conflicts.len()).unwrap_or(0),
            }),
        ));
        Some(outcome)
    }

    async fn consult(
        &self,
        task_description: &str,
        usable: &[&AgentResponse],
    ) -> ArbitrationOutcome {
        let Some(arbiter) = &self.arbiter else {
            return degrade(usable, "no arbiter configured");
        };

        let pairs: Vec<(String, String)> = usable
            .iter()
            .map(|r| (r.agent_name.clone(), r.content.clone()))
            .collect();

        info!("Arbitrating among {} responses", pairs.len());
        match limited_call(
            &self.limiter,
            self.timeout,
            arbiter.arbitrate(task_description, &pairs),
        )
        .await
        {
            Some(Ok(output)) if output.trim().is_empty() => {
                warn!("Arbiter returned empty output");
                degrade(usable, "arbiter returned empty output")
            }
            Some(Ok(output)) => interpret_arbiter_output(&output),
            Some(Err(e)) => {
                warn!("Arbiter failed: {}", e);
                degrade(usable, &e.to_string())
            }
            None => {
                warn!("Arbiter timed out after {:?}", self.timeout);
                degrade(usable, "arbiter timed out")
            }
        }
    }
}

/// Pick the best single response: most citations, then longest content,
/// then earliest.
fn degrade(usable: &[&AgentResponse], reason: &str) -> ArbitrationOutcome {
    let best = usable.iter().copied().reduce(|best, candidate| {
        let better = (candidate.citations.len(), candidate.content.trim().len())
            > (best.citations.len(), best.content.trim().len());
        if better { candidate } else { best }
    });

    match best {
        Some(r) => ArbitrationOutcome::Degraded {
            agent_name: r.agent_name.clone(),
            content: r.content.clone(),
            reason: reason.to_string(),
        },
        None => ArbitrationOutcome::NoUsableInput,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::arbiter::ArbitrationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Text(&'static str),
        Fail,
        Hang,
    }

    struct FakeArbiter {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl FakeArbiter {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Arbiter for FakeArbiter {
        async fn arbitrate(
            &self,
            _task_description: &str,
            _responses: &[(String, String)],
        ) -> Result<String, ArbitrationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Text(t) => Ok(t.to_string()),
                Reply::Fail => Err(ArbitrationError("provider down".into())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }

    fn use_case(arbiter: Option<Arc<FakeArbiter>>) -> ArbitrateUseCase {
        ArbitrateUseCase::new(
            arbiter.map(|a| a as Arc<dyn Arbiter>),
            LlmConcurrencyLimiter::new(2),
            Duration::from_secs(30),
        )
    }

    fn responses() -> Vec<AgentResponse> {
        vec![
            AgentResponse::new("contract_reviewer", "Clause 4 is void."),
            AgentResponse::new("risk_assessor", "Clause 4 is enforceable but risky.")
                .with_citation("Civil Code art. 497"),
        ]
    }

    const VERDICT: &str = r#"{
        "conflicts": [{
            "point": "Validity of clause 4",
            "positions": [
                {"agent": "contract_reviewer", "stance": "void",
                 "scores": {"legal_basis": 9, "evidentiary_rigor": 8, "risk_mitigation": 7}},
                {"agent": "risk_assessor", "stance": "enforceable",
                 "scores": {"legal_basis": 5, "evidentiary_rigor": 5, "risk_mitigation": 6}}
            ],
            "winner": "contract_reviewer"
        }],
        "final_decision": "Treat clause 4 as void.",
        "risk_level": "high"
    }"#;

    #[tokio::test]
    async fn test_single_response_skips_arbiter() {
        let arbiter = FakeArbiter::new(Reply::Text(VERDICT));
        let uc = use_case(Some(arbiter.clone()));
        let only = AgentResponse::new("legal_advisor", "Answer");

        assert_eq!(uc.execute("task", &[&only]).await, None);
        assert_eq!(arbiter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_usable_input() {
        let uc = use_case(None);
        let empty = AgentResponse::new("legal_advisor", "  ");
        assert_eq!(
            uc.execute("task", &[&empty]).await,
            Some(ArbitrationOutcome::NoUsableInput)
        );
    }

    #[tokio::test]
    async fn test_structured_verdict() {
        let uc = use_case(Some(FakeArbiter::new(Reply::Text(VERDICT))));
        let rs = responses();
        let refs: Vec<&AgentResponse> = rs.iter().collect();

        let outcome = uc.execute("task", &refs).await.unwrap();
        let verdict = outcome.verdict().unwrap();
        assert_eq!(verdict.conflicts.len(), 1);
        assert_eq!(verdict.conflicts[0].winner, "contract_reviewer");
        assert_eq!(outcome.final_decision(), Some("Treat clause 4 as void."));
    }

    #[tokio::test]
    async fn test_arbiter_failure_degrades_to_best_response() {
        let uc = use_case(Some(FakeArbiter::new(Reply::Fail)));
        let rs = responses();
        let refs: Vec<&AgentResponse> = rs.iter().collect();

        match uc.execute("task", &refs).await.unwrap() {
            ArbitrationOutcome::Degraded { agent_name, .. } => {
                assert_eq!(agent_name, "risk_assessor", "cited response wins");
            }
            other => panic!("expected degraded, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_arbiter_timeout_degrades() {
        let uc = use_case(Some(FakeArbiter::new(Reply::Hang)));
        let rs = responses();
        let refs: Vec<&AgentResponse> = rs.iter().collect();

        let outcome = uc.execute("task", &refs).await.unwrap();
        assert_eq!(outcome.as_str(), "degraded");
    }

    #[tokio::test]
    async fn test_free_text_arbiter_output() {
        let uc = use_case(Some(FakeArbiter::new(Reply::Text("Both agree; sign it."))));
        let rs = responses();
        let refs: Vec<&AgentResponse> = rs.iter().collect();

        let outcome = uc.execute("task", &refs).await.unwrap();
        assert_eq!(outcome.final_decision(), Some("Both agree; sign it."));
        assert!(outcome.verdict().is_none());
    }

    #[tokio::test]
    async fn test_blank_arbiter_output_degrades() {
        let uc = use_case(Some(FakeArbiter::new(Reply::Text("   \n "))));
        let rs = responses();
        let refs: Vec<&AgentResponse> = rs.iter().collect();

        let outcome = uc.execute("task", &refs).await.unwrap();
        assert_eq!(outcome.as_str(), "degraded");
        assert_eq!(
            outcome.final_decision(),
            Some("Clause 4 is enforceable but risky.")
        );
    }
}
