//! Result aggregation
//!
//! Merges the plan rationale, every node's terminal outcome and the
//! arbitration result into a single [`FinalResult`] with per-node provenance.

use crate::agent::response::AgentResponse;
use crate::consensus::ArbitrationOutcome;
use crate::plan::entities::{FailureKind, NodeStatus, Plan};
use crate::plan::value_objects::{Priority, TaskId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aggregation failures surfaced to the caller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    /// Every node failed or was skipped
    #[error("No task produced a usable result: {0}")]
    NoSuccessfulNodes(String),
}

/// Terminal outcome of a single node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOutcome {
    pub task_id: TaskId,
    pub capability: String,
    pub status: NodeStatus,
    pub failure_kind: Option<FailureKind>,
    pub failure_message: Option<String>,
    pub attempts: u32,
    pub response: Option<AgentResponse>,
}

/// Final answer for a request plus full provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub analysis: String,
    pub priority: Priority,
    pub nodes: Vec<NodeOutcome>,
    pub arbitration: Option<ArbitrationOutcome>,
    /// Best answer text for display
    pub answer: String,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl FinalResult {
    /// Build a result from the plan's current node states without any
    /// success check.
    pub fn summarize(plan: &Plan, arbitration: Option<ArbitrationOutcome>) -> Self {
        let nodes = plan
            .nodes
            .iter()
            .map(|n| NodeOutcome {
                task_id: n.id.clone(),
                capability: n.capability.clone(),
                status: n.status,
                failure_kind: n.failure_kind(),
                failure_message: n.failure.as_ref().map(|f| f.message.clone()),
                attempts: n.attempts,
                response: n.result.clone(),
            })
            .collect();

        let answer = arbitration
            .as_ref()
            .and_then(|a| a.final_decision())
            .filter(|decision| !decision.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| compose_answer(&plan.usable_responses()));

        Self {
            analysis: plan.analysis.clone(),
            priority: plan.priority,
            nodes,
            arbitration,
            answer,
            succeeded: plan.count(NodeStatus::Succeeded),
            failed: plan.count(NodeStatus::Failed),
            skipped: plan.count(NodeStatus::Skipped),
        }
    }

    pub fn node(&self, id: &TaskId) -> Option<&NodeOutcome> {
        self.nodes.iter().find(|n| &n.task_id == id)
    }
}

fn compose_answer(responses: &[&AgentResponse]) -> String {
    match responses {
        [] => String::new(),
        [only] => only.content.clone(),
        many => many
            .iter()
            .map(|r| format!("## {}\n\n{}", r.agent_name, r.content.trim()))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Aggregate a finished plan.
///
/// Fails only when no node produced a usable response; the error names each
/// node's failure kind.
pub fn aggregate(
    plan: &Plan,
    arbitration: Option<ArbitrationOutcome>,
) -> Result<FinalResult, AggregationError> {
    if plan.usable_responses().is_empty() {
        return Err(AggregationError::NoSuccessfulNodes(explain_failures(plan)));
    }
    Ok(FinalResult::summarize(plan, arbitration))
}

/// Composite explanation such as `T1 (contract_reviewer): PermanentError; ...`
pub fn explain_failures(plan: &Plan) -> String {
    if plan.nodes.is_empty() {
        return "plan has no tasks".to_string();
    }
    plan.nodes
        .iter()
        .map(|n| {
            let kind = match n.failure_kind() {
                Some(kind) => kind.as_str().to_string(),
                None if n.status == NodeStatus::Succeeded => "EmptyResponse".to_string(),
                None => n.status.as_str().to_string(),
            };
            format!("{} ({}): {}", n.id, n.capability, kind)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::entities::{NodeFailure, TaskNode};

    fn finished_plan() -> Plan {
        let mut plan = Plan::new("Lease dispute")
            .with_priority(Priority::High)
            .with_node(TaskNode::new("T1", "contract_reviewer", "review"))
            .with_node(TaskNode::new("T2", "risk_assessor", "assess"));
        plan.nodes[0].mark_succeeded(AgentResponse::new("contract_reviewer", "Clause 7 void"), 1);
        plan.nodes[1].mark_failed(NodeFailure::new(FailureKind::Timeout, "timed out"), 3);
        plan
    }

    #[test]
    fn test_aggregate_partial_success() {
        let plan = finished_plan();
        let result = aggregate(&plan, None).unwrap();

        assert_eq!(result.analysis, "Lease dispute");
        assert_eq!(result.priority, Priority::High);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.answer, "Clause 7 void");

        let t2 = result.node(&TaskId::new("T2")).unwrap();
        assert_eq!(t2.failure_kind, Some(FailureKind::Timeout));
        assert_eq!(t2.attempts, 3);
        assert_eq!(t2.capability, "risk_assessor");
    }

    #[test]
    fn test_arbitration_decision_becomes_answer() {
        let plan = finished_plan();
        let result = aggregate(
            &plan,
            Some(ArbitrationOutcome::RawText {
                final_decision: "Renegotiate".to_string(),
            }),
        )
        .unwrap();
        assert_eq!(result.answer, "Renegotiate");
    }

    #[test]
    fn test_blank_decision_keeps_specialist_answer() {
        let plan = finished_plan();
        let result = aggregate(
            &plan,
            Some(ArbitrationOutcome::RawText {
                final_decision: "  \n".to_string(),
            }),
        )
        .unwrap();
        assert_eq!(result.answer, "Clause 7 void");
    }

    #[test]
    fn test_multiple_responses_are_sectioned() {
        let mut plan = Plan::new("x")
            .with_node(TaskNode::new("T1", "a", "i"))
            .with_node(TaskNode::new("T2", "b", "j"));
        plan.nodes[0].mark_succeeded(AgentResponse::new("a", "first"), 1);
        plan.nodes[1].mark_succeeded(AgentResponse::new("b", "second"), 1);
        let result = aggregate(&plan, Some(ArbitrationOutcome::NoUsableInput)).unwrap();
        assert_eq!(result.answer, "## a\n\nfirst\n\n## b\n\nsecond");
    }

    #[test]
    fn test_zero_successes_is_hard_failure() {
        let mut plan = Plan::new("x")
            .with_node(TaskNode::new("T1", "contract_reviewer", "i"))
            .with_node(TaskNode::new("T2", "risk_assessor", "j"));
        plan.nodes[0].mark_failed(NodeFailure::new(FailureKind::Permanent, "bad"), 1);
        plan.nodes[1].mark_skipped(NodeFailure::new(FailureKind::GlobalTimeout, "deadline"));

        let err = aggregate(&plan, None).unwrap_err();
        assert_eq!(
            err,
            AggregationError::NoSuccessfulNodes(
                "T1 (contract_reviewer): PermanentError; T2 (risk_assessor): GlobalTimeout"
                    .to_string()
            )
        );
    }
}
