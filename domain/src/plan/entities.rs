//! Plan domain entities

use super::value_objects::{Priority, TaskId};
use crate::agent::response::AgentResponse;
use crate::core::time::now_millis;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task node.
///
/// `pending → ready → running → {succeeded | failed}`; `skipped` is reserved
/// for nodes that are never dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Pending,
    Ready,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl NodeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            NodeStatus::Pending => "pending",
            NodeStatus::Ready => "ready",
            NodeStatus::Running => "running",
            NodeStatus::Succeeded => "succeeded",
            NodeStatus::Failed => "failed",
            NodeStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NodeStatus::Succeeded | NodeStatus::Failed | NodeStatus::Skipped
        )
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a node did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// A single attempt exceeded the per-task timeout (after retries)
    #[serde(rename = "TimeoutError")]
    Timeout,
    /// The whole-plan deadline expired while the node was unfinished
    GlobalTimeout,
    /// Network / rate-limit class failure that persisted through every retry
    #[serde(rename = "TransientError")]
    Transient,
    /// Validation / content-policy class failure; never retried
    #[serde(rename = "PermanentError")]
    Permanent,
    /// Capability answered with blank content
    EmptyResponse,
    /// The node names a capability missing from the pool
    UnknownCapability,
    /// The node sits beyond the maximum number of waves
    WaveCapExceeded,
    /// Execution was cancelled by the caller
    Cancelled,
    /// The capability panicked
    Panicked,
}

impl FailureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FailureKind::Timeout => "TimeoutError",
            FailureKind::GlobalTimeout => "GlobalTimeout",
            FailureKind::Transient => "TransientError",
            FailureKind::Permanent => "PermanentError",
            FailureKind::EmptyResponse => "EmptyResponse",
            FailureKind::UnknownCapability => "UnknownCapability",
            FailureKind::WaveCapExceeded => "WaveCapExceeded",
            FailureKind::Cancelled => "Cancelled",
            FailureKind::Panicked => "Panicked",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure record attached to a failed or skipped node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl NodeFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A single specialist sub-task within a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Unique identifier within the plan
    pub id: TaskId,
    /// Registered capability that executes this node
    pub capability: String,
    /// What the capability should do
    pub instruction: String,
    /// Nodes that must be terminal before this one is dispatched
    pub depends_on: Vec<TaskId>,
    pub status: NodeStatus,
    /// Number of capability invocations made so far
    pub attempts: u32,
    pub result: Option<AgentResponse>,
    pub failure: Option<NodeFailure>,
    pub created_at: u64,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
}

impl TaskNode {
    pub fn new(
        id: impl Into<TaskId>,
        capability: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            capability: capability.into(),
            instruction: instruction.into(),
            depends_on: Vec::new(),
            status: NodeStatus::Pending,
            attempts: 0,
            result: None,
            failure: None,
            created_at: now_millis(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Add a dependency; duplicates are ignored.
    pub fn with_dependency(mut self, task_id: impl Into<TaskId>) -> Self {
        let task_id = task_id.into();
        if !self.depends_on.contains(&task_id) {
            self.depends_on.push(task_id);
        }
        self
    }

    pub fn mark_ready(&mut self) {
        if self.status == NodeStatus::Pending {
            self.status = NodeStatus::Ready;
        }
    }

    pub fn mark_running(&mut self) {
        if !self.status.is_terminal() {
            self.status = NodeStatus::Running;
            self.started_at = Some(now_millis());
        }
    }

    pub fn mark_succeeded(&mut self, response: AgentResponse, attempts: u32) {
        if self.status.is_terminal() {
            return;
        }
        self.status = NodeStatus::Succeeded;
        self.attempts = attempts;
        self.result = Some(response);
        self.failure = None;
        self.finished_at = Some(now_millis());
    }

    pub fn mark_failed(&mut self, failure: NodeFailure, attempts: u32) {
        if self.status.is_terminal() {
            return;
        }
        self.status = NodeStatus::Failed;
        self.attempts = attempts;
        self.failure = Some(failure);
        self.finished_at = Some(now_millis());
    }

    pub fn mark_skipped(&mut self, failure: NodeFailure) {
        if self.status.is_terminal() {
            return;
        }
        self.status = NodeStatus::Skipped;
        self.failure = Some(failure);
        self.finished_at = Some(now_millis());
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(|f| f.kind)
    }

    /// Successful, substantive response (if any)
    pub fn usable_response(&self) -> Option<&AgentResponse> {
        if self.status != NodeStatus::Succeeded {
            return None;
        }
        self.result.as_ref().filter(|r| r.is_substantive())
    }
}

/// A DAG of task nodes built for one incoming request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Planner's free-text analysis / rationale
    pub analysis: String,
    /// Ordered node list
    pub nodes: Vec<TaskNode>,
    pub priority: Priority,
    pub created_at: u64,
}

impl Plan {
    pub fn new(analysis: impl Into<String>) -> Self {
        Self {
            analysis: analysis.into(),
            nodes: Vec::new(),
            priority: Priority::default(),
            created_at: now_millis(),
        }
    }

    pub fn with_node(mut self, node: TaskNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn add_node(&mut self, node: TaskNode) {
        self.nodes.push(node);
    }

    pub fn node(&self, id: &TaskId) -> Option<&TaskNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_mut(&mut self, id: &TaskId) -> Option<&mut TaskNode> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    /// Whether every node has reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.nodes.iter().all(|n| n.status.is_terminal())
    }

    /// Number of nodes in the given status
    pub fn count(&self, status: NodeStatus) -> usize {
        self.nodes.iter().filter(|n| n.status == status).count()
    }

    /// Substantive responses from succeeded nodes, in plan order
    pub fn usable_responses(&self) -> Vec<&AgentResponse> {
        self.nodes
            .iter()
            .filter_map(|n| n.usable_response())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_lifecycle() {
        let mut node = TaskNode::new("T1", "contract_reviewer", "Review clause 4");
        assert_eq!(node.status, NodeStatus::Pending);

        node.mark_ready();
        assert_eq!(node.status, NodeStatus::Ready);

        node.mark_running();
        assert_eq!(node.status, NodeStatus::Running);
        assert!(node.started_at.is_some());

        node.mark_succeeded(AgentResponse::new("contract_reviewer", "ok"), 1);
        assert_eq!(node.status, NodeStatus::Succeeded);
        assert_eq!(node.attempts, 1);
        assert!(node.usable_response().is_some());
    }

    #[test]
    fn test_terminal_node_is_not_overwritten() {
        let mut node = TaskNode::new("T1", "contract_reviewer", "Review");
        node.mark_running();
        node.mark_failed(NodeFailure::new(FailureKind::Permanent, "bad input"), 1);
        node.mark_succeeded(AgentResponse::new("contract_reviewer", "late"), 2);

        assert_eq!(node.status, NodeStatus::Failed);
        assert_eq!(node.failure_kind(), Some(FailureKind::Permanent));
        assert!(node.result.is_none());
    }

    #[test]
    fn test_duplicate_dependencies_ignored() {
        let node = TaskNode::new("T3", "legal_advisor", "Summarize")
            .with_dependency("T1")
            .with_dependency("T1")
            .with_dependency("T2");
        assert_eq!(node.depends_on, vec![TaskId::new("T1"), TaskId::new("T2")]);
    }

    #[test]
    fn test_plan_counts() {
        let mut plan = Plan::new("analysis")
            .with_node(TaskNode::new("T1", "a", "x"))
            .with_node(TaskNode::new("T2", "b", "y"));
        assert!(!plan.is_complete());

        plan.node_mut(&TaskId::new("T1"))
            .unwrap()
            .mark_succeeded(AgentResponse::new("a", "done"), 1);
        plan.node_mut(&TaskId::new("T2"))
            .unwrap()
            .mark_skipped(NodeFailure::new(FailureKind::WaveCapExceeded, "beyond cap"));

        assert!(plan.is_complete());
        assert_eq!(plan.count(NodeStatus::Succeeded), 1);
        assert_eq!(plan.count(NodeStatus::Skipped), 1);
        assert_eq!(plan.usable_responses().len(), 1);
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::Timeout.to_string(), "TimeoutError");
        assert_eq!(FailureKind::GlobalTimeout.to_string(), "GlobalTimeout");
        assert_eq!(
            serde_json::to_value(FailureKind::Permanent).unwrap(),
            "PermanentError"
        );
    }
}
