//! Progress notification port
//!
//! Defines the interface for reporting progress while a plan executes.

use workforce_domain::{FailureKind, NodeStatus, Plan, TaskId};

/// Callback for progress updates during plan execution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain log lines, etc.).
/// Every method has a no-op default.
pub trait WorkforceProgress: Send + Sync {
    /// Called once the plan has been validated
    fn on_plan_ready(&self, _plan: &Plan, _wave_count: usize) {}

    /// Called when a wave starts
    fn on_wave_start(&self, _wave: usize, _total_waves: usize, _node_count: usize) {}

    /// Called when a node is dispatched
    fn on_node_start(&self, _task_id: &TaskId, _capability: &str) {}

    /// Called before a node is retried after a transient failure
    fn on_node_retry(&self, _task_id: &TaskId, _attempt: u32, _reason: &str) {}

    /// Called when a node reaches a terminal state
    fn on_node_finished(
        &self,
        _task_id: &TaskId,
        _status: NodeStatus,
        _failure: Option<FailureKind>,
    ) {
    }

    /// Called when every node in a wave is terminal
    fn on_wave_complete(&self, _wave: usize) {}

    /// Called before the consensus arbiter runs
    fn on_arbitration_start(&self, _responses: usize) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl WorkforceProgress for NoProgress {}
