//! Port for structured execution logging.
//!
//! Defines the [`ExecutionLogger`] trait for recording execution events
//! (plan creation, waves, node outcomes, arbitration, episodes) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the run
//! transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured execution event for logging.
pub struct ExecutionEvent {
    /// Event type identifier (e.g., "plan_created", "node_finished").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ExecutionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging execution events to a structured log.
///
/// `log` is synchronous and non-fallible; logging failures are ignored so
/// they never disturb plan execution.
pub trait ExecutionLogger: Send + Sync {
    fn log(&self, event: ExecutionEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoExecutionLogger;

impl ExecutionLogger for NoExecutionLogger {
    fn log(&self, _event: ExecutionEvent) {}
}
