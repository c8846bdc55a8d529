//! Plan domain: the DAG of specialist sub-tasks built for one request.
//!
//! - [`entities`]: [`TaskNode`](entities::TaskNode) and [`Plan`](entities::Plan)
//! - [`parser`]: typed parsing of planner output with a single-node fallback
//! - [`validation`]: well-formedness checks and wave partitioning

pub mod entities;
pub mod parser;
pub mod validation;
pub mod value_objects;

pub use entities::{FailureKind, NodeFailure, NodeStatus, Plan, TaskNode};
pub use parser::{PlanningError, fallback_plan, parse_plan, parse_plan_json};
pub use validation::{ExecutionWaves, ValidationError, validate};
pub use value_objects::{Priority, TaskId};
