//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod analyze_requirements;
pub mod arbitrate;
pub mod execute_plan;
pub mod plan_task;
pub mod record_episode;
pub mod run_workforce;
pub mod shared;
