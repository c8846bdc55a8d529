//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod arbiter;
pub mod capability;
pub mod execution_logger;
pub mod experience_store;
pub mod llm_gateway;
pub mod planner;
pub mod progress;
pub mod requirement_analyzer;
