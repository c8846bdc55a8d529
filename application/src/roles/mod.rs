//! LLM-backed role adapters
//!
//! Each role turns a port call into one [`LlmGateway`](crate::ports::llm_gateway::LlmGateway)
//! completion using the templates in `workforce_domain::prompt`, and parses
//! the raw text back through the domain parsers.
//!
//! Roles do not acquire the LLM concurrency limiter themselves; the use case
//! invoking them already holds a permit.

pub mod arbiter;
pub mod planner;
pub mod requirement;
pub mod specialist;

pub use arbiter::LlmArbiter;
pub use planner::LlmPlanner;
pub use requirement::LlmRequirementAnalyzer;
pub use specialist::LlmSpecialist;
