//! Agent domain module
//!
//! What a specialist receives ([`context::ExecutionContext`]) and what it
//! returns ([`response::AgentResponse`]).

pub mod context;
pub mod response;

pub use context::{DependentResult, ExecutionContext, LlmConfig};
pub use response::AgentResponse;
