//! Prompt domain
//!
//! Templates for the requirement gate, planner, specialists and arbiter.

mod template;

pub use template::PromptTemplate;
