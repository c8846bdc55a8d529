//! Application-level configuration.
//!
//! - [`SchedulerParams`]: plan execution limits (fan-out, LLM concurrency, timeouts, retries)
//! - [`MemoryParams`]: experience recall and persistence settings

pub mod memory_params;
pub mod scheduler_params;

pub use memory_params::MemoryParams;
pub use scheduler_params::SchedulerParams;
