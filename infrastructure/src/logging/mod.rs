//! Logging infrastructure: the JSONL execution transcript.

mod jsonl_logger;

pub use jsonl_logger::JsonlExecutionLogger;
