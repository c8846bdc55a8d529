//! Core domain concepts shared across all subdomains.
//!
//! - [`task::TaskDescription`]: a validated task description submitted by a caller
//! - [`error::DomainError`]: domain-level errors
//! - [`time::now_millis`]: wall-clock timestamps used on entities

pub mod error;
pub mod string;
pub mod task;
pub mod time;
