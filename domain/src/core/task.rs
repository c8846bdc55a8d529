//! Task description value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A task submitted to the workforce (Value Object)
///
/// Wraps the caller's natural-language request. Guaranteed non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescription {
    content: String,
}

impl TaskDescription {
    /// Create a task description, rejecting empty or whitespace-only input
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            Err(DomainError::EmptyTask)
        } else {
            Ok(Self { content })
        }
    }

    /// Get the description text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner text
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for TaskDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}
