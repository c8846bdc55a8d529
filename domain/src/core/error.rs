//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Task description cannot be empty")]
    EmptyTask,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Unknown priority: {0}")]
    UnknownPriority(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rating_display() {
        let error = DomainError::InvalidRating(7);
        assert_eq!(error.to_string(), "Rating must be between 1 and 5, got 7");
    }

    #[test]
    fn test_empty_task_display() {
        assert_eq!(
            DomainError::EmptyTask.to_string(),
            "Task description cannot be empty"
        );
    }
}
