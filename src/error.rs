//! Error types for the contest engine and pipeline
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate. Typed failures are recovered with `downcast_ref::<ArenaError>()`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific contest scenarios
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Pool too small: {available} contestants registered, {required} required")]
    EmptyPool { required: usize, available: usize },

    #[error("Unknown contestant: {contestant_id}")]
    UnknownContestant { contestant_id: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Task {task_id} failed: {reason}")]
    TaskFailed { task_id: String, reason: String },

    #[error("Stage {stage} is not complete: {reason}")]
    StageIncomplete { stage: String, reason: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ArenaError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
