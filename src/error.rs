//! Error types for taskheap
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::scheduler::TaskId;

/// All error types that can occur in taskheap
#[derive(Debug, Error)]
pub enum TaskheapError {
    /// Task identifier is already live in the scheduler
    #[error("Duplicate task: {0}")]
    DuplicateTask(TaskId),

    /// Heap order, index map or submission records disagree
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Malformed replay script
    #[error("Script error: {0}")]
    Script(String),

    /// The scheduler owner task has stopped
    #[error("Scheduler service closed")]
    ServiceClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for taskheap operations
pub type Result<T> = std::result::Result<T, TaskheapError>;
