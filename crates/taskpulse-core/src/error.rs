//! Error types for taskpulse-core

use thiserror::Error;

/// Scheduler error type
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The scheduler has been stopped and no longer accepts work
    #[error("scheduler is stopped")]
    Stopped,

    /// `start` was called on a scheduler that is already running
    #[error("scheduler is already running")]
    AlreadyStarted,

    /// `start` was called outside of a tokio runtime
    #[error("no tokio runtime available to drive the scheduler")]
    NoRuntime,

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pulse timeline terminated abnormally
    #[error("pulse timeline fault: {0}")]
    TimelineFault(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SchedulerError>;
