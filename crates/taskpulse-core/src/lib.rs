//! Taskpulse Core - Periodic Task Pulse Scheduler
//!
//! This crate provides the tick-driving primitive used inside an
//! event-driven server:
//! - Task: the single "advance one step" capability a recurring job exposes
//! - Scheduler: one timeline that promotes submitted tasks and pulses every
//!   active task at a fixed cadence until it reports completion
//! - Error: submission and lifecycle errors

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod scheduler;

pub use error::{Result, SchedulerError};
pub use scheduler::{
    SchedulerConfig, SchedulerState, SchedulerStats, SharedTask, Task, TaskId, TaskScheduler,
    TaskSubmitter, DEFAULT_PULSE_INTERVAL_MS,
};
