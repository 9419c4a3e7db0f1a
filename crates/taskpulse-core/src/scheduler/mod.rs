//! TaskScheduler - Fixed-Cadence Task Pulsing
//!
//! A scheduler owns one timeline that wakes every pulse interval and
//! advances every active [`Task`] exactly once, in promotion order.
//! Submissions may arrive from any thread at any time; they are buffered and
//! promoted at the start of the next tick.
//!
//! # Architecture
//!
//! ```text
//!  submit() ──┐   (any thread)
//!  submit() ──┼──► PendingQueue ── drain once per tick ──┐
//!  submit() ──┘     (mutex)                              ▼
//!                                         ┌──────────────────────────┐
//!  tokio interval ─── tick ──────────────►│ ActiveSet (timeline only)│
//!                                         │ pulse each task in order │
//!                                         │ drop tasks that are done │
//!                                         └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskpulse_core::{SchedulerConfig, TaskScheduler};
//!
//! # async fn example() -> taskpulse_core::Result<()> {
//! let scheduler = TaskScheduler::new(SchedulerConfig::default())?;
//! scheduler.start()?;
//!
//! let mut remaining = 3;
//! scheduler.submit(move || {
//!     remaining -= 1;
//!     remaining > 0
//! })?;
//!
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod engine;
mod pulse;
mod task;

pub use config::{SchedulerConfig, DEFAULT_PULSE_INTERVAL_MS};
pub use engine::{SchedulerState, SchedulerStats, TaskScheduler, TaskSubmitter};
pub use task::{SharedTask, Task, TaskId};
