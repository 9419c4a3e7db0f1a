//! Scheduler execution engine
//!
//! Owns the pulse timeline:
//! - Explicit start/stop lifecycle (`Created → Running → Stopped`)
//! - Submission from any thread into the pending buffer
//! - One serialized pulse per tick, delayed rather than overlapped on overrun

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::config::SchedulerConfig;
use super::pulse::{panic_message, ActiveSet, PendingQueue};
use super::task::{Task, TaskId};
use crate::error::{Result, SchedulerError};

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Timer not started; submissions are buffered but never promoted
    Created,
    /// Timer firing every pulse interval
    Running,
    /// Terminal; submissions are rejected
    Stopped,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Running => write!(f, "Running"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Snapshot of the timeline, published after every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Ticks completed since start
    pub ticks: u64,
    /// Size of the active set after the last tick
    pub active_tasks: usize,
    /// Tasks removed because they reported completion
    pub completed_tasks: u64,
    /// Tasks removed because their pulse panicked
    pub failed_tasks: u64,
}

struct Lifecycle {
    state: SchedulerState,
    timeline: Option<JoinHandle<()>>,
}

/// Periodic task-pulse scheduler
///
/// Nothing runs until [`TaskScheduler::start`] is called.
pub struct TaskScheduler {
    config: SchedulerConfig,
    pending: Arc<PendingQueue>,
    lifecycle: Mutex<Lifecycle>,
    cancel: CancellationToken,
    stats: Arc<watch::Sender<SchedulerStats>>,
}

impl TaskScheduler {
    /// Create a new scheduler in the `Created` state
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let (stats, _) = watch::channel(SchedulerStats::default());
        Ok(Self {
            config,
            pending: Arc::new(PendingQueue::new()),
            lifecycle: Mutex::new(Lifecycle {
                state: SchedulerState::Created,
                timeline: None,
            }),
            cancel: CancellationToken::new(),
            stats: Arc::new(stats),
        })
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configuration this scheduler was built with
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Start the pulse timeline on the current tokio runtime.
    ///
    /// The first tick fires immediately. Fails with `AlreadyStarted` when
    /// running and with `Stopped` once stopped.
    pub fn start(&self) -> Result<()> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        let mut lifecycle = self.lock_lifecycle();
        match lifecycle.state {
            SchedulerState::Running => return Err(SchedulerError::AlreadyStarted),
            SchedulerState::Stopped => return Err(SchedulerError::Stopped),
            SchedulerState::Created => {}
        }

        let timeline = Timeline {
            interval: self.config.pulse_interval(),
            pending: self.pending.clone(),
            stats: self.stats.clone(),
            cancel: self.cancel.clone(),
        };
        lifecycle.timeline = Some(runtime.spawn(timeline.run()));
        lifecycle.state = SchedulerState::Running;

        info!(
            "Task scheduler started (pulse interval: {}ms)",
            self.config.pulse_interval_ms
        );
        Ok(())
    }

    /// Stop the timeline and discard every pending and active task.
    ///
    /// A pulse already in progress finishes first. Calling `stop` again is a
    /// no-op. Returns `TimelineFault` if the timeline had died abnormally.
    pub async fn stop(&self) -> Result<()> {
        let timeline = {
            let mut lifecycle = self.lock_lifecycle();
            if lifecycle.state == SchedulerState::Stopped {
                return Ok(());
            }
            lifecycle.state = SchedulerState::Stopped;
            lifecycle.timeline.take()
        };

        let discarded = self.pending.close();
        if !discarded.is_empty() {
            debug!(count = discarded.len(), "Discarding pending tasks");
        }
        drop(discarded);
        self.cancel.cancel();

        if let Some(handle) = timeline {
            match handle.await {
                Ok(()) => {}
                Err(e) if e.is_panic() => {
                    let message = panic_message(e.into_panic().as_ref());
                    return Err(SchedulerError::TimelineFault(message));
                }
                Err(e) => return Err(SchedulerError::TimelineFault(e.to_string())),
            }
        }

        info!("Task scheduler stopped");
        Ok(())
    }

    /// Buffer a task for promotion on the next tick.
    ///
    /// Never blocks on the timeline. The scheduler does not check for
    /// duplicates: submitting the same shared handle twice pulses it twice.
    pub fn submit<T: Task>(&self, task: T) -> Result<TaskId> {
        submit_into(&self.pending, Box::new(task))
    }

    /// Cloneable handle that can only submit tasks
    pub fn submitter(&self) -> TaskSubmitter {
        TaskSubmitter {
            pending: self.pending.clone(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        self.lock_lifecycle().state
    }

    /// Report a timeline that exited while the scheduler was still running
    pub fn check_timeline(&self) -> Result<()> {
        let lifecycle = self.lock_lifecycle();
        let exited = lifecycle
            .timeline
            .as_ref()
            .is_some_and(|handle| handle.is_finished());
        if lifecycle.state == SchedulerState::Running && exited {
            return Err(SchedulerError::TimelineFault(
                "pulse timeline exited while running".to_string(),
            ));
        }
        Ok(())
    }

    /// Latest published statistics
    pub fn stats(&self) -> SchedulerStats {
        *self.stats.borrow()
    }

    /// Watch statistics as ticks complete
    pub fn subscribe(&self) -> watch::Receiver<SchedulerStats> {
        self.stats.subscribe()
    }

    /// Number of submitted tasks not yet promoted
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.pending.close();
        self.cancel.cancel();
    }
}

/// Submission-only handle to a [`TaskScheduler`]
#[derive(Clone)]
pub struct TaskSubmitter {
    pending: Arc<PendingQueue>,
}

impl TaskSubmitter {
    /// Buffer a task for promotion on the next tick
    pub fn submit<T: Task>(&self, task: T) -> Result<TaskId> {
        submit_into(&self.pending, Box::new(task))
    }
}

fn submit_into(pending: &PendingQueue, task: Box<dyn Task>) -> Result<TaskId> {
    let id = pending.push(task)?;
    debug!(task_id = %id, "Task submitted");
    Ok(id)
}

/// State moved into the spawned timer task
struct Timeline {
    interval: Duration,
    pending: Arc<PendingQueue>,
    stats: Arc<watch::Sender<SchedulerStats>>,
    cancel: CancellationToken,
}

impl Timeline {
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut active = ActiveSet::new();
        let mut stats = SchedulerStats::default();

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let started = Instant::now();
                    let report = active.pulse(&self.pending);
                    let elapsed = started.elapsed();

                    stats.ticks += 1;
                    stats.active_tasks = report.active;
                    stats.completed_tasks += report.completed as u64;
                    stats.failed_tasks += report.failed as u64;
                    self.stats.send_replace(stats);

                    trace!(
                        tick = stats.ticks,
                        promoted = report.promoted,
                        advanced = report.advanced,
                        completed = report.completed,
                        failed = report.failed,
                        active = report.active,
                        "Pulse complete"
                    );

                    if elapsed > self.interval {
                        warn!(
                            tick = stats.ticks,
                            "Pulse took {:?} (longer than interval {:?}), delaying next tick",
                            elapsed, self.interval
                        );
                    }
                }
            }
        }

        let dropped = active.clear();
        info!(ticks = stats.ticks, dropped, "Pulse timeline shut down");
    }
}
