//! Pending buffer and active set
//!
//! The pending queue is the only state shared between submitters and the
//! timeline, so it is the only state behind a lock. The active set is owned
//! by the timeline and never locked.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

use super::task::{Task, TaskId};
use crate::error::{Result, SchedulerError};

/// A submitted task and its id
pub(crate) struct Entry {
    pub(crate) id: TaskId,
    pub(crate) task: Box<dyn Task>,
}

struct PendingInner {
    tasks: Vec<Entry>,
    next_id: u64,
    closed: bool,
}

/// Multi-writer buffer of submitted tasks awaiting promotion
pub(crate) struct PendingQueue {
    inner: Mutex<PendingInner>,
}

impl PendingQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(PendingInner {
                tasks: Vec::new(),
                next_id: 1,
                closed: false,
            }),
        }
    }

    // Critical sections never run task code, so a poisoned lock still
    // guards consistent data.
    fn lock(&self) -> MutexGuard<'_, PendingInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Buffer a task. Fails once the queue has been closed.
    pub(crate) fn push(&self, task: Box<dyn Task>) -> Result<TaskId> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(SchedulerError::Stopped);
        }
        let id = TaskId(inner.next_id);
        inner.next_id += 1;
        inner.tasks.push(Entry { id, task });
        Ok(id)
    }

    /// Take every buffered task, in submission order
    pub(crate) fn drain(&self) -> Vec<Entry> {
        std::mem::take(&mut self.lock().tasks)
    }

    /// Reject further submissions and hand back whatever was still buffered
    pub(crate) fn close(&self) -> Vec<Entry> {
        let mut inner = self.lock();
        inner.closed = true;
        std::mem::take(&mut inner.tasks)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().tasks.len()
    }
}

/// Outcome of one pulse of the active set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PulseReport {
    pub(crate) promoted: usize,
    pub(crate) advanced: usize,
    pub(crate) completed: usize,
    pub(crate) failed: usize,
    pub(crate) active: usize,
}

/// Tasks being pulsed every tick, in promotion order
#[derive(Default)]
pub(crate) struct ActiveSet {
    tasks: Vec<Entry>,
}

impl ActiveSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Promote pending tasks, then advance every active task once.
    ///
    /// Survivors are collected into a fresh vector so removal never disturbs
    /// the iteration. A task that panics is dropped like a finished one.
    pub(crate) fn pulse(&mut self, pending: &PendingQueue) -> PulseReport {
        let promoted = pending.drain();
        let mut report = PulseReport {
            promoted: promoted.len(),
            ..PulseReport::default()
        };
        self.tasks.extend(promoted);

        let current = std::mem::take(&mut self.tasks);
        let mut survivors = Vec::with_capacity(current.len());

        for mut entry in current {
            report.advanced += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| entry.task.pulse())) {
                Ok(true) => survivors.push(entry),
                Ok(false) => {
                    debug!(task_id = %entry.id, "Task finished");
                    report.completed += 1;
                    release(entry);
                }
                Err(payload) => {
                    error!(
                        task_id = %entry.id,
                        panic = %panic_message(payload.as_ref()),
                        "Task panicked during pulse, removing it"
                    );
                    report.failed += 1;
                    release(entry);
                }
            }
        }

        self.tasks = survivors;
        report.active = self.tasks.len();
        report
    }

    /// Drop every active task without pulsing it
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.tasks.len();
        for entry in self.tasks.drain(..) {
            release(entry);
        }
        count
    }
}

/// Drop a task, keeping a panicking destructor off the timeline
fn release(entry: Entry) {
    let id = entry.id;
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || drop(entry))) {
        error!(
            task_id = %id,
            panic = %panic_message(payload.as_ref()),
            "Task panicked while being dropped"
        );
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
