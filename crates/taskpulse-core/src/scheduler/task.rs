//! The task capability consumed by the scheduler

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A recurring unit of work advanced once per tick.
///
/// The scheduler sees nothing of a task beyond the result of [`Task::pulse`].
/// Any cleanup must happen inside the final `pulse` call, before it reports
/// completion. `pulse` runs on the scheduler timeline and must not block:
/// a slow task delays every other task in the same tick.
pub trait Task: Send + 'static {
    /// Advance one step. Returns `true` to stay scheduled, `false` once done.
    fn pulse(&mut self) -> bool;
}

impl<F> Task for F
where
    F: FnMut() -> bool + Send + 'static,
{
    fn pulse(&mut self) -> bool {
        self()
    }
}

/// Shared task handle.
///
/// The submitter keeps a clone and can inspect the task between ticks.
/// Submitting two clones of the same handle pulses the underlying task twice
/// per tick; the scheduler does not deduplicate.
pub struct SharedTask<T> {
    inner: Arc<Mutex<T>>,
}

impl<T: Task> SharedTask<T> {
    /// Wrap a task so it can be observed after submission
    pub fn new(task: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(task)),
        }
    }

    /// Lock the task state. Recovers the state if a pulse panicked.
    ///
    /// Hold the guard briefly: while it is held, the timeline blocks inside
    /// this task's pulse and every later task in the tick waits with it.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for SharedTask<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Task> Task for SharedTask<T> {
    fn pulse(&mut self) -> bool {
        match self.inner.lock() {
            Ok(mut task) => task.pulse(),
            // a previous pulse panicked mid-step
            Err(_) => false,
        }
    }
}

/// Identifier assigned to a task when its submission is accepted.
///
/// Ids increase in submission order, which is also promotion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    /// Raw sequence number
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}
