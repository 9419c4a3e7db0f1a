//! Integration tests for Taskpulse
//!
//! These tests drive the scheduler through its public API only:
//! - Lifecycle: start, stop, and rejection after stop
//! - Ordering: promotion order is pulse order across ticks
//! - Completion: finished tasks are never pulsed again

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskpulse_core::{
    SchedulerConfig, SchedulerError, SchedulerState, SharedTask, Task, TaskScheduler,
    DEFAULT_PULSE_INTERVAL_MS,
};
use tokio_test::assert_ok;

// ============================================================================
// Helpers
// ============================================================================

/// Connection-like task that records each pulse and hangs up after a budget
struct Connection {
    name: &'static str,
    budget: Option<usize>,
    pulses: usize,
    journal: Arc<Mutex<Vec<&'static str>>>,
}

impl Task for Connection {
    fn pulse(&mut self) -> bool {
        self.pulses += 1;
        self.journal.lock().unwrap().push(self.name);
        self.budget.map_or(true, |budget| self.pulses < budget)
    }
}

fn connection(
    name: &'static str,
    budget: Option<usize>,
    journal: &Arc<Mutex<Vec<&'static str>>>,
) -> SharedTask<Connection> {
    SharedTask::new(Connection {
        name,
        budget,
        pulses: 0,
        journal: journal.clone(),
    })
}

async fn wait_for_ticks(scheduler: &TaskScheduler, ticks: u64) {
    let mut rx = scheduler.subscribe();
    rx.wait_for(|stats| stats.ticks >= ticks).await.unwrap();
}

// ============================================================================
// Scheduler Tests
// ============================================================================

#[test]
fn test_default_config() {
    let config = SchedulerConfig::default();
    assert_eq!(config.pulse_interval_ms, DEFAULT_PULSE_INTERVAL_MS);
    assert_eq!(config.pulse_interval(), Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_connections_pulse_in_promotion_order() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let scheduler = TaskScheduler::new(SchedulerConfig::default()).unwrap();

    let a = connection("A", Some(1), &journal);
    let b = connection("B", None, &journal);
    let c = connection("C", None, &journal);
    assert_ok!(scheduler.submit(a.clone()));
    assert_ok!(scheduler.submit(b.clone()));
    assert_ok!(scheduler.submit(c.clone()));

    assert_ok!(scheduler.start());
    wait_for_ticks(&scheduler, 1).await;
    assert_eq!(*journal.lock().unwrap(), vec!["A", "B", "C"]);

    wait_for_ticks(&scheduler, 2).await;
    assert_eq!(*journal.lock().unwrap(), vec!["A", "B", "C", "B", "C"]);
    assert_eq!(a.lock().pulses, 1);
    assert_eq!(b.lock().pulses, 2);
    assert_eq!(c.lock().pulses, 2);

    assert_ok!(scheduler.stop().await);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_stop_immediately_after_construction() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let scheduler = TaskScheduler::new(SchedulerConfig::default()).unwrap();
    let never = connection("never", None, &journal);
    assert_ok!(scheduler.submit(never.clone()));

    assert_ok!(scheduler.stop().await);
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(never.lock().pulses, 0);
    assert!(journal.lock().unwrap().is_empty());
    assert!(matches!(scheduler.start(), Err(SchedulerError::Stopped)));
}

#[tokio::test(start_paused = true)]
async fn test_submitter_handle_outlives_borrow() {
    let scheduler = TaskScheduler::new(SchedulerConfig::new().with_pulse_interval_ms(50)).unwrap();
    let submitter = scheduler.submitter();
    assert_ok!(scheduler.start());

    let hits = Arc::new(AtomicUsize::new(0));
    let spawned = {
        let hits = hits.clone();
        tokio::spawn(async move {
            submitter.submit(move || {
                hits.fetch_add(1, Ordering::SeqCst) < 2
            })
        })
    };
    assert_ok!(spawned.await.unwrap());

    let mut rx = scheduler.subscribe();
    rx.wait_for(|stats| stats.completed_tasks == 1).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    assert_ok!(scheduler.stop().await);
    assert!(matches!(
        scheduler.submit(|| true),
        Err(SchedulerError::Stopped)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_real_time_cadence() {
    let scheduler = TaskScheduler::new(SchedulerConfig::new().with_pulse_interval_ms(20)).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    {
        let hits = hits.clone();
        assert_ok!(scheduler.submit(move || {
            hits.fetch_add(1, Ordering::SeqCst);
            true
        }));
    }

    assert_ok!(scheduler.start());
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_ok!(scheduler.stop().await);

    let pulses = hits.load(Ordering::SeqCst);
    assert!(pulses >= 3, "expected several pulses, got {pulses}");
    assert!(pulses <= 14, "expected at most one pulse per tick, got {pulses}");
    assert_eq!(scheduler.stats().ticks as usize, pulses);
}
