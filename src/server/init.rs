//! Host run loop
//!
//! Starts the scheduler, submits the keep-alive sessions, and waits until
//! they finish or the process is interrupted.

use super::config::AppConfig;
use super::sessions::KeepAliveSession;
use anyhow::{Context, Result};
use std::time::Duration;
use taskpulse_core::{SharedTask, TaskScheduler};
use tracing::{debug, info};

/// How often the host checks that the pulse timeline is alive
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Run the host until all sessions finish or ctrl-c
pub async fn run(config: AppConfig) -> Result<()> {
    let scheduler =
        TaskScheduler::new(config.scheduler.clone()).context("Failed to create task scheduler")?;
    scheduler.start().context("Failed to start task scheduler")?;

    let sessions = (0..config.demo.sessions)
        .map(|id| -> Result<SharedTask<KeepAliveSession>> {
            let session = SharedTask::new(KeepAliveSession::new(id, config.demo.session_pulses));
            let task_id = scheduler
                .submit(session.clone())
                .context("Failed to submit session")?;
            debug!(session = id, task_id = %task_id, "Session scheduled");
            Ok(session)
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Scheduled {} sessions ({} pulses each)",
        sessions.len(),
        config.demo.session_pulses
    );

    let mut stats = scheduler.subscribe();
    let mut health = tokio::time::interval(HEALTH_CHECK_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            changed = stats.changed() => {
                if changed.is_err() {
                    break;
                }
                if sessions.iter().all(|s| s.lock().is_finished()) {
                    info!("All sessions finished");
                    break;
                }
            }
            _ = health.tick() => {
                scheduler.check_timeline().context("Task scheduler stalled")?;
            }
        }
    }

    let last = scheduler.stats();
    let keepalives: u32 = sessions.iter().map(|s| s.lock().sent()).sum();
    scheduler
        .stop()
        .await
        .context("Task scheduler did not shut down cleanly")?;

    info!(
        ticks = last.ticks,
        completed = last.completed_tasks,
        failed = last.failed_tasks,
        keepalives,
        "Taskpulse stopped"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::config::DemoConfig;
    use taskpulse_core::SchedulerConfig;

    #[tokio::test(start_paused = true)]
    async fn test_run_exits_when_sessions_finish() {
        let config = AppConfig {
            scheduler: SchedulerConfig::new().with_pulse_interval_ms(50),
            demo: DemoConfig {
                sessions: 2,
                session_pulses: 4,
            },
        };

        tokio::time::timeout(Duration::from_secs(60), run(config))
            .await
            .expect("run should finish once sessions are done")
            .unwrap();
    }
}
