//! Keep-alive session task
//!
//! Stands in for per-connection work that must run at a fixed cadence
//! regardless of I/O activity.

use taskpulse_core::Task;
use tracing::{debug, info};

/// Sends a keep-alive on every pulse until its budget is spent
pub struct KeepAliveSession {
    session: usize,
    sent: u32,
    budget: u32,
}

impl KeepAliveSession {
    pub fn new(session: usize, budget: u32) -> Self {
        Self {
            session,
            sent: 0,
            budget,
        }
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn is_finished(&self) -> bool {
        self.sent >= self.budget
    }
}

impl Task for KeepAliveSession {
    fn pulse(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }

        self.sent += 1;
        debug!(session = self.session, sent = self.sent, "Keep-alive sent");

        if self.is_finished() {
            info!(session = self.session, sent = self.sent, "Session closed");
            return false;
        }
        true
    }
}
