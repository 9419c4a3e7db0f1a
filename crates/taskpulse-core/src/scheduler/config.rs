//! Scheduler configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SchedulerError};

/// Default number of milliseconds between pulses
pub const DEFAULT_PULSE_INTERVAL_MS: u64 = 200;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Milliseconds between two pulses of the active set
    pub pulse_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pulse_interval_ms: DEFAULT_PULSE_INTERVAL_MS,
        }
    }
}

impl SchedulerConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pulse interval
    pub fn with_pulse_interval_ms(mut self, millis: u64) -> Self {
        self.pulse_interval_ms = millis;
        self
    }

    /// Pulse interval as a [`Duration`]
    pub fn pulse_interval(&self) -> Duration {
        Duration::from_millis(self.pulse_interval_ms)
    }

    /// Reject settings the timer cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.pulse_interval_ms == 0 {
            return Err(SchedulerError::InvalidConfig(
                "pulse_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
