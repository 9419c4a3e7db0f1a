//! Server configuration types

use serde::{Deserialize, Serialize};
use taskpulse_core::SchedulerConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Keep-alive sessions submitted at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_sessions")]
    pub sessions: usize,
    #[serde(default = "default_session_pulses")]
    pub session_pulses: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sessions: default_sessions(),
            session_pulses: default_session_pulses(),
        }
    }
}

fn default_sessions() -> usize {
    3
}

fn default_session_pulses() -> u32 {
    10
}
