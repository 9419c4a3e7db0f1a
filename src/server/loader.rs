//! Configuration loading
//!
//! Sources, lowest priority first: the embedded defaults, optional
//! `config/default`, `config/{TASKPULSE_ENV}` and `config/local` files,
//! then `TASKPULSE_*` environment variables.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

const ENV_PREFIX: &str = "TASKPULSE";

/// Load configuration from files and the process environment
pub fn load_config() -> Result<AppConfig> {
    let profile = std::env::var("TASKPULSE_ENV").unwrap_or_else(|_| "development".to_string());
    build_config(&profile, None)
}

/// `vars` stands in for the process environment when given
fn build_config(profile: &str, vars: Option<HashMap<String, String>>) -> Result<AppConfig> {
    let mut builder =
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

    for name in [
        "config/default".to_string(),
        format!("config/{profile}"),
        "config/local".to_string(),
    ] {
        builder = builder.add_source(File::with_name(&name).required(false));
    }

    let config: AppConfig = builder
        .add_source(environment(vars))
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    config
        .scheduler
        .validate()
        .context("Invalid scheduler configuration")?;

    Ok(config)
}

// A single `_` follows the prefix and `__` separates nesting levels, so
// TASKPULSE_SCHEDULER__PULSE_INTERVAL_MS sets scheduler.pulse_interval_ms.
fn environment(vars: Option<HashMap<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.scheduler.pulse_interval_ms, 200);
        assert_eq!(config.demo.sessions, 3);
        assert_eq!(config.demo.session_pulses, 10);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str("", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.scheduler.pulse_interval_ms, 200);
        assert_eq!(config.demo.session_pulses, 10);
    }

    #[test]
    fn test_environment_overrides_files() {
        let config = build_config(
            "test",
            vars(&[
                ("TASKPULSE_SCHEDULER__PULSE_INTERVAL_MS", "75"),
                ("TASKPULSE_DEMO__SESSIONS", "5"),
            ]),
        )
        .unwrap();

        assert_eq!(config.scheduler.pulse_interval_ms, 75);
        assert_eq!(config.demo.sessions, 5);
        assert_eq!(config.demo.session_pulses, 10);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = build_config(
            "test",
            vars(&[("TASKPULSE_SCHEDULER__PULSE_INTERVAL_MS", "0")]),
        );
        assert!(result.is_err());
    }
}
