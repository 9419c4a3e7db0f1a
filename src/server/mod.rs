//! Server module for Taskpulse
//!
//! Contains configuration loading and the host run loop.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `sessions`: Keep-alive session task pulsed by the scheduler
//! - `init`: Scheduler startup, wait loop, and shutdown

pub mod config;
mod init;
mod loader;
mod sessions;

pub use init::run;
pub use loader::load_config;
