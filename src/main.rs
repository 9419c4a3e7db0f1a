//! Taskpulse - Periodic Task Pulse Host
//!
//! Entry point that wires the task scheduler into a process lifecycle.

#![forbid(unsafe_code)]

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskpulse=info,taskpulse_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Taskpulse v{}", env!("CARGO_PKG_VERSION"));

    let config = server::load_config()?;
    server::run(config).await
}
