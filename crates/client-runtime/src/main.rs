//! # Event Feedback Client
//!
//! Headless entry point. Configuration comes from the environment; see
//! [`client_runtime::load_config_from`] and `client_telemetry::TelemetryConfig`.

use anyhow::{Context, Result};
use client_runtime::{load_config, ClientRuntime};
use client_telemetry::init_telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config();
    let _telemetry =
        init_telemetry(config.telemetry.clone()).context("Failed to initialise logging")?;

    config
        .realtime
        .validate()
        .context("Invalid realtime configuration")?;

    let runtime = ClientRuntime::new(config);
    runtime.start();

    info!("Client is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown();
    Ok(())
}
