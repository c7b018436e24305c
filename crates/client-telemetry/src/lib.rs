//! # Client Telemetry
//!
//! Logging initialisation for the event-feedback client. Every crate in the
//! workspace logs through `tracing` with structured fields; this crate installs
//! the subscriber that renders them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use client_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FC_SERVICE_NAME` | `feedback-client` | Service name on the startup span |
//! | `FC_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `FC_CONSOLE_OUTPUT` | `true` | Write events to stderr |
//! | `FC_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |

mod config;
mod logging;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global subscriber.
///
/// Returns a guard to hold for the lifetime of the process.
///
/// # Errors
///
/// Fails on an unparsable filter directive or when a global subscriber is
/// already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::install(&config)?;
    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Telemetry initialised"
    );
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Span carrying the component name.
///
/// ```rust,ignore
/// let _span = component_span!("realtime", url = %config.url).entered();
/// ```
#[macro_export]
macro_rules! component_span {
    ($component:expr $(, $($field:tt)*)?) => {
        tracing::info_span!("component", component = $component $(, $($field)*)?)
    };
}
