//! # Client Configuration
//!
//! Defaults overridden from environment variables. Unparsable values are
//! logged and ignored.

use client_telemetry::TelemetryConfig;
use fc_02_realtime::RealtimeConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default directory of persisted client state.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Realtime channel settings.
    pub realtime: RealtimeConfig,
    /// Directory holding the persisted credential.
    pub data_dir: PathBuf,
    /// Credential to log in with at startup.
    pub token: Option<String>,
    /// Logging settings.
    pub telemetry: TelemetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            realtime: RealtimeConfig::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            token: None,
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> ClientConfig {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration from an arbitrary key lookup.
///
/// | Variable | Field |
/// |----------|-------|
/// | `FC_WS_URL` | `realtime.url` |
/// | `FC_RECONNECT_DELAY_SECS` | `realtime.reconnect_delay` |
/// | `FC_HANDSHAKE_TIMEOUT_SECS` | `realtime.handshake_timeout` |
/// | `FC_DATA_DIR` | `data_dir` |
/// | `FC_TOKEN` | `token` |
pub fn load_config_from<F>(lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClientConfig {
        telemetry: TelemetryConfig::from_lookup(&lookup),
        ..ClientConfig::default()
    };

    if let Some(url) = lookup("FC_WS_URL") {
        config.realtime.url = url;
    }
    if let Some(delay) = seconds(&lookup, "FC_RECONNECT_DELAY_SECS") {
        config.realtime.reconnect_delay = delay;
    }
    if let Some(timeout) = seconds(&lookup, "FC_HANDSHAKE_TIMEOUT_SECS") {
        config.realtime.handshake_timeout = timeout;
    }
    if let Some(dir) = lookup("FC_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    config.token = lookup("FC_TOKEN").filter(|t| !t.trim().is_empty());

    config
}

fn seconds<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring invalid duration");
            None
        }
    }
}
