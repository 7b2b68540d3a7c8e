//! Logging initialization.
//!
//! Builds the `tracing` subscriber used by binaries. Libraries only emit
//! events; installing a subscriber is left to the composition root.

use crate::SphereResult;
use serde::{Deserialize, Serialize};

#[cfg(feature = "telemetry")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether to write log events to the console.
    #[serde(default = "default_console_output")]
    pub console_output: bool,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,

    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_console_output() -> bool {
    true
}

fn default_filter() -> String {
    "info,sphere=debug".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            console_output: default_console_output(),
            json: false,
            filter: default_filter(),
        }
    }
}

/// Initialize the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured filter.
#[cfg(feature = "telemetry")]
pub fn init_telemetry(config: &TelemetryConfig) -> SphereResult<()> {
    if !config.console_output {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| crate::SphereError::Configuration(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    result.map_err(|e| crate::SphereError::internal(format!("Failed to install subscriber: {}", e)))?;

    tracing::info!(json = config.json, filter = %config.filter, "Logging initialized");
    Ok(())
}

/// Placeholder for when the telemetry feature is disabled.
#[cfg(not(feature = "telemetry"))]
pub fn init_telemetry(_config: &TelemetryConfig) -> SphereResult<()> {
    Ok(())
}
