//! # Telemetry
//!
//! Installs the tracing subscriber for the register process.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=warung=trace` - Show trace for warung crates only
//! - Default: the `[logging] filter` setting (`info,warung=debug,sqlx=warn`)

use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;

/// Error returned when a global subscriber is already installed.
pub type TelemetryError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, else `default_filter`.
///
/// Safe to call more than once; later calls return an error and leave the
/// first subscriber in place.
pub fn init_tracing(default_filter: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}

/// [`init_tracing`] with the filter from the loaded configuration.
pub fn init_from_config(config: &EngineConfig) -> Result<(), TelemetryError> {
    init_tracing(&config.logging.filter)
}
