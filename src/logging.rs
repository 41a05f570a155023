// ABOUTME: Logging setup for the importer: tracing events formatted to stderr
// ABOUTME: RUST_LOG overrides the level picked on the command line

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Normalizes a user supplied log level, falling back to the default.
pub fn parse_level(value: &str) -> &'static str {
    match value.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" | "none" => "off",
        _ => DEFAULT_LOG_LEVEL,
    }
}

/// Installs the global subscriber. Stdout stays reserved for import output.
pub fn init(level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(parse_level(level)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Logging initialized at level {}", parse_level(level));
    Ok(())
}
