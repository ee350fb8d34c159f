//! Tracing subscriber setup for the server binary.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `default_filter`.
pub fn init(logging: &LoggingConfig, default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer()
        .with_target(logging.target)
        .with_line_number(logging.line_numbers);

    match logging.format.to_lowercase().as_str() {
        "json" => registry.with(layer.json()).try_init(),
        "compact" => registry.with(layer.compact()).try_init(),
        _ => registry.with(layer.pretty()).try_init(),
    }
    .context("Failed to install tracing subscriber")
}
