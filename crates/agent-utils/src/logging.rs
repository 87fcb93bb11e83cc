//! Logging and tracing utilities

use crate::config::{Config, LogFormat};
use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter for `config`, falling back to the default directives
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER))
}

/// Initialize the global tracing subscriber
///
/// Logs go to stderr so they never interleave with answers printed on
/// stdout.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    }
    .context("failed to install tracing subscriber")?;

    tracing::debug!(
        app = %config.app_name,
        environment = %config.environment,
        "Tracing initialized"
    );
    Ok(())
}
