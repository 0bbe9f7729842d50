//! Logging and tracing utilities
//!
//! Logs always go to stderr so that report text printed on stdout stays clean.

use crate::{Config, LogFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize a human-readable tracing subscriber
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize a JSON tracing subscriber, one object per line
pub fn init_tracing_json() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Pick the subscriber matching `config.log_format`
pub fn init_from_config(config: &Config) {
    match config.log_format {
        LogFormat::Text => init_tracing(),
        LogFormat::Json => init_tracing_json(),
    }
}
