//! Tracing bootstrap.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
///
/// An explicit verbosity (from `-v` flags or `ROLLCALL_LOG_LEVEL`) scopes
/// the filter to this crate; otherwise `RUST_LOG` decides, defaulting to
/// errors only.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init(level: Option<tracing::Level>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("{}={level}", env!("CARGO_PKG_NAME"))),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!("Failed to initialize tracing subscriber: {err}"))
}
