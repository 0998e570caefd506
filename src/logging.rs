//! Tracing/logging initialization.
//!
//! Filtering comes from `RUST_LOG`; the fallback level depends on the front end.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process, logging to stderr.
///
/// `default_level` applies when `RUST_LOG` is unset. Safe to call multiple
/// times (subsequent calls are no-ops).
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
