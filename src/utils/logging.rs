//! Logging configuration and setup
//!
//! This module provides logging initialization and the structured log events
//! emitted while settings are resolved.

use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::errors::SettingsError;

/// Initialize logging
///
/// `RUST_LOG` takes precedence over `default_level` when it is set.
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok();

    if installed {
        debug!(level = default_level, "Logging initialized");
    }
    installed
}

/// Log a source read
pub fn log_source_loaded(source: &str, entries: usize) {
    debug!(source = source, entries = entries, "Settings source loaded");
}

/// Log a key that no schema field claims
pub fn log_ignored_key(key: &str) {
    debug!(key = key, "Ignoring key not declared in settings schema");
}

/// Log resolution results
pub fn log_resolution(groups: usize, result: Result<(), &SettingsError>) {
    match result {
        Ok(()) => info!(groups = groups, "Settings resolved"),
        Err(e) => warn!(
            groups = groups,
            severity = %e.severity(),
            error = %e,
            "Settings resolution failed"
        ),
    }
}

/// Log cache transitions
pub fn log_cache_event(event: &str) {
    debug!(event = event, "Settings cache");
}
