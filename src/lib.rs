//! Bot settings
//!
//! Typed settings for a Telegram bot backed by PostgreSQL. Values come from
//! environment variables, optionally backed by a `.env` file, with nested
//! groups expressed as `GROUP__FIELD`. Resolved settings are validated,
//! immutable and cached behind a [`SettingsProvider`].

pub mod config;
pub mod utils;

// Re-export commonly used types
pub use config::{clear_settings_cache, get_settings, Settings, SettingsLoader, SettingsProvider};
pub use utils::errors::{Result, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
