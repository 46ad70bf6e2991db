//! Configuration management module
//!
//! This module handles loading and validation of application settings
//! from a `.env` file and environment variables.

pub mod loader;
pub mod provider;
pub mod schema;
pub mod settings;
pub mod sources;
pub mod validation;

pub use loader::SettingsLoader;
pub use provider::{clear_settings_cache, default_provider, get_settings, SettingsProvider};
pub use schema::{FieldSpec, FieldType, GroupSpec, Presence, SettingsSchema};
pub use settings::{DatabaseSettings, SecretRendering, Settings, TgBotSettings};
pub use sources::{ConfigSource, DotenvSource, EnvironmentSource, MapSource};
