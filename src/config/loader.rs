//! Settings loader
//!
//! Reads every configured source once, merges them by priority, splits the
//! flat key space into groups and validates each group of the schema.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use super::schema::{SettingsSchema, DB_GROUP, TGBOT_GROUP};
use super::settings::{DatabaseSettings, Settings, TgBotSettings};
use super::sources::{
    merge_sources, partition, ConfigSource, DotenvSource, EnvironmentSource, GroupedValues,
    NESTED_DELIMITER,
};
use super::validation::{validate_group, GroupValues};
use crate::utils::errors::{Result, SettingsError};
use crate::utils::logging;

/// Resolves [`Settings`] from an ordered list of sources
///
/// Sources are held lowest priority first; a key present in several sources
/// takes the value of the last one.
pub struct SettingsLoader {
    sources: Vec<Box<dyn ConfigSource>>,
    schema: SettingsSchema,
}

impl SettingsLoader {
    /// `.env` in the working directory, overridden by the environment,
    /// validated against the strict schema
    pub fn new() -> Self {
        Self::with_dotenv_path(super::sources::DOTENV_FILE)
    }

    /// Like [`new`](Self::new) with a different dotenv file
    pub fn with_dotenv_path(path: impl Into<PathBuf>) -> Self {
        Self::empty()
            .with_source(DotenvSource::new(path))
            .with_source(EnvironmentSource)
    }

    /// No sources at all
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
            schema: SettingsSchema::default(),
        }
    }

    /// Add a source with higher priority than every source added before it
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn with_schema(mut self, schema: SettingsSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Resolve settings from the current contents of every source
    pub fn load(&self) -> Result<Settings> {
        let result = self.resolve();
        logging::log_resolution(self.schema.groups().len(), result.as_ref().map(|_| ()));
        result
    }

    fn resolve(&self) -> Result<Settings> {
        let merged = merge_sources(&self.sources)?;
        let grouped = partition(merged, NESTED_DELIMITER);

        for group in grouped.keys() {
            if self.schema.group(group).is_none() {
                logging::log_ignored_key(&format!("{}{}*", group, NESTED_DELIMITER));
            }
        }

        // Groups are validated in schema order; the first failure wins.
        let tgbot = TgBotSettings::try_from(self.validate(&grouped, TGBOT_GROUP)?)?;
        let db = DatabaseSettings::try_from(self.validate(&grouped, DB_GROUP)?)?;

        Ok(Settings { tgbot, db })
    }

    fn validate(&self, grouped: &GroupedValues, name: &str) -> Result<GroupValues> {
        let spec = self
            .schema
            .group(name)
            .ok_or_else(|| SettingsError::missing(name, "*"))?;
        let empty = HashMap::new();
        validate_group(spec, grouped.get(name).unwrap_or(&empty))
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SettingsLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsLoader")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("schema", &self.schema)
            .finish()
    }
}
