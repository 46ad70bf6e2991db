//! Raw settings sources
//!
//! A source yields flat `KEY=value` pairs. Sources are merged in order, later
//! sources overriding earlier ones, and the merged keys are then split on the
//! nested-key delimiter into per-group maps.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::utils::errors::{Result, SettingsError};
use crate::utils::logging;

/// Delimiter between a group name and a field key (`TGBOT__TOKEN`)
pub const NESTED_DELIMITER: &str = "__";

/// Default dotenv file, relative to the working directory
pub const DOTENV_FILE: &str = ".env";

/// Flat key space, keys lower-cased
pub type FlatValues = HashMap<String, String>;

/// Per-group key space: group name -> field key -> raw value
pub type GroupedValues = HashMap<String, HashMap<String, String>>;

/// A provider of raw key/value pairs
pub trait ConfigSource: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Read every pair this source currently holds
    fn read(&self) -> Result<Vec<(String, String)>>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentSource;

impl ConfigSource for EnvironmentSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn read(&self) -> Result<Vec<(String, String)>> {
        Ok(std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect())
    }
}

/// A dotenv file; a missing file reads as empty
///
/// One `KEY=value` pair per line. Blank lines and `#` comments are skipped,
/// an `export ` prefix is allowed, and a value may be wrapped in single or
/// double quotes. Values are taken literally: `$NAME` is never expanded.
#[derive(Debug, Clone)]
pub struct DotenvSource {
    path: PathBuf,
}

impl DotenvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn malformed(&self, line: usize) -> SettingsError {
        SettingsError::MalformedSourceFile {
            path: self.path.clone(),
            line,
        }
    }
}

impl Default for DotenvSource {
    fn default() -> Self {
        Self::new(DOTENV_FILE)
    }
}

impl ConfigSource for DotenvSource {
    fn name(&self) -> &str {
        "dotenv"
    }

    fn read(&self) -> Result<Vec<(String, String)>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SettingsError::SourceRead {
                    path: self.path.clone(),
                    kind: e.kind(),
                })
            }
        };

        let mut entries = Vec::new();
        for (index, line) in text.trim_start_matches('\u{feff}').lines().enumerate() {
            match parse_dotenv_line(line) {
                Ok(Some(pair)) => entries.push(pair),
                Ok(None) => {}
                Err(()) => return Err(self.malformed(index + 1)),
            }
        }
        Ok(entries)
    }
}

/// Parse one dotenv line: `Ok(None)` for blank and comment lines
fn parse_dotenv_line(line: &str) -> std::result::Result<Option<(String, String)>, ()> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let line = line
        .strip_prefix("export ")
        .map(str::trim_start)
        .unwrap_or(line);

    let (key, value) = line.split_once('=').ok_or(())?;
    let key = key.trim_end();
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !valid_key {
        return Err(());
    }

    Ok(Some((key.to_string(), parse_dotenv_value(value.trim())?)))
}

fn parse_dotenv_value(value: &str) -> std::result::Result<String, ()> {
    let quote = match value.chars().next() {
        Some(q @ ('\'' | '"')) => q,
        // Unquoted values end at an inline ` #` comment.
        _ => {
            let end = value.find(" #").unwrap_or(value.len());
            return Ok(value[..end].trim_end().to_string());
        }
    };

    let mut parsed = String::new();
    let mut chars = value[1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => {
                let rest = value[1 + i + 1..].trim_start();
                return if rest.is_empty() || rest.starts_with('#') {
                    Ok(parsed)
                } else {
                    Err(())
                };
            }
            '\\' if quote == '"' => match chars.next() {
                Some((_, 'n')) => parsed.push('\n'),
                Some((_, escaped)) => parsed.push(escaped),
                None => return Err(()),
            },
            c => parsed.push(c),
        }
    }
    // No closing quote.
    Err(())
}

/// A fixed in-memory set of pairs
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    name: String,
    entries: Vec<(String, String)>,
}

impl MapSource {
    pub fn new<I, K, V>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            entries: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<Vec<(String, String)>> {
        Ok(self.entries.clone())
    }
}

/// Read every source once and merge them, later sources winning
pub fn merge_sources(sources: &[Box<dyn ConfigSource>]) -> Result<FlatValues> {
    let mut merged = FlatValues::new();
    for source in sources {
        let entries = source.read()?;
        logging::log_source_loaded(source.name(), entries.len());
        for (key, value) in entries {
            merged.insert(key.to_lowercase(), value);
        }
    }
    Ok(merged)
}

/// Split flat keys on the first `delimiter` into per-group maps
///
/// Keys without the delimiter belong to no group and are dropped.
pub fn partition(flat: FlatValues, delimiter: &str) -> GroupedValues {
    let mut grouped = GroupedValues::new();
    for (key, value) in flat {
        if let Some((group, field)) = key.split_once(delimiter) {
            grouped
                .entry(group.to_string())
                .or_default()
                .insert(field.to_string(), value);
        }
    }
    grouped
}
