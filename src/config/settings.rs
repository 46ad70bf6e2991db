//! Application settings
//!
//! This module defines the typed settings tree produced by the loader, the
//! values derived from it and its structured text rendering.

use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};
use serde_json::ser::PrettyFormatter;

use super::loader::SettingsLoader;
use super::schema::{SettingsSchema, DB_GROUP};
use super::validation::GroupValues;
use crate::utils::errors::{Result, SettingsError};

/// Placeholder rendered in place of a secret value
pub const SECRET_MASK: &str = "**********";

/// Main application settings
#[derive(Debug, Serialize)]
pub struct Settings {
    pub tgbot: TgBotSettings,
    pub db: DatabaseSettings,
}

/// Telegram bot settings
#[derive(Debug, Serialize)]
pub struct TgBotSettings {
    #[serde(serialize_with = "mask_secret")]
    pub token_secret_str: SecretString,
    pub admin_ids: Vec<i64>,
}

/// Database settings
#[derive(Debug, Serialize)]
pub struct DatabaseSettings {
    pub username: String,
    #[serde(serialize_with = "mask_optional_secret")]
    pub password: Option<SecretString>,
    pub host: String,
    pub port: u16,
    pub database: String,
}

/// How secrets appear in [`Settings::to_pretty_json_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretRendering {
    #[default]
    Masked,
    Exposed,
}

impl Settings {
    /// Resolve settings from `.env` and the environment right now
    pub fn new() -> Result<Self> {
        SettingsLoader::new().load()
    }

    /// Render as 4-space indented JSON with secrets masked
    pub fn to_pretty_json(&self) -> Result<String> {
        self.to_pretty_json_with(SecretRendering::Masked)
    }

    pub fn to_pretty_json_with(&self, rendering: SecretRendering) -> Result<String> {
        match rendering {
            SecretRendering::Masked => render_pretty(self),
            SecretRendering::Exposed => {
                let mut value = serde_json::to_value(self)?;
                self.expose_into(&mut value);
                render_pretty(&value)
            }
        }
    }

    /// Replace masked secrets in a rendered tree with their plaintext
    fn expose_into(&self, value: &mut serde_json::Value) {
        // Every secret field of either schema variant.
        for group in SettingsSchema::strict().groups() {
            for field in group.fields.iter().filter(|f| f.is_secret()) {
                if let Some(slot) = value.get_mut(group.name).and_then(|g| g.get_mut(field.name)) {
                    if let Some(secret) = self.secret(group.name, field.name) {
                        *slot = serde_json::Value::String(secret.to_string());
                    }
                }
            }
        }
    }

    fn secret(&self, group: &str, field: &str) -> Option<&str> {
        match (group, field) {
            ("tgbot", "token_secret_str") => Some(self.tgbot.token()),
            ("db", "password") => self.db.password.as_ref().map(|p| p.expose_secret()),
            _ => None,
        }
    }
}

impl TgBotSettings {
    /// Bot token as plain text
    pub fn token(&self) -> &str {
        self.token_secret_str.expose_secret()
    }
}

impl TryFrom<GroupValues> for TgBotSettings {
    type Error = SettingsError;

    fn try_from(mut values: GroupValues) -> Result<Self> {
        Ok(Self {
            token_secret_str: values.take_secret("token_secret_str")?,
            admin_ids: values.take_integer_list("admin_ids")?,
        })
    }
}

impl DatabaseSettings {
    /// asyncpg connection URL
    ///
    /// Fails with `MissingSecretValue` when no password is configured.
    pub fn url(&self) -> Result<String> {
        let password = self
            .password
            .as_ref()
            .ok_or_else(|| SettingsError::MissingSecretValue {
                group: DB_GROUP.to_string(),
                field: "password".to_string(),
            })?;
        let password = urlencoding::encode(password.expose_secret());

        // postgresql[+asyncpg]://[user[:password]@][host][:port][/dbname]
        Ok(format!(
            "postgresql+asyncpg://{}:{}@{}:{}/{}",
            self.username, password, self.host, self.port, self.database
        ))
    }
}

impl TryFrom<GroupValues> for DatabaseSettings {
    type Error = SettingsError;

    fn try_from(mut values: GroupValues) -> Result<Self> {
        let raw_port = values.take_integer("port")?;
        let port = u16::try_from(raw_port)
            .map_err(|_| SettingsError::invalid(values.group(), "port", raw_port.to_string()))?;

        Ok(Self {
            username: values.take_string("username")?,
            password: values.take_optional_secret("password")?,
            host: values.take_string("host")?,
            port,
            database: values.take_string("database")?,
        })
    }
}

fn render_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| SettingsError::Rendering(e.to_string()))
}

fn mask_secret<S: Serializer>(_: &SecretString, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(SECRET_MASK)
}

fn mask_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match secret {
        Some(_) => serializer.serialize_str(SECRET_MASK),
        None => serializer.serialize_none(),
    }
}
