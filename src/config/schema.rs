//! Settings schema tables
//!
//! Each configuration group is described once as static data: its fields,
//! their types, whether they are required, defaulted or optional, and the
//! external key they are read from. The validator in `validation.rs`
//! interprets these tables generically.

/// Semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Plain string, passed through unchanged
    String,
    /// String wrapped in `SecretString`
    Secret,
    /// Decimal signed integer
    Integer,
    /// Comma separated (or JSON array) list of integers
    IntegerList,
}

/// What happens when no source supplies a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absence is a `MissingRequiredField` error
    Required,
    /// Absence falls back to this raw value, coerced like a supplied one
    Default(&'static str),
    /// Absence leaves the field unset
    Optional,
}

/// One configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    alias: Option<&'static str>,
    pub field_type: FieldType,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn new(name: &'static str, field_type: FieldType, presence: Presence) -> Self {
        Self {
            name,
            alias: None,
            field_type,
            presence,
        }
    }

    /// Read this field from a differently named external key
    pub const fn with_alias(self, alias: &'static str) -> Self {
        Self {
            alias: Some(alias),
            ..self
        }
    }

    /// External key name; the field name unless an alias is declared
    pub fn key(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    pub fn is_secret(&self) -> bool {
        self.field_type == FieldType::Secret
    }
}

/// One nested configuration section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl GroupSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The full configuration tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsSchema {
    groups: &'static [GroupSpec],
}

pub const TGBOT_GROUP: &str = "tgbot";
pub const DB_GROUP: &str = "db";

const TGBOT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("token_secret_str", FieldType::Secret, Presence::Required).with_alias("token"),
    FieldSpec::new("admin_ids", FieldType::IntegerList, Presence::Required),
];

const DB_FIELDS_STRICT: &[FieldSpec] = &[
    FieldSpec::new("username", FieldType::String, Presence::Required),
    FieldSpec::new("password", FieldType::Secret, Presence::Required),
    FieldSpec::new("host", FieldType::String, Presence::Required),
    FieldSpec::new("port", FieldType::Integer, Presence::Required),
    FieldSpec::new("database", FieldType::String, Presence::Required),
];

const DB_FIELDS_PERMISSIVE: &[FieldSpec] = &[
    FieldSpec::new("username", FieldType::String, Presence::Default("postgres")),
    FieldSpec::new("password", FieldType::Secret, Presence::Optional),
    FieldSpec::new("host", FieldType::String, Presence::Default("localhost")),
    FieldSpec::new("port", FieldType::Integer, Presence::Default("5432")),
    FieldSpec::new("database", FieldType::String, Presence::Default("postgres")),
];

const STRICT_GROUPS: &[GroupSpec] = &[
    GroupSpec {
        name: TGBOT_GROUP,
        fields: TGBOT_FIELDS,
    },
    GroupSpec {
        name: DB_GROUP,
        fields: DB_FIELDS_STRICT,
    },
];

const PERMISSIVE_GROUPS: &[GroupSpec] = &[
    GroupSpec {
        name: TGBOT_GROUP,
        fields: TGBOT_FIELDS,
    },
    GroupSpec {
        name: DB_GROUP,
        fields: DB_FIELDS_PERMISSIVE,
    },
];

impl SettingsSchema {
    /// Every database field must be supplied
    pub const fn strict() -> Self {
        Self {
            groups: STRICT_GROUPS,
        }
    }

    /// Database fields fall back to local development defaults and the
    /// password may be left unset
    pub const fn permissive() -> Self {
        Self {
            groups: PERMISSIVE_GROUPS,
        }
    }

    pub fn groups(&self) -> &'static [GroupSpec] {
        self.groups
    }

    pub fn group(&self, name: &str) -> Option<&'static GroupSpec> {
        self.groups.iter().find(|g| g.name == name)
    }
}

impl Default for SettingsSchema {
    fn default() -> Self {
        Self::strict()
    }
}
