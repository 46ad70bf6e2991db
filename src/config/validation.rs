//! Configuration validation module
//!
//! This module interprets a [`GroupSpec`] against the raw string values of
//! that group's namespace: it applies defaults, enforces required fields and
//! coerces each value to its declared type.

use secrecy::SecretString;
use std::collections::HashMap;

use super::schema::{FieldSpec, FieldType, GroupSpec, Presence};
use super::settings::SECRET_MASK;
use super::sources::NESTED_DELIMITER;
use crate::utils::errors::{Result, SettingsError};
use crate::utils::logging;

/// Separator between elements of an integer list
pub const LIST_SEPARATOR: char = ',';

/// A coerced field value
#[derive(Debug)]
pub enum FieldValue {
    Str(String),
    Secret(SecretString),
    Integer(i64),
    IntegerList(Vec<i64>),
}

/// Validated values of one group, keyed by internal field name
#[derive(Debug)]
pub struct GroupValues {
    group: &'static str,
    values: HashMap<&'static str, FieldValue>,
}

impl GroupValues {
    pub fn group(&self) -> &'static str {
        self.group
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn take_string(&mut self, field: &str) -> Result<String> {
        match self.take(field)? {
            FieldValue::Str(value) => Ok(value),
            other => Err(self.mismatch(field, &other)),
        }
    }

    pub fn take_secret(&mut self, field: &str) -> Result<SecretString> {
        match self.take(field)? {
            FieldValue::Secret(value) => Ok(value),
            other => Err(self.mismatch(field, &other)),
        }
    }

    /// Like [`take_secret`](Self::take_secret) but an unset optional field is `None`
    pub fn take_optional_secret(&mut self, field: &str) -> Result<Option<SecretString>> {
        if !self.contains(field) {
            return Ok(None);
        }
        self.take_secret(field).map(Some)
    }

    pub fn take_integer(&mut self, field: &str) -> Result<i64> {
        match self.take(field)? {
            FieldValue::Integer(value) => Ok(value),
            other => Err(self.mismatch(field, &other)),
        }
    }

    pub fn take_integer_list(&mut self, field: &str) -> Result<Vec<i64>> {
        match self.take(field)? {
            FieldValue::IntegerList(value) => Ok(value),
            other => Err(self.mismatch(field, &other)),
        }
    }

    fn take(&mut self, field: &str) -> Result<FieldValue> {
        self.values
            .remove(field)
            .ok_or_else(|| SettingsError::missing(self.group, field))
    }

    fn mismatch(&self, field: &str, value: &FieldValue) -> SettingsError {
        let rendered = match value {
            FieldValue::Str(s) => s.clone(),
            FieldValue::Secret(_) => SECRET_MASK.to_string(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::IntegerList(list) => format!("{:?}", list),
        };
        SettingsError::invalid(self.group, field, rendered)
    }
}

/// Validate one group against its raw `key -> value` mapping
///
/// Keys of `raw` must already be lower case. Keys that no field claims are
/// ignored.
pub fn validate_group(spec: &GroupSpec, raw: &HashMap<String, String>) -> Result<GroupValues> {
    let mut values = HashMap::with_capacity(spec.fields.len());

    for field in spec.fields {
        let supplied = raw.get(field.key()).map(String::as_str);
        let value = match (supplied, field.presence) {
            (Some(value), _) => value,
            (None, Presence::Default(default)) => default,
            (None, Presence::Optional) => continue,
            (None, Presence::Required) => {
                return Err(SettingsError::missing(spec.name, field.key()));
            }
        };
        values.insert(field.name, coerce(spec.name, field, value)?);
    }

    for key in raw.keys() {
        if !spec.fields.iter().any(|f| f.key() == key) {
            logging::log_ignored_key(&format!("{}{}{}", spec.name, NESTED_DELIMITER, key));
        }
    }

    Ok(GroupValues {
        group: spec.name,
        values,
    })
}

/// Coerce a raw string to the field's declared type
pub fn coerce(group: &str, field: &FieldSpec, raw: &str) -> Result<FieldValue> {
    match field.field_type {
        FieldType::String => Ok(FieldValue::Str(raw.to_string())),
        FieldType::Secret => Ok(FieldValue::Secret(SecretString::from(raw.to_string()))),
        FieldType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| SettingsError::invalid(group, field.key(), raw)),
        FieldType::IntegerList => {
            let list = parse_integer_list(raw)
                .ok_or_else(|| SettingsError::invalid(group, field.key(), raw))?;
            if list.is_empty() && field.presence == Presence::Required {
                return Err(SettingsError::invalid(group, field.key(), raw));
            }
            Ok(FieldValue::IntegerList(list))
        }
    }
}

/// Parse `1,2,3` or `[1, 2, 3]` into integers
///
/// Returns `None` if any element is not an integer. A blank value is an
/// empty list.
pub fn parse_integer_list(raw: &str) -> Option<Vec<i64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).ok();
    }
    trimmed
        .split(LIST_SEPARATOR)
        .map(|item| item.trim().parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{SettingsSchema, DB_GROUP, TGBOT_GROUP};
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use secrecy::ExposeSecret;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_integer_list() {
        assert_eq!(parse_integer_list("1,2,3"), Some(vec![1, 2, 3]));
        assert_eq!(parse_integer_list(" 10 , -20 "), Some(vec![10, -20]));
        assert_eq!(parse_integer_list("[4, 5]"), Some(vec![4, 5]));
        assert_eq!(parse_integer_list(""), Some(vec![]));
        assert_eq!(parse_integer_list("1,x,3"), None);
        assert_eq!(parse_integer_list("1,,3"), None);
        assert_eq!(parse_integer_list("[1, \"a\"]"), None);
    }

    #[test]
    fn test_tgbot_group_reads_alias() {
        let schema = SettingsSchema::strict();
        let spec = schema.group(TGBOT_GROUP).unwrap();

        let mut values =
            validate_group(spec, &raw(&[("token", "abc123"), ("admin_ids", "1,2")])).unwrap();

        assert_eq!(values.group(), "tgbot");
        assert_eq!(values.take_secret("token_secret_str").unwrap().expose_secret(), "abc123");
        assert_eq!(values.take_integer_list("admin_ids").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_field_name_is_not_an_external_key() {
        let schema = SettingsSchema::strict();
        let spec = schema.group(TGBOT_GROUP).unwrap();

        let result = validate_group(
            spec,
            &raw(&[("token_secret_str", "abc123"), ("admin_ids", "1")]),
        );

        assert_matches!(
            result,
            Err(SettingsError::MissingRequiredField { ref group, ref field })
                if group == "tgbot" && field == "token"
        );
    }

    #[test]
    fn test_required_empty_list_is_invalid() {
        let schema = SettingsSchema::strict();
        let spec = schema.group(TGBOT_GROUP).unwrap();

        let result = validate_group(spec, &raw(&[("token", "t"), ("admin_ids", "  ")]));

        assert_matches!(
            result,
            Err(SettingsError::InvalidFieldType { ref field, .. }) if field == "admin_ids"
        );
    }

    #[test]
    fn test_invalid_port() {
        let schema = SettingsSchema::permissive();
        let spec = schema.group(DB_GROUP).unwrap();

        let result = validate_group(spec, &raw(&[("port", "54x2")]));

        assert_eq!(
            result.unwrap_err(),
            SettingsError::InvalidFieldType {
                group: "db".to_string(),
                field: "port".to_string(),
                value: "54x2".to_string(),
            }
        );
    }

    #[test]
    fn test_defaults_and_optional() {
        let schema = SettingsSchema::permissive();
        let spec = schema.group(DB_GROUP).unwrap();

        let mut values = validate_group(spec, &raw(&[("host", "db.internal")])).unwrap();

        assert_eq!(values.take_string("host").unwrap(), "db.internal");
        assert_eq!(values.take_string("username").unwrap(), "postgres");
        assert_eq!(values.take_integer("port").unwrap(), 5432);
        assert!(values.take_optional_secret("password").unwrap().is_none());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let schema = SettingsSchema::permissive();
        let spec = schema.group(DB_GROUP).unwrap();

        let values = validate_group(spec, &raw(&[("pool_size", "20"), ("sslmode", "require")]));

        assert!(values.is_ok());
    }

    #[test]
    fn test_type_mismatch_masks_secret() {
        let schema = SettingsSchema::strict();
        let spec = schema.group(TGBOT_GROUP).unwrap();
        let mut values =
            validate_group(spec, &raw(&[("token", "hunter2"), ("admin_ids", "1")])).unwrap();

        let err = values.take_string("token_secret_str").unwrap_err();

        assert!(!err.to_string().contains("hunter2"));
    }

    proptest! {
        #[test]
        fn prop_comma_separated_integers_parse_in_order(ids in proptest::collection::vec(any::<i64>(), 1..16)) {
            let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
            prop_assert_eq!(parse_integer_list(&joined), Some(ids));
        }
    }
}
