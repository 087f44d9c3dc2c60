//! Configuration store - the live tree behind the declared schema
//!
//! Built once from schema defaults overlaid with a persisted document, then
//! mutated only through validated `set` calls. A failed set leaves the tree
//! unchanged.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use super::schema::{ConfigField, ConfigSchema, ConfigValue, FieldType};
use crate::application::errors::ConfigError;

/// One row of the deterministic enumeration
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub section: String,
    pub key: String,
    pub value: ConfigValue,
    pub ty: FieldType,
}

pub struct ConfigStore {
    schema: ConfigSchema,
    values: RwLock<HashMap<String, ConfigValue>>,
}

impl ConfigStore {
    /// Build the tree from schema defaults.
    pub fn from_schema(schema: ConfigSchema) -> Result<Self, ConfigError> {
        schema.validate()?;
        let mut values = HashMap::new();
        for section in schema.sections() {
            for field in &section.fields {
                values.insert(
                    format!("{}.{}", section.name, field.name),
                    field.default.clone(),
                );
            }
        }
        Ok(Self {
            schema,
            values: RwLock::new(values),
        })
    }

    /// Build from defaults, then overlay a persisted YAML document.
    ///
    /// Overlay entries that name unknown keys or carry the wrong type are
    /// skipped with a warning; they never corrupt the tree.
    pub fn load(schema: ConfigSchema, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let store = Self::from_schema(schema)?;
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Parse(format!("failed to read config: {}", e)))?;
        let doc: serde_yaml::Value = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("failed to parse config: {}", e)))?;
        store.apply_overlay(&doc);
        Ok(store)
    }

    fn apply_overlay(&self, doc: &serde_yaml::Value) {
        let Some(sections) = doc.as_mapping() else {
            tracing::warn!("config overlay is not a mapping, ignoring");
            return;
        };
        for (section_name, fields) in sections {
            let Some(section_name) = section_name.as_str() else {
                continue;
            };
            let Some(fields) = fields.as_mapping() else {
                tracing::warn!("config section '{}' is not a mapping, ignoring", section_name);
                continue;
            };
            for (field_name, value) in fields {
                let Some(field_name) = field_name.as_str() else {
                    continue;
                };
                let key = format!("{}.{}", section_name, field_name);
                let Some(field) = self.schema.field(&key) else {
                    tracing::warn!("unknown config key '{}' in overlay, ignoring", key);
                    continue;
                };
                match Self::from_yaml(value, field.ty) {
                    Some(value) => {
                        if let Ok(mut values) = self.values.write() {
                            values.insert(key, value);
                        }
                    }
                    None => {
                        tracing::warn!(
                            "config key '{}' expects {}, got incompatible value, ignoring",
                            key,
                            field.ty
                        );
                    }
                }
            }
        }
    }

    fn from_yaml(value: &serde_yaml::Value, ty: FieldType) -> Option<ConfigValue> {
        match ty {
            FieldType::Bool => value.as_bool().map(ConfigValue::Bool),
            FieldType::Int => value.as_i64().map(ConfigValue::Int),
            FieldType::Float => value
                .as_f64()
                .or_else(|| value.as_i64().map(|i| i as f64))
                .map(ConfigValue::Float),
            FieldType::Str => value.as_str().map(|s| ConfigValue::Str(s.to_string())),
            FieldType::List => value.as_sequence().map(|seq| {
                ConfigValue::List(
                    seq.iter()
                        .filter_map(|item| item.as_str().map(|s| s.to_string()))
                        .collect(),
                )
            }),
        }
    }

    /// Dotted-path lookup. Never fails; absent keys yield None.
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.read().ok()?.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(|v| v.as_int()).unwrap_or(default)
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(|v| v.as_float()).unwrap_or(default)
    }

    pub fn get_str(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_list(&self, key: &str, default: &[&str]) -> Vec<String> {
        self.get(key)
            .and_then(|v| v.as_list().map(|items| items.to_vec()))
            .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
    }

    /// Coerce a raw string to the key's declared type and install it.
    ///
    /// Atomic: any error leaves the store unchanged. Returns the installed
    /// value.
    pub fn set(&self, key: &str, raw: &str) -> Result<ConfigValue, ConfigError> {
        let key = self
            .schema
            .resolve_key(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        if self.schema.is_read_only(&key) {
            return Err(ConfigError::ReadOnly(key));
        }
        let field = self
            .schema
            .field(&key)
            .ok_or_else(|| ConfigError::UnknownKey(key.clone()))?;

        let value = Self::coerce(raw, field.ty)?;
        Self::check_constraints(field, &key, &value)?;

        let mut values = self
            .values
            .write()
            .map_err(|_| ConfigError::Parse("config lock poisoned".to_string()))?;
        values.insert(key, value.clone());
        Ok(value)
    }

    /// Restore a key to its schema default.
    pub fn reset(&self, key: &str) -> Result<ConfigValue, ConfigError> {
        let key = self
            .schema
            .resolve_key(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        if self.schema.is_read_only(&key) {
            return Err(ConfigError::ReadOnly(key));
        }
        let default = self
            .schema
            .field(&key)
            .ok_or_else(|| ConfigError::UnknownKey(key.clone()))?
            .default
            .clone();

        let mut values = self
            .values
            .write()
            .map_err(|_| ConfigError::Parse("config lock poisoned".to_string()))?;
        values.insert(key, default.clone());
        Ok(default)
    }

    fn coerce(raw: &str, ty: FieldType) -> Result<ConfigValue, ConfigError> {
        let conversion = |raw: &str| ConfigError::Conversion {
            raw: raw.to_string(),
            target: ty.to_string(),
        };
        match ty {
            FieldType::Bool => match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "enabled" => Ok(ConfigValue::Bool(true)),
                "false" | "0" | "no" | "off" | "disabled" => Ok(ConfigValue::Bool(false)),
                _ => Err(conversion(raw)),
            },
            FieldType::Int => raw
                .trim()
                .parse::<i64>()
                .map(ConfigValue::Int)
                .map_err(|_| conversion(raw)),
            FieldType::Float => raw
                .trim()
                .parse::<f64>()
                .map(ConfigValue::Float)
                .map_err(|_| conversion(raw)),
            FieldType::Str => Ok(ConfigValue::Str(raw.to_string())),
            FieldType::List => {
                let trimmed = raw.trim();
                if trimmed.starts_with('[') && trimmed.ends_with(']') {
                    let inner = &trimmed[1..trimmed.len() - 1];
                    let items = inner
                        .split(',')
                        .map(|item| {
                            item.trim()
                                .trim_matches(|c| c == '"' || c == '\'')
                                .to_string()
                        })
                        .filter(|item| !item.is_empty())
                        .collect();
                    Ok(ConfigValue::List(items))
                } else {
                    Ok(ConfigValue::List(vec![raw.to_string()]))
                }
            }
        }
    }

    fn check_constraints(
        field: &ConfigField,
        key: &str,
        value: &ConfigValue,
    ) -> Result<(), ConfigError> {
        if let (Some(choices), Some(s)) = (&field.choices, value.as_str()) {
            if !choices.iter().any(|c| c == s) {
                return Err(ConfigError::Validation {
                    key: key.to_string(),
                    reason: format!("'{}' is not one of [{}]", s, choices.join(", ")),
                });
            }
        }
        if let Some(validator) = field.validator {
            if !validator(value) {
                return Err(ConfigError::Validation {
                    key: key.to_string(),
                    reason: format!("value {} rejected", value),
                });
            }
        }
        Ok(())
    }

    /// Deterministic enumeration in schema declaration order.
    pub fn list(&self) -> Vec<ConfigEntry> {
        let values = match self.values.read() {
            Ok(values) => values,
            Err(_) => return Vec::new(),
        };
        let mut entries = Vec::new();
        for section in self.schema.sections() {
            for field in &section.fields {
                let key = format!("{}.{}", section.name, field.name);
                let value = values.get(&key).cloned().unwrap_or_else(|| field.default.clone());
                entries.push(ConfigEntry {
                    section: section.name.clone(),
                    key,
                    value,
                    ty: field.ty,
                });
            }
        }
        entries
    }

    pub fn resolve_key(&self, key: &str) -> Option<String> {
        self.schema.resolve_key(key)
    }

    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    /// Current tree as a YAML document, section by section.
    pub fn to_document(&self) -> serde_yaml::Value {
        let mut sections = serde_yaml::Mapping::new();
        let mut current = String::new();
        let mut fields = serde_yaml::Mapping::new();
        for entry in self.list() {
            if entry.section != current {
                if !current.is_empty() {
                    sections.insert(
                        serde_yaml::Value::String(current.clone()),
                        serde_yaml::Value::Mapping(std::mem::take(&mut fields)),
                    );
                }
                current = entry.section.clone();
            }
            let field_name = entry
                .key
                .rsplit('.')
                .next()
                .unwrap_or(entry.key.as_str())
                .to_string();
            fields.insert(serde_yaml::Value::String(field_name), Self::to_yaml(&entry.value));
        }
        if !current.is_empty() {
            sections.insert(
                serde_yaml::Value::String(current),
                serde_yaml::Value::Mapping(fields),
            );
        }
        serde_yaml::Value::Mapping(sections)
    }

    fn to_yaml(value: &ConfigValue) -> serde_yaml::Value {
        match value {
            ConfigValue::Bool(b) => serde_yaml::Value::Bool(*b),
            ConfigValue::Int(i) => serde_yaml::Value::Number((*i).into()),
            ConfigValue::Float(f) => serde_yaml::Value::Number((*f).into()),
            ConfigValue::Str(s) => serde_yaml::Value::String(s.clone()),
            ConfigValue::List(items) => serde_yaml::Value::Sequence(
                items
                    .iter()
                    .map(|s| serde_yaml::Value::String(s.clone()))
                    .collect(),
            ),
        }
    }

    /// Serialize the current tree back to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let doc = serde_yaml::to_string(&self.to_document())
            .map_err(|e| ConfigError::Parse(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), doc)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::config_schema;

    fn store() -> ConfigStore {
        ConfigStore::from_schema(config_schema()).expect("builtin schema is valid")
    }

    #[test]
    fn defaults_populated() {
        let s = store();
        assert!(s.get_bool("plugin.enabled", false));
        assert!(!s.get_bool("plugin.debug_mode", true));
        assert_eq!(s.get_int("actions.max_response_length", 0), 200);
        assert_eq!(s.get_float("actions.response_probability", 0.0), 0.1);
        assert_eq!(s.get_str("advanced.log_level", ""), "INFO");
        assert_eq!(
            s.get_list("actions.greeting_keywords", &[]),
            vec!["你好", "hello", "hi", "嗨"]
        );
    }

    #[test]
    fn absent_key_yields_caller_default() {
        let s = store();
        assert_eq!(s.get("nowhere.nothing"), None);
        assert!(s.get_bool("nowhere.nothing", true));
        assert_eq!(s.get_str("nowhere.nothing", "fallback"), "fallback");
    }

    #[test]
    fn bool_coercion_table() {
        let s = store();
        for raw in ["true", "1", "yes", "ON", "Enabled"] {
            assert_eq!(
                s.set("plugin.debug_mode", raw).unwrap(),
                ConfigValue::Bool(true),
                "raw = {raw}"
            );
        }
        for raw in ["false", "0", "no", "OFF", "Disabled"] {
            assert_eq!(
                s.set("plugin.debug_mode", raw).unwrap(),
                ConfigValue::Bool(false),
                "raw = {raw}"
            );
        }
        assert!(matches!(
            s.set("plugin.debug_mode", "maybe"),
            Err(ConfigError::Conversion { .. })
        ));
    }

    #[test]
    fn numeric_coercion() {
        let s = store();
        assert_eq!(
            s.set("commands.command_timeout", "45").unwrap(),
            ConfigValue::Int(45)
        );
        assert!(matches!(
            s.set("commands.command_timeout", "soon"),
            Err(ConfigError::Conversion { .. })
        ));
        assert_eq!(
            s.set("actions.response_probability", "0.25").unwrap(),
            ConfigValue::Float(0.25)
        );
    }

    #[test]
    fn list_coercion_bracket_and_bare() {
        let s = store();
        assert_eq!(
            s.set("actions.greeting_keywords", r#"[hey, "howdy", 'yo']"#)
                .unwrap(),
            ConfigValue::List(vec!["hey".into(), "howdy".into(), "yo".into()])
        );
        assert_eq!(
            s.set("actions.greeting_keywords", "hello there").unwrap(),
            ConfigValue::List(vec!["hello there".into()])
        );
    }

    #[test]
    fn probability_bounds_enforced() {
        let s = store();
        assert!(s.set("actions.response_probability", "0.5").is_ok());
        assert!(matches!(
            s.set("actions.response_probability", "1.5"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            s.set("actions.response_probability", "-0.1"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn choices_enforced() {
        let s = store();
        assert!(s.set("advanced.log_level", "DEBUG").is_ok());
        assert!(matches!(
            s.set("advanced.log_level", "TRACE"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn read_only_key_always_rejected() {
        let s = store();
        assert!(matches!(
            s.set("plugin.config_version", "2.0.0"),
            Err(ConfigError::ReadOnly(_))
        ));
        // even the current value is refused
        assert!(matches!(
            s.set("plugin.config_version", "1.0.0"),
            Err(ConfigError::ReadOnly(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let s = store();
        assert!(matches!(
            s.set("plugin.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn failed_set_leaves_store_unchanged() {
        let s = store();
        s.set("advanced.log_level", "WARNING").unwrap();
        assert!(s.set("advanced.log_level", "TRACE").is_err());
        assert_eq!(s.get_str("advanced.log_level", ""), "WARNING");

        assert!(s.set("actions.response_probability", "not a number").is_err());
        assert_eq!(s.get_float("actions.response_probability", 0.0), 0.1);
    }

    #[test]
    fn set_resolves_bare_key_to_unique_section() {
        let s = store();
        s.set("debug_mode", "true").unwrap();
        assert!(s.get_bool("plugin.debug_mode", false));
    }

    #[test]
    fn round_trip_set_of_displayed_value() {
        let s = store();
        for key in [
            "plugin.enabled",
            "plugin.debug_mode",
            "actions.response_probability",
            "actions.max_response_length",
            "commands.help_prefix",
            "advanced.log_level",
        ] {
            let before = s.get(key).expect("declared key");
            s.set(key, &before.to_string()).expect("round trip set");
            assert_eq!(s.get(key).unwrap(), before, "key = {key}");
        }
    }

    #[test]
    fn reset_restores_default() {
        let s = store();
        s.set("actions.response_probability", "0.9").unwrap();
        let restored = s.reset("actions.response_probability").unwrap();
        assert_eq!(restored, ConfigValue::Float(0.1));
        assert_eq!(s.get_float("actions.response_probability", 0.0), 0.1);
    }

    #[test]
    fn list_follows_declaration_order() {
        let s = store();
        let entries = s.list();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys[0], "plugin.enabled");
        assert_eq!(keys[1], "plugin.config_version");
        assert_eq!(keys[2], "plugin.debug_mode");
        let features_at = keys.iter().position(|k| *k == "features.enable_greetings");
        let advanced_at = keys.iter().position(|k| *k == "advanced.log_level");
        assert!(features_at.unwrap() < advanced_at.unwrap());
    }

    #[test]
    fn overlay_applies_and_skips_bad_entries() {
        let doc: serde_yaml::Value = serde_yaml::from_str(
            r#"
plugin:
  debug_mode: true
  unknown_field: 1
actions:
  max_response_length: "not an int"
  response_probability: 0.4
"#,
        )
        .unwrap();
        let s = store();
        s.apply_overlay(&doc);
        assert!(s.get_bool("plugin.debug_mode", false));
        assert_eq!(s.get_float("actions.response_probability", 0.0), 0.4);
        // wrong type and unknown key both left the defaults alone
        assert_eq!(s.get_int("actions.max_response_length", 0), 200);
    }

    #[test]
    fn document_round_trip() {
        let s = store();
        s.set("plugin.debug_mode", "true").unwrap();
        let doc = s.to_document();
        let other = store();
        other.apply_overlay(&doc);
        assert!(other.get_bool("plugin.debug_mode", false));
        assert_eq!(
            other.get_list("actions.greeting_keywords", &[]),
            s.get_list("actions.greeting_keywords", &[])
        );
    }
}
