//! Configuration schema - declared sections, fields, defaults and constraints

use std::fmt;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::ConfigError;

static KEY_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Value type a config field can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Str,
    List,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Str => "string",
            FieldType::List => "list",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl ConfigValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            ConfigValue::Bool(_) => FieldType::Bool,
            ConfigValue::Int(_) => FieldType::Int,
            ConfigValue::Float(_) => FieldType::Float,
            ConfigValue::Str(_) => FieldType::Str,
            ConfigValue::List(_) => FieldType::List,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric accessor; int values widen to float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::Str(s) => f.write_str(s),
            ConfigValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Per-key validation predicate applied after coercion
pub type FieldValidator = fn(&ConfigValue) -> bool;

/// One declared configuration field
#[derive(Clone)]
pub struct ConfigField {
    pub name: String,
    pub ty: FieldType,
    pub default: ConfigValue,
    pub description: String,
    pub choices: Option<Vec<String>>,
    pub validator: Option<FieldValidator>,
}

impl ConfigField {
    pub fn new(
        name: impl Into<String>,
        default: ConfigValue,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: default.field_type(),
            default,
            description: description.into(),
            choices: None,
            validator: None,
        }
    }

    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = Some(choices.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validator = Some(validator);
        self
    }
}

impl fmt::Debug for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigField")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("default", &self.default)
            .field("choices", &self.choices)
            .finish()
    }
}

/// A named group of fields; section name is the first dotted-path segment
#[derive(Debug, Clone)]
pub struct ConfigSection {
    pub name: String,
    pub description: String,
    pub fields: Vec<ConfigField>,
}

impl ConfigSection {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: ConfigField) -> Self {
        self.fields.push(field);
        self
    }
}

/// The full declared schema, in declaration order, plus the read-only denylist
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    sections: Vec<ConfigSection>,
    read_only: Vec<String>,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, section: ConfigSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn mark_read_only(mut self, key: impl Into<String>) -> Self {
        self.read_only.push(key.into());
        self
    }

    pub fn sections(&self) -> &[ConfigSection] {
        &self.sections
    }

    pub fn is_read_only(&self, key: &str) -> bool {
        self.read_only.iter().any(|k| k == key)
    }

    /// Check declaration-time invariants: valid key segments, no duplicate
    /// keys, choices only on string fields and containing their default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = Vec::new();
        for section in &self.sections {
            if !KEY_SEGMENT.is_match(&section.name) {
                return Err(ConfigError::Validation {
                    key: section.name.clone(),
                    reason: "invalid section name".to_string(),
                });
            }
            for field in &section.fields {
                let key = format!("{}.{}", section.name, field.name);
                if !KEY_SEGMENT.is_match(&field.name) {
                    return Err(ConfigError::Validation {
                        key,
                        reason: "invalid field name".to_string(),
                    });
                }
                if seen.contains(&key) {
                    return Err(ConfigError::Validation {
                        key,
                        reason: "duplicate field".to_string(),
                    });
                }
                if let Some(choices) = &field.choices {
                    if field.ty != FieldType::Str {
                        return Err(ConfigError::Validation {
                            key,
                            reason: "choices are only valid on string fields".to_string(),
                        });
                    }
                    match field.default.as_str() {
                        Some(default) if choices.iter().any(|c| c == default) => {}
                        _ => {
                            return Err(ConfigError::Validation {
                                key,
                                reason: "default is not one of the declared choices".to_string(),
                            })
                        }
                    }
                }
                seen.push(key);
            }
        }
        Ok(())
    }

    /// Field lookup by full dotted key.
    pub fn field(&self, key: &str) -> Option<&ConfigField> {
        let (section_name, field_name) = key.split_once('.')?;
        self.sections
            .iter()
            .find(|s| s.name == section_name)?
            .fields
            .iter()
            .find(|f| f.name == field_name)
    }

    /// Resolve a possibly unqualified key to its full dotted form.
    ///
    /// An exact dotted key wins; a bare field name resolves only when exactly
    /// one section declares it.
    pub fn resolve_key(&self, key: &str) -> Option<String> {
        if key.contains('.') {
            return self.field(key).map(|_| key.to_string());
        }
        let mut hits = self.sections.iter().filter_map(|s| {
            s.fields
                .iter()
                .find(|f| f.name == key)
                .map(|f| format!("{}.{}", s.name, f.name))
        });
        let first = hits.next()?;
        match hits.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ConfigSchema {
        ConfigSchema::new()
            .section(
                ConfigSection::new("plugin", "basic settings")
                    .field(ConfigField::new(
                        "enabled",
                        ConfigValue::Bool(true),
                        "master switch",
                    ))
                    .field(ConfigField::new(
                        "debug_mode",
                        ConfigValue::Bool(false),
                        "verbose output",
                    )),
            )
            .section(
                ConfigSection::new("advanced", "tuning").field(
                    ConfigField::new(
                        "log_level",
                        ConfigValue::Str("INFO".to_string()),
                        "log verbosity",
                    )
                    .with_choices(&["DEBUG", "INFO", "WARNING", "ERROR"]),
                ),
            )
    }

    #[test]
    fn valid_schema_passes() {
        schema().validate().expect("schema should be valid");
    }

    #[test]
    fn default_outside_choices_rejected() {
        let bad = ConfigSchema::new().section(
            ConfigSection::new("advanced", "").field(
                ConfigField::new("log_level", ConfigValue::Str("TRACE".to_string()), "")
                    .with_choices(&["DEBUG", "INFO"]),
            ),
        );
        assert!(bad.validate().is_err());
    }

    #[test]
    fn choices_on_non_string_rejected() {
        let bad = ConfigSchema::new().section(
            ConfigSection::new("plugin", "").field(
                ConfigField::new("enabled", ConfigValue::Bool(true), "").with_choices(&["true"]),
            ),
        );
        assert!(bad.validate().is_err());
    }

    #[test]
    fn bad_key_segment_rejected() {
        let bad = ConfigSchema::new().section(
            ConfigSection::new("plugin", "")
                .field(ConfigField::new("9lives", ConfigValue::Bool(true), "")),
        );
        assert!(bad.validate().is_err());

        let bad_section = ConfigSchema::new().section(
            ConfigSection::new("my-section", "")
                .field(ConfigField::new("ok", ConfigValue::Bool(true), "")),
        );
        assert!(bad_section.validate().is_err());
    }

    #[test]
    fn duplicate_field_rejected() {
        let bad = ConfigSchema::new().section(
            ConfigSection::new("plugin", "")
                .field(ConfigField::new("enabled", ConfigValue::Bool(true), ""))
                .field(ConfigField::new("enabled", ConfigValue::Bool(false), "")),
        );
        assert!(bad.validate().is_err());
    }

    #[test]
    fn resolve_bare_key_when_unique() {
        let s = schema();
        assert_eq!(
            s.resolve_key("debug_mode"),
            Some("plugin.debug_mode".to_string())
        );
        assert_eq!(
            s.resolve_key("plugin.enabled"),
            Some("plugin.enabled".to_string())
        );
        assert_eq!(s.resolve_key("missing"), None);
    }

    #[test]
    fn resolve_ambiguous_bare_key_fails() {
        let s = ConfigSchema::new()
            .section(
                ConfigSection::new("a", "")
                    .field(ConfigField::new("enabled", ConfigValue::Bool(true), "")),
            )
            .section(
                ConfigSection::new("b", "")
                    .field(ConfigField::new("enabled", ConfigValue::Bool(true), "")),
            );
        assert_eq!(s.resolve_key("enabled"), None);
    }

    #[test]
    fn display_round_trips_through_parsing() {
        assert_eq!(ConfigValue::Bool(true).to_string(), "true");
        assert_eq!(ConfigValue::Int(200).to_string(), "200");
        assert_eq!(ConfigValue::Float(0.1).to_string(), "0.1");
        assert_eq!(
            ConfigValue::List(vec!["a".into(), "b".into()]).to_string(),
            "[a, b]"
        );
    }
}
