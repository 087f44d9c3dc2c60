//! The shipped bot: its configuration schema and component declarations
//!
//! The schema drives both the generated config document and the enable flags
//! the registry reads; the descriptor list is the single source of component
//! declaration order.

pub mod actions;
pub mod commands;
pub mod registry;

use std::sync::Arc;

use actions::{GreetingAction, SmartResponseAction};
use commands::{ConfigCommand, HelpCommand};
use registry::{ComponentDescriptor, ComponentInstance, ComponentKind, ComponentRegistry};

use crate::infrastructure::config::{ConfigField, ConfigSchema, ConfigSection, ConfigValue};

/// Full declared configuration schema of the bot.
pub fn config_schema() -> ConfigSchema {
    ConfigSchema::new()
        .section(
            ConfigSection::new("plugin", "basic plugin settings")
                .field(ConfigField::new(
                    "enabled",
                    ConfigValue::Bool(true),
                    "master switch for every component",
                ))
                .field(ConfigField::new(
                    "config_version",
                    ConfigValue::Str("1.0.0".to_string()),
                    "configuration document version",
                ))
                .field(ConfigField::new(
                    "debug_mode",
                    ConfigValue::Bool(false),
                    "verbose diagnostics",
                )),
        )
        .section(
            ConfigSection::new("features", "feature switches")
                .field(ConfigField::new(
                    "enable_greetings",
                    ConfigValue::Bool(true),
                    "greeting replies",
                ))
                .field(ConfigField::new(
                    "enable_smart_responses",
                    ConfigValue::Bool(true),
                    "supplementary replies",
                ))
                .field(ConfigField::new(
                    "enable_help_command",
                    ConfigValue::Bool(true),
                    "/help command",
                ))
                .field(ConfigField::new(
                    "enable_config_command",
                    ConfigValue::Bool(false),
                    "/config command",
                )),
        )
        .section(
            ConfigSection::new("actions", "action component settings")
                .field(ConfigField::new(
                    "greeting_keywords",
                    ConfigValue::List(
                        actions::greeting::DEFAULT_KEYWORDS
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    ),
                    "keywords that trigger the greeting action",
                ))
                .field(
                    ConfigField::new(
                        "response_probability",
                        ConfigValue::Float(0.1),
                        "random activation probability of the smart response action",
                    )
                    .with_validator(|v| matches!(v.as_float(), Some(p) if (0.0..=1.0).contains(&p))),
                )
                .field(ConfigField::new(
                    "max_response_length",
                    ConfigValue::Int(200),
                    "maximum reply length in characters",
                ))
                .field(ConfigField::new(
                    "enable_emoji",
                    ConfigValue::Bool(true),
                    "append an emoji to greetings",
                )),
        )
        .section(
            ConfigSection::new("commands", "command component settings")
                .field(ConfigField::new(
                    "help_prefix",
                    ConfigValue::Str("📖".to_string()),
                    "prefix of help messages",
                ))
                .field(ConfigField::new(
                    "config_admin_only",
                    ConfigValue::Bool(true),
                    "restrict the config command to admins",
                ))
                .field(ConfigField::new(
                    "admins",
                    ConfigValue::List(vec!["admin".to_string(), "owner".to_string()]),
                    "user ids allowed to use admin-only commands",
                ))
                .field(
                    ConfigField::new(
                        "command_timeout",
                        ConfigValue::Int(30),
                        "command execution timeout in seconds, enforced by the host",
                    )
                    .with_validator(|v| matches!(v.as_int(), Some(t) if t > 0)),
                ),
        )
        .section(
            ConfigSection::new("advanced", "tuning")
                .field(ConfigField::new(
                    "cache_enabled",
                    ConfigValue::Bool(true),
                    "cache generated smart responses",
                ))
                .field(
                    ConfigField::new(
                        "cache_ttl",
                        ConfigValue::Int(3600),
                        "cache lifetime in seconds",
                    )
                    .with_validator(|v| matches!(v.as_int(), Some(t) if t > 0)),
                )
                .field(
                    ConfigField::new(
                        "log_level",
                        ConfigValue::Str("INFO".to_string()),
                        "log verbosity",
                    )
                    .with_choices(&["DEBUG", "INFO", "WARNING", "ERROR"]),
                )
                .field(ConfigField::new(
                    "performance_monitor",
                    ConfigValue::Bool(false),
                    "log slow executions",
                )),
        )
        .mark_read_only("plugin.config_version")
}

/// Component declarations in registration order.
pub fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register(ComponentDescriptor {
        name: "greeting_action",
        kind: ComponentKind::Action,
        enable_flag: "features.enable_greetings",
        factory: |config| ComponentInstance::Action(Arc::new(GreetingAction::new(config))),
    });
    registry.register(ComponentDescriptor {
        name: "smart_response_action",
        kind: ComponentKind::Action,
        enable_flag: "features.enable_smart_responses",
        factory: |config| ComponentInstance::Action(Arc::new(SmartResponseAction::new(config))),
    });
    registry.register(ComponentDescriptor {
        name: "help_command",
        kind: ComponentKind::Command,
        enable_flag: "features.enable_help_command",
        factory: |config| ComponentInstance::Command(Arc::new(HelpCommand::new(config))),
    });
    registry.register(ComponentDescriptor {
        name: "config_command",
        kind: ComponentKind::Command,
        enable_flag: "features.enable_config_command",
        factory: |config| ComponentInstance::Command(Arc::new(ConfigCommand::new(config))),
    });
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schema_is_valid() {
        config_schema().validate().expect("schema invariants hold");
    }

    #[test]
    fn descriptor_flags_exist_in_schema() {
        let schema = config_schema();
        for descriptor in registry().descriptors() {
            assert!(
                schema.field(descriptor.enable_flag).is_some(),
                "missing flag {}",
                descriptor.enable_flag
            );
        }
    }
}
