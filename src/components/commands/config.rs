//! Config command - inspect and change configuration at runtime
//!
//! User mistakes (bad keys, bad values, missing permission) come back as
//! replies, not errors; the process never aborts over a typo.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::dispatch::matcher::{CommandMatch, CommandPattern};
use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::TurnContext;
use crate::domain::traits::{Command, Outcome};
use crate::infrastructure::config::ConfigStore;

pub const CONFIG_PATTERN: &str =
    r"^/config\s+(?P<action>get|set|list|reset)(?:\s+(?P<key>\w+(?:\.\w+)*))?(?:\s+(?P<value>.+))?$";

const CONFIG_EXAMPLES: [&str; 4] = [
    "/config list",
    "/config get plugin.enabled",
    "/config set debug_mode true",
    "/config reset features.enable_greetings",
];

const DEFAULT_ADMINS: [&str; 2] = ["admin", "owner"];

/// Structured view of the pattern's captures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    Get,
    Set,
    List,
    Reset,
}

#[derive(Debug, Clone)]
pub struct ConfigArgs {
    pub action: ConfigAction,
    pub key: Option<String>,
    pub value: Option<String>,
}

impl ConfigArgs {
    pub fn from_match(matched: &CommandMatch) -> Result<Self, CommandError> {
        let action = match matched.group("action") {
            Some("get") => ConfigAction::Get,
            Some("set") => ConfigAction::Set,
            Some("list") => ConfigAction::List,
            Some("reset") => ConfigAction::Reset,
            other => {
                return Err(CommandError::InvalidArgs(format!(
                    "unsupported action: {}",
                    other.unwrap_or("none")
                )))
            }
        };
        Ok(Self {
            action,
            key: matched.group("key").map(|s| s.to_string()),
            value: matched.group("value").map(|s| s.to_string()),
        })
    }
}

pub struct ConfigCommand {
    config: Arc<ConfigStore>,
}

impl ConfigCommand {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self { config }
    }

    fn is_admin(&self, ctx: &TurnContext) -> bool {
        let admins = self.config.get_list("commands.admins", &DEFAULT_ADMINS);
        ctx.sender_id()
            .map(|id| admins.iter().any(|a| a == id))
            .unwrap_or(false)
    }

    fn handle_list(&self) -> String {
        let mut out = String::from("🔧 Configuration\n");
        let mut current = String::new();
        for entry in self.config.list() {
            if entry.section != current {
                out.push_str(&format!("\n[{}]\n", entry.section));
                current = entry.section.clone();
            }
            let name = entry.key.rsplit('.').next().unwrap_or(&entry.key);
            out.push_str(&format!("• {} = {} ({})\n", name, entry.value, entry.ty));
        }
        out.push_str("\nUse /config get <key> or /config set <key> <value>.");
        out
    }

    fn handle_get(&self, key: Option<&str>) -> String {
        let Some(key) = key else {
            return "❌ missing config key".to_string();
        };
        let Some(full_key) = self.config.resolve_key(key) else {
            return format!("❌ unknown config key: {}", key);
        };
        match self.config.get(&full_key) {
            Some(value) => format!(
                "🔍 {} = {} ({})",
                full_key,
                value,
                value.field_type()
            ),
            None => format!("❌ unknown config key: {}", key),
        }
    }

    fn handle_set(&self, key: Option<&str>, value: Option<&str>) -> String {
        let Some(key) = key else {
            return "❌ missing config key".to_string();
        };
        let Some(value) = value else {
            return "❌ missing config value".to_string();
        };
        let old = self
            .config
            .resolve_key(key)
            .and_then(|k| self.config.get(&k));
        match self.config.set(key, value) {
            Ok(new) => match old {
                Some(old) => format!("✅ updated {}: {} -> {}", key, old, new),
                None => format!("✅ updated {} = {}", key, new),
            },
            Err(e) => format!("❌ {}", e),
        }
    }

    fn handle_reset(&self, key: Option<&str>) -> String {
        let Some(key) = key else {
            return "❌ missing config key".to_string();
        };
        match self.config.reset(key) {
            Ok(default) => format!("🔄 reset {} to {}", key, default),
            Err(e) => format!("❌ {}", e),
        }
    }
}

#[async_trait]
impl Command for ConfigCommand {
    fn name(&self) -> &str {
        "config_command"
    }

    fn description(&self) -> &str {
        "Views, changes and resets plugin configuration"
    }

    fn pattern(&self) -> Result<CommandPattern, CommandError> {
        CommandPattern::new(self.name(), CONFIG_PATTERN, &CONFIG_EXAMPLES)
    }

    async fn execute(&self, matched: &CommandMatch, ctx: &TurnContext) -> Result<Outcome, BotError> {
        if !self.config.get_bool("features.enable_config_command", false) {
            return Ok(Outcome::Disabled("config command is disabled".into()));
        }

        if self.config.get_bool("commands.config_admin_only", true) && !self.is_admin(ctx) {
            return Ok(Outcome::Reply(
                "❌ permission denied: the config command is admin-only".to_string(),
            ));
        }

        let args = ConfigArgs::from_match(matched).map_err(BotError::Command)?;

        if self.config.get_bool("plugin.debug_mode", false) {
            tracing::debug!(
                "config command: action={:?} key={:?} value={:?}",
                args.action,
                args.key,
                args.value
            );
        }

        let reply = match args.action {
            ConfigAction::List => self.handle_list(),
            ConfigAction::Get => self.handle_get(args.key.as_deref()),
            ConfigAction::Set => self.handle_set(args.key.as_deref(), args.value.as_deref()),
            ConfigAction::Reset => self.handle_reset(args.key.as_deref()),
        };
        Ok(Outcome::Reply(reply))
    }
}
