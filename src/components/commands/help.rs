//! Help command - topic-scoped usage information

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::dispatch::matcher::{CommandMatch, CommandPattern};
use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::TurnContext;
use crate::domain::traits::{Command, Outcome};
use crate::infrastructure::config::ConfigStore;

pub const HELP_PATTERN: &str = r"^/help(?:\s+(?P<topic>actions|commands|config|all))?$";

const HELP_EXAMPLES: [&str; 5] = ["/help", "/help actions", "/help commands", "/help config", "/help all"];

/// Structured view of the pattern's captures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Actions,
    Commands,
    Config,
    All,
}

impl HelpTopic {
    pub fn from_match(matched: &CommandMatch) -> Option<Self> {
        match matched.group("topic")? {
            "actions" => Some(HelpTopic::Actions),
            "commands" => Some(HelpTopic::Commands),
            "config" => Some(HelpTopic::Config),
            "all" => Some(HelpTopic::All),
            _ => None,
        }
    }
}

pub struct HelpCommand {
    config: Arc<ConfigStore>,
}

impl HelpCommand {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self { config }
    }

    fn general(prefix: &str) -> String {
        format!(
            "{prefix} lark-bot help\n\
             \n\
             Commands:\n\
             • /help - this message\n\
             • /help actions - what the autonomous actions do\n\
             • /help commands - available commands\n\
             • /help config - configuration reference\n\
             • /help all - everything at once\n\
             \n\
             The bot also replies on its own: greetings are answered when a \
             greeting keyword appears, and supplementary replies fire at random."
        )
    }

    fn actions(prefix: &str) -> String {
        format!(
            "{prefix} Actions\n\
             \n\
             Actions are picked autonomously per turn based on an activation rule.\n\
             \n\
             • greeting_action - answers salutations. Activates on keywords \
             (actions.greeting_keywords) in normal mode, judge decision in focus mode.\n\
             • smart_response_action - adds a related supplementary reply. Activates \
             at random (actions.response_probability) in normal mode, judge decision \
             in focus mode."
        )
    }

    fn commands(prefix: &str) -> String {
        format!(
            "{prefix} Commands\n\
             \n\
             Commands fire when your input matches their pattern exactly.\n\
             \n\
             • /help [topic] - this help\n\
             • /config <get|set|list|reset> [key] [value] - inspect and change \
             configuration (off by default; enable features.enable_config_command)"
        )
    }

    fn config_reference(prefix: &str) -> String {
        format!(
            "{prefix} Configuration\n\
             \n\
             [plugin] enabled, config_version (read-only), debug_mode\n\
             [features] enable_greetings, enable_smart_responses, \
             enable_help_command, enable_config_command\n\
             [actions] greeting_keywords, response_probability, \
             max_response_length, enable_emoji\n\
             [commands] help_prefix, config_admin_only, admins, command_timeout\n\
             [advanced] cache_enabled, cache_ttl, log_level, performance_monitor\n\
             \n\
             Use /config get <key> and /config set <key> <value> to adjust."
        )
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help_command"
    }

    fn description(&self) -> &str {
        "Shows usage information, optionally scoped to a topic"
    }

    fn pattern(&self) -> Result<CommandPattern, CommandError> {
        CommandPattern::new(self.name(), HELP_PATTERN, &HELP_EXAMPLES)
    }

    async fn execute(&self, matched: &CommandMatch, _ctx: &TurnContext) -> Result<Outcome, BotError> {
        if !self.config.get_bool("features.enable_help_command", true) {
            return Ok(Outcome::Disabled("help command is disabled".into()));
        }

        let prefix = self.config.get_str("commands.help_prefix", "📖");
        let text = match HelpTopic::from_match(matched) {
            Some(HelpTopic::Actions) => Self::actions(&prefix),
            Some(HelpTopic::Commands) => Self::commands(&prefix),
            Some(HelpTopic::Config) => Self::config_reference(&prefix),
            Some(HelpTopic::All) => format!(
                "{}\n\n{}\n\n{}\n\n{}",
                Self::general(&prefix),
                Self::actions(&prefix),
                Self::commands(&prefix),
                Self::config_reference(&prefix)
            ),
            None => Self::general(&prefix),
        };
        Ok(Outcome::Reply(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::config_schema;
    use crate::domain::entities::{ChatMode, Message};

    fn command() -> HelpCommand {
        HelpCommand::new(Arc::new(ConfigStore::from_schema(config_schema()).unwrap()))
    }

    fn ctx() -> TurnContext {
        TurnContext::new(Message::from_text("chat", "/help"), ChatMode::Normal)
    }

    #[test]
    fn examples_satisfy_own_pattern() {
        let pattern = command().pattern().unwrap();
        for example in pattern.examples() {
            assert!(pattern.matches(example).is_some(), "example = {example}");
        }
    }

    #[tokio::test]
    async fn topic_selects_section() {
        let cmd = command();
        let pattern = cmd.pattern().unwrap();

        let matched = pattern.matches("/help actions").unwrap();
        assert_eq!(HelpTopic::from_match(&matched), Some(HelpTopic::Actions));
        let text = cmd.execute(&matched, &ctx()).await.unwrap().into_reply().unwrap();
        assert!(text.contains("greeting_action"));

        let matched = pattern.matches("/help").unwrap();
        assert_eq!(HelpTopic::from_match(&matched), None);
        let text = cmd.execute(&matched, &ctx()).await.unwrap().into_reply().unwrap();
        assert!(text.contains("/help actions"));
    }

    #[tokio::test]
    async fn prefix_comes_from_config() {
        let config = Arc::new(ConfigStore::from_schema(config_schema()).unwrap());
        config.set("commands.help_prefix", ">>").unwrap();
        let cmd = HelpCommand::new(config);
        let matched = cmd.pattern().unwrap().matches("/help").unwrap();
        let text = cmd.execute(&matched, &ctx()).await.unwrap().into_reply().unwrap();
        assert!(text.starts_with(">>"));
    }

    #[tokio::test]
    async fn disabled_outcome_when_switched_off() {
        let config = Arc::new(ConfigStore::from_schema(config_schema()).unwrap());
        config.set("features.enable_help_command", "false").unwrap();
        let cmd = HelpCommand::new(config);
        let matched = cmd.pattern().unwrap().matches("/help").unwrap();
        assert!(cmd.execute(&matched, &ctx()).await.unwrap().is_disabled());
    }

    #[tokio::test]
    async fn all_topic_concatenates_sections() {
        let cmd = command();
        let matched = cmd.pattern().unwrap().matches("/help all").unwrap();
        let text = cmd.execute(&matched, &ctx()).await.unwrap().into_reply().unwrap();
        assert!(text.contains("Actions"));
        assert!(text.contains("Commands"));
        assert!(text.contains("Configuration"));
    }
}
