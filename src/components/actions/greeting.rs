//! Greeting action - replies to salutations
//!
//! Normal mode activates on configured keywords; focus mode defers to the
//! host's judge. Runs alone in its turn.

use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::application::errors::BotError;
use crate::domain::entities::{ActivationRule, ChatMode, TurnContext};
use crate::domain::traits::{Action, Outcome};
use crate::infrastructure::config::ConfigStore;

const JUDGE_PROMPT: &str = "Decide whether a greeting reply fits: the user \
opened with a salutation or friendly opener, used a polite address, or the \
conversation has just begun. Answer yes or no.";

pub const DEFAULT_KEYWORDS: [&str; 4] = ["你好", "hello", "hi", "嗨"];

pub struct GreetingAction {
    config: Arc<ConfigStore>,
    normal_rule: ActivationRule,
    focus_rule: ActivationRule,
}

impl GreetingAction {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        let keywords = config.get_list("actions.greeting_keywords", &DEFAULT_KEYWORDS);
        Self {
            config,
            normal_rule: ActivationRule::keywords(keywords, false),
            focus_rule: ActivationRule::judge(JUDGE_PROMPT),
        }
    }

    fn compose(&self, ctx: &TurnContext) -> String {
        if let Some(custom) = ctx.param("custom_message").filter(|m| !m.is_empty()) {
            return custom.to_string();
        }

        let greeting_type = ctx.param("greeting_type").unwrap_or("friendly");
        let time_context = ctx.param("time_context").unwrap_or("");
        let user_name = ctx.param("user_name").unwrap_or("");

        let time_options: &[&str] = match time_context {
            "morning" => &["早上好", "上午好", "Good morning"],
            "afternoon" => &["下午好", "Good afternoon"],
            "evening" => &["晚上好", "Good evening"],
            _ => &[],
        };
        let base_options: &[&str] = match greeting_type {
            "formal" => &["您好", "很高兴见到您", "欢迎"],
            "casual" => &["嗨", "你好呀", "Hey"],
            _ => &["你好", "很高兴遇到你", "Hi there"],
        };
        let options = if time_options.is_empty() {
            base_options
        } else {
            time_options
        };

        let mut rng = rand::thread_rng();
        let mut greeting = options
            .choose(&mut rng)
            .copied()
            .unwrap_or("你好")
            .to_string();

        if !user_name.is_empty() {
            greeting.push('，');
            greeting.push_str(user_name);
        }

        let suffixes = ["！", "~", "！😊", "！很高兴见到你"];
        greeting.push_str(suffixes.choose(&mut rng).copied().unwrap_or("！"));
        greeting
    }
}

#[async_trait]
impl Action for GreetingAction {
    fn name(&self) -> &str {
        "greeting_action"
    }

    fn description(&self) -> &str {
        "Replies to user greetings with a friendly salutation"
    }

    fn activation(&self, mode: ChatMode) -> &ActivationRule {
        match mode {
            ChatMode::Normal => &self.normal_rule,
            ChatMode::Focus => &self.focus_rule,
        }
    }

    fn parallel(&self) -> bool {
        false
    }

    async fn execute(&self, ctx: &TurnContext) -> Result<Outcome, BotError> {
        if !self.config.get_bool("features.enable_greetings", true) {
            return Ok(Outcome::Disabled("greeting replies are disabled".into()));
        }

        let mut reply = self.compose(ctx);

        if self.config.get_bool("actions.enable_emoji", true) {
            let emoji = ["😊", "👋", "🌟", "💫", "✨"];
            let mut rng = rand::thread_rng();
            if let Some(e) = emoji.choose(&mut rng) {
                reply.push(' ');
                reply.push_str(e);
            }
        }

        if self.config.get_bool("plugin.debug_mode", false) {
            tracing::debug!(
                "greeting: type={} user={}",
                ctx.param("greeting_type").unwrap_or("friendly"),
                ctx.param("user_name").unwrap_or("-")
            );
        }

        Ok(Outcome::Reply(reply))
    }
}
