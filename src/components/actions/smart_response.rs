//! Smart response action - adds a supplementary reply to the conversation
//!
//! Normal mode activates at random with a configured probability; focus mode
//! defers to the judge. May share a turn with other actions. Generated
//! replies are cached per (type, depth, tone) and the cache is dropped
//! wholesale once it outlives the configured TTL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::application::errors::BotError;
use crate::domain::entities::{ActivationRule, ChatMode, TurnContext};
use crate::domain::traits::{Action, Outcome};
use crate::infrastructure::config::ConfigStore;

const JUDGE_PROMPT: &str = "Decide whether a supplementary reply helps: the \
user asked a question or needs advice, the topic is complex or emotional, or \
the main reply may be insufficient. Skip plain salutations and conversations \
that have just started. Answer yes or no.";

struct ResponseCache {
    entries: HashMap<String, String>,
    last_clear: Instant,
}

pub struct SmartResponseAction {
    config: Arc<ConfigStore>,
    normal_rule: ActivationRule,
    focus_rule: ActivationRule,
    cache: Mutex<ResponseCache>,
}

impl SmartResponseAction {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        let probability = config.get_float("actions.response_probability", 0.1);
        Self {
            config,
            normal_rule: ActivationRule::random(probability),
            focus_rule: ActivationRule::judge(JUDGE_PROMPT),
            cache: Mutex::new(ResponseCache {
                entries: HashMap::new(),
                last_clear: Instant::now(),
            }),
        }
    }

    fn generate(response_type: &str, context_depth: &str, tone: &str, include_examples: bool) -> String {
        let templates: &[&str] = match response_type {
            "supportive" => &[
                "我理解你的想法，这确实是一个值得考虑的问题。",
                "你的观点很有意思，我想分享一些相关的想法：",
                "从另一个角度来看，也许可以这样考虑：",
            ],
            "creative" => &[
                "这激发了我的一些创意想法：",
                "从创意的角度来看，我们可以这样思考：",
                "让我分享一个有趣的想法：",
            ],
            "analytical" => &[
                "从分析的角度来看，这个问题有几个维度：",
                "让我们深入分析一下这个情况：",
                "数据表明这种现象背后可能有以下原因：",
            ],
            _ => &[
                "关于这个话题，我了解到一些有趣的信息...",
                "补充一下相关的背景知识：",
                "这让我想到了一些相关的内容：",
            ],
        };

        let mut rng = rand::thread_rng();
        let mut response = templates.choose(&mut rng).copied().unwrap_or(templates[0]).to_string();

        match tone {
            "formal" => {
                response = response.replace('我', "本系统").replace('你', "您");
            }
            "casual" => response.push_str(" 😊"),
            _ => {}
        }

        match context_depth {
            "deep" => response.push_str("\n\n深入来看，这个话题涉及多个层面的考虑..."),
            "medium" => response.push_str("\n\n这其中有一些重要的要点值得注意。"),
            _ => {}
        }

        if include_examples {
            response.push_str("\n\n举个例子来说...");
        }
        response
    }

    fn truncate(text: String, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text;
        }
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}

#[async_trait]
impl Action for SmartResponseAction {
    fn name(&self) -> &str {
        "smart_response_action"
    }

    fn description(&self) -> &str {
        "Generates a supplementary reply related to the conversation"
    }

    fn activation(&self, mode: ChatMode) -> &ActivationRule {
        match mode {
            ChatMode::Normal => &self.normal_rule,
            ChatMode::Focus => &self.focus_rule,
        }
    }

    fn parallel(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: &TurnContext) -> Result<Outcome, BotError> {
        let started = Instant::now();

        if !self.config.get_bool("features.enable_smart_responses", true) {
            return Ok(Outcome::Disabled("smart responses are disabled".into()));
        }

        let max_length = self.config.get_int("actions.max_response_length", 200).max(0) as usize;
        let cache_enabled = self.config.get_bool("advanced.cache_enabled", true);
        let cache_ttl = self.config.get_int("advanced.cache_ttl", 3600).max(0) as u64;

        let response_type = ctx.param("response_type").unwrap_or("informative");
        let context_depth = ctx.param("context_depth").unwrap_or("medium");
        let tone = ctx.param("tone").unwrap_or("friendly");
        let include_examples = ctx.param("include_examples") == Some("true");

        let cache_key = format!("{}_{}_{}", response_type, context_depth, tone);

        if cache_enabled {
            if let Ok(mut cache) = self.cache.lock() {
                if cache.last_clear.elapsed() > Duration::from_secs(cache_ttl) {
                    cache.entries.clear();
                    cache.last_clear = Instant::now();
                    tracing::debug!("smart response cache cleared");
                }
                if let Some(hit) = cache.entries.get(&cache_key) {
                    tracing::debug!("smart response cache hit: {}", cache_key);
                    return Ok(Outcome::Reply(hit.clone()));
                }
            }
        }

        let response = Self::truncate(
            Self::generate(response_type, context_depth, tone, include_examples),
            max_length,
        );

        if cache_enabled {
            if let Ok(mut cache) = self.cache.lock() {
                cache.entries.insert(cache_key, response.clone());
            }
        }

        if self.config.get_bool("advanced.performance_monitor", false) {
            let elapsed = started.elapsed();
            if elapsed > Duration::from_secs(2) {
                tracing::warn!("smart response took {:.2}s", elapsed.as_secs_f64());
            }
        }

        Ok(Outcome::Reply(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::config_schema;
    use crate::domain::entities::Message;

    fn config() -> Arc<ConfigStore> {
        Arc::new(ConfigStore::from_schema(config_schema()).unwrap())
    }

    fn ctx(text: &str) -> TurnContext {
        TurnContext::new(Message::from_text("chat", text), ChatMode::Normal)
    }

    #[tokio::test]
    async fn produces_reply() {
        let action = SmartResponseAction::new(config());
        let text = action.execute(&ctx("tell me more")).await.unwrap().into_reply().unwrap();
        assert!(!text.is_empty());
    }

    #[tokio::test]
    async fn disabled_outcome() {
        let config = config();
        config.set("features.enable_smart_responses", "false").unwrap();
        let action = SmartResponseAction::new(config);
        assert!(action.execute(&ctx("x")).await.unwrap().is_disabled());
    }

    #[tokio::test]
    async fn reply_truncated_to_configured_chars() {
        let config = config();
        config.set("actions.max_response_length", "10").unwrap();
        let action = SmartResponseAction::new(config);
        let turn = ctx("x").with_param("context_depth", "deep");
        let text = action.execute(&turn).await.unwrap().into_reply().unwrap();
        assert!(text.ends_with("..."));
        assert!(text.chars().count() <= 13);
    }

    #[tokio::test]
    async fn cache_returns_same_reply_for_same_key() {
        let action = SmartResponseAction::new(config());
        let turn = ctx("x")
            .with_param("response_type", "analytical")
            .with_param("tone", "formal");
        let first = action.execute(&turn).await.unwrap().into_reply().unwrap();
        let second = action.execute(&turn).await.unwrap().into_reply().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn formal_tone_rewrites_pronouns() {
        let config = config();
        config.set("advanced.cache_enabled", "false").unwrap();
        let action = SmartResponseAction::new(config);
        let turn = ctx("x")
            .with_param("response_type", "supportive")
            .with_param("tone", "formal");
        let text = action.execute(&turn).await.unwrap().into_reply().unwrap();
        assert!(!text.contains('我') || text.contains("本系统"));
    }

    #[test]
    fn normal_rule_uses_configured_probability() {
        let config = config();
        config.set("actions.response_probability", "0.7").unwrap();
        let action = SmartResponseAction::new(config);
        match action.activation(ChatMode::Normal) {
            ActivationRule::Random { probability } => assert_eq!(*probability, 0.7),
            other => panic!("expected random rule, got {:?}", other),
        }
    }
}
