//! Turn context - everything a component sees for one chat turn

use std::collections::HashMap;

use super::{ChatMode, Message};

/// Input for one chat turn, passed to commands and actions.
///
/// `params` carries host-supplied action parameters (the planner's view of
/// what the action should do); the core treats them as opaque strings.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub message: Message,
    pub mode: ChatMode,
    pub params: HashMap<String, String>,
}

impl TurnContext {
    pub fn new(message: Message, mode: ChatMode) -> Self {
        Self {
            message,
            mode,
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|s| s.as_str())
    }

    pub fn sender_id(&self) -> Option<&str> {
        self.message.sender.as_ref().map(|u| u.id.as_str())
    }

    pub fn text(&self) -> &str {
        self.message.text()
    }
}
