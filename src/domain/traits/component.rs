//! Component traits - the two component kinds the registry can produce
//!
//! Actions are selected autonomously per turn through their activation rules;
//! Commands fire deterministically when user text matches their pattern.

use async_trait::async_trait;

use crate::application::dispatch::matcher::{CommandMatch, CommandPattern};
use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::{ActivationRule, ChatMode, TurnContext};

/// Result of executing a component.
///
/// `Disabled` is a normal outcome, not an error: the feature is switched off
/// in configuration and callers may want to tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    Disabled(String),
}

impl Outcome {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Outcome::Disabled(_))
    }

    pub fn into_reply(self) -> Option<String> {
        match self {
            Outcome::Reply(text) => Some(text),
            Outcome::Disabled(_) => None,
        }
    }
}

/// A component the host may select autonomously based on a per-mode
/// activation rule.
#[async_trait]
pub trait Action: Send + Sync {
    /// Unique identifier for the action
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// The activation rule that applies in the given chat mode
    fn activation(&self, mode: ChatMode) -> &ActivationRule;

    /// Whether this action may run in the same turn as other actions
    fn parallel(&self) -> bool;

    /// Execute the action for one turn
    async fn execute(&self, ctx: &TurnContext) -> Result<Outcome, BotError>;
}

/// A component triggered deterministically by matching user text against a
/// fixed pattern.
#[async_trait]
pub trait Command: Send + Sync {
    /// Unique identifier for the command; must equal its pattern id
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// The pattern this command is registered under
    fn pattern(&self) -> Result<CommandPattern, CommandError>;

    /// Execute the command with its captured arguments
    async fn execute(&self, matched: &CommandMatch, ctx: &TurnContext) -> Result<Outcome, BotError>;
}
