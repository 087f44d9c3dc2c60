//! Command service - routes user text to the matching command component

use std::sync::Arc;

use crate::application::dispatch::matcher::CommandMatcher;
use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::TurnContext;
use crate::domain::traits::{Command, Outcome};

/// Owns the matcher and the command components resolved from the registry.
///
/// A component's pattern id must equal its name; `register` enforces the
/// pairing so a match can always be routed back to its component.
#[derive(Default)]
pub struct CommandService {
    matcher: CommandMatcher,
    commands: Vec<Arc<dyn Command>>,
}

impl CommandService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Arc<dyn Command>) -> Result<(), CommandError> {
        let pattern = command.pattern()?;
        if pattern.id() != command.name() {
            return Err(CommandError::Pattern {
                id: pattern.id().to_string(),
                reason: format!("pattern id does not match component name '{}'", command.name()),
            });
        }
        self.matcher.register(pattern)?;
        self.commands.push(command);
        Ok(())
    }

    /// Match the turn's text and execute the winning command.
    ///
    /// `Ok(None)` means no registered pattern matched - not a failure, just
    /// "no command recognized".
    pub async fn handle(&self, ctx: &TurnContext) -> Result<Option<Outcome>, BotError> {
        let Some(matched) = self.matcher.match_text(ctx.text()) else {
            return Ok(None);
        };

        let command = self
            .commands
            .iter()
            .find(|c| c.name() == matched.id)
            .ok_or_else(|| {
                BotError::Internal(format!("matched id '{}' has no component", matched.id))
            })?;

        tracing::debug!("dispatching command '{}'", matched.id);
        command.execute(&matched, ctx).await.map(Some)
    }

    /// Strict variant for callers that treat unrecognized input as an error
    /// value rather than a silent pass-through.
    pub async fn handle_required(&self, ctx: &TurnContext) -> Result<Outcome, BotError> {
        match self.handle(ctx).await? {
            Some(outcome) => Ok(outcome),
            None => Err(CommandError::NoMatch.into()),
        }
    }

    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
