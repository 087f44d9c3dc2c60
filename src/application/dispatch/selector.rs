//! Action dispatcher - decides which registered Actions run this turn
//!
//! Selection is a pure filter over each action's activation rule for the
//! current chat mode; turn planning then applies the mutual-exclusion flag.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::entities::{ActivationRule, TurnContext};
use crate::domain::traits::{Action, Judge};

pub struct ActionDispatcher {
    judge: Arc<dyn Judge>,
    rng: Mutex<StdRng>,
}

impl ActionDispatcher {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self::with_rng(judge, StdRng::from_entropy())
    }

    /// Seeded variant so Random-rule behavior is reproducible in tests.
    pub fn with_rng(judge: Arc<dyn Judge>, rng: StdRng) -> Self {
        Self {
            judge,
            rng: Mutex::new(rng),
        }
    }

    /// Actions whose activation rule for the current mode accepts the input,
    /// in the order they were given (declaration order).
    pub async fn selectable(
        &self,
        actions: &[Arc<dyn Action>],
        ctx: &TurnContext,
    ) -> Vec<Arc<dyn Action>> {
        let mut selected = Vec::new();
        for action in actions {
            if self.activates(action.activation(ctx.mode), ctx).await {
                selected.push(Arc::clone(action));
            }
        }
        selected
    }

    async fn activates(&self, rule: &ActivationRule, ctx: &TurnContext) -> bool {
        match rule {
            ActivationRule::Always => true,
            ActivationRule::Keyword {
                keywords,
                case_sensitive,
            } => {
                let text = ctx.text();
                if *case_sensitive {
                    keywords.iter().any(|k| text.contains(k.as_str()))
                } else {
                    let folded = text.to_lowercase();
                    keywords.iter().any(|k| folded.contains(&k.to_lowercase()))
                }
            }
            ActivationRule::Random { probability } => match self.rng.lock() {
                Ok(mut rng) => rng.gen::<f64>() < *probability,
                Err(_) => false,
            },
            ActivationRule::Judge { prompt } => self.judge.approve(prompt, ctx).await,
        }
    }

    /// Apply the mutual-exclusion flag to a selectable set: if any selected
    /// action refuses parallel execution, exactly one action runs this turn -
    /// the first such action in declaration order. Otherwise all run.
    pub fn plan_turn(selected: Vec<Arc<dyn Action>>) -> Vec<Arc<dyn Action>> {
        if let Some(exclusive) = selected.iter().find(|a| !a.parallel()) {
            vec![Arc::clone(exclusive)]
        } else {
            selected
        }
    }

    /// Selection plus turn planning in one step.
    pub async fn dispatch(
        &self,
        actions: &[Arc<dyn Action>],
        ctx: &TurnContext,
    ) -> Vec<Arc<dyn Action>> {
        Self::plan_turn(self.selectable(actions, ctx).await)
    }

    /// Two actions may share a turn only when both allow it.
    pub fn parallel_allowed(a: &dyn Action, b: &dyn Action) -> bool {
        a.parallel() && b.parallel()
    }
}
