//! Judge trait - external activation decision collaborator

use async_trait::async_trait;

use crate::domain::entities::TurnContext;

/// External collaborator that approves or denies Judge-rule activation.
///
/// The core treats the call as an opaque boolean decision; real hosts back
/// this with a reasoning engine.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn approve(&self, prompt: &str, ctx: &TurnContext) -> bool;
}

/// Judge stub with a fixed answer, for tests and judge-less front ends.
pub struct FixedJudge(pub bool);

#[async_trait]
impl Judge for FixedJudge {
    async fn approve(&self, _prompt: &str, _ctx: &TurnContext) -> bool {
        self.0
    }
}
