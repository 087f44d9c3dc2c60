//! Dispatch - command matching and action selection

pub mod matcher;
pub mod selector;

pub use matcher::{CommandMatch, CommandMatcher, CommandPattern};
pub use selector::ActionDispatcher;
