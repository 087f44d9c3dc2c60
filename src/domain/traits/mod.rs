//! Trait definitions for pluggable components

pub mod component;
pub mod judge;

pub use component::{Action, Command, Outcome};
pub use judge::{FixedJudge, Judge};
