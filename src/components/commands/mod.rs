//! Command components - triggered by pattern match

pub mod config;
pub mod help;

pub use config::ConfigCommand;
pub use help::HelpCommand;
