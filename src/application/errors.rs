//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot convert '{raw}' to {target}")]
    Conversion { raw: String, target: String },

    #[error("invalid value for '{key}': {reason}")]
    Validation { key: String, reason: String },

    #[error("config key '{0}' is read-only")]
    ReadOnly(String),

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Command registration and execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("command '{0}' is already registered")]
    Duplicate(String),

    #[error("invalid pattern for '{id}': {reason}")]
    Pattern { id: String, reason: String },

    #[error("example '{example}' does not match the pattern of '{id}'")]
    ExampleMismatch { id: String, example: String },

    #[error("no command matched")]
    NoMatch,

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}
