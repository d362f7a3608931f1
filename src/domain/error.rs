//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the command naming rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("command names and aliases must not be empty")]
    EmptyName,

    #[error("invalid command name or alias \"{name}\": {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("command string \"{0}\" must be \"$0\" or start with \"$0 \"")]
    InvalidCommand(String),

    #[error("invalid positional \"{token}\" in command string \"{command}\"")]
    InvalidPositional { command: String, token: String },
}
