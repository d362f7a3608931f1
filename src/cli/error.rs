//! CLI-level errors (wraps application and settings errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    App(#[from] ApplicationError),

    #[error("cannot load settings: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::App(e) => e.suggested_exit_code(),
            CliError::Config(_) => crate::exitcode::CONFIG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_cli_errors_when_mapping_then_exit_codes_follow_taxonomy() {
        assert_eq!(CliError::App(ApplicationError::NotImplemented).exit_code(), 2);
        assert_eq!(
            CliError::Config(config::ConfigError::Message("bad".into())).exit_code(),
            78
        );
    }
}
