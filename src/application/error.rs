//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::exitcode;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by discovery, dispatch and command handlers.
///
/// Everything propagates to the pipeline's executor, which is the only place
/// errors are caught.
#[derive(Error, Debug)]
pub enum ApplicationError {
    /// Invalid name, alias or command string
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// A sanity or invariant check failed
    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    /// The invoked command has no handler
    #[error("this command has not been implemented yet")]
    NotImplemented,

    /// Not an error: unwinds after `--help` or `--version` output
    #[error("graceful early exit")]
    GracefulEarlyExit,

    /// User-facing failure, optionally chained to its cause
    #[error("{message}")]
    Command {
        message: String,
        suggested_exit_code: Option<i32>,
        #[source]
        cause: Option<BoxError>,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: BoxError,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed(message.into())
    }

    /// A user-facing error with the default exit code.
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
            suggested_exit_code: None,
            cause: None,
        }
    }

    /// A user-facing error wrapping its cause.
    pub fn command_with_cause(
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self::Command {
            message: message.into(),
            suggested_exit_code: None,
            cause: Some(cause.into()),
        }
    }

    /// Attach a suggested exit code (user-facing errors only).
    pub fn with_exit_code(self, code: i32) -> Self {
        match self {
            Self::Command { message, cause, .. } => Self::Command {
                message,
                suggested_exit_code: Some(code),
                cause,
            },
            other => other,
        }
    }

    pub fn is_graceful_exit(&self) -> bool {
        matches!(self, Self::GracefulEarlyExit)
    }

    /// Exit code the process should terminate with for this error.
    pub fn suggested_exit_code(&self) -> i32 {
        match self {
            Self::GracefulEarlyExit => exitcode::OK,
            Self::Domain(_) | Self::AssertionFailed(_) => exitcode::ASSERTION_FAILED,
            Self::NotImplemented => exitcode::NOT_IMPLEMENTED,
            Self::Command {
                suggested_exit_code,
                ..
            } => suggested_exit_code.unwrap_or(exitcode::DEFAULT_ERROR),
            Self::OperationFailed { .. } => exitcode::DEFAULT_ERROR,
        }
    }
}

impl From<String> for ApplicationError {
    fn from(message: String) -> Self {
        Self::command(message)
    }
}

impl From<&str> for ApplicationError {
    fn from(message: &str) -> Self {
        Self::command(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_taxonomy() {
        assert_eq!(ApplicationError::GracefulEarlyExit.suggested_exit_code(), 0);
        assert_eq!(ApplicationError::NotImplemented.suggested_exit_code(), 2);
        assert_eq!(ApplicationError::assertion("x").suggested_exit_code(), 3);
        assert_eq!(
            ApplicationError::Domain(DomainError::EmptyName).suggested_exit_code(),
            3
        );
        assert_eq!(ApplicationError::command("boom").suggested_exit_code(), 1);
        assert_eq!(
            ApplicationError::command("boom")
                .with_exit_code(42)
                .suggested_exit_code(),
            42
        );
    }
}
