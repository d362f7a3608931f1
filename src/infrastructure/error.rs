//! Infrastructure-level errors (module import and I/O)

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while importing a configuration module.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse module {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported module extension: {0}")]
    UnsupportedExtension(PathBuf),

    #[error("module {path} references unknown {kind} \"{name}\"")]
    UnknownReference {
        path: PathBuf,
        kind: &'static str,
        name: String,
    },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Import failures the loader may skip in favour of the next candidate path.
    ///
    /// A module that was read and parsed but references a callable nobody
    /// registered is broken, not absent.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, InfraError::UnknownReference { .. })
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
