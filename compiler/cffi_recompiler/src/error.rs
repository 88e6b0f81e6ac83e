//! Recompiler errors.
//!
//! Every failure aborts the whole compilation before any file is written.
//! Errors raised while handling one declaration carry that declaration's
//! `"kind name"` key.

use std::fmt;
use std::path::PathBuf;

use cffi_model::ModelError;

/// Result type of every recompiler phase.
pub type RecompileResult<T> = Result<T, RecompileError>;

/// A recompilation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecompileError {
    /// The input cannot be compiled as declared.
    Configuration {
        message: String,
        declaration: Option<String>,
    },
    /// A bookkeeping invariant of the compiler itself was broken.
    Internal {
        message: String,
        declaration: Option<String>,
    },
    /// Reading or writing the generated source failed.
    Io { path: PathBuf, message: String },
}

impl RecompileError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            declaration: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            declaration: None,
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Attach the key of the declaration being processed.
    ///
    /// The innermost annotation wins; errors that already name a
    /// declaration are returned unchanged.
    #[must_use]
    pub fn in_declaration(self, key: &str) -> Self {
        match self {
            Self::Configuration {
                message,
                declaration: None,
            } => Self::Configuration {
                message,
                declaration: Some(key.to_owned()),
            },
            Self::Internal {
                message,
                declaration: None,
            } => Self::Internal {
                message,
                declaration: Some(key.to_owned()),
            },
            other => other,
        }
    }

    /// The `"kind name"` key of the offending declaration, if known.
    pub fn declaration(&self) -> Option<&str> {
        match self {
            Self::Configuration { declaration, .. } | Self::Internal { declaration, .. } => {
                declaration.as_deref()
            }
            Self::Io { .. } => None,
        }
    }

    /// The message without the declaration annotation.
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message, .. }
            | Self::Internal { message, .. }
            | Self::Io { message, .. } => message,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

impl fmt::Display for RecompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration {
                message,
                declaration,
            } => match declaration {
                Some(decl) => write!(f, "{decl}: {message}"),
                None => f.write_str(message),
            },
            Self::Internal {
                message,
                declaration,
            } => match declaration {
                Some(decl) => write!(f, "{decl}: internal inconsistency: {message}"),
                None => write!(f, "internal inconsistency: {message}"),
            },
            Self::Io { path, message } => {
                write!(f, "failed to write '{}': {message}", path.display())
            }
        }
    }
}

impl std::error::Error for RecompileError {}

impl From<ModelError> for RecompileError {
    fn from(err: ModelError) -> Self {
        Self::configuration(err.to_string())
    }
}
