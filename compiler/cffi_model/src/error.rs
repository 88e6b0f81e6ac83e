//! Type model errors.

use std::fmt;

/// Failure while querying the type model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// A type with no C spelling (an anonymous aggregate) was rendered.
    UnknownTypeName { name: String, context: String },
    /// Enum values exceed both `long` and `unsigned long`.
    EnumTooWide { name: String },
    /// A query needed a different kind of node.
    UnexpectedNode { name: String, expected: &'static str },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTypeName { name, context } => {
                write!(f, "cannot generate '{name}' in {context}: unknown type name")
            }
            Self::EnumTooWide { name } => {
                write!(
                    f,
                    "{name} values don't all fit into either 'long' or 'unsigned long'"
                )
            }
            Self::UnexpectedNode { name, expected } => {
                write!(f, "'{name}' is not {expected}")
            }
        }
    }
}

impl std::error::Error for ModelError {}
