//! Error types for config binding
//!
//! Provides error handling for:
//! - Bind operations (type registration at builder time)
//! - Stream operations (reader/writer cursor misuse)
//! - Conversion operations (type mismatches, text parsing)
//! - Validation (declared field constraints)

use std::fmt::Display;

use confbind_value::ParseError;

use crate::path::FieldPath;
use crate::reader::Token;

/// Result alias for conversions
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad category of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Token stream misuse: reading past the end, missing names, bad nesting
    Io,
    /// A value had the wrong shape for the target type
    Syntax,
    /// A declared field constraint was violated
    Validation,
    /// Invalid binder configuration
    Config,
}

/// Errors while registering bound types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// Two fields (or aliases) resolve to the same name
    #[error("duplicate field name '{name}' in {type_name}")]
    DuplicateField { type_name: &'static str, name: String },

    /// Metadata declared for a field serde does not know
    #[error("unknown field '{field}' in {type_name}")]
    UnknownField { type_name: &'static str, field: String },

    /// Two bound types share one serde struct name
    #[error("struct name '{name}' is bound twice")]
    DuplicateStructName { name: &'static str },

    /// Type does not deserialize as a struct
    #[error("{type_name} is not a struct")]
    NotAStruct { type_name: &'static str },

    /// Constraint bounds are unusable
    #[error("invalid constraint on {type_name}.{field}: {reason}")]
    InvalidConstraint {
        type_name: &'static str,
        field: String,
        reason: String,
    },
}

/// Errors during conversion between values and trees
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Consumed past the end of a container
    #[error("end of container at {path}")]
    EndOfContainer { path: FieldPath },

    /// Name requested on a frame that has none
    #[error("{frame} node has no name property")]
    NoName { frame: &'static str },

    /// Value written into an object without a name
    #[error("value written into an object without a name")]
    MissingName,

    /// Reader met a token it did not expect
    #[error("expected {expected} at {path}, found {found}")]
    UnexpectedToken {
        path: FieldPath,
        expected: &'static str,
        found: Token,
    },

    /// Value had the wrong shape for the requested type
    #[error("invalid type at {path}: expected {expected}, found {found}")]
    InvalidType {
        path: FieldPath,
        expected: &'static str,
        found: Token,
    },

    /// Writer begin/end calls do not pair up
    #[error("mismatched nesting: expected {expected}, found {found}")]
    Nesting {
        expected: &'static str,
        found: &'static str,
    },

    /// Writer finished with containers still open
    #[error("{0} container(s) left open")]
    UnclosedContainer(usize),

    /// Scalar text could not be parsed as the requested type
    #[error("invalid {expected} at {path}: '{text}'")]
    InvalidScalar {
        path: FieldPath,
        expected: &'static str,
        text: String,
    },

    /// Map key was not a scalar
    #[error("map key must be a scalar")]
    KeyMustBeScalar,

    /// Error raised by a serde impl
    #[error("{0}")]
    Message(String),

    /// Config text failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Root key missing from a document
    #[error("root key '{0}' not found")]
    MissingRoot(String),

    /// Field value violated a constraint
    #[error("field '{path}' has incorrect value ({value}): {constraint}")]
    Validation {
        path: FieldPath,
        value: String,
        constraint: String,
    },

    /// Binder configuration error
    #[error(transparent)]
    Bind(#[from] BindError),
}

impl Error {
    /// Category of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EndOfContainer { .. }
            | Self::NoName { .. }
            | Self::MissingName
            | Self::UnexpectedToken { .. }
            | Self::Nesting { .. }
            | Self::UnclosedContainer(_) => ErrorKind::Io,
            Self::InvalidType { .. }
            | Self::InvalidScalar { .. }
            | Self::KeyMustBeScalar
            | Self::Message(_)
            | Self::Parse(_)
            | Self::MissingRoot(_) => ErrorKind::Syntax,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Bind(_) => ErrorKind::Config,
        }
    }

    /// Create validation error
    pub fn validation(
        path: FieldPath,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::Validation {
            path,
            value: value.into(),
            constraint: constraint.into(),
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(Error::MissingName.kind(), ErrorKind::Io);
        assert_eq!(Error::KeyMustBeScalar.kind(), ErrorKind::Syntax);
        assert_eq!(
            Error::validation(FieldPath::root(), "x", "y").kind(),
            ErrorKind::Validation
        );
        let bind = BindError::NotAStruct { type_name: "u8" };
        assert_eq!(Error::from(bind).kind(), ErrorKind::Config);
    }

    #[test]
    fn validation_message() {
        let err = Error::validation(
            FieldPath::root().key("value"),
            "invalid",
            "valid values: [foo, bar]",
        );
        assert_eq!(
            err.to_string(),
            "field '$.value' has incorrect value (invalid): valid values: [foo, bar]"
        );
    }
}
