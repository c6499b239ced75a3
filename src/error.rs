//! Error types for MAML serialization and deserialization.
//!
//! Syntax problems are collected by the parser into a [`ParseErrors`] batch
//! so a bad document reports every discovered problem at once. Binding
//! problems (type mismatches, overflows, unknown fields, depth exhaustion)
//! surface as individual [`Error`] variants carrying the position of the
//! offending node where one is available.
//!
//! ## Examples
//!
//! ```rust
//! use serde_maml::{from_str, Error, Value};
//!
//! let result: Result<Value, Error> = from_str("{ key: }");
//! assert!(result.is_err());
//! ```

use std::fmt;

use thiserror::Error;

/// A single error that occurred during parsing, with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parsing error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

/// The collection of syntax errors found in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseErrors(Vec<ParseError>);

impl ParseErrors {
    pub(crate) fn new(errors: Vec<ParseError>) -> Self {
        ParseErrors(errors)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParseErrors {
    /// Reports the first error; the full list is available through
    /// [`ParseErrors::iter`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.first() {
            Some(first) => {
                write!(f, "{first}")?;
                if self.0.len() > 1 {
                    write!(f, " (and {} more)", self.0.len() - 1)?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Represents all possible errors from MAML encoding and decoding.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing.
    #[error("io error: {0}")]
    Io(String),

    /// One or more syntax errors found while parsing.
    #[error("{0}")]
    Syntax(ParseErrors),

    /// A value kind incompatible with the requested target.
    #[error("cannot unmarshal {found} into {target} (line {line}, column {column})")]
    TypeMismatch {
        found: &'static str,
        target: String,
        line: usize,
        column: usize,
    },

    /// An integer that does not fit the target width.
    #[error("integer value {value} overflows {target} (line {line}, column {column})")]
    IntegerOverflow {
        value: i64,
        target: &'static str,
        line: usize,
        column: usize,
    },

    /// A float that does not fit the target width.
    #[error("float value {value} overflows {target} (line {line}, column {column})")]
    FloatOverflow {
        value: f64,
        target: &'static str,
        line: usize,
        column: usize,
    },

    /// An array bound to a fixed-length target of a different length.
    #[error("cannot unmarshal array of length {found} into fixed-length target of length {expected} (line {line}, column {column})")]
    ArrayLength {
        expected: usize,
        found: usize,
        line: usize,
        column: usize,
    },

    /// The decoder's recursion budget was exhausted.
    #[error("reached max recursion depth")]
    RecursionLimit,

    /// The encoder's nesting budget was exhausted, which for finite data
    /// only happens when the value graph contains a reference cycle.
    #[error("encountered a cycle while encoding (nesting limit exceeded)")]
    Cycle,

    /// Encode encountered a value with no MAML representation.
    #[error("unsupported type for encoding: {0}")]
    UnsupportedType(String),

    /// Maps must have string keys on both encode and decode.
    #[error("map key must be a string")]
    KeyMustBeString,

    /// Strict mode only: a document key bound to no record field.
    #[error("unknown field {field:?} in {target}")]
    UnknownField { field: String, target: String },

    /// An invalid option value, e.g. a zero recursion limit.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// An error raised by a `Serialize`/`Deserialize` implementation.
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates an error with a display message, for custom trait impls.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the parse error list when this is a syntax error.
    pub fn parse_errors(&self) -> Option<&ParseErrors> {
        match self {
            Error::Syntax(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
