//! # serde_maml
//!
//! A Serde-compatible serialization library for the MAML configuration
//! format.
//!
//! ## What is MAML?
//!
//! MAML (Minimal Abstract Markup Language) is a JSON superset designed for
//! configuration files. It keeps JSON's data model and adds the things
//! humans want when editing by hand:
//!
//! - **Comments**: `# like this`
//! - **Optional commas**: newlines separate fields just as well
//! - **Bare keys**: `server-name: "example"` needs no quotes
//! - **Multiline strings**: `"""` blocks with no escape noise
//!
//! See the [`spec`] module for the full syntax description.
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! serde_maml = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Basic Serialization and Deserialization
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_maml::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     active: bool,
//! }
//!
//! let maml = r#"
//! {
//!   host: "example.org" # primary instance
//!   port: 8080
//!   active: true
//! }
//! "#;
//!
//! let server: Server = from_str(maml).unwrap();
//! assert_eq!(server.port, 8080);
//!
//! let out = to_string(&server).unwrap();
//! assert_eq!(out, "{\n  host: \"example.org\"\n  port: 8080\n  active: true\n}");
//! ```
//!
//! ### Dynamic Values
//!
//! ```rust
//! use serde_maml::{maml, from_str, Value};
//!
//! let value: Value = from_str("{ retries: 3, backoff: 1.5 }").unwrap();
//! assert_eq!(value.get("retries").and_then(|v| v.as_i64()), Some(3));
//!
//! let built = maml!({ "retries": 3, "backoff": 1.5 });
//! assert_eq!(value, built);
//! ```
//!
//! ### Styling the Output
//!
//! ```rust
//! use serde_maml::{to_string_with_options, EncodeOptions};
//!
//! let value = vec![1, 2, 3];
//! let compact = to_string_with_options(&value, EncodeOptions::compact()).unwrap();
//! assert_eq!(compact, "[1,2,3]");
//!
//! let inline = to_string_with_options(
//!     &value,
//!     EncodeOptions::new().with_inline_arrays(),
//! ).unwrap();
//! assert_eq!(inline, "[1,2,3]");
//! ```
//!
//! ### Preserving Comments
//!
//! [`parse_str_with_comments`] produces a full-fidelity syntax tree that
//! keeps comments and blank-line grouping, and [`format_document`] writes
//! it back out:
//!
//! ```rust
//! use serde_maml::{format_document, parse_str_with_comments, EncodeOptions};
//!
//! let source = "{\n  # the port we listen on\n  port: 8080\n}";
//! let doc = parse_str_with_comments(source).unwrap();
//!
//! let mut out = Vec::new();
//! format_document(&doc, &EncodeOptions::new(), &mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), source);
//! ```

pub mod ast;
pub mod de;
pub mod error;
mod format;
pub mod lexer;
mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod ser;
pub mod spec;
pub mod token;
pub mod value;

pub use de::Deserializer;
pub use error::{Error, ParseError, ParseErrors, Result};
pub use map::MamlMap;
pub use options::{DecodeOptions, EncodeOptions};
pub use ser::Serializer;
pub use value::{Number, Value};

use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ast::Document;
use crate::format::Formatter;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Parses `bytes` into a document, collecting all syntax errors.
fn parse_bytes(bytes: &[u8], parse_comments: bool) -> Result<Document> {
    let lexer = Lexer::new(bytes);
    let mut parser = if parse_comments {
        Parser::new_with_comments(lexer)
    } else {
        Parser::new(lexer)
    };
    let doc = parser.parse();
    let errors = parser.take_errors();
    if !errors.is_empty() {
        return Err(Error::Syntax(errors));
    }
    Ok(doc)
}

/// Parses MAML source into its syntax tree, discarding comments.
///
/// # Errors
///
/// Returns [`Error::Syntax`] carrying every problem found in the document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_str(s: &str) -> Result<Document> {
    parse_bytes(s.as_bytes(), false)
}

/// Parses MAML source into a full-fidelity syntax tree with comments and
/// blank-line counts attached.
///
/// # Examples
///
/// ```rust
/// use serde_maml::parse_str_with_comments;
///
/// let doc = parse_str_with_comments("# top\n{ a: 1 }").unwrap();
/// assert_eq!(doc.head_comments[0].value, "top");
/// ```
///
/// # Errors
///
/// Returns [`Error::Syntax`] carrying every problem found in the document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_str_with_comments(s: &str) -> Result<Document> {
    parse_bytes(s.as_bytes(), true)
}

/// Deserialize an instance of type `T` from a string of MAML text.
///
/// # Examples
///
/// ```rust
/// use serde_maml::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("{ x: 1, y: 2 }").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid MAML or cannot be bound to
/// `T`. Syntax errors carry line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice(s.as_bytes())
}

/// Deserialize an instance of type `T` from a string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_maml::{from_str_with_options, DecodeOptions};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Config { name: String }
///
/// let opts = DecodeOptions::new().deny_unknown_fields();
/// let err = from_str_with_options::<Config>("{ name: \"x\", extra: 1 }", opts);
/// assert!(err.is_err());
/// ```
///
/// # Errors
///
/// Returns an error on invalid options, invalid MAML, or a binding failure.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<T>(s: &str, opts: DecodeOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice_with_options(s.as_bytes(), opts)
}

/// Deserialize an instance of type `T` from bytes of MAML text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid MAML or cannot be bound to
/// `T`. Invalid UTF-8 is reported as a syntax error with its position.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice_with_options(bytes, DecodeOptions::default())
}

/// Deserialize an instance of type `T` from bytes with custom options.
///
/// # Errors
///
/// Returns an error on invalid options, invalid MAML, or a binding failure.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice_with_options<T>(bytes: &[u8], opts: DecodeOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    if opts.max_depth == 0 {
        return Err(Error::InvalidOptions(
            "max depth must be a positive integer".to_string(),
        ));
    }
    let doc = parse_bytes(bytes, opts.parse_comments)?;
    de::deserialize_document(&doc, &opts)
}

/// Deserialize an instance of type `T` from an I/O stream of MAML.
///
/// The reader is consumed to its end before parsing begins.
///
/// # Examples
///
/// ```rust
/// use serde_maml::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"{ x: 1, y: 2 }")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid MAML, or the
/// data cannot be bound to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    from_reader_with_options(reader, DecodeOptions::default())
}

/// Deserialize an instance of type `T` from an I/O stream with custom
/// options.
///
/// # Errors
///
/// Returns an error if reading fails, the options are invalid, the input is
/// not valid MAML, or the data cannot be bound to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<R, T>(mut reader: R, opts: DecodeOptions) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_slice_with_options(&bytes, opts)
}

/// Serialize any `T: Serialize` to a MAML string.
///
/// Output is pretty-printed with two-space indentation; use
/// [`to_string_with_options`] for other styles.
///
/// # Examples
///
/// ```rust
/// use serde_maml::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let maml = to_string(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(maml, "{\n  x: 1\n  y: 2\n}");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be encoded (unsupported values,
/// non-string map keys, reference cycles).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, EncodeOptions::default())
}

/// Serialize any `T: Serialize` to a MAML string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_maml::{to_string_with_options, EncodeOptions};
///
/// let out = to_string_with_options(&vec![1, 2], EncodeOptions::compact()).unwrap();
/// assert_eq!(out, "[1,2]");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, opts: EncodeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let expr = ser::to_expression(value)?;
    format::expression_to_string(&expr, &opts)
}

/// Serialize any `T: Serialize` to a MAML byte vector.
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_vec_with_options(value, EncodeOptions::default())
}

/// Serialize any `T: Serialize` to a MAML byte vector with custom options.
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_options<T>(value: &T, opts: EncodeOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let mut buf = Vec::new();
    to_writer_with_options(&mut buf, value, opts)?;
    Ok(buf)
}

/// Serialize any `T: Serialize` to a writer in MAML format.
///
/// # Examples
///
/// ```rust
/// use serde_maml::to_writer;
///
/// let mut buf = Vec::new();
/// to_writer(&mut buf, &42).unwrap();
/// assert_eq!(buf, b"42");
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, EncodeOptions::default())
}

/// Serialize any `T: Serialize` to a writer with custom options.
///
/// # Errors
///
/// Returns an error if encoding fails or the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, value: &T, opts: EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let expr = ser::to_expression(value)?;
    Formatter::new(writer, &opts).format_expression(&expr)
}

/// Writes a parsed document back out, including any attached comments.
///
/// # Errors
///
/// Returns an error only when the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn format_document<W>(doc: &Document, opts: &EncodeOptions, writer: W) -> Result<()>
where
    W: io::Write,
{
    Formatter::new(writer, opts).format_document(doc)
}

/// Convert any `T: Serialize` into a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_maml::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value: Value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_object());
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    let expr = ser::to_expression(value)?;
    de::deserialize_expression(&expr, &DecodeOptions::default())
}

/// Convert a [`Value`] into any `T: Deserialize`.
///
/// # Examples
///
/// ```rust
/// use serde_maml::{from_value, maml};
///
/// let point: (i64, i64) = from_value(maml!([1, 2])).unwrap();
/// assert_eq!(point, (1, 2));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be bound to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    let expr = ser::to_expression(&value)?;
    de::deserialize_expression(&expr, &DecodeOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    #[test]
    fn roundtrip_point() {
        let point = Point { x: 1, y: -2 };
        let maml = to_string(&point).unwrap();
        let point_back: Point = from_str(&maml).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn roundtrip_user() {
        let user = User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
        };

        let maml = to_string(&user).unwrap();
        let user_back: User = from_str(&maml).unwrap();
        assert_eq!(user, user_back);
    }

    #[test]
    fn roundtrip_compact() {
        let user = User {
            id: 1,
            name: "Bob".to_string(),
            active: false,
            tags: vec![],
        };
        let maml = to_string_with_options(&user, EncodeOptions::compact()).unwrap();
        assert_eq!(maml, "{id:1,name:\"Bob\",active:false,tags:[]}");
        let user_back: User = from_str(&maml).unwrap();
        assert_eq!(user, user_back);
    }

    #[test]
    fn to_value_preserves_structure() {
        let point = Point { x: 1, y: 2 };
        let value = to_value(&point).unwrap();
        assert_eq!(value.get("x").and_then(|v| v.as_i64()), Some(1));
        assert_eq!(value.get("y").and_then(|v| v.as_i64()), Some(2));

        let back: Point = from_value(value).unwrap();
        assert_eq!(back, point);
    }

    #[test]
    fn reader_and_writer_entry_points() {
        let point = Point { x: 3, y: 4 };
        let mut buf = Vec::new();
        to_writer(&mut buf, &point).unwrap();

        let back: Point = from_reader(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(back, point);
    }

    #[test]
    fn zero_max_depth_is_rejected() {
        let opts = DecodeOptions::new().with_max_depth(0);
        let err = from_str_with_options::<Value>("1", opts).unwrap_err();
        assert!(err.to_string().contains("positive integer"));
    }

    #[test]
    fn parse_errors_are_batched() {
        let err = from_str::<Value>("{ a: 1, a: 2, b: }").unwrap_err();
        let errors = err.parse_errors().expect("expected syntax errors");
        assert!(errors.len() >= 2);
    }
}
