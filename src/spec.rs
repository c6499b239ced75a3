//! MAML format notes.
//!
//! This module documents the MAML (Minimal Abstract Markup Language) syntax
//! as implemented by this library. MAML v0.1 is a superset of JSON intended
//! for configuration files: every JSON document is valid MAML, and MAML adds
//! comments, optional commas, bare keys, and multiline strings.
//!
//! # Documents
//!
//! A document holds a single root value of any kind:
//!
//! ```text
//! {
//!   project: "MAML"
//!   tags: ["minimal", "readable"]
//!   spec: { version: 1 }
//! }
//! ```
//!
//! # Objects
//!
//! Key-value pairs are separated by commas, newlines, or both:
//!
//! ```text
//! { a: 1, b: 2 }
//!
//! {
//!   a: 1
//!   b: 2,
//! }
//! ```
//!
//! Keys come in three forms:
//!
//! - **Bare keys**: one or more of `A-Z a-z 0-9 _ -`, e.g. `server-name`.
//! - **Integer keys**: `123: ...` is accepted and treated as the identifier
//!   `123`.
//! - **Quoted keys**: any string literal, required when the key contains
//!   other characters or is one of the keywords `true`, `false`, `null`.
//!
//! Duplicate keys in one object are a parse error.
//!
//! # Arrays
//!
//! Elements are separated by commas, newlines, or both; a trailing
//! separator is allowed:
//!
//! ```text
//! [1, 2, 3]
//!
//! [
//!   "one"
//!   "two",
//! ]
//! ```
//!
//! # Strings
//!
//! Standard strings are double-quoted and single-line, with the escapes
//! `\b \f \n \r \t \" \\ \/` and `\uXXXX` (four hex digits; surrogate code
//! points are rejected and surrogate pairs are not composed). Raw control
//! characters other than tab are forbidden.
//!
//! Multiline strings open and close with `"""`. A newline immediately after
//! the opener is dropped; everything else is taken verbatim, with no escape
//! processing:
//!
//! ```text
//! description: """
//! First line.
//! Second line.
//! """
//! ```
//!
//! # Numbers
//!
//! JSON number syntax: an optional minus, an integer part without leading
//! zeros, an optional fraction, an optional exponent. A fraction or
//! exponent makes the token a float; everything else is a 64-bit signed
//! integer. `01`, `+5`, `.1`, `1.` and `5e-` are all malformed.
//!
//! # Booleans and null
//!
//! The bare words `true`, `false` and `null`. Any other bare word in value
//! position is an identifier and decodes as a string.
//!
//! # Comments
//!
//! `#` starts a comment running to the end of the line:
//!
//! ```text
//! # configuration for the demo service
//! {
//!   port: 8080 # the default
//! }
//! ```
//!
//! Comments are normally discarded. [`crate::parse_str_with_comments`]
//! retains them on the syntax tree, attached to the nearest pair: comments
//! above a pair are its head comments, a comment on the same line is its
//! line comment, and comments on the lines after it (before the next pair)
//! are its foot comments. [`crate::format_document`] writes them back out.
//!
//! # Whitespace and line endings
//!
//! Space and tab separate tokens. `\n` and `\r\n` are line breaks; a lone
//! carriage return is an error. Input must be valid UTF-8.
