//! Configuration options for MAML encoding and decoding.
//!
//! - [`EncodeOptions`]: output style (indentation, commas, inline forms)
//! - [`DecodeOptions`]: decoding behavior (recursion limit, comment mode,
//!   strict field matching)
//!
//! ## Examples
//!
//! ```rust
//! use serde_maml::{to_string_with_options, EncodeOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data { x: i32, y: i32 }
//!
//! let data = Data { x: 1, y: 2 };
//!
//! let compact = to_string_with_options(&data, EncodeOptions::compact()).unwrap();
//! assert_eq!(compact, "{x:1,y:2}");
//!
//! let pretty = to_string_with_options(
//!     &data,
//!     EncodeOptions::new().with_field_commas(),
//! ).unwrap();
//! assert_eq!(pretty, "{\n  x: 1,\n  y: 2\n}");
//! ```

/// The default number of spaces per indentation level.
pub const DEFAULT_INDENT: usize = 2;

/// The default maximum recursion depth for decoding.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Controls the textual form of encoded MAML.
///
/// The default is pretty output with two-space indentation, newline
/// separators, and no commas. An `indent` of zero selects compact mode: no
/// newlines and minimal whitespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Spaces per nesting level; 0 means compact output.
    pub indent: usize,
    /// Insert commas between siblings in pretty mode.
    pub field_commas: bool,
    /// Also emit a comma after the last sibling. Only effective together
    /// with `field_commas`.
    pub trailing_commas: bool,
    /// Always emit arrays on one line.
    pub inline_arrays: bool,
    /// Never emit triple-quoted multiline strings; escape newlines instead.
    pub inline_strings: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            indent: DEFAULT_INDENT,
            field_commas: false,
            trailing_commas: false,
            inline_arrays: false,
            inline_strings: false,
        }
    }
}

impl EncodeOptions {
    /// Creates the default options: pretty output, two-space indentation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for compact single-line output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_maml::EncodeOptions;
    ///
    /// let options = EncodeOptions::compact();
    /// assert_eq!(options.indent, 0);
    /// ```
    #[must_use]
    pub fn compact() -> Self {
        EncodeOptions {
            indent: 0,
            ..Default::default()
        }
    }

    /// Sets the indentation size. Zero selects compact mode.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Separates siblings with commas in pretty mode.
    #[must_use]
    pub fn with_field_commas(mut self) -> Self {
        self.field_commas = true;
        self
    }

    /// Adds a trailing comma after the last sibling (requires
    /// [`EncodeOptions::with_field_commas`]).
    #[must_use]
    pub fn with_trailing_commas(mut self) -> Self {
        self.trailing_commas = true;
        self
    }

    /// Keeps arrays on a single line regardless of indentation.
    #[must_use]
    pub fn with_inline_arrays(mut self) -> Self {
        self.inline_arrays = true;
        self
    }

    /// Disables triple-quoted multiline strings.
    #[must_use]
    pub fn with_inline_strings(mut self) -> Self {
        self.inline_strings = true;
        self
    }

    pub(crate) fn is_compact(&self) -> bool {
        self.indent == 0
    }
}

/// Controls decoding behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum recursion depth. Must be positive; checked when decoding
    /// begins.
    pub max_depth: usize,
    /// Attach comments and vertical-spacing hints to the parsed tree.
    pub parse_comments: bool,
    /// Error on document keys that bind to no record field.
    pub deny_unknown_fields: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            parse_comments: false,
            deny_unknown_fields: false,
        }
    }
}

impl DecodeOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum recursion depth.
    ///
    /// The depth must be a positive integer; decoding rejects a zero value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_maml::DecodeOptions;
    ///
    /// let options = DecodeOptions::new().with_max_depth(64);
    /// assert_eq!(options.max_depth, 64);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables comment parsing (used by [`crate::parse_str_with_comments`]).
    #[must_use]
    pub fn with_comments(mut self) -> Self {
        self.parse_comments = true;
        self
    }

    /// Enables strict field matching: unknown object keys become errors.
    #[must_use]
    pub fn deny_unknown_fields(mut self) -> Self {
        self.deny_unknown_fields = true;
        self
    }
}
