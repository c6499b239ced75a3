//! Lexical tokens for MAML source.
//!
//! The lexer produces a stream of [`Token`]s; each one records its [`Kind`],
//! the decoded literal payload, and the 1-based line/column of its first
//! character. Columns count characters, not bytes.

use std::fmt;

/// The kind of a lexical token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// An unknown or invalid token. The literal carries a diagnostic.
    Illegal,
    /// End of input. Returned repeatedly once reached.
    Eof,

    /// A bare identifier such as `key` or `some-name`.
    Ident,
    /// An integer literal such as `12345`.
    Int,
    /// A float literal such as `123.45` or `6.626e-34`.
    Float,
    /// A string literal. The literal holds the decoded text.
    String,

    LBrace,
    RBrace,
    LBrack,
    RBrack,
    Comma,
    Colon,

    True,
    False,
    Null,

    /// A `#` comment. The literal holds the text after `#`, trimmed of
    /// leading spaces and tabs.
    Comment,
    /// A line break (`\n` or `\r\n`).
    Newline,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Illegal => "ILLEGAL",
            Kind::Eof => "EOF",
            Kind::Ident => "IDENT",
            Kind::Int => "INT",
            Kind::Float => "FLOAT",
            Kind::String => "STRING",
            Kind::LBrace => "{",
            Kind::RBrace => "}",
            Kind::LBrack => "[",
            Kind::RBrack => "]",
            Kind::Comma => ",",
            Kind::Colon => ":",
            Kind::True => "TRUE",
            Kind::False => "FALSE",
            Kind::Null => "NULL",
            Kind::Comment => "COMMENT",
            Kind::Newline => "NEWLINE",
        };
        f.write_str(s)
    }
}

/// A lexical token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: Kind,
    pub literal: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub(crate) fn new(kind: Kind, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            literal: literal.into(),
            line,
            column,
        }
    }

    /// A position-less token, used for nodes built programmatically by the
    /// encoder rather than by the parser.
    pub(crate) fn synthetic(kind: Kind, literal: impl Into<String>) -> Self {
        Token::new(kind, literal, 0, 0)
    }
}

/// Checks the keyword table for an identifier. Returns the keyword kind for
/// `true`, `false` and `null`, and [`Kind::Ident`] otherwise.
pub fn lookup_ident(ident: &str) -> Kind {
    match ident {
        "true" => Kind::True,
        "false" => Kind::False,
        "null" => Kind::Null,
        _ => Kind::Ident,
    }
}

/// Classifies `s` under the MAML number grammar.
///
/// Returns `Some(Kind::Int)` or `Some(Kind::Float)` when the whole string is
/// a valid number, and `None` otherwise. The grammar: an optional `-`, an
/// integer part that is `0` or a nonzero digit followed by digits, an
/// optional fraction (`.` plus digits), an optional exponent (`e`/`E`,
/// optional sign, digits). Leading zeros are rejected.
pub fn classify_number(s: &str) -> Option<Kind> {
    let b = s.as_bytes();
    if b.is_empty() {
        return None;
    }

    let mut i = 0;
    let mut is_float = false;

    if b[i] == b'-' {
        if b.len() == 1 {
            return None;
        }
        i += 1;
    }

    // Integer part.
    let int_start = i;
    i = consume_digits(b, i);
    if i == int_start {
        return None;
    }
    if i - int_start > 1 && b[int_start] == b'0' {
        return None;
    }

    // Fractional part.
    if i < b.len() && b[i] == b'.' {
        is_float = true;
        i += 1;
        let frac_start = i;
        i = consume_digits(b, i);
        if i == frac_start {
            return None;
        }
    }

    // Exponent part.
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        is_float = true;
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        i = consume_digits(b, i);
        if i == exp_start {
            return None;
        }
    }

    if i != b.len() {
        return None;
    }

    Some(if is_float { Kind::Float } else { Kind::Int })
}

fn consume_digits(b: &[u8], mut i: usize) -> usize {
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    i
}

/// Returns `true` for characters allowed in a bare identifier:
/// `[A-Za-z0-9_-]`.
pub(crate) fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}
