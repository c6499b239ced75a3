//! The MAML formatter.
//!
//! Writes a syntax tree back out as MAML text under the style controls of
//! [`EncodeOptions`]: compact single-line output when `indent` is zero,
//! otherwise pretty output with one child per line. Comment-carrying trees
//! (produced by [`crate::parse_str_with_comments`]) have their head, line
//! and foot comments re-emitted in place, and blank-line counts recorded by
//! the parser are replayed.
//!
//! Formatting only fails when the underlying writer fails.

use std::io::Write;

use crate::ast::{quote_string, ArrayLiteral, Document, Expression, ObjectLiteral};
use crate::error::Result;
use crate::options::EncodeOptions;

const TRIPLE_QUOTE: &str = "\"\"\"";

/// A string takes the triple-quoted form only when it contains a newline,
/// no `"""` sequence, and no control characters that are illegal inside a
/// multiline literal (where the body cannot be escaped).
fn multiline_eligible(s: &str) -> bool {
    s.contains('\n')
        && !s.contains(TRIPLE_QUOTE)
        && s.chars()
            .all(|c| c == '\n' || !crate::lexer::is_forbidden_control_char(c))
}

/// Writes a MAML AST to an output stream.
pub(crate) struct Formatter<'a, W: Write> {
    w: W,
    indent: String,
    depth: usize,
    opts: &'a EncodeOptions,
}

impl<'a, W: Write> Formatter<'a, W> {
    pub(crate) fn new(w: W, opts: &'a EncodeOptions) -> Self {
        let indent = " ".repeat(opts.indent);
        Formatter {
            w,
            indent,
            depth: 0,
            opts,
        }
    }

    /// Writes the document: leading comments, then the root value.
    pub(crate) fn format_document(&mut self, doc: &Document) -> Result<()> {
        for comment in &doc.head_comments {
            writeln!(self.w, "# {}", comment.value)?;
        }
        for (i, stmt) in doc.statements.iter().enumerate() {
            if i > 0 {
                writeln!(self.w)?;
            }
            self.format_expression(&stmt.expression)?;
        }
        Ok(())
    }

    pub(crate) fn format_expression(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Object(obj) => self.write_object(obj),
            Expression::Array(arr) => self.write_array(arr),
            Expression::String(s) => {
                if self.opts.inline_strings || self.opts.is_compact() || !multiline_eligible(&s.value)
                {
                    write!(self.w, "{}", quote_string(&s.value))?;
                } else {
                    self.write_multiline_string(&s.value)?;
                }
                Ok(())
            }
            other => {
                write!(self.w, "{other}")?;
                Ok(())
            }
        }
    }

    fn write_indent(&mut self) -> Result<()> {
        for _ in 0..self.depth {
            write!(self.w, "{}", self.indent)?;
        }
        Ok(())
    }

    /// The multiline form: opener, newline, raw body, closer. The body is
    /// emitted verbatim at column zero.
    fn write_multiline_string(&mut self, s: &str) -> Result<()> {
        write!(self.w, "{TRIPLE_QUOTE}\n{s}{TRIPLE_QUOTE}")?;
        Ok(())
    }

    fn write_object(&mut self, obj: &ObjectLiteral) -> Result<()> {
        write!(self.w, "{{")?;
        if !obj.pairs.is_empty() {
            if self.opts.is_compact() {
                self.write_compact_object(obj)?;
            } else {
                self.write_pretty_object(obj)?;
            }
        }
        write!(self.w, "}}")?;
        Ok(())
    }

    fn write_compact_object(&mut self, obj: &ObjectLiteral) -> Result<()> {
        for (i, pair) in obj.pairs.iter().enumerate() {
            if i > 0 {
                write!(self.w, ",")?;
            }
            write!(self.w, "{}:", pair.key)?;
            self.format_expression(&pair.value)?;
        }
        Ok(())
    }

    fn write_pretty_object(&mut self, obj: &ObjectLiteral) -> Result<()> {
        self.depth += 1;
        let last = obj.pairs.len() - 1;
        for (i, pair) in obj.pairs.iter().enumerate() {
            // Replay the vertical spacing recorded from the source. The
            // first pair sits directly after '{', and every pair needs at
            // least one newline.
            let newlines = if i == 0 { 1 } else { pair.newlines_before.max(1) };
            for _ in 0..newlines {
                writeln!(self.w)?;
            }

            for comment in &pair.head_comments {
                self.write_indent()?;
                writeln!(self.w, "# {}", comment.value)?;
            }

            self.write_indent()?;
            write!(self.w, "{}: ", pair.key)?;
            self.format_expression(&pair.value)?;

            if self.opts.field_commas && (i < last || self.opts.trailing_commas) {
                write!(self.w, ",")?;
            }

            if let Some(comment) = &pair.line_comment {
                write!(self.w, " # {}", comment.value)?;
            }

            for comment in &pair.foot_comments {
                writeln!(self.w)?;
                self.write_indent()?;
                write!(self.w, "# {}", comment.value)?;
            }
        }
        self.depth -= 1;
        writeln!(self.w)?;
        self.write_indent()
    }

    fn write_array(&mut self, arr: &ArrayLiteral) -> Result<()> {
        write!(self.w, "[")?;
        if !arr.elements.is_empty() {
            if self.opts.inline_arrays || self.opts.is_compact() {
                self.write_compact_array(arr)?;
            } else {
                self.write_pretty_array(arr)?;
            }
        }
        write!(self.w, "]")?;
        Ok(())
    }

    fn write_compact_array(&mut self, arr: &ArrayLiteral) -> Result<()> {
        for (i, elem) in arr.elements.iter().enumerate() {
            if i > 0 {
                write!(self.w, ",")?;
            }
            self.format_expression(elem)?;
        }
        Ok(())
    }

    fn write_pretty_array(&mut self, arr: &ArrayLiteral) -> Result<()> {
        self.depth += 1;
        let last = arr.elements.len() - 1;
        for (i, elem) in arr.elements.iter().enumerate() {
            writeln!(self.w)?;
            self.write_indent()?;
            self.format_expression(elem)?;
            if self.opts.field_commas && (i < last || self.opts.trailing_commas) {
                write!(self.w, ",")?;
            }
        }
        self.depth -= 1;
        writeln!(self.w)?;
        self.write_indent()
    }
}

/// Renders a single expression to a string under the given options.
pub(crate) fn expression_to_string(expr: &Expression, opts: &EncodeOptions) -> Result<String> {
    let mut buf = Vec::new();
    Formatter::new(&mut buf, opts).format_expression(expr)?;
    // The formatter only ever writes UTF-8.
    String::from_utf8(buf).map_err(crate::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        BooleanLiteral, Comment, ExpressionStatement, FloatLiteral, Identifier, IntegerLiteral,
        Key, KeyValue, NullLiteral, StringLiteral,
    };
    use crate::token::{Kind, Token};

    fn ident_key(name: &str) -> Key {
        Key::Identifier(Identifier {
            token: Token::synthetic(Kind::Ident, name),
            value: name.to_string(),
        })
    }

    fn pair(name: &str, value: Expression) -> KeyValue {
        KeyValue::new(ident_key(name), value)
    }

    fn string(value: &str) -> Expression {
        Expression::String(StringLiteral {
            token: Token::synthetic(Kind::String, value),
            value: value.to_string(),
        })
    }

    fn int(value: i64) -> Expression {
        Expression::Integer(IntegerLiteral {
            token: Token::synthetic(Kind::Int, value.to_string()),
            value,
        })
    }

    fn boolean(value: bool) -> Expression {
        Expression::Boolean(BooleanLiteral {
            token: Token::synthetic(if value { Kind::True } else { Kind::False }, value.to_string()),
            value,
        })
    }

    fn null() -> Expression {
        Expression::Null(NullLiteral {
            token: Token::synthetic(Kind::Null, "null"),
        })
    }

    fn object(pairs: Vec<KeyValue>) -> Expression {
        Expression::Object(ObjectLiteral {
            token: Token::synthetic(Kind::LBrace, "{"),
            pairs,
        })
    }

    fn array(elements: Vec<Expression>) -> Expression {
        Expression::Array(ArrayLiteral {
            token: Token::synthetic(Kind::LBrack, "["),
            elements,
        })
    }

    fn sample_document() -> Document {
        let expression = object(vec![
            pair("stringField", string("hello world")),
            pair("multilineString", string("line one\nline two")),
            pair(
                "floatField",
                Expression::Float(FloatLiteral {
                    token: Token::synthetic(Kind::Float, "3.14"),
                    value: 3.14,
                }),
            ),
            pair(
                "nestedObject",
                object(vec![pair("a", int(1)), pair("b", boolean(true))]),
            ),
            pair("arrayField", array(vec![int(10), string("foo"), null()])),
        ]);
        Document {
            head_comments: Vec::new(),
            statements: vec![ExpressionStatement {
                token: Token::synthetic(Kind::LBrace, "{"),
                expression,
            }],
        }
    }

    fn format_doc(doc: &Document, opts: &EncodeOptions) -> String {
        let mut buf = Vec::new();
        Formatter::new(&mut buf, opts).format_document(doc).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn format_expr(expr: &Expression, opts: &EncodeOptions) -> String {
        expression_to_string(expr, opts).unwrap()
    }

    #[test]
    fn compact_mode() {
        let out = format_doc(&sample_document(), &EncodeOptions::compact());
        assert_eq!(
            out,
            r#"{stringField:"hello world",multilineString:"line one\nline two",floatField:3.14,nestedObject:{a:1,b:true},arrayField:[10,"foo",null]}"#
        );
    }

    #[test]
    fn default_indent_no_commas() {
        let out = format_doc(&sample_document(), &EncodeOptions::new());
        let expected = "{\n  stringField: \"hello world\"\n  multilineString: \"\"\"\nline one\nline two\"\"\"\n  floatField: 3.14\n  nestedObject: {\n    a: 1\n    b: true\n  }\n  arrayField: [\n    10\n    \"foo\"\n    null\n  ]\n}";
        assert_eq!(out, expected);
    }

    #[test]
    fn default_indent_with_field_commas() {
        let out = format_doc(
            &sample_document(),
            &EncodeOptions::new().with_field_commas(),
        );
        let expected = "{\n  stringField: \"hello world\",\n  multilineString: \"\"\"\nline one\nline two\"\"\",\n  floatField: 3.14,\n  nestedObject: {\n    a: 1,\n    b: true\n  },\n  arrayField: [\n    10,\n    \"foo\",\n    null\n  ]\n}";
        assert_eq!(out, expected);
    }

    #[test]
    fn custom_indent_four_spaces() {
        let out = format_doc(
            &sample_document(),
            &EncodeOptions::new().with_indent(4).with_field_commas(),
        );
        assert!(out.contains("\n    stringField: \"hello world\","));
        assert!(out.contains("\n    nestedObject: {\n        a: 1,\n        b: true\n    },"));
    }

    #[test]
    fn empty_containers_collapse() {
        let obj = object(vec![]);
        assert_eq!(format_expr(&obj, &EncodeOptions::new()), "{}");

        let arr = array(vec![]);
        assert_eq!(format_expr(&arr, &EncodeOptions::new()), "[]");
    }

    #[test]
    fn string_with_quotes_and_backslashes() {
        let s = string(r#"a "quote" and \n newline"#);
        assert_eq!(
            format_expr(&s, &EncodeOptions::compact()),
            r#""a \"quote\" and \\n newline""#
        );
    }

    #[test]
    fn inline_arrays() {
        let arr = array(vec![int(10), string("foo"), null()]);
        let opts = EncodeOptions::new().with_inline_arrays();
        assert_eq!(format_expr(&arr, &opts), r#"[10,"foo",null]"#);

        let opts = EncodeOptions::new().with_inline_arrays().with_field_commas();
        assert_eq!(format_expr(&arr, &opts), r#"[10,"foo",null]"#);
    }

    #[test]
    fn multiline_string_selection() {
        let s = string("first line\nsecond line\nthird line");
        assert_eq!(
            format_expr(&s, &EncodeOptions::new()),
            "\"\"\"\nfirst line\nsecond line\nthird line\"\"\""
        );

        // A leading newline in the value survives after the dropped opener
        // newline.
        let s = string("\nfirst line\nsecond line");
        assert_eq!(
            format_expr(&s, &EncodeOptions::new()),
            "\"\"\"\n\nfirst line\nsecond line\"\"\""
        );
    }

    #[test]
    fn inline_strings_option() {
        let s = string("line1\nline2");
        assert_eq!(
            format_expr(&s, &EncodeOptions::compact().with_inline_strings()),
            r#""line1\nline2""#
        );
        assert_eq!(
            format_expr(&s, &EncodeOptions::new().with_inline_strings()),
            r#""line1\nline2""#
        );
    }

    #[test]
    fn triple_quote_content_falls_back_to_standard_form() {
        let s = string(r#"This string has """ triple quotes"#);
        for opts in [EncodeOptions::new(), EncodeOptions::new().with_inline_strings()] {
            assert_eq!(
                format_expr(&s, &opts),
                r#""This string has \"\"\" triple quotes""#
            );
        }
    }

    #[test]
    fn trailing_commas() {
        let out = format_doc(
            &sample_document(),
            &EncodeOptions::new()
                .with_field_commas()
                .with_trailing_commas(),
        );
        assert!(out.contains("    b: true,\n  },"));
        assert!(out.contains("    null,\n  ],\n}"));
    }

    #[test]
    fn trailing_commas_require_field_commas() {
        let out = format_doc(
            &sample_document(),
            &EncodeOptions::new().with_trailing_commas(),
        );
        assert!(!out.contains(','));
    }

    #[test]
    fn object_with_all_comment_kinds() {
        let mut kv = pair("key", string("value"));
        kv.head_comments = vec![
            Comment::new("Head comment line 1"),
            Comment::new("Head comment line 2"),
        ];
        kv.line_comment = Some(Comment::new("Line comment"));
        kv.foot_comments = vec![Comment::new("Foot comment")];
        let obj = object(vec![kv]);

        let out = format_expr(&obj, &EncodeOptions::new().with_field_commas());
        let expected = "{\n  # Head comment line 1\n  # Head comment line 2\n  key: \"value\" # Line comment\n  # Foot comment\n}";
        assert_eq!(out, expected);
    }

    #[test]
    fn comments_across_multiple_pairs() {
        let mut first = pair("key1", int(1));
        first.head_comments = vec![Comment::new("Head for key1")];
        first.line_comment = Some(Comment::new("Line for key1"));
        let mut second = pair("key2", int(2));
        second.head_comments = vec![Comment::new("Head for key2")];
        second.foot_comments = vec![Comment::new("Foot for key2")];
        let obj = object(vec![first, second]);

        let out = format_expr(&obj, &EncodeOptions::new().with_field_commas());
        let expected = "{\n  # Head for key1\n  key1: 1, # Line for key1\n  # Head for key2\n  key2: 2\n  # Foot for key2\n}";
        assert_eq!(out, expected);
    }

    #[test]
    fn line_comments_on_containers() {
        let mut obj_pair = pair("innerObject", object(vec![pair("a", int(1))]));
        obj_pair.line_comment = Some(Comment::new("comment on object"));
        let mut arr_pair = pair("innerArray", array(vec![int(1)]));
        arr_pair.line_comment = Some(Comment::new("comment on array"));
        let obj = object(vec![obj_pair, arr_pair]);

        let out = format_expr(&obj, &EncodeOptions::new().with_field_commas());
        let expected = "{\n  innerObject: {\n    a: 1\n  }, # comment on object\n  innerArray: [\n    1\n  ] # comment on array\n}";
        assert_eq!(out, expected);
    }

    #[test]
    fn blank_lines_replayed() {
        let first = pair("a", int(1));
        let mut second = pair("b", int(2));
        second.newlines_before = 3;
        let obj = object(vec![first, second]);

        let out = format_expr(&obj, &EncodeOptions::new());
        assert_eq!(out, "{\n  a: 1\n\n\n  b: 2\n}");
    }

    #[test]
    fn quoted_keys() {
        let kv = KeyValue::new(
            Key::String(StringLiteral {
                token: Token::synthetic(Kind::String, "needs quoting"),
                value: "needs quoting".to_string(),
            }),
            int(1),
        );
        let obj = object(vec![kv]);
        assert_eq!(
            format_expr(&obj, &EncodeOptions::compact()),
            r#"{"needs quoting":1}"#
        );
    }

    #[test]
    fn writer_errors_propagate() {
        struct FailingWriter;
        impl std::io::Write for FailingWriter {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "write error"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let doc = sample_document();
        let err = Formatter::new(FailingWriter, &EncodeOptions::new())
            .format_document(&doc)
            .unwrap_err();
        assert!(err.to_string().contains("write error"));
    }
}
