//! The MAML parser.
//!
//! [`Parser`] consumes tokens from a [`Lexer`] and produces an
//! [`ast::Document`](crate::ast::Document). Parsing never aborts early:
//! errors are accumulated with their positions and the caller inspects
//! [`Parser::errors`] afterwards. A non-empty error list means the document
//! is undefined, though it may still be partially populated for
//! diagnostics.
//!
//! Value dispatch is prefix-driven: each token kind that can begin an
//! expression has a registered parse function. NEWLINE and COMMA are treated
//! as separators, and COMMENT tokens are either filtered out entirely or, in
//! comment mode, attached to the nearest key-value pair.
//!
//! Every parse routine follows the same cursor contract: it is entered with
//! the current token on the first token of its construct and returns with
//! the current token on the token immediately following it, including on
//! error paths.

use std::collections::{HashMap, HashSet};

use crate::ast::{
    ArrayLiteral, BooleanLiteral, Comment, Document, Expression, ExpressionStatement,
    FloatLiteral, Identifier, IntegerLiteral, Key, KeyValue, NullLiteral, ObjectLiteral,
    StringLiteral,
};
use crate::error::{ParseError, ParseErrors};
use crate::lexer::Lexer;
use crate::token::{Kind, Token};

type PrefixFn<'a> = fn(&mut Parser<'a>) -> Option<Expression>;

/// Holds the state of the parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    errors: Vec<ParseError>,

    cur_token: Token,
    peek_token: Token,

    prefix_fns: HashMap<Kind, PrefixFn<'a>>,

    parse_comments: bool,
}

impl<'a> Parser<'a> {
    /// Creates a parser that discards comments.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self::with_comment_mode(lexer, false)
    }

    /// Creates a parser that attaches comments to the tree.
    pub fn new_with_comments(lexer: Lexer<'a>) -> Self {
        Self::with_comment_mode(lexer, true)
    }

    fn with_comment_mode(lexer: Lexer<'a>, parse_comments: bool) -> Self {
        let placeholder = Token::new(Kind::Eof, "", 0, 0);
        let mut p = Parser {
            lexer,
            errors: Vec::new(),
            cur_token: placeholder.clone(),
            peek_token: placeholder,
            prefix_fns: HashMap::new(),
            parse_comments,
        };

        p.register_prefix(Kind::Ident, Self::parse_identifier);
        p.register_prefix(Kind::Int, Self::parse_integer_literal);
        p.register_prefix(Kind::Float, Self::parse_float_literal);
        p.register_prefix(Kind::String, Self::parse_string_literal);
        p.register_prefix(Kind::True, Self::parse_boolean_literal);
        p.register_prefix(Kind::False, Self::parse_boolean_literal);
        p.register_prefix(Kind::Null, Self::parse_null_literal);
        p.register_prefix(Kind::LBrack, Self::parse_array_literal);
        p.register_prefix(Kind::LBrace, Self::parse_object_literal);
        p.register_prefix(Kind::Illegal, Self::parse_illegal);

        // Read two tokens, so cur_token and peek_token are both set.
        p.next_token();
        p.next_token();

        p
    }

    /// The errors encountered during parsing.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Consumes the parser's error list.
    pub fn take_errors(&mut self) -> ParseErrors {
        ParseErrors::new(std::mem::take(&mut self.errors))
    }

    /// Parses the MAML document and returns the root node.
    pub fn parse(&mut self) -> Document {
        let mut document = Document::default();

        self.skip(&[Kind::Newline]);

        // When parsing with comments, they can appear before the main value.
        if self.parse_comments {
            document.head_comments = self.consume_comments();
            self.skip(&[Kind::Newline]);
        }

        if self.cur_token_is(Kind::Eof) {
            return document;
        }

        let token = self.cur_token.clone();
        if let Some(expression) = self.parse_expression() {
            document.statements.push(ExpressionStatement { token, expression });
        }

        self.skip(&[Kind::Newline]);

        if !self.cur_token_is(Kind::Eof) {
            self.append_error(format!(
                "unexpected token after main value: {} ('{}')",
                self.cur_token.kind, self.cur_token.literal
            ));
        }

        document
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
        if !self.parse_comments {
            while self.cur_token_is(Kind::Comment) {
                self.cur_token =
                    std::mem::replace(&mut self.peek_token, self.lexer.next_token());
            }
        }
    }

    /// Consumes a block of comments, including the newlines between them.
    fn consume_comments(&mut self) -> Vec<Comment> {
        let mut comments = Vec::new();
        loop {
            if self.cur_token_is(Kind::Comment) {
                comments.push(Comment::from_token(self.cur_token.clone()));
                self.next_token();
            } else if self.cur_token_is(Kind::Newline) && self.peek_token_is(Kind::Comment) {
                // A newline followed by another comment stays in the block.
                self.next_token();
            } else {
                break;
            }
        }
        comments
    }

    /// Consumes one or more newline tokens and returns the count.
    fn consume_newlines(&mut self) -> usize {
        let mut count = 0;
        while self.cur_token_is(Kind::Newline) {
            count += 1;
            self.next_token();
        }
        count
    }

    fn parse_expression(&mut self) -> Option<Expression> {
        let Some(&prefix) = self.prefix_fns.get(&self.cur_token.kind) else {
            self.append_error(format!(
                "no prefix parse function for {} ('{}') found",
                self.cur_token.kind, self.cur_token.literal
            ));
            self.next_token();
            return None;
        };
        prefix(self)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        // An IDENT that starts with a digit or '-' must be a malformed
        // number, because a valid number would have been tokenized as INT
        // or FLOAT. This applies to identifiers used as values.
        let lit = &self.cur_token.literal;
        if lit.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            let msg = format!("invalid number format: {lit}");
            self.append_error(msg);
            self.next_token();
            return None;
        }

        let expr = Expression::Identifier(Identifier {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        });
        self.next_token();
        Some(expr)
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let value = match token.literal.parse::<i64>() {
            Ok(v) => v,
            Err(err) => {
                self.append_error(format!(
                    "could not parse {:?} as integer: {err}",
                    token.literal
                ));
                self.next_token();
                return None;
            }
        };
        self.next_token();
        Some(Expression::Integer(IntegerLiteral { token, value }))
    }

    fn parse_float_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let value = match token.literal.parse::<f64>() {
            Ok(v) => v,
            Err(err) => {
                self.append_error(format!(
                    "could not parse {:?} as float: {err}",
                    token.literal
                ));
                self.next_token();
                return None;
            }
        };
        self.next_token();
        Some(Expression::Float(FloatLiteral { token, value }))
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let value = token.literal.clone();
        self.next_token();
        Some(Expression::String(StringLiteral { token, value }))
    }

    fn parse_boolean_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let value = self.cur_token_is(Kind::True);
        self.next_token();
        Some(Expression::Boolean(BooleanLiteral { token, value }))
    }

    fn parse_null_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        self.next_token();
        Some(Expression::Null(NullLiteral { token }))
    }

    fn parse_illegal(&mut self) -> Option<Expression> {
        self.append_error(format!(
            "illegal token encountered: {}",
            self.cur_token.literal
        ));
        self.next_token();
        None
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        self.next_token(); // Consume '['

        let elements = self.parse_expression_list(Kind::RBrack);

        if !self.cur_token_is(Kind::RBrack) {
            self.append_error(format!(
                "unterminated array literal, expected ']' got {}",
                self.cur_token.kind
            ));
            return None;
        }
        self.next_token(); // Consume ']'
        Some(Expression::Array(ArrayLiteral { token, elements }))
    }

    fn parse_expression_list(&mut self, end: Kind) -> Vec<Expression> {
        let mut list = Vec::new();
        self.skip(&[Kind::Newline]);
        if self.cur_token_is(end) {
            return list;
        }

        list.extend(self.parse_expression());

        loop {
            self.skip(&[Kind::Newline, Kind::Comma]);
            if self.cur_token_is(end) || self.cur_token_is(Kind::Eof) {
                break;
            }
            list.extend(self.parse_expression());
        }
        list
    }

    fn parse_object_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let mut pairs: Vec<KeyValue> = Vec::new();
        let mut keys: HashSet<String> = HashSet::new();
        self.next_token(); // Consume '{'

        while !self.cur_token_is(Kind::RBrace) && !self.cur_token_is(Kind::Eof) {
            let mut newlines = self.consume_newlines();
            if self.cur_token_is(Kind::Comma) {
                self.next_token();
                newlines += self.consume_newlines();
            }

            if self.cur_token_is(Kind::RBrace) {
                break;
            }

            let mut head_comments = Vec::new();
            if self.parse_comments {
                // A pair can be preceded by multiple comment blocks,
                // separated by newlines. Consume all of them.
                while self.cur_token_is(Kind::Comment) {
                    head_comments.extend(self.consume_comments());
                    self.skip(&[Kind::Newline]);
                }
            }

            if self.cur_token_is(Kind::RBrace) {
                break;
            }

            match self.parse_key_value_pair(head_comments, newlines) {
                Some(mut pair) => {
                    let key_str = pair.key.text().to_string();
                    if !keys.insert(key_str.clone()) {
                        self.append_error(format!("duplicate key in object: {key_str}"));
                    }

                    if self.parse_comments {
                        // Foot comments may follow the pair, optionally
                        // behind a comma, and must be on a new line.
                        if self.cur_token_is(Kind::Comma) && self.peek_token_is(Kind::Newline) {
                            self.next_token(); // consume comma
                        }
                        if self.cur_token_is(Kind::Newline) && self.peek_token_is(Kind::Comment) {
                            self.next_token(); // consume newline
                            pair.foot_comments = self.consume_comments();
                        }
                    }
                    pairs.push(pair);
                }
                None => self.next_token(),
            }
        }

        if !self.cur_token_is(Kind::RBrace) {
            self.append_error(format!(
                "unterminated object literal, expected '}}' got {}",
                self.cur_token.kind
            ));
            return None;
        }
        self.next_token(); // Consume '}'
        Some(Expression::Object(ObjectLiteral { token, pairs }))
    }

    fn parse_key_value_pair(
        &mut self,
        head_comments: Vec<Comment>,
        newlines_before: usize,
    ) -> Option<KeyValue> {
        let key = self.parse_object_key()?;

        if !self.cur_token_is(Kind::Colon) {
            self.append_error(format!(
                "expected ':' after key, got {}",
                self.cur_token.kind
            ));
            return None;
        }
        let token = self.cur_token.clone();
        self.next_token(); // Consume ':'
        self.skip(&[Kind::Newline]);

        let value = self.parse_expression()?;

        let mut pair = KeyValue {
            token,
            key,
            value,
            head_comments,
            line_comment: None,
            foot_comments: Vec::new(),
            newlines_before,
        };

        if self.parse_comments {
            // A line comment must not be separated from the value by a
            // newline. It can appear before or after an optional comma.
            if self.cur_token_is(Kind::Comment) {
                pair.line_comment = Some(Comment::from_token(self.cur_token.clone()));
                self.next_token();
            } else if self.cur_token_is(Kind::Comma) && self.peek_token_is(Kind::Comment) {
                self.next_token(); // consume comma
                pair.line_comment = Some(Comment::from_token(self.cur_token.clone()));
                self.next_token();
            }
        }

        Some(pair)
    }

    fn parse_object_key(&mut self) -> Option<Key> {
        let token = self.cur_token.clone();
        let key = match token.kind {
            Kind::String => Key::String(StringLiteral {
                value: token.literal.clone(),
                token,
            }),
            // Numeric keys are treated as identifiers.
            Kind::Ident | Kind::Int => Key::Identifier(Identifier {
                value: token.literal.clone(),
                token,
            }),
            _ => {
                self.append_error(format!(
                    "invalid token for object key: {} ('{}')",
                    token.kind, token.literal
                ));
                self.next_token();
                return None;
            }
        };
        self.next_token();
        Some(key)
    }

    fn skip(&mut self, kinds: &[Kind]) {
        while kinds.contains(&self.cur_token.kind) {
            self.next_token();
        }
    }

    fn register_prefix(&mut self, kind: Kind, f: PrefixFn<'a>) {
        self.prefix_fns.insert(kind, f);
    }

    fn append_error(&mut self, message: String) {
        self.errors.push(ParseError {
            message,
            line: self.cur_token.line,
            column: self.cur_token.column,
        });
    }

    fn cur_token_is(&self, kind: Kind) -> bool {
        self.cur_token.kind == kind
    }

    fn peek_token_is(&self, kind: Kind) -> bool {
        self.peek_token.kind == kind
    }
}
